//! Authoring-правки sequence (data-level, без UI/gizmos/undo).
//!
//! Все правки держат инварианты: индексы узлов = порядок, стартовый узел
//! указывает на тот же узел (или на соседа, если его удалили).

use bevy::math::Vec3;

use super::{WaypointNode, WaypointSequence};
use crate::error::{Result, WaypointError};

impl WaypointSequence {
    /// Appends a node on top of the current last one (origin for an empty sequence).
    pub fn add_node(&mut self, reach_radius: f32) -> usize {
        let position = self.last().map(|node| node.position).unwrap_or(Vec3::ZERO);
        self.nodes.push(WaypointNode::new(position, reach_radius));
        self.reindex();
        self.nodes.len() - 1
    }

    /// Inserts a node at `index`, halfway between its new neighbours.
    ///
    /// Appending (`index == node_count`) places it on the previous last node.
    pub fn insert_node(&mut self, index: usize, reach_radius: f32) -> Result<usize> {
        let len = self.nodes.len();
        if index > len {
            return Err(WaypointError::NodeIndexOutOfRange { index, len });
        }

        let previous = index.checked_sub(1).and_then(|i| self.nodes.get(i));
        let position = match (previous, self.nodes.get(index)) {
            (Some(previous), Some(next)) => (previous.position + next.position) / 2.0,
            (Some(previous), None) => previous.position,
            (None, Some(next)) => next.position,
            (None, None) => Vec3::ZERO,
        };

        self.nodes.insert(index, WaypointNode::new(position, reach_radius));
        // стартовый узел остаётся тем же узлом
        if len > 0 && self.starting >= index {
            self.starting += 1;
        }
        self.reindex();
        Ok(index)
    }

    /// Removes a node. Removing the starting node moves the start to the previous node.
    pub fn remove_node(&mut self, index: usize) -> Result<WaypointNode> {
        let len = self.nodes.len();
        if index >= len {
            return Err(WaypointError::NodeIndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(WaypointError::LastNode);
        }

        let removed = self.nodes.remove(index);
        if index == self.starting {
            self.starting = index.saturating_sub(1);
        } else if index < self.starting {
            self.starting -= 1;
        }
        self.reindex();
        Ok(removed)
    }

    /// Drops every node but the first one.
    pub fn truncate_to_first(&mut self) {
        self.nodes.truncate(1);
        self.starting = 0;
    }

    pub fn reset_reach_radii(&mut self, reach_radius: f32) {
        for node in &mut self.nodes {
            node.reach_radius = reach_radius;
        }
    }

    pub fn set_starting(&mut self, starting: usize) -> Result<()> {
        if starting >= self.nodes.len() {
            return Err(WaypointError::StartingNodeOutOfRange {
                starting,
                len: self.nodes.len(),
            });
        }
        self.starting = starting;
        Ok(())
    }

    pub fn set_node_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or(WaypointError::NodeIndexOutOfRange { index, len })?;
        node.position = position;
        Ok(())
    }
}
