//! Waypoint sequence - упорядоченный список waypoints (leaf data).
//!
//! # Архитектура
//!
//! **WaypointNode** - точка + радиус достижения + индекс в authored порядке.
//! "Next"/"previous" не хранятся: это `index + 1` / `index - 1` с проверкой границ.
//!
//! **WaypointSequence** - упорядоченные узлы + стартовый узел (обычно 0, но автор
//! может выбрать другой). Индекс 0 - канонический "первый" для nearest-поиска и
//! границы ping-pong.
//!
//! **WaypointPath** - shared handle (`Rc<RefCell<_>>`) на sequence. Один path
//! разделяют все `PathState` одного registry. Authoring-правки во время traversal
//! не поддерживаются, но выживаются (см. forced resync в `path::state`).

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::{Result, WaypointError};
use crate::settings::WaypointSettings;

mod authoring;

#[cfg(test)]
mod sequence_tests;

// ============================================================================
// WaypointNode
// ============================================================================

/// A fixed point in space with a reach radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointNode {
    pub position: Vec3,
    /// Дистанция (строго меньше), на которой waypoint считается достигнутым
    pub reach_radius: f32,
    /// 0-based позиция в authored порядке (проставляет sequence)
    pub index: usize,
}

impl WaypointNode {
    pub fn new(position: Vec3, reach_radius: f32) -> Self {
        Self {
            position,
            reach_radius,
            index: 0,
        }
    }

    pub fn has_been_reached(&self, position: Vec3) -> bool {
        self.position.distance(position) < self.reach_radius
    }
}

// ============================================================================
// WaypointSequence
// ============================================================================

/// Ordered waypoints plus the designated starting node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuthoredSequence", into = "AuthoredSequence")]
pub struct WaypointSequence {
    nodes: Vec<WaypointNode>,
    starting: usize,
}

impl WaypointSequence {
    pub fn new(nodes: impl IntoIterator<Item = WaypointNode>) -> Self {
        let mut sequence = Self {
            nodes: nodes.into_iter().collect(),
            starting: 0,
        };
        sequence.reindex();
        sequence
    }

    /// Builds a sequence from bare positions, every node gets the default reach radius.
    pub fn from_positions(
        positions: impl IntoIterator<Item = Vec3>,
        settings: &WaypointSettings,
    ) -> Self {
        Self::new(
            positions
                .into_iter()
                .map(|position| WaypointNode::new(position, settings.default_reach_radius)),
        )
    }

    pub fn with_starting(mut self, starting: usize) -> Result<Self> {
        self.set_starting(starting)?;
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&WaypointNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaypointNode> {
        self.nodes.iter()
    }

    pub fn first(&self) -> Option<&WaypointNode> {
        self.nodes.first()
    }

    pub fn last(&self) -> Option<&WaypointNode> {
        self.nodes.last()
    }

    pub fn starting_index(&self) -> usize {
        self.starting
    }

    pub fn starting_node(&self) -> Option<&WaypointNode> {
        self.nodes.get(self.starting)
    }

    pub fn next_index(&self, index: usize) -> Option<usize> {
        let next = index.checked_add(1)?;
        (next < self.nodes.len()).then_some(next)
    }

    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let previous = index.checked_sub(1)?;
        (previous < self.nodes.len()).then_some(previous)
    }

    /// Linear scan from index 0, keeps the strictly closer node (ties → lowest index).
    pub fn nearest_index(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for node in &self.nodes {
            let distance = node.position.distance(position);
            match best {
                None => best = Some((node.index, distance)),
                Some((_, best_distance)) if distance < best_distance => {
                    best = Some((node.index, distance))
                }
                _ => {}
            }
        }
        best.map(|(index, _)| index)
    }

    /// Checks everything a registration needs: at least one node, valid radii,
    /// starting node in range.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(WaypointError::EmptySequence);
        }
        if self.starting >= self.nodes.len() {
            return Err(WaypointError::StartingNodeOutOfRange {
                starting: self.starting,
                len: self.nodes.len(),
            });
        }
        for node in &self.nodes {
            if !node.reach_radius.is_finite() || node.reach_radius < 0.0 {
                return Err(WaypointError::InvalidReachRadius {
                    index: node.index,
                    radius: node.reach_radius,
                });
            }
        }
        Ok(())
    }

    fn reindex(&mut self) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.index = index;
        }
    }
}

// Authored формат: индексы не хранятся, их проставляет порядок.
#[derive(Serialize, Deserialize)]
struct AuthoredSequence {
    nodes: Vec<AuthoredNode>,
    #[serde(default)]
    starting: usize,
}

#[derive(Serialize, Deserialize)]
struct AuthoredNode {
    position: Vec3,
    reach_radius: f32,
}

impl From<AuthoredSequence> for WaypointSequence {
    fn from(authored: AuthoredSequence) -> Self {
        let mut sequence = WaypointSequence::new(
            authored
                .nodes
                .into_iter()
                .map(|node| WaypointNode::new(node.position, node.reach_radius)),
        );
        // Не валидируем здесь: пустой/битый sequence отклоняется при регистрации
        sequence.starting = authored.starting;
        sequence
    }
}

impl From<WaypointSequence> for AuthoredSequence {
    fn from(sequence: WaypointSequence) -> Self {
        Self {
            nodes: sequence
                .nodes
                .iter()
                .map(|node| AuthoredNode {
                    position: node.position,
                    reach_radius: node.reach_radius,
                })
                .collect(),
            starting: sequence.starting,
        }
    }
}

// ============================================================================
// WaypointPath (shared handle)
// ============================================================================

/// Shared, single-threaded handle to a sequence.
#[derive(Debug, Clone, Default)]
pub struct WaypointPath(Rc<RefCell<WaypointSequence>>);

impl WaypointPath {
    pub fn new(sequence: WaypointSequence) -> Self {
        Self(Rc::new(RefCell::new(sequence)))
    }

    pub fn read(&self) -> Ref<'_, WaypointSequence> {
        self.0.borrow()
    }

    /// Authoring-правка. Нельзя вызывать, пока держится `read()`.
    pub fn edit<R>(&self, edit: impl FnOnce(&mut WaypointSequence) -> R) -> R {
        edit(&mut self.0.borrow_mut())
    }

    pub fn node_count(&self) -> usize {
        self.0.borrow().node_count()
    }

    pub fn node(&self, index: usize) -> Option<WaypointNode> {
        self.0.borrow().node(index).copied()
    }

    pub fn to_sequence(&self) -> WaypointSequence {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &WaypointPath) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<WaypointSequence> for WaypointPath {
    fn from(sequence: WaypointSequence) -> Self {
        Self::new(sequence)
    }
}
