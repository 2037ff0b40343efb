//! PathState - per-subject traversal state machine.
//!
//! Чистая логика: позицию subject'а передаёт вызывающий (`PathHandle`),
//! callbacks тоже рассылает он. Здесь только курсор, фаза и граничные условия.
//!
//! Фазы: `Forward` (по умолчанию), `Backward` (только PingPong), `Finished`
//! (терминальная).

use bevy::math::Vec3;
use bevy::prelude::Reflect;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::logger;
use crate::sequence::{WaypointNode, WaypointPath};

/// What happens when the subject reaches the end of the sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum LoopType {
    /// Go to the end, then stop
    #[default]
    OneWay,
    /// Go to the end, then wrap to the starting waypoint
    Loop,
    /// Go to the end, then walk back (and forth again)
    PingPong,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathPhase {
    #[default]
    Forward,
    Backward,
    Finished,
}

/// Cursor movement: `previous` → `next`.
///
/// `previous == next` on a forced resync and when a single-node sequence is
/// reached under Loop/PingPong.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointStep {
    pub previous: WaypointNode,
    pub next: WaypointNode,
}

impl WaypointStep {
    pub fn is_stationary(&self) -> bool {
        self.previous.index == self.next.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEvent {
    Reached(WaypointStep),
    Finished,
}

/// Serializable view of a path (для сравнения прогонов и отладки).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSnapshot {
    pub loop_type: LoopType,
    pub phase: PathPhase,
    pub current: usize,
}

#[derive(Debug, Clone)]
pub struct PathState {
    sequence: WaypointPath,
    loop_type: LoopType,
    current: usize,
    phase: PathPhase,
}

impl PathState {
    /// Creates a state at the starting node, or at the node nearest to
    /// `subject_position` when `start_at_nearest` is set.
    ///
    /// Fails on a sequence that can't be traversed (empty, bad radius, bad start).
    pub fn new(
        sequence: WaypointPath,
        loop_type: LoopType,
        start_at_nearest: bool,
        subject_position: Option<Vec3>,
    ) -> Result<Self> {
        let current = {
            let nodes = sequence.read();
            nodes.validate()?;

            match (start_at_nearest, subject_position) {
                (true, Some(position)) => nodes
                    .nearest_index(position)
                    .unwrap_or(nodes.starting_index()),
                (true, None) => {
                    logger::log_warning(
                        "⚠️ start-at-nearest without subject position, using starting waypoint",
                    );
                    nodes.starting_index()
                }
                (false, _) => nodes.starting_index(),
            }
        };

        Ok(Self {
            sequence,
            loop_type,
            current,
            phase: PathPhase::Forward,
        })
    }

    pub fn loop_type(&self) -> LoopType {
        self.loop_type
    }

    pub fn phase(&self) -> PathPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == PathPhase::Finished
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// `None` when the cursor points past a shrunk sequence.
    pub fn current_waypoint(&self) -> Option<WaypointNode> {
        self.sequence.node(self.current)
    }

    pub fn sequence(&self) -> &WaypointPath {
        &self.sequence
    }

    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            loop_type: self.loop_type,
            phase: self.phase,
            current: self.current,
        }
    }

    /// Forced resynchronization: if the current node no longer exists, jump to
    /// the node nearest to `position` and report `(nearest, nearest)`.
    pub fn resync(&mut self, position: Vec3) -> Option<WaypointStep> {
        if self.is_finished() {
            return None;
        }

        let nodes = self.sequence.read();
        if self.current < nodes.node_count() {
            return None;
        }

        let Some(nearest) = nodes.nearest_index(position).and_then(|i| nodes.node(i)).copied()
        else {
            logger::log_warning("⚠️ waypoint sequence is empty, path stays inert");
            return None;
        };

        logger::log_warning(&format!(
            "⚠️ waypoint {} disappeared, resync to nearest waypoint {}",
            self.current, nearest.index
        ));
        self.current = nearest.index;

        Some(WaypointStep {
            previous: nearest,
            next: nearest,
        })
    }

    /// One traversal step for the given subject position.
    pub fn advance(&mut self, position: Vec3) -> Option<PathEvent> {
        if self.is_finished() {
            return None;
        }

        let nodes = self.sequence.read();
        let reached = *nodes.node(self.current)?;
        if !reached.has_been_reached(position) {
            return None;
        }

        if self.loop_type == LoopType::PingPong && self.phase == PathPhase::Backward {
            match nodes.previous_index(self.current) {
                Some(previous) => self.current = previous,
                // Граница: первый узел → снова вперёд, на узел после стартового
                None => {
                    let starting = nodes.starting_index();
                    self.phase = PathPhase::Forward;
                    self.current = nodes.next_index(starting).unwrap_or(starting);
                }
            }
        } else {
            match nodes.next_index(self.current) {
                Some(next) => self.current = next,
                // Граница: последний узел
                None => match self.loop_type {
                    LoopType::Loop => self.current = nodes.starting_index(),
                    LoopType::OneWay => {
                        self.phase = PathPhase::Finished;
                        return Some(PathEvent::Finished);
                    }
                    LoopType::PingPong => {
                        // разворот без двойного шага: один узел назад за тик
                        self.current = nodes.previous_index(self.current).unwrap_or(self.current);
                        self.phase = PathPhase::Backward;
                    }
                },
            }
        }

        let next = *nodes.node(self.current)?;
        Some(PathEvent::Reached(WaypointStep {
            previous: reached,
            next,
        }))
    }

    /// Forces `Finished`. Returns false if the path was already finished.
    pub fn finish(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.phase = PathPhase::Finished;
        true
    }
}
