//! Ошибки waypoint системы.
//!
//! Только конфигурационные ошибки и ошибки authoring-правок поднимаются наверх.
//! Dangling subject, усадка топологии и удаление во время тика обрабатываются
//! локально (логом), см. `path` и `registry`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaypointError {
    #[error("waypoint sequence has no nodes")]
    EmptySequence,

    #[error("waypoint {index} has invalid reach radius {radius} (must be finite and >= 0)")]
    InvalidReachRadius { index: usize, radius: f32 },

    #[error("starting waypoint {starting} is out of range (sequence has {len} nodes)")]
    StartingNodeOutOfRange { starting: usize, len: usize },

    #[error("waypoint index {index} is out of range (sequence has {len} nodes)")]
    NodeIndexOutOfRange { index: usize, len: usize },

    #[error("cannot remove the only waypoint of a sequence")]
    LastNode,
}

pub type Result<T> = std::result::Result<T, WaypointError>;
