//! Настройки по умолчанию для waypoint системы.
//!
//! Явное значение конфигурации, передаётся в `PathRegistry::new`,
//! `WaypointSequence::from_positions` и `WaypointPlugin`. Глобального синглтона нет.

use serde::{Deserialize, Serialize};

use crate::path::LoopType;

/// Defaults used when a sequence or registry is built without explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointSettings {
    /// Loop type for registrations that don't override it
    pub default_loop_type: LoopType,
    /// Радиус достижения для новых waypoints
    pub default_reach_radius: f32,
    /// true → стартуем с ближайшего waypoint, иначе со стартового
    pub start_at_nearest: bool,
    /// RGBA, метаданные для authoring-инструментов
    pub waypoint_color: [f32; 4],
    /// RGBA, метаданные для authoring-инструментов
    pub path_color: [f32; 4],
    pub show_reach_radius: bool,
}

impl Default for WaypointSettings {
    fn default() -> Self {
        Self {
            default_loop_type: LoopType::OneWay,
            default_reach_radius: 0.5,
            start_at_nearest: false,
            waypoint_color: [0.0, 0.0, 1.0, 1.0], // синий
            path_color: [0.0, 0.0, 0.0, 1.0],     // чёрный
            show_reach_radius: false,
        }
    }
}

impl WaypointSettings {
    pub fn with_loop_type(mut self, loop_type: LoopType) -> Self {
        self.default_loop_type = loop_type;
        self
    }

    pub fn with_reach_radius(mut self, radius: f32) -> Self {
        self.default_reach_radius = radius;
        self
    }

    pub fn with_start_at_nearest(mut self, start_at_nearest: bool) -> Self {
        self.start_at_nearest = start_at_nearest;
        self
    }
}
