//! Traveler компоненты: кто ходит по waypoints и с какими overrides

use bevy::prelude::*;

use crate::path::LoopType;

/// Entity, которая следует по общей waypoint последовательности.
///
/// Появление компонента → регистрация в `WaypointSystem`, удаление → unregister.
/// Смена `loop_type` на лету → перерегистрация со стартом от ближайшего узла.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WaypointTraveler {
    /// Скорость движения к текущему waypoint (метры/сек)
    pub speed: f32,
    /// None → `WaypointSettings::default_loop_type`
    pub loop_type: Option<LoopType>,
    /// None → `WaypointSettings::start_at_nearest`
    pub start_at_nearest: Option<bool>,
}

impl Default for WaypointTraveler {
    fn default() -> Self {
        Self {
            speed: 5.0,
            loop_type: None,
            start_at_nearest: None,
        }
    }
}

impl WaypointTraveler {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    pub fn with_loop_type(mut self, loop_type: LoopType) -> Self {
        self.loop_type = Some(loop_type);
        self
    }

    pub fn with_start_at_nearest(mut self, start_at_nearest: bool) -> Self {
        self.start_at_nearest = Some(start_at_nearest);
        self
    }
}

/// Маркер: OneWay путь пройден (или завершён instant_finish).
///
/// Движение останавливается; компонент снимается при перерегистрации.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PathComplete;
