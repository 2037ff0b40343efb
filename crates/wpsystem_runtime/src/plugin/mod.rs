//! Waypoint plugin (Bevy ECS интеграция)
//!
//! ECS ответственность:
//! - Transform travelers → позиции subjects
//! - WaypointTraveler add/remove → register/unregister
//! - Reached/Finished callbacks → Bevy events
//!
//! Traversal логика целиком в `PathRegistry` (однопоточный, `Rc`), поэтому
//! registry живёт в NonSend ресурсе и все системы идут на main thread.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod resource;
pub mod systems;


pub use components::{PathComplete, WaypointTraveler};
pub use events::{PathFinished, WaypointReached};
pub use resource::{PathNotification, PositionCache, WaypointSystem};

use crate::logger::log;
use crate::sequence::WaypointSequence;
use crate::settings::WaypointSettings;

/// Set всех waypoint систем (для `.after(WaypointSystems)` в gameplay коде)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaypointSystems;

/// Waypoint Plugin
///
/// Регистрирует waypoint системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. sync_traveler_positions - Transform → кэш позиций
/// 2. unregister_removed_travelers - despawn / remove компонента
/// 3. register_travelers - новые travelers и смена loop type
/// 4. tick_waypoint_paths - тик registry, events, PathComplete
/// 5. move_travelers - шаг к текущему waypoint
pub struct WaypointPlugin {
    pub sequence: WaypointSequence,
    pub settings: WaypointSettings,
}

impl WaypointPlugin {
    pub fn new(sequence: WaypointSequence, settings: WaypointSettings) -> Self {
        Self { sequence, settings }
    }
}

impl Plugin for WaypointPlugin {
    fn build(&self, app: &mut App) {
        log(&format!(
            "🗺️ WaypointPlugin: {} nodes, default {:?}",
            self.sequence.node_count(),
            self.settings.default_loop_type
        ));

        app.insert_non_send_resource(WaypointSystem::new(
            self.sequence.clone(),
            self.settings.clone(),
        ));

        app.register_type::<WaypointTraveler>();

        // Регистрация событий
        app.add_event::<WaypointReached>()
            .add_event::<PathFinished>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: позиции subjects
                systems::sync_traveler_positions_main_thread,

                // Фаза 2: membership (unregister раньше register - re-add в том же кадре)
                systems::unregister_removed_travelers_main_thread,
                systems::register_travelers_main_thread,

                // Фаза 3: traversal
                systems::tick_waypoint_paths_main_thread,

                // Фаза 4: движение
                systems::move_travelers_main_thread,
            )
                .chain()
                .in_set(WaypointSystems),
        );
    }
}
