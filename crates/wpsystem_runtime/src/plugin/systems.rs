//! Waypoint системы (FixedUpdate, main thread - `WaypointSystem` NonSend)

use bevy::prelude::*;

use super::components::{PathComplete, WaypointTraveler};
use super::events::{PathFinished, WaypointReached};
use super::resource::{PathNotification, WaypointSystem};
use crate::logger::{log, log_error};

/// Система: Transform → PositionCache
///
/// Кэш пересобирается с нуля: despawned entity пропадают и их paths не тикают.
pub fn sync_traveler_positions_main_thread(
    travelers: Query<(Entity, &Transform), With<WaypointTraveler>>,
    system: NonSend<WaypointSystem>,
) {
    system
        .positions()
        .refresh(travelers.iter().map(|(entity, transform)| (entity, transform.translation)));
}

/// Система: RemovedComponents<WaypointTraveler> → unregister
///
/// Despawn тоже попадает сюда. Удаление отложенное (после ближайшего тика).
pub fn unregister_removed_travelers_main_thread(
    mut removed: RemovedComponents<WaypointTraveler>,
    system: NonSend<WaypointSystem>,
) {
    for entity in removed.read() {
        if system.unregister_entity(entity) {
            log(&format!("🚪 {:?} left waypoints", entity));
        }
    }
}

/// Система: регистрация новых travelers и смена loop type на лету
///
/// - Added → register с overrides компонента
/// - Changed и loop type отличается (или path уже снят) → unregister + register
///   со стартом от ближайшего узла, PathComplete снимается
pub fn register_travelers_main_thread(
    mut commands: Commands,
    travelers: Query<(Entity, Ref<WaypointTraveler>), Changed<WaypointTraveler>>,
    system: NonSend<WaypointSystem>,
) {
    for (entity, traveler) in travelers.iter() {
        if traveler.is_added() {
            match system.register_entity(entity, traveler.loop_type, traveler.start_at_nearest) {
                Ok(handle) => log(&format!(
                    "🧭 {:?} joined waypoints: {:?}, target #{}",
                    entity,
                    handle.loop_type(),
                    handle.current_index()
                )),
                Err(err) => log_error(&format!("❌ {:?} cannot join waypoints: {}", entity, err)),
            }
            continue;
        }

        let requested = system.effective_loop_type(traveler.loop_type);
        let registry = system.registry();
        let live = registry
            .get(&entity)
            .filter(|_| !registry.is_pending_removal(&entity));
        if let Some(handle) = &live {
            if handle.loop_type() == requested {
                continue;
            }
        }

        system.unregister_entity(entity);
        match system.register_entity(entity, Some(requested), Some(true)) {
            Ok(handle) => {
                commands.entity(entity).remove::<PathComplete>();
                log(&format!(
                    "🔀 {:?} switched to {:?}, target #{}",
                    entity,
                    requested,
                    handle.current_index()
                ));
            }
            Err(err) => log_error(&format!("❌ {:?} cannot switch loop type: {}", entity, err)),
        }
    }
}

/// Система: тик registry → WaypointReached / PathFinished events
///
/// Finished → PathComplete маркер + unregister (путь больше не нужен).
pub fn tick_waypoint_paths_main_thread(
    mut commands: Commands,
    system: NonSend<WaypointSystem>,
    mut reached_events: EventWriter<WaypointReached>,
    mut finished_events: EventWriter<PathFinished>,
) {
    for notification in system.tick() {
        match notification {
            PathNotification::Reached {
                entity,
                previous,
                next,
            } => {
                reached_events.write(WaypointReached {
                    entity,
                    previous,
                    next,
                });
            }
            PathNotification::Finished { entity } => {
                log(&format!("🏁 {:?} finished its path", entity));
                system.unregister_entity(entity);
                commands.entity(entity).try_insert(PathComplete);
                finished_events.write(PathFinished { entity });
            }
        }
    }
}

/// Система: линейное движение к текущему waypoint
///
/// Не перелетаем цель: последний шаг ставит ровно на позицию узла.
pub fn move_travelers_main_thread(
    mut travelers: Query<(Entity, &mut Transform, &WaypointTraveler), Without<PathComplete>>,
    system: NonSend<WaypointSystem>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.timestep().as_secs_f32();

    for (entity, mut transform, traveler) in travelers.iter_mut() {
        let Some(target) = system.current_waypoint(entity) else {
            continue;
        };

        let to_target = target.position - transform.translation;
        let distance = to_target.length();
        let step = traveler.speed * delta;

        if distance <= step {
            transform.translation = target.position;
        } else {
            transform.translation += to_target / distance * step;
        }
    }
}
