//! WPSystem Runtime
//!
//! Waypoint traversal: общий маршрут из узлов, по которому ходят subjects
//! (OneWay / Loop / PingPong), с событиями Reached / Finished.
//!
//! Слои:
//! - sequence: узлы маршрута + authoring правки
//! - path: state machine одного subject'а + callbacks
//! - registry: subject → path, тик всех путей, отложенное удаление
//! - plugin: Bevy ECS интеграция (FixedUpdate, Transform, events)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

// Публичные модули
pub mod error;
pub mod logger;
pub mod path;
pub mod plugin;
pub mod registry;
pub mod sequence;
pub mod settings;
pub mod subject;

// Re-export базовых типов для удобства
pub use error::{Result, WaypointError};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use path::{LoopType, PathEvent, PathHandle, PathPhase, PathSnapshot, PathState, WaypointStep};
pub use plugin::{
    PathComplete, PathFinished, WaypointPlugin, WaypointReached, WaypointSystem, WaypointSystems,
    WaypointTraveler,
};
pub use registry::{PathRegistry, WeakPathRegistry};
pub use sequence::{WaypointNode, WaypointPath, WaypointSequence};
pub use settings::WaypointSettings;
pub use subject::{SharedPosition, Subject};

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// WaypointPlugin добавляет вызывающий код (маршрут у каждого свой).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Прогоняет `ticks` FixedUpdate тиков напрямую (без wall-clock accumulator)
///
/// `app.update()` крутит FixedUpdate по реальному времени, для тестов и headless
/// прогонов число тиков должно быть точным.
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Состояние одного traveler'а для сравнения детерминизма
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerSnapshot {
    pub entity: u32,
    pub translation: Vec3,
    pub complete: bool,
    /// None → traveler не зарегистрирован (завершён и снят, или ещё не добавлен)
    pub path: Option<PathSnapshot>,
}

/// Snapshot всех travelers, отсортированный по Entity index
pub fn world_snapshot(world: &mut World) -> Vec<TravelerSnapshot> {
    let mut query =
        world.query_filtered::<(Entity, &Transform, Has<PathComplete>), With<WaypointTraveler>>();
    let mut travelers: Vec<_> = query
        .iter(world)
        .map(|(entity, transform, complete)| (entity, transform.translation, complete))
        .collect();

    // Сортируем по Entity ID для детерминизма
    travelers.sort_by_key(|(entity, _, _)| entity.index());

    let system = world.get_non_send_resource::<WaypointSystem>();
    travelers
        .into_iter()
        .map(|(entity, translation, complete)| TravelerSnapshot {
            entity: entity.index(),
            translation,
            complete,
            path: system
                .and_then(|system| system.registry().get(&entity))
                .map(|handle| handle.snapshot()),
        })
        .collect()
}
