//! Headless прогон WPSystem
//!
//! Квадратный маршрут, travelers во всех loop режимах, смена режима на лету,
//! "N кругов и despawn". Без рендера, тики FixedUpdate считаются точно.

use bevy::prelude::*;
use rand::Rng;
use wpsystem_runtime::{
    create_headless_app, log, log_info, run_fixed_ticks, world_snapshot, DeterministicRng,
    LoopType, PathComplete, PathFinished, WaypointPlugin, WaypointReached, WaypointSequence,
    WaypointSettings, WaypointSystems, WaypointTraveler,
};

const TICK_COUNT: usize = 1200;
const SWITCH_TICK: usize = 600;

/// Despawn после `remaining` полных кругов (Reached с последнего узла на первый)
#[derive(Component, Debug)]
struct LoopsThenDespawn {
    remaining: u32,
}

/// Маркер: traveler, которому сменим loop type на SWITCH_TICK
#[derive(Component, Debug)]
struct SwitchesLoopType;

fn square_course(settings: &WaypointSettings) -> WaypointSequence {
    WaypointSequence::from_positions(
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 10.0),
        ],
        settings,
    )
}

/// Система: считаем круги по WaypointReached, despawn на последнем
fn count_laps_then_despawn(
    mut commands: Commands,
    mut reached_events: EventReader<WaypointReached>,
    mut travelers: Query<&mut LoopsThenDespawn>,
) {
    for event in reached_events.read() {
        let Ok(mut laps) = travelers.get_mut(event.entity) else {
            continue;
        };
        if event.next.index != 0 || event.previous.index == 0 {
            continue;
        }

        laps.remaining = laps.remaining.saturating_sub(1);
        log(&format!("🔁 {:?} lap done, {} left", event.entity, laps.remaining));
        if laps.remaining == 0 {
            log_info(&format!("💨 {:?} despawned after its laps", event.entity));
            commands.entity(event.entity).despawn();
        }
    }
}

fn log_finished(mut finished_events: EventReader<PathFinished>) {
    for event in finished_events.read() {
        log_info(&format!("🏁 {:?} reached the end of the course", event.entity));
    }
}

fn spawn_travelers(app: &mut App) {
    let world = app.world_mut();

    world.spawn((
        Name::new("one_way"),
        Transform::default(),
        WaypointTraveler::new(5.0).with_loop_type(LoopType::OneWay),
    ));
    world.spawn((
        Name::new("looper"),
        Transform::default(),
        WaypointTraveler::new(5.0).with_loop_type(LoopType::Loop),
    ));
    world.spawn((
        Name::new("ping_pong"),
        Transform::default(),
        WaypointTraveler::new(4.0).with_loop_type(LoopType::PingPong),
        SwitchesLoopType,
    ));
    world.spawn((
        Name::new("lapper"),
        Transform::default(),
        WaypointTraveler::new(8.0).with_loop_type(LoopType::Loop),
        LoopsThenDespawn { remaining: 2 },
    ));

    // Случайная (seeded) позиция, старт с ближайшего узла
    let spawn_at = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        Vec3::new(
            rng.rng.gen_range(-5.0..15.0),
            0.0,
            rng.rng.gen_range(-5.0..15.0),
        )
    };
    world.spawn((
        Name::new("wanderer"),
        Transform::from_translation(spawn_at),
        WaypointTraveler::new(3.0)
            .with_loop_type(LoopType::Loop)
            .with_start_at_nearest(true),
    ));
}

/// Смена loop type на лету: меняем компонент, plugin перерегистрирует
fn switch_loop_type(app: &mut App) {
    let world = app.world_mut();
    let mut query = world.query_filtered::<&mut WaypointTraveler, With<SwitchesLoopType>>();
    for mut traveler in query.iter_mut(world) {
        traveler.loop_type = Some(LoopType::Loop);
    }
}

fn main() {
    let seed = 42;
    println!("Starting WPSystem headless run (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let settings = WaypointSettings::default();
    app.add_plugins(WaypointPlugin::new(square_course(&settings), settings))
        .add_systems(
            FixedUpdate,
            (count_laps_then_despawn, log_finished).after(WaypointSystems),
        );

    spawn_travelers(&mut app);

    for tick in 0..TICK_COUNT {
        if tick == SWITCH_TICK {
            switch_loop_type(&mut app);
        }

        run_fixed_ticks(&mut app, 1);

        if tick % 100 == 0 {
            let completed = app
                .world_mut()
                .query_filtered::<Entity, With<PathComplete>>()
                .iter(app.world())
                .count();
            log_info(&format!(
                "Tick {}: {} travelers, {} complete",
                tick,
                world_snapshot(app.world_mut()).len(),
                completed
            ));
        }
    }

    for traveler in world_snapshot(app.world_mut()) {
        println!("{:?}", traveler);
    }
    println!("Run complete!");
}
