//! Tests for the path traversal state machine.

#[cfg(test)]
mod tests {
    use super::super::state::{LoopType, PathEvent, PathPhase, PathState};
    use crate::error::WaypointError;
    use crate::sequence::{WaypointPath, WaypointSequence};
    use crate::settings::WaypointSettings;
    use bevy::math::Vec3;

    fn at(index: usize) -> Vec3 {
        Vec3::new(index as f32 * 10.0, 0.0, 0.0)
    }

    fn line_path(count: usize) -> WaypointPath {
        WaypointPath::new(WaypointSequence::from_positions(
            (0..count).map(at),
            &WaypointSettings::default(),
        ))
    }

    /// Телепортирует subject на текущий waypoint и делает шаг, `ticks` раз.
    fn drive(state: &mut PathState, ticks: usize) -> Vec<PathEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            let Some(target) = state.current_waypoint() else {
                break;
            };
            if let Some(event) = state.advance(target.position) {
                events.push(event);
            }
        }
        events
    }

    /// (previous, next) индексы для Reached событий
    fn steps(events: &[PathEvent]) -> Vec<(usize, usize)> {
        events
            .iter()
            .filter_map(|event| match event {
                PathEvent::Reached(step) => Some((step.previous.index, step.next.index)),
                PathEvent::Finished => None,
            })
            .collect()
    }

    #[test]
    fn test_one_way_reaches_every_node_then_finishes() {
        const N: usize = 5;
        let mut state = PathState::new(line_path(N), LoopType::OneWay, false, None).expect("valid");

        let events = drive(&mut state, N + 3);

        assert_eq!(events.len(), N);
        assert_eq!(steps(&events), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(events.last(), Some(&PathEvent::Finished));
        assert!(state.is_finished());
    }

    #[test]
    fn test_loop_wraps_to_starting_node_and_never_finishes() {
        const N: usize = 4;
        let mut state = PathState::new(line_path(N), LoopType::Loop, false, None).expect("valid");

        // 2 полных цикла: N-1 шагов вперёд + wrap, дважды
        let events = drive(&mut state, 2 * N);

        assert!(events.iter().all(|event| matches!(event, PathEvent::Reached(_))));
        assert_eq!(
            steps(&events),
            vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 1), (1, 2), (2, 3), (3, 0)]
        );
        assert_eq!(state.phase(), PathPhase::Forward);
    }

    #[test]
    fn test_ping_pong_reverses_at_both_ends() {
        const N: usize = 4;
        let mut state =
            PathState::new(line_path(N), LoopType::PingPong, false, None).expect("valid");

        let events = drive(&mut state, 2 * (N - 1));
        assert_eq!(
            steps(&events),
            vec![(0, 1), (1, 2), (2, 3), (3, 2), (2, 1), (1, 0)]
        );
        assert_eq!(state.phase(), PathPhase::Backward);
        assert_eq!(state.current_index(), 0);

        // На узле 0: разворот, снова вперёд
        let events = drive(&mut state, 1);
        assert_eq!(steps(&events), vec![(0, 1)]);
        assert_eq!(state.phase(), PathPhase::Forward);
    }

    #[test]
    fn test_ping_pong_never_skips_a_node() {
        const N: usize = 6;
        let mut state =
            PathState::new(line_path(N), LoopType::PingPong, false, None).expect("valid");

        let events = drive(&mut state, 40);
        for (previous, next) in steps(&events) {
            assert_eq!(previous.abs_diff(next), 1, "step {} -> {}", previous, next);
        }
    }

    #[test]
    fn test_ping_pong_two_nodes_alternates() {
        let mut state =
            PathState::new(line_path(2), LoopType::PingPong, false, None).expect("valid");

        let events = drive(&mut state, 6);
        assert_eq!(
            steps(&events),
            vec![(0, 1), (1, 0), (0, 1), (1, 0), (0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_single_node_one_way_finishes_on_first_reach() {
        let mut state = PathState::new(line_path(1), LoopType::OneWay, false, None).expect("valid");
        let events = drive(&mut state, 3);
        assert_eq!(events, vec![PathEvent::Finished]);
    }

    #[test]
    fn test_single_node_loop_and_ping_pong_stay_parked() {
        for loop_type in [LoopType::Loop, LoopType::PingPong] {
            let mut state = PathState::new(line_path(1), loop_type, false, None).expect("valid");
            let events = drive(&mut state, 3);

            // Reached (0, 0) каждый тик, пока дистанция < радиуса
            assert_eq!(steps(&events), vec![(0, 0), (0, 0), (0, 0)], "{:?}", loop_type);
            assert!(!state.is_finished());
        }
    }

    #[test]
    fn test_not_reached_does_nothing() {
        let mut state = PathState::new(line_path(3), LoopType::OneWay, false, None).expect("valid");

        assert_eq!(state.advance(Vec3::new(0.5, 0.0, 0.0)), None); // ровно на радиусе
        assert_eq!(state.advance(Vec3::new(100.0, 0.0, 0.0)), None);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_start_at_nearest() {
        let state = PathState::new(
            line_path(3),
            LoopType::OneWay,
            true,
            Some(Vec3::new(9.0, 0.0, 0.0)),
        )
        .expect("valid");
        assert_eq!(state.current_index(), 1);

        // Без позиции - стартовый узел
        let state = PathState::new(line_path(3), LoopType::OneWay, true, None).expect("valid");
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_custom_starting_node() {
        let sequence = WaypointSequence::from_positions((0..4).map(at), &WaypointSettings::default())
            .with_starting(1)
            .expect("in range");
        let path = WaypointPath::new(sequence);

        let mut looping = PathState::new(path.clone(), LoopType::Loop, false, None).expect("valid");
        assert_eq!(looping.current_index(), 1);
        let events = drive(&mut looping, 3);
        assert_eq!(steps(&events), vec![(1, 2), (2, 3), (3, 1)]);

        // PingPong: граница - узел 0, дальше узел после стартового
        let mut pong = PathState::new(path, LoopType::PingPong, false, None).expect("valid");
        let events = drive(&mut pong, 6);
        assert_eq!(
            steps(&events),
            vec![(1, 2), (2, 3), (3, 2), (2, 1), (1, 0), (0, 2)]
        );
    }

    #[test]
    fn test_resync_after_topology_shrinks() {
        let path = line_path(4);
        let mut state = PathState::new(path.clone(), LoopType::OneWay, false, None).expect("valid");
        drive(&mut state, 3);
        assert_eq!(state.current_index(), 3);

        path.edit(|sequence| sequence.remove_node(3)).expect("remove");
        assert_eq!(state.current_waypoint(), None);
        assert_eq!(state.advance(at(3)), None);

        let step = state.resync(Vec3::new(11.0, 0.0, 0.0)).expect("resync");
        assert!(step.is_stationary());
        assert_eq!(step.next.index, 1);
        assert_eq!(state.current_index(), 1);

        // Валидный курсор - resync ничего не делает
        assert_eq!(state.resync(Vec3::ZERO), None);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let result = PathState::new(WaypointPath::default(), LoopType::Loop, false, None);
        assert!(matches!(result, Err(WaypointError::EmptySequence)));
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut state = PathState::new(line_path(3), LoopType::Loop, false, None).expect("valid");
        assert!(state.finish());
        assert!(!state.finish());
        assert_eq!(state.advance(at(0)), None);
        assert_eq!(state.resync(at(0)), None);
        assert_eq!(state.phase(), PathPhase::Finished);
    }

    #[test]
    fn test_snapshot() {
        let mut state =
            PathState::new(line_path(3), LoopType::PingPong, false, None).expect("valid");
        drive(&mut state, 2);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.current, 2);
        assert_eq!(snapshot.loop_type, LoopType::PingPong);
        assert_eq!(snapshot.phase, PathPhase::Forward);
    }
}
