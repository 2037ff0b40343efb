//! Tests for waypoint sequence and authoring edits.

#[cfg(test)]
mod tests {
    use super::super::{WaypointNode, WaypointPath, WaypointSequence};
    use crate::error::WaypointError;
    use crate::settings::WaypointSettings;
    use bevy::math::Vec3;

    fn line(count: usize) -> WaypointSequence {
        WaypointSequence::from_positions(
            (0..count).map(|i| Vec3::new(i as f32 * 10.0, 0.0, 0.0)),
            &WaypointSettings::default(),
        )
    }

    #[test]
    fn test_nodes_are_indexed_in_authored_order() {
        let sequence = line(4);
        for (i, node) in sequence.iter().enumerate() {
            assert_eq!(node.index, i);
            assert_eq!(node.reach_radius, 0.5);
        }
        assert_eq!(sequence.first().map(|n| n.index), Some(0));
        assert_eq!(sequence.last().map(|n| n.index), Some(3));
    }

    #[test]
    fn test_next_and_previous_are_bounds_checked() {
        let sequence = line(3);
        assert_eq!(sequence.next_index(0), Some(1));
        assert_eq!(sequence.next_index(2), None);
        assert_eq!(sequence.previous_index(2), Some(1));
        assert_eq!(sequence.previous_index(0), None);
    }

    #[test]
    fn test_has_been_reached_is_strict() {
        let node = WaypointNode::new(Vec3::ZERO, 1.0);
        assert!(node.has_been_reached(Vec3::new(0.5, 0.0, 0.0)));
        assert!(!node.has_been_reached(Vec3::new(1.0, 0.0, 0.0)));

        // Радиус 0 - недостижим
        let unreachable = WaypointNode::new(Vec3::ZERO, 0.0);
        assert!(!unreachable.has_been_reached(Vec3::ZERO));
    }

    #[test]
    fn test_nearest_picks_strictly_closer_node() {
        let sequence = line(3);
        assert_eq!(sequence.nearest_index(Vec3::new(9.0, 0.0, 0.0)), Some(1));
        assert_eq!(sequence.nearest_index(Vec3::new(-50.0, 0.0, 0.0)), Some(0));
        assert_eq!(sequence.nearest_index(Vec3::new(100.0, 3.0, 0.0)), Some(2));
    }

    #[test]
    fn test_nearest_tie_keeps_lowest_index() {
        let sequence = line(2);
        assert_eq!(sequence.nearest_index(Vec3::new(5.0, 0.0, 0.0)), Some(0));
    }

    #[test]
    fn test_nearest_single_node_and_empty() {
        let single = line(1);
        assert_eq!(single.nearest_index(Vec3::splat(1000.0)), Some(0));
        assert_eq!(WaypointSequence::default().nearest_index(Vec3::ZERO), None);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            WaypointSequence::default().validate(),
            Err(WaypointError::EmptySequence)
        );
        assert_eq!(line(2).validate(), Ok(()));

        let negative = WaypointSequence::new([
            WaypointNode::new(Vec3::ZERO, 1.0),
            WaypointNode::new(Vec3::X, -1.0),
        ]);
        assert_eq!(
            negative.validate(),
            Err(WaypointError::InvalidReachRadius { index: 1, radius: -1.0 })
        );
    }

    #[test]
    fn test_with_starting_out_of_range() {
        assert_eq!(
            line(2).with_starting(2),
            Err(WaypointError::StartingNodeOutOfRange { starting: 2, len: 2 })
        );
        let sequence = line(3).with_starting(2).expect("in range");
        assert_eq!(sequence.starting_node().map(|n| n.index), Some(2));
    }

    #[test]
    fn test_insert_node_places_at_midpoint() {
        let mut sequence = line(3).with_starting(1).expect("in range");
        let index = sequence.insert_node(1, 0.5).expect("insert");

        assert_eq!(index, 1);
        assert_eq!(sequence.node_count(), 4);
        assert_eq!(sequence.node(1).map(|n| n.position), Some(Vec3::new(5.0, 0.0, 0.0)));
        // стартовый узел сдвинулся вместе с узлом
        assert_eq!(sequence.starting_index(), 2);
        assert_eq!(sequence.node(3).map(|n| n.index), Some(3));
    }

    #[test]
    fn test_insert_node_at_end_sits_on_last() {
        let mut sequence = line(2);
        sequence.insert_node(2, 0.5).expect("insert");
        assert_eq!(sequence.node(2).map(|n| n.position), Some(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(
            sequence.insert_node(9, 0.5),
            Err(WaypointError::NodeIndexOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_add_node_on_empty_and_non_empty() {
        let mut sequence = WaypointSequence::default();
        assert_eq!(sequence.add_node(1.0), 0);
        assert_eq!(sequence.node(0).map(|n| n.position), Some(Vec3::ZERO));

        let mut sequence = line(2);
        assert_eq!(sequence.add_node(1.0), 2);
        assert_eq!(sequence.node(2).map(|n| n.position), Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_remove_starting_node_moves_start_back() {
        let mut sequence = line(4).with_starting(2).expect("in range");
        sequence.remove_node(2).expect("remove");
        assert_eq!(sequence.starting_index(), 1);
        assert_eq!(sequence.node_count(), 3);
        assert_eq!(sequence.node(2).map(|n| n.index), Some(2));

        let mut sequence = line(3);
        sequence.remove_node(0).expect("remove");
        assert_eq!(sequence.starting_index(), 0);
    }

    #[test]
    fn test_remove_only_node_is_refused() {
        let mut sequence = line(1);
        assert_eq!(sequence.remove_node(0), Err(WaypointError::LastNode));
        assert_eq!(
            line(2).remove_node(5),
            Err(WaypointError::NodeIndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_truncate_and_reset_radii() {
        let mut sequence = line(5).with_starting(3).expect("in range");
        sequence.reset_reach_radii(2.5);
        assert!(sequence.iter().all(|n| n.reach_radius == 2.5));

        sequence.truncate_to_first();
        assert_eq!(sequence.node_count(), 1);
        assert_eq!(sequence.starting_index(), 0);
    }

    #[test]
    fn test_set_node_position() {
        let mut sequence = line(3);
        sequence
            .set_node_position(1, Vec3::new(5.0, 2.0, 0.0))
            .expect("in range");
        assert_eq!(sequence.node(1).map(|n| n.position), Some(Vec3::new(5.0, 2.0, 0.0)));
        assert_eq!(
            sequence.set_node_position(3, Vec3::ZERO),
            Err(WaypointError::NodeIndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_shared_path_edits_are_visible_to_all_clones() {
        let path = WaypointPath::new(line(3));
        let other = path.clone();
        path.edit(|sequence| sequence.remove_node(2)).expect("remove");
        assert_eq!(other.node_count(), 2);
        assert!(path.ptr_eq(&other));
    }

    #[test]
    fn test_authored_json_round_trip_reindexes() {
        let json = r#"{
            "nodes": [
                { "position": [0.0, 0.0, 0.0], "reach_radius": 1.0 },
                { "position": [4.0, 0.0, 0.0], "reach_radius": 1.0 },
                { "position": [8.0, 0.0, 0.0], "reach_radius": 2.0 }
            ],
            "starting": 1
        }"#;
        let sequence: WaypointSequence = serde_json::from_str(json).expect("authored json");
        assert_eq!(sequence.node_count(), 3);
        assert_eq!(sequence.starting_index(), 1);
        assert_eq!(sequence.node(2).map(|n| n.index), Some(2));
        assert_eq!(sequence.node(2).map(|n| n.reach_radius), Some(2.0));
        assert_eq!(sequence.validate(), Ok(()));
    }
}
