//! Bevy events, которые пишет tick система (Reached / Finished callbacks → ECS)

use bevy::prelude::*;

use crate::sequence::WaypointNode;

/// Событие: traveler достиг waypoint `previous`, следующая цель `next`.
///
/// `previous == next` при resync после смены топологии или на одноузловом пути.
#[derive(Event, Debug, Clone, Copy)]
pub struct WaypointReached {
    pub entity: Entity,
    pub previous: WaypointNode,
    pub next: WaypointNode,
}

impl WaypointReached {
    pub fn is_stationary(&self) -> bool {
        self.previous.index == self.next.index
    }
}

/// Событие: путь завершён (OneWay конец или instant_finish)
#[derive(Event, Debug, Clone, Copy)]
pub struct PathFinished {
    pub entity: Entity,
}
