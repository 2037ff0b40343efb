//! WaypointSystem - NonSend resource: registry по Entity + кэш позиций + outbox.
//!
//! NonSend, потому что registry однопоточный (`Rc`). Системы, которые его
//! трогают, идут с суффиксом `_main_thread`.

use bevy::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::path::{LoopType, PathHandle};
use crate::registry::PathRegistry;
use crate::sequence::{WaypointNode, WaypointSequence};
use crate::settings::WaypointSettings;
use crate::subject::Subject;

/// Позиции travelers за текущий кадр (Transform → кэш → Subject).
///
/// Despawned entity пропадает из кэша → её path инертен до unregister.
#[derive(Debug, Clone, Default)]
pub struct PositionCache(Rc<RefCell<HashMap<Entity, Vec3>>>);

impl PositionCache {
    pub fn refresh(&self, positions: impl IntoIterator<Item = (Entity, Vec3)>) {
        let mut cache = self.0.borrow_mut();
        cache.clear();
        cache.extend(positions);
    }

    pub fn set(&self, entity: Entity, position: Vec3) {
        self.0.borrow_mut().insert(entity, position);
    }

    pub fn get(&self, entity: Entity) -> Option<Vec3> {
        self.0.borrow().get(&entity).copied()
    }

    fn subject(&self, entity: Entity) -> CachedSubject {
        CachedSubject {
            entity,
            cache: self.clone(),
        }
    }
}

struct CachedSubject {
    entity: Entity,
    cache: PositionCache,
}

impl Subject for CachedSubject {
    fn position(&self) -> Option<Vec3> {
        self.cache.get(self.entity)
    }
}

/// Notification collected during a registry tick, forwarded as Bevy events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathNotification {
    Reached {
        entity: Entity,
        previous: WaypointNode,
        next: WaypointNode,
    },
    Finished {
        entity: Entity,
    },
}

pub struct WaypointSystem {
    registry: PathRegistry<Entity>,
    positions: PositionCache,
    outbox: Rc<RefCell<Vec<PathNotification>>>,
}

impl WaypointSystem {
    pub fn new(sequence: WaypointSequence, settings: WaypointSettings) -> Self {
        Self {
            registry: PathRegistry::new(sequence, settings),
            positions: PositionCache::default(),
            outbox: Rc::default(),
        }
    }

    pub fn registry(&self) -> &PathRegistry<Entity> {
        &self.registry
    }

    pub fn positions(&self) -> &PositionCache {
        &self.positions
    }

    /// Registers `entity`; `None` overrides fall back to the registry defaults.
    ///
    /// Reached/Finished are queued in the outbox and come out of `tick()`.
    pub fn register_entity(
        &self,
        entity: Entity,
        loop_type: Option<LoopType>,
        start_at_nearest: Option<bool>,
    ) -> Result<PathHandle> {
        let settings = self.registry.settings();
        let handle = self.registry.register_with(
            entity,
            self.positions.subject(entity),
            loop_type.unwrap_or(settings.default_loop_type),
            start_at_nearest.unwrap_or(settings.start_at_nearest),
        )?;

        let outbox = Rc::clone(&self.outbox);
        handle.on_reached(move |previous, next| {
            outbox.borrow_mut().push(PathNotification::Reached {
                entity,
                previous: *previous,
                next: *next,
            });
        });
        let outbox = Rc::clone(&self.outbox);
        handle.on_finished(move || {
            outbox.borrow_mut().push(PathNotification::Finished { entity });
        });

        Ok(handle)
    }

    pub fn unregister_entity(&self, entity: Entity) -> bool {
        self.registry.unregister(&entity)
    }

    /// Loop type the entity would get if registered now.
    pub fn effective_loop_type(&self, requested: Option<LoopType>) -> LoopType {
        requested.unwrap_or(self.registry.settings().default_loop_type)
    }

    /// Current target of a live, unfinished path.
    pub fn current_waypoint(&self, entity: Entity) -> Option<WaypointNode> {
        self.registry
            .get(&entity)
            .filter(|handle| !handle.is_finished())
            .and_then(|handle| handle.current_waypoint())
    }

    /// Ticks the registry and drains everything the paths reported.
    pub fn tick(&self) -> Vec<PathNotification> {
        self.registry.tick();
        std::mem::take(&mut *self.outbox.borrow_mut())
    }
}
