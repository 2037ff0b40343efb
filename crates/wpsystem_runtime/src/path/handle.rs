//! PathHandle - то, что получает вызывающий при регистрации.
//!
//! Связывает `PathState` с subject'ом и двумя каналами событий. Registry хранит
//! клон того же handle. Ни один borrow состояния не держится во время рассылки,
//! поэтому callbacks могут читать handle, вызывать `instant_finish` и трогать
//! registry.

use bevy::math::Vec3;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::events::{Channel, SubscriptionId};
use super::state::{LoopType, PathEvent, PathPhase, PathSnapshot, PathState, WaypointStep};
use crate::logger;
use crate::sequence::{WaypointNode, WaypointPath};
use crate::subject::Subject;

struct PathInner {
    state: RefCell<PathState>,
    /// Очищается при Finished
    subject: RefCell<Option<Box<dyn Subject>>>,
    reached: Channel<WaypointStep>,
    finished: Channel<()>,
}

#[derive(Clone)]
pub struct PathHandle {
    inner: Rc<PathInner>,
}

impl fmt::Debug for PathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathHandle")
            .field("state", &self.inner.state.borrow())
            .field("has_subject", &self.has_subject())
            .field("reached", &self.inner.reached)
            .field("finished", &self.inner.finished)
            .finish()
    }
}

impl PathHandle {
    pub(crate) fn new(state: PathState, subject: Box<dyn Subject>) -> Self {
        Self {
            inner: Rc::new(PathInner {
                state: RefCell::new(state),
                subject: RefCell::new(Some(subject)),
                reached: Channel::default(),
                finished: Channel::default(),
            }),
        }
    }

    pub fn current_waypoint(&self) -> Option<WaypointNode> {
        self.inner.state.borrow().current_waypoint()
    }

    pub fn current_index(&self) -> usize {
        self.inner.state.borrow().current_index()
    }

    pub fn loop_type(&self) -> LoopType {
        self.inner.state.borrow().loop_type()
    }

    pub fn phase(&self) -> PathPhase {
        self.inner.state.borrow().phase()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.state.borrow().is_finished()
    }

    /// false after Finished (subject detached)
    pub fn has_subject(&self) -> bool {
        self.inner.subject.borrow().is_some()
    }

    pub fn sequence(&self) -> WaypointPath {
        self.inner.state.borrow().sequence().clone()
    }

    pub fn snapshot(&self) -> PathSnapshot {
        self.inner.state.borrow().snapshot()
    }

    pub fn ptr_eq(&self, other: &PathHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Called with `(previous, next)` every time the cursor moves or resyncs.
    pub fn on_reached<F>(&self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&WaypointNode, &WaypointNode) + 'static,
    {
        self.inner
            .reached
            .subscribe(move |step: &WaypointStep| callback(&step.previous, &step.next))
    }

    /// Called once, when a OneWay path completes or on `instant_finish`.
    pub fn on_finished<F>(&self, mut callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.inner.finished.subscribe(move |_: &()| callback())
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.reached.unsubscribe(id) || self.inner.finished.unsubscribe(id)
    }

    /// Early termination (skip/cutscene-skip): `Finished` + finished event,
    /// без проверки границ. Повторный вызов ничего не делает.
    pub fn instant_finish(&self) {
        let finished_now = self.inner.state.borrow_mut().finish();
        if !finished_now {
            return;
        }

        self.detach_subject();
        logger::log_info("⏭️ Path instant-finished");
        self.inner.finished.emit(&());
    }

    /// One tick of the state machine. Missing subject (detached or destroyed) → no-op.
    pub(crate) fn tick(&self) {
        let Some(position) = self.subject_position() else {
            return;
        };

        // Borrow отпускаем до рассылки: callbacks могут читать этот handle
        let resynced = self.inner.state.borrow_mut().resync(position);
        if let Some(step) = resynced {
            self.inner.reached.emit(&step);
        }

        let event = self.inner.state.borrow_mut().advance(position);
        match event {
            Some(PathEvent::Reached(step)) => {
                self.inner.reached.emit(&step);
            }
            Some(PathEvent::Finished) => {
                self.detach_subject();
                logger::log_info("🏁 Path finished (last waypoint reached)");
                self.inner.finished.emit(&());
            }
            None => {}
        }
    }

    fn subject_position(&self) -> Option<Vec3> {
        self.inner.subject.borrow().as_ref()?.position()
    }

    fn detach_subject(&self) {
        let detached = self.inner.subject.borrow_mut().take();
        drop(detached);
    }
}
