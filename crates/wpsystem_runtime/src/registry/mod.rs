//! PathRegistry - subject → PathState, тик всех путей, отложенное удаление.
//!
//! # Архитектура
//!
//! - Registry - дешёвый clonable handle (`Rc<RefCell<_>>`), однопоточный.
//! - `tick()` итерирует по снимку ключей и никогда не держит borrow во время
//!   тика отдельного path, поэтому callbacks могут вызывать `register` /
//!   `unregister` (в т.ч. для самого себя).
//! - `unregister` не трогает mapping: ключ уходит в pending-removal и удаляется
//!   после полного прохода текущего (или следующего) тика.
//! - Повторная регистрация отменяет pending removal для этого ключа.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::logger;
use crate::path::{LoopType, PathHandle, PathSnapshot, PathState};
use crate::sequence::WaypointPath;
use crate::settings::WaypointSettings;
use crate::subject::Subject;


struct RegistryInner<K> {
    sequence: WaypointPath,
    settings: WaypointSettings,
    states: HashMap<K, PathHandle>,
    /// Ключи, которые удалим после прохода тика (только живые ключи)
    pending_removal: HashSet<K>,
    ticking: bool,
    tick_count: u64,
}

/// Registry of path states sharing one waypoint sequence.
pub struct PathRegistry<K> {
    inner: Rc<RefCell<RegistryInner<K>>>,
}

impl<K> Clone for PathRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning registry handle for callbacks (не создаёт Rc-цикл registry → callback).
pub struct WeakPathRegistry<K> {
    inner: Weak<RefCell<RegistryInner<K>>>,
}

impl<K> Clone for WeakPathRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<K> WeakPathRegistry<K> {
    pub fn upgrade(&self) -> Option<PathRegistry<K>> {
        self.inner.upgrade().map(|inner| PathRegistry { inner })
    }
}

impl<K> PathRegistry<K>
where
    K: Eq + Hash + Clone + Debug + 'static,
{
    pub fn new(sequence: impl Into<WaypointPath>, settings: WaypointSettings) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                sequence: sequence.into(),
                settings,
                states: HashMap::new(),
                pending_removal: HashSet::new(),
                ticking: false,
                tick_count: 0,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakPathRegistry<K> {
        WeakPathRegistry {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn sequence(&self) -> WaypointPath {
        self.inner.borrow().sequence.clone()
    }

    pub fn settings(&self) -> WaypointSettings {
        self.inner.borrow().settings.clone()
    }

    /// Не влияет на уже зарегистрированные paths.
    pub fn set_default_loop_type(&self, loop_type: LoopType) {
        self.inner.borrow_mut().settings.default_loop_type = loop_type;
    }

    /// Не влияет на уже зарегистрированные paths.
    pub fn set_start_at_nearest(&self, start_at_nearest: bool) {
        self.inner.borrow_mut().settings.start_at_nearest = start_at_nearest;
    }

    /// Registers `key` with the registry's default loop type and start policy.
    pub fn register(&self, key: K, subject: impl Subject + 'static) -> Result<PathHandle> {
        let (loop_type, start_at_nearest) = {
            let inner = self.inner.borrow();
            (inner.settings.default_loop_type, inner.settings.start_at_nearest)
        };
        self.register_with(key, subject, loop_type, start_at_nearest)
    }

    /// Registers `key` with an overridden loop type and start policy.
    pub fn register_with(
        &self,
        key: K,
        subject: impl Subject + 'static,
        loop_type: LoopType,
        start_at_nearest: bool,
    ) -> Result<PathHandle> {
        let sequence = self.sequence();
        self.register_on(key, subject, sequence, loop_type, start_at_nearest)
    }

    /// Registers `key` on an explicit sequence.
    ///
    /// Replaces any existing state for `key` (its callbacks are dropped) and cancels
    /// a pending removal. Fails fast on an untraversable sequence.
    pub fn register_on(
        &self,
        key: K,
        subject: impl Subject + 'static,
        sequence: WaypointPath,
        loop_type: LoopType,
        start_at_nearest: bool,
    ) -> Result<PathHandle> {
        let state = PathState::new(sequence, loop_type, start_at_nearest, subject.position())?;
        let handle = PathHandle::new(state, Box::new(subject));

        let mut inner = self.inner.borrow_mut();
        if inner.pending_removal.remove(&key) {
            logger::log(&format!("♻️ Re-registered {:?}, pending removal cancelled", key));
        }
        if inner.states.insert(key.clone(), handle.clone()).is_some() {
            logger::log(&format!("📋 Replaced path state: {:?} ({:?})", key, loop_type));
        } else {
            logger::log(&format!("📋 Registered path state: {:?} ({:?})", key, loop_type));
        }

        Ok(handle)
    }

    /// Queues `key` for removal after the current (or next) tick.
    ///
    /// Safe from inside callbacks. Returns false if `key` has no live state.
    pub fn unregister(&self, key: &K) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.states.contains_key(key) {
            return false;
        }
        inner.pending_removal.insert(key.clone());
        true
    }

    /// Ticks every live state once, then applies queued removals.
    pub fn tick(&self) {
        let keys: Vec<K> = {
            let mut inner = self.inner.borrow_mut();
            if inner.ticking {
                logger::log_warning("⚠️ PathRegistry::tick called from inside a tick, ignored");
                return;
            }
            inner.ticking = true;
            inner.tick_count += 1;
            inner.states.keys().cloned().collect()
        };

        for key in keys {
            // Смотрим актуальное состояние: ключ мог уйти в pending или быть перерегистрирован
            let live = {
                let inner = self.inner.borrow();
                if inner.pending_removal.contains(&key) {
                    None
                } else {
                    inner.states.get(&key).cloned()
                }
            };
            if let Some(handle) = live {
                handle.tick();
            }
        }

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        for key in inner.pending_removal.drain() {
            if inner.states.remove(&key).is_some() {
                logger::log(&format!("🗑️ Unregistered path state: {:?}", key));
            }
        }
        inner.ticking = false;
    }

    pub fn get(&self, key: &K) -> Option<PathHandle> {
        self.inner.borrow().states.get(key).cloned()
    }

    /// true while a state is live, including a pending removal.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.borrow().states.contains_key(key)
    }

    pub fn is_pending_removal(&self, key: &K) -> bool {
        self.inner.borrow().pending_removal.contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().states.is_empty()
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.borrow().states.keys().cloned().collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.inner.borrow().tick_count
    }

    /// Снимок всех живых states (порядок не определён).
    pub fn snapshot(&self) -> Vec<(K, PathSnapshot)> {
        self.inner
            .borrow()
            .states
            .iter()
            .map(|(key, handle)| (key.clone(), handle.snapshot()))
            .collect()
    }
}
