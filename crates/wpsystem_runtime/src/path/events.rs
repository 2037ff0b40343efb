//! Multicast event channels (Reached / Finished) per path.
//!
//! Подписчики вызываются синхронно, в порядке подписки. Список копируется перед
//! рассылкой: подписка/отписка из callback'а не ломает текущую рассылку
//! (новый подписчик получит только следующие события).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logger;

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Token returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

pub struct Channel<T: 'static> {
    subscribers: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T: 'static> Default for Channel<T> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<T: 'static> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<T: 'static> Channel<T> {
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId::next();
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(subscription, _)| *subscription != id);
        subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.subscribers.borrow_mut().clear();
    }

    /// Delivers `payload` to a snapshot of the current subscribers.
    ///
    /// Returns how many callbacks ran.
    pub fn emit(&self, payload: &T) -> usize {
        let snapshot: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        let mut delivered = 0;
        for callback in snapshot {
            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(payload);
                    delivered += 1;
                }
                // callback сам вызвал эмит своего же канала
                Err(_) => logger::log_warning("⚠️ re-entrant path callback skipped"),
            }
        }
        delivered
    }
}
