//! Path traversal: state machine, event channels, handle.
//!
//! Порядок тика одного path (внутри `PathRegistry::tick`):
//! 1. нет subject'а (Finished или уничтожен) → пропуск
//! 2. текущий узел пропал → resync на ближайший, Reached `(n, n)`
//! 3. `distance < reach_radius` → шаг курсора по loop type, Reached / Finished

pub mod events;
pub mod handle;
pub mod state;

#[cfg(test)]
mod state_tests;

pub use events::{Channel, SubscriptionId};
pub use handle::PathHandle;
pub use state::{LoopType, PathEvent, PathPhase, PathSnapshot, PathState, WaypointStep};
