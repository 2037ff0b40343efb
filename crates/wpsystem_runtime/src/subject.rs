//! Subject - сущность, которую ведут по waypoints.
//!
//! Ядро только спрашивает позицию и никогда не двигает subject.
//! `None` = subject больше не существует (уничтожен): такой `PathState` инертен,
//! пока его явно не снимут с регистрации.

use bevy::math::Vec3;
use std::cell::Cell;
use std::rc::Rc;

/// Position query for the entity a path tracks.
pub trait Subject {
    fn position(&self) -> Option<Vec3>;
}

impl<F> Subject for F
where
    F: Fn() -> Option<Vec3>,
{
    fn position(&self) -> Option<Vec3> {
        self()
    }
}

/// Позиция, которую хост обновляет сам (тесты, ручное движение, не-ECS хосты).
///
/// `clear()` симулирует уничтоженный subject.
#[derive(Debug, Clone, Default)]
pub struct SharedPosition(Rc<Cell<Option<Vec3>>>);

impl SharedPosition {
    pub fn new(position: Vec3) -> Self {
        Self(Rc::new(Cell::new(Some(position))))
    }

    pub fn get(&self) -> Option<Vec3> {
        self.0.get()
    }

    pub fn set(&self, position: Vec3) {
        self.0.set(Some(position));
    }

    pub fn clear(&self) {
        self.0.set(None);
    }
}

impl Subject for SharedPosition {
    fn position(&self) -> Option<Vec3> {
        self.0.get()
    }
}
