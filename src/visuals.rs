// src/visuals.rs
//! Контейнер визуальных представлений уровня
//!
//! Генератор ничего не рисует сам. Он лишь сообщает контейнеру о появлении
//! комнат и коридоров и получает в ответ непрозрачные дескрипторы, которые
//! хранит рядом с комнатой/ребром. Обратно из контейнера генератор ничего не читает.

use crate::edge::Edge;
use crate::room::Room;

/// Непрозрачный дескриптор визуального объекта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

pub trait LevelVisuals {
    /// Создаёт визуальный объект для новой комнаты
    fn add_room_visual(&mut self, room: &Room) -> VisualHandle;

    /// Создаёт визуальный объект для проложенного коридора
    fn add_edge_visual(&mut self, edge: &Edge, rooms: &[Room]) -> VisualHandle;

    /// Убирает объект комнаты, отсечённой при генерации
    fn remove_visual(&mut self, _handle: VisualHandle) {}

    /// Вызывается после стадий, двигающих комнаты
    fn relayout(&mut self, rooms: &[Room]);
}

/// Контейнер без отображения: для сервера, тестов и пакетной проверки
#[derive(Debug, Default)]
pub struct NullVisuals {
    next: u64,
}

impl NullVisuals {
    fn next_handle(&mut self) -> VisualHandle {
        self.next += 1;
        VisualHandle(self.next)
    }
}

impl LevelVisuals for NullVisuals {
    fn add_room_visual(&mut self, _room: &Room) -> VisualHandle {
        self.next_handle()
    }

    fn add_edge_visual(&mut self, _edge: &Edge, _rooms: &[Room]) -> VisualHandle {
        self.next_handle()
    }

    fn relayout(&mut self, _rooms: &[Room]) {}
}
