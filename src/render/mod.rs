// src/render/mod.rs
//! Отладочная визуализация уровня
//!
//! [`Canvas`] — контейнер визуальных объектов, который просто запоминает
//! спрайты комнат и отрезки коридоров по их дескрипторам. Генератор двигает
//! комнаты, а холст синхронизируется в [`LevelVisuals::relayout`].
//! Растеризация в PNG — в модуле [`png`].

pub mod png;

use std::collections::BTreeMap;

use glam::DVec2;

use crate::edge::Edge;
use crate::geometry::Rect;
use crate::room::{Room, RoomKind};
use crate::visuals::{LevelVisuals, VisualHandle};

/// Прямоугольник комнаты в клетках
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSprite {
    pub kind: RoomKind,
    pub rect: Rect,
}

/// Ломаная коридора в клетках
#[derive(Debug, Clone, PartialEq)]
pub struct HallwaySprite {
    pub points: Vec<DVec2>,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    /// Пикселей на клетку
    pub scale: u32,
    /// Мировых единиц на клетку, чтобы вернуть пути коридоров в клетки
    pub tile_size: f64,
    rooms: BTreeMap<VisualHandle, RoomSprite>,
    hallways: BTreeMap<VisualHandle, HallwaySprite>,
    next: u64,
}

impl Canvas {
    #[must_use]
    pub fn new(scale: u32, tile_size: f64) -> Self {
        Self {
            scale: scale.max(1),
            tile_size,
            rooms: BTreeMap::new(),
            hallways: BTreeMap::new(),
            next: 0,
        }
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomSprite> {
        self.rooms.values()
    }

    pub fn hallways(&self) -> impl Iterator<Item = &HallwaySprite> {
        self.hallways.values()
    }

    /// Ограничивающий прямоугольник всех спрайтов в клетках
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self
            .rooms
            .values()
            .flat_map(|s| {
                [
                    DVec2::new(s.rect.x, s.rect.y),
                    DVec2::new(s.rect.right(), s.rect.bottom()),
                ]
            })
            .chain(self.hallways.values().flat_map(|h| h.points.iter().copied()));

        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    fn next_handle(&mut self) -> VisualHandle {
        self.next += 1;
        VisualHandle(self.next)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(4, 16.0)
    }
}

impl LevelVisuals for Canvas {
    fn add_room_visual(&mut self, room: &Room) -> VisualHandle {
        let handle = self.next_handle();
        self.rooms.insert(
            handle,
            RoomSprite {
                kind: room.kind,
                rect: room.rect(),
            },
        );
        handle
    }

    fn add_edge_visual(&mut self, edge: &Edge, _rooms: &[Room]) -> VisualHandle {
        let handle = self.next_handle();
        let points = edge.path.iter().map(|&p| p * (1.0 / self.tile_size)).collect();
        self.hallways.insert(handle, HallwaySprite { points });
        handle
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        self.rooms.remove(&handle);
        self.hallways.remove(&handle);
    }

    fn relayout(&mut self, rooms: &[Room]) {
        for room in rooms {
            if let Some(sprite) = room.visual.and_then(|h| self.rooms.get_mut(&h)) {
                sprite.rect = room.rect();
            }
        }
    }
}
