// src/edge.rs
//! Рёбра графа комнат
//!
//! Ребро — неупорядоченная пара комнат из триангуляции. Активное ребро
//! становится коридором; неактивное остаётся кандидатом и хранится только
//! для этапа возврата рёбер.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::room::{DoorCell, Room, RoomId};
use crate::visuals::VisualHandle;

/// Индекс ребра в арене генератора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

/// Сторона прямоугольника комнаты. Ось Y направлена вниз: `Top` — меньший Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Точка, где луч из центра комнаты к соседу пересекает её границу
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub point: DVec2,
    pub side: Side,
    /// Точка лежит ближе одной клетки к углу
    pub in_corner: bool,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: RoomId,
    pub neighbor: RoomId,
    /// Расстояние между центрами комнат
    pub weight: f64,
    pub active: bool,
    /// Путь коридора уже построен
    pub calculated: bool,
    /// Ребро активировано на этапе возврата, а не MST или межслойной связкой
    pub restored: bool,
    /// Две мировые точки: дверь `source` → дверь `neighbor`
    pub path: Vec<DVec2>,
    pub visual: Option<VisualHandle>,
}

impl Edge {
    #[must_use]
    pub fn new(rooms: &[Room], source: RoomId, neighbor: RoomId) -> Self {
        let weight = rooms[source.0].mid().distance(rooms[neighbor.0].mid());
        Self {
            source,
            neighbor,
            weight,
            active: false,
            calculated: false,
            restored: false,
            path: Vec::new(),
            visual: None,
        }
    }

    /// Противоположный конец ребра
    #[must_use]
    pub fn other(&self, room: RoomId) -> RoomId {
        if room == self.source {
            self.neighbor
        } else {
            self.source
        }
    }

    #[must_use]
    pub fn touches(&self, room: RoomId) -> bool {
        self.source == room || self.neighbor == room
    }

    /// Есть ли у рёбер общий конец
    #[must_use]
    pub fn shares_room(&self, other: &Edge) -> bool {
        self.touches(other.source) || self.touches(other.neighbor)
    }

    #[must_use]
    pub fn connects(&self, a: RoomId, b: RoomId) -> bool {
        (self.source == a && self.neighbor == b) || (self.source == b && self.neighbor == a)
    }

    /// Направление ребра из центра комнаты `from` к центру соседа
    #[must_use]
    pub fn direction_from(&self, rooms: &[Room], from: RoomId) -> DVec2 {
        rooms[self.other(from).0].mid() - rooms[from.0].mid()
    }

    /// Параметрическое отсечение луча прямоугольником комнаты `from`.
    ///
    /// Луч выходит из центра комнаты к центру соседа; берётся ближайший из
    /// параметров выхода по X и по Y. Если центры совпадают, возвращается центр
    /// комнаты, помеченный как угловой.
    #[must_use]
    pub fn crossing(&self, rooms: &[Room], from: RoomId) -> Crossing {
        let room = &rooms[from.0];
        let mid = room.mid();
        let d = self.direction_from(rooms, from);
        let half_w = f64::from(room.width) * 0.5;
        let half_h = f64::from(room.height) * 0.5;

        let tx = if d.x.abs() > f64::EPSILON { half_w / d.x.abs() } else { f64::INFINITY };
        let ty = if d.y.abs() > f64::EPSILON { half_h / d.y.abs() } else { f64::INFINITY };
        if tx.is_infinite() && ty.is_infinite() {
            return Crossing {
                point: mid,
                side: Side::Right,
                in_corner: true,
            };
        }

        let t = tx.min(ty);
        let point = mid + d * t;
        let local = point - room.position;
        let (side, along, span) = if tx < ty {
            let side = if d.x > 0.0 { Side::Right } else { Side::Left };
            (side, local.y, f64::from(room.height))
        } else {
            let side = if d.y > 0.0 { Side::Bottom } else { Side::Top };
            (side, local.x, f64::from(room.width))
        };

        Crossing {
            point,
            side,
            in_corner: along < 1.0 || along > span - 1.0,
        }
    }

    /// Угол между направлением на дверь и направлением ребра в комнате `at`
    #[must_use]
    pub fn door_angle(&self, rooms: &[Room], at: RoomId, door: DoorCell) -> f64 {
        let room = &rooms[at.0];
        let to_door = room.position + door.local_center() - room.mid();
        to_door.angle_to(self.direction_from(rooms, at)).abs()
    }
}
