// src/room/door.rs
//! Двери: клетки периметра комнаты, через которые выходят коридоры
//!
//! Угловые клетки дверями не бывают. Каждое активное ребро комнаты получает
//! собственную дверь: сначала пробуется клетка, через которую проходит луч
//! ребра, а если она занята — ближайшая свободная клетка периметра.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::edge::{Edge, EdgeId, Side};
use crate::room::{Room, RoomId};

/// Предельный угол между дверью и направлением ребра
pub const MAX_DOOR_ANGLE: f64 = FRAC_PI_2 + 0.1;

/// Клетка двери в локальных координатах комнаты
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorCell {
    pub x: i32,
    pub y: i32,
}

impl DoorCell {
    #[must_use]
    pub fn local_center(self) -> DVec2 {
        DVec2::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }
}

/// Клетки периметра без углов, по часовой стрелке начиная с верхней стороны
#[must_use]
pub fn perimeter_cells(width: i32, height: i32) -> Vec<DoorCell> {
    let mut cells = Vec::with_capacity((2 * (width - 2) + 2 * (height - 2)).max(0) as usize);
    cells.extend((1..width - 1).map(|x| DoorCell { x, y: 0 }));
    cells.extend((1..height - 1).map(|y| DoorCell { x: width - 1, y }));
    cells.extend((1..width - 1).rev().map(|x| DoorCell { x, y: height - 1 }));
    cells.extend((1..height - 1).rev().map(|y| DoorCell { x: 0, y }));
    cells
}

/// Клетка периметра под точкой пересечения, сдвинутая с углов
#[must_use]
pub fn preferred_door(room: &Room, side: Side, point: DVec2) -> DoorCell {
    let local = point - room.position;
    let along_x = (local.x.floor() as i32).clamp(1, room.width - 2);
    let along_y = (local.y.floor() as i32).clamp(1, room.height - 2);
    match side {
        Side::Top => DoorCell { x: along_x, y: 0 },
        Side::Bottom => DoorCell {
            x: along_x,
            y: room.height - 1,
        },
        Side::Left => DoorCell { x: 0, y: along_y },
        Side::Right => DoorCell {
            x: room.width - 1,
            y: along_y,
        },
    }
}

/// Назначает двери всем активным рёбрам комнаты в порядке их индексов
#[must_use]
pub fn assign_doors(rooms: &[Room], edges: &[Edge], at: RoomId) -> BTreeMap<EdgeId, DoorCell> {
    let room = &rooms[at.0];
    let perimeter = perimeter_cells(room.width, room.height);
    let mut active: Vec<EdgeId> = room
        .edges
        .iter()
        .copied()
        .filter(|id| edges[id.0].active)
        .collect();
    active.sort_unstable();

    let mut taken = vec![false; perimeter.len()];
    let mut doors = BTreeMap::new();

    for id in active {
        let crossing = edges[id.0].crossing(rooms, at);
        let preferred = preferred_door(room, crossing.side, crossing.point);
        let start = perimeter.iter().position(|&c| c == preferred).unwrap_or(0);
        let len = perimeter.len();

        // 0, +1, -1, +2, -2 ... вдоль периметра
        let slot = (0..len).find_map(|k| {
            let offsets = [k as isize, -(k as isize)];
            offsets.into_iter().find_map(|off| {
                let i = (start as isize + off).rem_euclid(len as isize) as usize;
                (!taken[i]).then_some(i)
            })
        });

        let door = match slot {
            Some(i) => {
                taken[i] = true;
                perimeter[i]
            }
            None => preferred,
        };
        doors.insert(id, door);
    }
    doors
}

/// Все двери комнаты смотрят не дальше [`MAX_DOOR_ANGLE`] от своих рёбер
#[must_use]
pub fn doors_within_angle(
    rooms: &[Room],
    edges: &[Edge],
    at: RoomId,
    doors: &BTreeMap<EdgeId, DoorCell>,
) -> bool {
    doors
        .iter()
        .all(|(id, &door)| edges[id.0].door_angle(rooms, at, door) <= MAX_DOOR_ANGLE)
}
