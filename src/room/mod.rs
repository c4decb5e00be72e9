// src/room/mod.rs
//! Комнаты уровня
//!
//! Комната — прямоугольник на целочисленной сетке клеток, размер берётся из
//! каталога шаблонов. Генератор хранит комнаты в арене и адресует их через
//! [`RoomId`]; после отсечения пересечений индекс в арене становится ключом.

pub mod door;
pub mod templates;

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::edge::EdgeId;
use crate::geometry::Rect;
use crate::visuals::VisualHandle;
pub use door::DoorCell;
pub use templates::RoomTemplate;

/// Индекс комнаты в арене генератора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Spawn,
    Terminal,
    Standard,
}

impl RoomKind {
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            RoomKind::Spawn => [80, 200, 120],
            RoomKind::Terminal => [220, 80, 60],
            RoomKind::Standard => [150, 150, 170],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    /// Стабильный ключ, назначается после отсечения пересекающихся комнат
    pub key: Option<usize>,
    pub kind: RoomKind,
    pub template: &'static str,
    /// Левый верхний угол в клетках
    pub position: DVec2,
    pub width: i32,
    pub height: i32,
    /// Все рёбра триангуляции, включая неактивные
    pub edges: Vec<EdgeId>,
    pub visited: bool,
    pub to_delete: bool,
    /// Дверь для каждого активного ребра; заполняется при прокладке коридоров
    pub doors: BTreeMap<EdgeId, DoorCell>,
    /// Слой (кольцо), к которому отнесена комната
    pub ring: usize,
    /// Закреплённая комната не сдвигается при разведении
    pub pinned: bool,
    pub visual: Option<VisualHandle>,
}

impl Room {
    /// Комната по шаблону с центром в точке `center`; позиция округляется вниз до целых клеток
    #[must_use]
    pub fn from_template(kind: RoomKind, template: &'static RoomTemplate, center: DVec2) -> Self {
        let half = DVec2::new(f64::from(template.width) * 0.5, f64::from(template.height) * 0.5);
        Self {
            key: None,
            kind,
            template: template.name,
            position: (center - half).floor(),
            width: template.width,
            height: template.height,
            edges: Vec::new(),
            visited: false,
            to_delete: false,
            doors: BTreeMap::new(),
            ring: 0,
            pinned: false,
            visual: None,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            f64::from(self.width),
            f64::from(self.height),
        )
    }

    /// Центр комнаты
    #[must_use]
    pub fn mid(&self) -> DVec2 {
        self.rect().center()
    }

    /// Половина диагонали
    #[must_use]
    pub fn radius(&self) -> f64 {
        f64::from(self.width).hypot(f64::from(self.height)) * 0.5
    }

    #[must_use]
    pub fn intersects(&self, other: &Room) -> bool {
        self.rect().intersects(&other.rect())
    }

    #[must_use]
    pub fn overlap_area(&self, other: &Room) -> f64 {
        self.rect().intersection_area(&other.rect())
    }

    /// Сдвиг на один шаг вдоль уже нормализованного направления
    pub fn nudge(&mut self, direction: DVec2) {
        if !self.pinned {
            self.position = self.position + direction;
        }
    }

    /// Переносит комнату так, чтобы её центр оказался в `center` (без округления)
    pub fn set_mid(&mut self, center: DVec2) {
        self.position = self.position + (center - self.mid());
    }

    /// Мировые координаты центра клетки-двери
    #[must_use]
    pub fn door_world_position(&self, door: DoorCell, tile_size: f64) -> DVec2 {
        (self.position + door.local_center()) * tile_size
    }

    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.kind == RoomKind::Standard
    }
}
