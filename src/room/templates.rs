// src/room/templates.rs
//! Каталог шаблонов комнат
//!
//! Интерьеры комнат заранее нарисованы и загружаются отдельно; генератору нужны
//! только имя шаблона и его размер в клетках. Все шаблоны не меньше 3×3, чтобы
//! на периметре всегда оставались клетки под двери помимо углов.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomTemplate {
    pub name: &'static str,
    pub width: i32,
    pub height: i32,
    /// Относительная частота выбора среди обычных шаблонов
    pub weight: u32,
}

impl RoomTemplate {
    #[must_use]
    pub fn half_diagonal(&self) -> f64 {
        f64::from(self.width).hypot(f64::from(self.height)) * 0.5
    }
}

pub const STANDARD_TEMPLATES: &[RoomTemplate] = &[
    RoomTemplate { name: "closet", width: 5, height: 5, weight: 3 },
    RoomTemplate { name: "cell_wide", width: 7, height: 5, weight: 4 },
    RoomTemplate { name: "cell_tall", width: 5, height: 7, weight: 4 },
    RoomTemplate { name: "chamber", width: 7, height: 7, weight: 5 },
    RoomTemplate { name: "hall_wide", width: 11, height: 7, weight: 2 },
    RoomTemplate { name: "hall_tall", width: 7, height: 11, weight: 2 },
    RoomTemplate { name: "gallery", width: 13, height: 5, weight: 1 },
    RoomTemplate { name: "crypt", width: 9, height: 9, weight: 2 },
];

/// Терминальная комната всегда одного размера
pub const TERMINAL_TEMPLATE: RoomTemplate = RoomTemplate {
    name: "terminal",
    width: 9,
    height: 9,
    weight: 0,
};

/// Чётный размер: левый верхний угол спавна `(-6, -6)` кратен шагу сетки по умолчанию
pub const SPAWN_TEMPLATE: RoomTemplate = RoomTemplate {
    name: "spawn",
    width: 12,
    height: 12,
    weight: 0,
};

/// Выбирает обычный шаблон с учётом весов
pub fn pick_standard<R: Rng>(rng: &mut R) -> &'static RoomTemplate {
    match WeightedIndex::new(STANDARD_TEMPLATES.iter().map(|t| t.weight)) {
        Ok(weights) => &STANDARD_TEMPLATES[weights.sample(rng)],
        Err(err) => {
            log::warn!("Веса шаблонов некорректны ({err}), берётся первый");
            &STANDARD_TEMPLATES[0]
        }
    }
}
