// src/sweep.rs
//! Пакетная проверка сидов
//!
//! Прогоняет генератор без отображения на наборе сидов и собирает по каждому
//! краткий отчёт: сколько комнат и коридоров, связен ли уровень, не превышена
//! ли допустимая степень, остались ли пересечения. С фичей `parallel` сиды
//! обрабатываются в пуле rayon; порядок отчётов всегда совпадает с порядком сидов.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::config::LevelConfig;
use crate::generator::LevelGenerator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub seed: u64,
    pub rooms: usize,
    pub hallways: usize,
    pub connected: bool,
    pub max_degree: usize,
    /// Пары комнат, пересекающихся в готовом уровне
    pub residual_overlaps: usize,
    /// Вызовы `update` до завершения
    pub ticks: usize,
    /// Превышения предела рёбер ради связности
    pub over_cap: usize,
}

impl SeedReport {
    /// Уровень удовлетворяет всем структурным гарантиям
    #[must_use]
    pub fn is_sound(&self, max_num_of_edges: usize) -> bool {
        self.connected
            && self.residual_overlaps == 0
            && (self.over_cap > 0 || self.max_degree <= max_num_of_edges)
    }
}

#[must_use]
pub fn verify_seed(config: &LevelConfig, seed: u64) -> SeedReport {
    let mut generator = LevelGenerator::headless(config.clone(), seed);
    generator.run_to_completion();
    let layout = generator.layout();

    SeedReport {
        seed,
        rooms: layout.rooms.len(),
        hallways: layout.hallways.len(),
        connected: layout.is_connected(),
        max_degree: layout.max_degree(),
        residual_overlaps: generator.overlapping_pairs(),
        ticks: generator.stats().ticks,
        over_cap: generator.stats().over_cap(),
    }
}

#[must_use]
pub fn verify_seeds(config: &LevelConfig, seeds: &[u64]) -> Vec<SeedReport> {
    #[cfg(feature = "parallel")]
    let reports = seeds.par_iter().map(|&seed| verify_seed(config, seed)).collect();
    #[cfg(not(feature = "parallel"))]
    let reports = seeds.iter().map(|&seed| verify_seed(config, seed)).collect();

    reports
}
