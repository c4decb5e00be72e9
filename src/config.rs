// src/config.rs
//! Конфигурация генерации уровня
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией уровня:
//! - Радиусы карты и зоны разброса комнат вокруг спавна
//! - Концентрические слои (кольца) с терминалами и межслойными переходами
//! - Параметры разведения, расширения и привязки к сетке
//! - Ограничения на коридоры и вероятность возврата рёбер триангуляции
//!
//! Конфигурация копируется в генератор при `init` и больше не меняется.
//! Хост и клиенты обязаны использовать одинаковую конфигурацию: вместе с сидом
//! она полностью определяет уровень.
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::error::{ConfigError, LevelGenError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Концентрический слой (кольцо) карты
///
/// Слой ограничен снаружи окружностью радиуса `radius_fraction × map_radius`,
/// а изнутри — внешней границей предыдущего слоя.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Внешний радиус слоя как доля радиуса карты, `(0, 1]`
    pub radius_fraction: f64,

    /// Абсолютный внешний радиус (вычисляется из `radius_fraction`, в файле не хранится)
    #[serde(skip)]
    pub radius: f64,

    /// Количество терминальных комнат в слое
    #[serde(default = "default_num_terminals")]
    pub num_terminals: usize,

    /// Количество переходов в следующий (внешний) слой
    #[serde(default = "default_num_out_edges")]
    pub num_out_edges: usize,
}

fn default_num_terminals() -> usize {
    1
}
fn default_num_out_edges() -> usize {
    2
}

impl Layer {
    #[must_use]
    pub fn new(radius_fraction: f64, num_terminals: usize, num_out_edges: usize) -> Self {
        Self {
            radius_fraction,
            radius: 0.0,
            num_terminals,
            num_out_edges,
        }
    }
}

/// Основные параметры генерации уровня
///
/// Полная конфигурация для генерации одного уровня. Поддерживает загрузку из TOML-файлов.
/// Все расстояния заданы в клетках сетки, кроме `tile_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Радиус всей карты (внешняя граница последнего слоя)
    #[serde(default = "default_map_radius")]
    pub map_radius: f64,

    /// Радиус зоны, в которой изначально разбрасываются обычные комнаты
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f64,

    /// Количество обычных комнат
    #[serde(default = "default_num_rooms")]
    pub num_rooms: usize,

    /// Слои, упорядоченные по возрастанию `radius_fraction`
    #[serde(default = "default_layers")]
    pub layers: Vec<Layer>,

    /// Множитель, с которым комнаты отодвигаются от центра при разделении слоёв
    #[serde(default = "default_expansion_factor")]
    pub expansion_factor: f64,

    /// Дополнительный радиальный сдвиг для всех слоёв, кроме первого
    #[serde(default = "default_layer_offset")]
    pub layer_offset: f64,

    /// Шаг сетки, к которому привязываются позиции комнат
    #[serde(default = "default_grid_cell_size")]
    pub grid_cell_size: i32,

    /// Размер клетки в мировых единицах (для точек коридоров)
    #[serde(default = "default_tile_size")]
    pub tile_size: f64,

    /// Максимум активных рёбер (коридоров) у одной комнаты
    #[serde(default = "default_max_num_of_edges")]
    pub max_num_of_edges: usize,

    /// Максимальная длина ребра, которое может быть возвращено после MST
    #[serde(default = "default_max_hallway_length")]
    pub max_hallway_length: f64,

    /// Вероятность вернуть подходящее ребро триангуляции после построения MST
    #[serde(default = "default_add_edges_back_prob")]
    pub add_edges_back_prob: f64,

    /// Предел проходов разведения комнат за одну стадию.
    /// По исчерпании конвейер идёт дальше с остаточными пересечениями.
    #[serde(default = "default_max_separation_sweeps")]
    pub max_separation_sweeps: usize,

    /// Закрепить комнату спавна в центре на время разведения
    #[serde(default = "default_pin_spawn")]
    pub pin_spawn: bool,
}

fn default_map_radius() -> f64 {
    120.0
}
fn default_spawn_radius() -> f64 {
    60.0
}
fn default_num_rooms() -> usize {
    40
}
fn default_layers() -> Vec<Layer> {
    vec![
        Layer::new(0.35, 1, 3),
        Layer::new(0.7, 2, 3),
        Layer::new(1.0, 3, 0),
    ]
}
fn default_expansion_factor() -> f64 {
    1.3
}
fn default_layer_offset() -> f64 {
    10.0
}
fn default_grid_cell_size() -> i32 {
    2
}
fn default_tile_size() -> f64 {
    16.0
}
fn default_max_num_of_edges() -> usize {
    4
}
fn default_max_hallway_length() -> f64 {
    28.0
}
fn default_add_edges_back_prob() -> f64 {
    0.25
}
fn default_max_separation_sweeps() -> usize {
    2000
}
fn default_pin_spawn() -> bool {
    true
}

impl Default for LevelConfig {
    fn default() -> Self {
        let mut config = Self {
            map_radius: 120.0,
            spawn_radius: 60.0,
            num_rooms: 40,
            layers: default_layers(),
            expansion_factor: 1.3,
            layer_offset: 10.0,
            grid_cell_size: 2,
            tile_size: 16.0,
            max_num_of_edges: 4,
            max_hallway_length: 28.0,
            add_edges_back_prob: 0.25,
            max_separation_sweeps: 2000,
            pin_spawn: true,
        };
        config.resolve_layers();
        config
    }
}

impl LevelConfig {
    /// Пустая конфигурация без слоёв: слои добавляются через [`LevelConfig::add_layer`]
    #[must_use]
    pub fn without_layers() -> Self {
        Self {
            layers: Vec::new(),
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// Слои пересортировываются, абсолютные радиусы вычисляются, затем
    /// конфигурация проверяется через [`LevelConfig::validate`].
    ///
    /// # Пример
    /// ```toml
    /// # level.toml
    /// map_radius = 150.0
    /// num_rooms = 60
    ///
    /// [[layers]]
    /// radius_fraction = 0.5
    /// num_terminals = 2
    /// num_out_edges = 3
    ///
    /// [[layers]]
    /// radius_fraction = 1.0
    /// num_terminals = 3
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LevelGenError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LevelGenError> {
        let mut config: Self = toml::from_str(contents)?;
        config.resolve_layers();
        config.validate()?;
        Ok(config)
    }

    /// Добавляет слой, сохраняя порядок по возрастанию `radius_fraction`
    pub fn add_layer(&mut self, mut layer: Layer) {
        layer.radius = layer.radius_fraction * self.map_radius;
        let at = self
            .layers
            .partition_point(|l| l.radius_fraction <= layer.radius_fraction);
        self.layers.insert(at, layer);
    }

    /// Сортирует слои и пересчитывает их абсолютные радиусы
    pub fn resolve_layers(&mut self) {
        self.layers
            .sort_by(|a, b| a.radius_fraction.total_cmp(&b.radius_fraction));
        for layer in &mut self.layers {
            layer.radius = layer.radius_fraction * self.map_radius;
        }
    }

    /// Внутренняя граница слоя `index` (внешний радиус предыдущего слоя, для первого — 0)
    #[must_use]
    pub fn inner_radius(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.layers[index - 1].radius
        }
    }

    /// Индекс слоя, в который попадает точка на расстоянии `distance` от центра.
    /// Всё, что дальше последнего слоя, относится к последнему.
    #[must_use]
    pub fn layer_for_distance(&self, distance: f64) -> usize {
        self.layers
            .iter()
            .position(|l| distance <= l.radius)
            .unwrap_or(self.layers.len().saturating_sub(1))
    }

    /// Проверяет диапазоны параметров
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if !(layer.radius_fraction > 0.0 && layer.radius_fraction <= 1.0) {
                return Err(ConfigError::LayerFraction {
                    index,
                    fraction: layer.radius_fraction,
                });
            }
            if layer.num_out_edges == 0 && index + 1 < self.layers.len() {
                return Err(ConfigError::NoOutEdges { index });
            }
        }
        if self.map_radius <= 0.0 {
            return Err(ConfigError::MapRadius(self.map_radius));
        }
        if self.spawn_radius > self.map_radius {
            return Err(ConfigError::SpawnRadius {
                spawn: self.spawn_radius,
                map: self.map_radius,
            });
        }
        if !(0.0..=1.0).contains(&self.add_edges_back_prob) {
            return Err(ConfigError::Probability(self.add_edges_back_prob));
        }
        if self.grid_cell_size < 1 {
            return Err(ConfigError::GridCellSize(self.grid_cell_size));
        }
        if self.tile_size <= 0.0 {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        if self.expansion_factor < 1.0 {
            return Err(ConfigError::ExpansionFactor(self.expansion_factor));
        }
        if self.max_num_of_edges == 0 {
            return Err(ConfigError::MaxEdges);
        }
        Ok(())
    }
}
