// src/error.rs
//! Ошибки крейта
//!
//! Сам конвейер генерации ошибок не возвращает: любые геометрические неудачи
//! сводятся к допустимым приближениям. Ошибки возникают только на краях —
//! загрузка конфигурации, экспорт JSON/PNG.

use thiserror::Error;

/// Нарушение допустимых диапазонов конфигурации
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("конфигурация не содержит ни одного слоя")]
    NoLayers,

    #[error("доля радиуса слоя {index} должна быть в (0, 1], получено {fraction}")]
    LayerFraction { index: usize, fraction: f64 },

    #[error("слой {index} не внешний, но num_out_edges = 0: внешние кольца оторвутся от спавна")]
    NoOutEdges { index: usize },

    #[error("радиус карты должен быть положительным, получено {0}")]
    MapRadius(f64),

    #[error("радиус спавна {spawn} превышает радиус карты {map}")]
    SpawnRadius { spawn: f64, map: f64 },

    #[error("вероятность возврата рёбер должна быть в [0, 1], получено {0}")]
    Probability(f64),

    #[error("размер ячейки сетки должен быть не меньше 1, получено {0}")]
    GridCellSize(i32),

    #[error("размер тайла должен быть положительным, получено {0}")]
    TileSize(f64),

    #[error("коэффициент расширения должен быть не меньше 1, получено {0}")]
    ExpansionFactor(f64),

    #[error("max_num_of_edges должен быть не меньше 1")]
    MaxEdges,
}

/// Общая ошибка библиотеки
#[derive(Debug, Error)]
pub enum LevelGenError {
    #[error("ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("ошибка разбора TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ошибка изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error("некорректная конфигурация: {0}")]
    Config(#[from] ConfigError),
}
