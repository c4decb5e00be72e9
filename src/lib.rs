pub mod config;
pub mod edge;
pub mod error;
pub mod export;
pub mod generator;
pub mod geometry;
pub mod mst;
pub mod render;
pub mod room;
pub mod sweep;
pub mod triangulation;
pub mod visuals;

pub use config::{Layer, LevelConfig};
pub use error::{ConfigError, LevelGenError};
pub use export::LevelLayout;
pub use generator::{GenerationStats, LevelGenerator, Phase};
pub use render::Canvas;
pub use room::{Room, RoomId, RoomKind};
pub use visuals::{LevelVisuals, NullVisuals, VisualHandle};
