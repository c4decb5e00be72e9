// src/export.rs
//! Снимок готового уровня
//!
//! Генератор держит комнаты и рёбра в аренах с рабочими флагами. Для
//! сохранения, сравнения между клиентами и внешних проверок достаточно
//! плоского снимка: комнаты с ключами и активные коридоры с путями.
//!
//! Два снимка одного сида и одной конфигурации обязаны совпадать побитово,
//! поэтому [`LevelLayout`] реализует `PartialEq` и сериализуется в JSON.

use std::fs;
use std::path::Path;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::error::LevelGenError;
use crate::room::{DoorCell, Room, RoomKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub key: usize,
    pub kind: RoomKind,
    pub template: String,
    /// Левый верхний угол в клетках
    pub x: f64,
    pub y: f64,
    pub width: i32,
    pub height: i32,
    pub ring: usize,
    /// Двери в порядке индексов коридоров
    pub doors: Vec<DoorCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallwaySnapshot {
    /// Ключи комнат
    pub source: usize,
    pub neighbor: usize,
    pub weight: f64,
    /// Точки пути в мировых координатах (клетка × размер тайла)
    pub path: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub seed: u64,
    pub rooms: Vec<RoomSnapshot>,
    pub hallways: Vec<HallwaySnapshot>,
}

impl LevelLayout {
    /// Снимок арен генератора: только активные рёбра попадают в коридоры
    #[must_use]
    pub fn from_graph(seed: u64, rooms: &[Room], edges: &[Edge]) -> Self {
        let key_of = |index: usize| rooms[index].key.unwrap_or(index);

        let rooms_out = rooms
            .iter()
            .enumerate()
            .map(|(i, room)| RoomSnapshot {
                key: key_of(i),
                kind: room.kind,
                template: room.template.to_string(),
                x: room.position.x,
                y: room.position.y,
                width: room.width,
                height: room.height,
                ring: room.ring,
                doors: room.doors.values().copied().collect(),
            })
            .collect();

        let hallways = edges
            .iter()
            .filter(|e| e.active)
            .map(|e| HallwaySnapshot {
                source: key_of(e.source.0),
                neighbor: key_of(e.neighbor.0),
                weight: e.weight,
                path: e.path.iter().map(glam::DVec2::to_array).collect(),
            })
            .collect();

        Self {
            seed,
            rooms: rooms_out,
            hallways,
        }
    }

    pub fn to_json(&self) -> Result<String, LevelGenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(contents: &str) -> Result<Self, LevelGenError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn save_as_json(&self, path: impl AsRef<Path>) -> Result<(), LevelGenError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Граф уровня: вершины — ключи комнат, веса рёбер — длины коридоров
    #[must_use]
    pub fn to_graph(&self) -> UnGraph<usize, f64> {
        let mut graph = UnGraph::with_capacity(self.rooms.len(), self.hallways.len());
        let nodes: Vec<NodeIndex> = self.rooms.iter().map(|r| graph.add_node(r.key)).collect();
        let node_of = |key: usize| self.rooms.iter().position(|r| r.key == key).map(|i| nodes[i]);

        for hallway in &self.hallways {
            if let (Some(a), Some(b)) = (node_of(hallway.source), node_of(hallway.neighbor)) {
                graph.add_edge(a, b, hallway.weight);
            }
        }
        graph
    }

    /// Все комнаты достижимы от спавна по коридорам
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let graph = self.to_graph();
        let Some(spawn) = self.rooms.iter().position(|r| r.kind == RoomKind::Spawn) else {
            return self.rooms.is_empty();
        };

        let mut bfs = Bfs::new(&graph, NodeIndex::new(spawn));
        let mut reached = 0;
        while bfs.next(&graph).is_some() {
            reached += 1;
        }
        reached == graph.node_count()
    }

    /// Наибольшее число коридоров у одной комнаты
    #[must_use]
    pub fn max_degree(&self) -> usize {
        let graph = self.to_graph();
        graph
            .node_indices()
            .map(|n| graph.edges(n).count())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn rooms_of_kind(&self, kind: RoomKind) -> usize {
        self.rooms.iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layer, LevelConfig};
    use crate::generator::LevelGenerator;

    fn small_layout(seed: u64) -> LevelLayout {
        let mut config = LevelConfig::default();
        config.num_rooms = 12;
        let mut generator = LevelGenerator::headless(config, seed);
        generator.run_to_completion();
        generator.layout()
    }

    #[test]
    fn json_round_trip_keeps_layout() {
        let layout = small_layout(4);
        let json = layout.to_json().unwrap();
        assert_eq!(LevelLayout::from_json(&json).unwrap(), layout);
    }

    #[test]
    fn generated_layout_is_connected() {
        let layout = small_layout(21);
        assert!(layout.is_connected());
        assert_eq!(layout.rooms_of_kind(RoomKind::Spawn), 1);
        assert_eq!(layout.rooms[0].key, 0);
    }

    #[test]
    fn detached_room_breaks_connectivity() {
        let mut config = LevelConfig::without_layers();
        config.num_rooms = 0;
        config.add_layer(Layer::new(1.0, 1, 0));
        let mut generator = LevelGenerator::headless(config, 2);
        generator.run_to_completion();

        let mut layout = generator.layout();
        assert!(layout.is_connected());
        assert_eq!(layout.max_degree(), 1);

        layout.hallways.clear();
        assert!(!layout.is_connected());
        assert_eq!(layout.max_degree(), 0);
    }

    #[test]
    fn saves_to_disk() {
        let layout = small_layout(5);
        let path = std::env::temp_dir().join(format!("levelgen-layout-{}.json", std::process::id()));
        layout.save_as_json(&path).unwrap();
        let restored = LevelLayout::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(restored, layout);
    }
}
