// src/generator/mod.rs
//! Генератор уровня: возобновляемый конвейер стадий
//!
//! Уровень строится за несколько вызовов [`LevelGenerator::update`]: каждый вызов
//! выполняет ровно одну стадию целиком и возвращает управление, чтобы
//! вызывающая сторона (например, экран загрузки) оставалась отзывчивой.
//!
//! ## Стадии
//!
//! ```text
//! GenerateRooms → SeparateRooms(→PlaceTerminals) → PlaceTerminals
//!   → SeparateRooms(→SegregateLayers) → SegregateLayers
//!   → SeparateRooms(→SnapAndCull) → SnapAndCull → MarkAndFillHallways → Done
//! ```
//!
//! `SeparateRooms` — одна и та же стадия, параметризованная тем, что идёт после неё.
//! Она повторяется (по одному проходу за вызов), пока комнаты не перестанут пересекаться.
//!
//! ## Детерминизм
//!
//! Единственный источник случайности — `ChaCha8Rng`, инициализированный сидом.
//! Одинаковые конфигурация и сид дают одинаковый граф на хосте и на всех клиентах;
//! именно поэтому геометрию уровня не нужно передавать по сети.

mod hallways;
mod placement;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::LevelConfig;
use crate::edge::{Edge, EdgeId};
use crate::export::LevelLayout;
use crate::room::{Room, RoomId};
use crate::visuals::{LevelVisuals, NullVisuals};

/// Что выполнить после успешного разведения комнат
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSeparation {
    PlaceTerminals,
    SegregateLayers,
    SnapAndCull,
}

impl From<AfterSeparation> for Phase {
    fn from(then: AfterSeparation) -> Self {
        match then {
            AfterSeparation::PlaceTerminals => Phase::PlaceTerminals,
            AfterSeparation::SegregateLayers => Phase::SegregateLayers,
            AfterSeparation::SnapAndCull => Phase::SnapAndCull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    GenerateRooms,
    SeparateRooms { then: AfterSeparation },
    PlaceTerminals,
    SegregateLayers,
    SnapAndCull,
    MarkAndFillHallways,
    Done,
}

/// Счётчики одного прогона генерации
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Вызовы `update`, выполнившие стадию
    pub ticks: usize,
    /// Число проходов каждой из стадий разведения
    pub separation_sweeps: Vec<usize>,
    /// Стадии разведения, прерванные по `max_separation_sweeps`
    pub separation_cap_hits: usize,
    pub culled_by_terminals: usize,
    pub culled_by_snap: usize,
    pub restored_edges: usize,
    pub mst_over_cap: usize,
    pub inter_layer_fallbacks: usize,
    /// Переходы между слоями, проложенные сверх предела рёбер
    pub links_over_cap: usize,
    /// Рёбра через центр кольца, без которых кольцо не связать
    pub core_crossings: usize,
}

impl GenerationStats {
    /// Все случаи, когда предел рёбер был превышен ради связности
    #[must_use]
    pub fn over_cap(&self) -> usize {
        self.mst_over_cap + self.links_over_cap
    }
}

pub struct LevelGenerator<V: LevelVisuals = NullVisuals> {
    config: LevelConfig,
    seed: u64,
    rng: ChaCha8Rng,
    rooms: Vec<Room>,
    edges: Vec<Edge>,
    phase: Phase,
    active: bool,
    visuals: Option<V>,
    stats: GenerationStats,
    /// Проходы текущей стадии разведения
    sweeps_in_stint: usize,
}

impl<V: LevelVisuals> Default for LevelGenerator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelGenerator<NullVisuals> {
    /// Генератор без отображения, сразу инициализированный
    #[must_use]
    pub fn headless(config: LevelConfig, seed: u64) -> Self {
        let mut generator = Self::new();
        generator.init(config, NullVisuals::default(), Some(seed));
        generator
    }
}

impl<V: LevelVisuals> LevelGenerator<V> {
    /// Неактивный генератор; перед работой нужен [`LevelGenerator::init`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LevelConfig::default(),
            seed: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
            rooms: Vec::new(),
            edges: Vec::new(),
            phase: Phase::Done,
            active: false,
            visuals: None,
            stats: GenerationStats::default(),
            sweeps_in_stint: 0,
        }
    }

    /// Запускает генерацию. Без сида берётся системная энтропия; выбранный сид
    /// доступен через [`LevelGenerator::seed`] для рассылки клиентам.
    ///
    /// Повторный вызов на активном генераторе ничего не делает и возвращает `false`.
    /// Конфигурация, не прошедшая [`LevelConfig::validate`], тоже даёт `false`,
    /// генератор остаётся неактивным.
    pub fn init(&mut self, mut config: LevelConfig, visuals: V, seed: Option<u64>) -> bool {
        if self.active {
            log::warn!("Генератор уже активен, повторный init пропущен");
            return false;
        }

        config.resolve_layers();
        if let Err(err) = config.validate() {
            log::error!("Некорректная конфигурация уровня: {err}");
            return false;
        }
        let seed = seed.unwrap_or_else(rand::random);
        log::info!(
            "Генерация уровня: сид {seed}, {} комнат, {} слоёв",
            config.num_rooms,
            config.layers.len()
        );

        self.config = config;
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.rooms.clear();
        self.edges.clear();
        self.phase = Phase::GenerateRooms;
        self.visuals = Some(visuals);
        self.stats = GenerationStats::default();
        self.sweeps_in_stint = 0;
        self.active = true;
        true
    }

    /// Выполняет одну стадию. `true`, пока впереди есть стадии.
    pub fn update(&mut self) -> bool {
        if !self.active || self.phase == Phase::Done {
            return false;
        }
        self.stats.ticks += 1;
        self.phase = self.step(self.phase);
        self.phase != Phase::Done
    }

    /// Прогоняет конвейер до конца, возвращает число выполненных стадий
    pub fn run_to_completion(&mut self) -> usize {
        let before = self.stats.ticks;
        while self.update() {}
        self.stats.ticks - before
    }

    /// Сбрасывает всё состояние. Повторный вызов ничего не делает.
    pub fn dispose(&mut self) {
        if !self.active {
            return;
        }
        self.rooms.clear();
        self.edges.clear();
        self.visuals = None;
        self.phase = Phase::Done;
        self.active = false;
        self.sweeps_in_stint = 0;
        log::debug!("Генератор освобождён");
    }

    fn step(&mut self, phase: Phase) -> Phase {
        match phase {
            Phase::GenerateRooms => {
                self.generate_rooms();
                Phase::SeparateRooms {
                    then: AfterSeparation::PlaceTerminals,
                }
            }
            Phase::SeparateRooms { then } => {
                if self.separate_rooms() {
                    then.into()
                } else {
                    phase
                }
            }
            Phase::PlaceTerminals => {
                self.place_terminals();
                Phase::SeparateRooms {
                    then: AfterSeparation::SegregateLayers,
                }
            }
            Phase::SegregateLayers => {
                self.segregate_layers();
                Phase::SeparateRooms {
                    then: AfterSeparation::SnapAndCull,
                }
            }
            Phase::SnapAndCull => {
                self.snap_and_cull();
                Phase::MarkAndFillHallways
            }
            Phase::MarkAndFillHallways => {
                self.mark_and_fill_hallways();
                log::info!(
                    "Уровень готов: {} комнат, {} коридоров за {} шагов",
                    self.rooms.len(),
                    self.edges.iter().filter(|e| e.active).count(),
                    self.stats.ticks
                );
                Phase::Done
            }
            Phase::Done => Phase::Done,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.active && self.phase == Phase::Done
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    #[must_use]
    pub fn visuals(&self) -> Option<&V> {
        self.visuals.as_ref()
    }

    /// Забирает контейнер визуализации (например, чтобы сохранить рендер)
    pub fn take_visuals(&mut self) -> Option<V> {
        self.visuals.take()
    }

    pub fn active_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(i, e)| (EdgeId(i), e))
    }

    /// Количество активных рёбер комнаты
    #[must_use]
    pub fn active_degree(&self, room: RoomId) -> usize {
        self.rooms[room.0]
            .edges
            .iter()
            .filter(|id| self.edges[id.0].active)
            .count()
    }

    /// Снимок готового уровня для экспорта
    #[must_use]
    pub fn layout(&self) -> LevelLayout {
        LevelLayout::from_graph(self.seed, &self.rooms, &self.edges)
    }

    /// Есть ли сейчас хотя бы одна пара пересекающихся комнат
    #[must_use]
    pub fn has_overlaps(&self) -> bool {
        self.overlapping_pairs() > 0
    }

    #[must_use]
    pub fn overlapping_pairs(&self) -> usize {
        let mut count = 0;
        for (i, a) in self.rooms.iter().enumerate() {
            count += self.rooms[i + 1..].iter().filter(|b| a.intersects(b)).count();
        }
        count
    }

    fn relayout(&mut self) {
        if let Some(visuals) = self.visuals.as_mut() {
            visuals.relayout(&self.rooms);
        }
    }

    /// Добавляет комнату в арену и создаёт для неё визуальный объект
    fn push_room(&mut self, mut room: Room) -> RoomId {
        if let Some(visuals) = self.visuals.as_mut() {
            room.visual = Some(visuals.add_room_visual(&room));
        }
        self.rooms.push(room);
        RoomId(self.rooms.len() - 1)
    }

    /// Добавляет ребро и регистрирует его на обоих концах
    fn push_edge(&mut self, source: RoomId, neighbor: RoomId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(&self.rooms, source, neighbor));
        self.rooms[source.0].edges.push(id);
        self.rooms[neighbor.0].edges.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layer;
    use crate::room::RoomKind;

    fn tiny_config() -> LevelConfig {
        let mut config = LevelConfig::without_layers();
        config.num_rooms = 0;
        config.add_layer(Layer::new(1.0, 1, 0));
        config
    }

    #[test]
    fn phases_follow_the_pipeline() {
        let mut generator = LevelGenerator::headless(LevelConfig::default(), 3);
        assert_eq!(generator.phase(), Phase::GenerateRooms);

        let mut seen = vec![generator.phase()];
        while generator.update() {
            if seen.last() != Some(&generator.phase()) {
                seen.push(generator.phase());
            }
        }
        seen.push(generator.phase());

        let expected = [
            Phase::GenerateRooms,
            Phase::SeparateRooms { then: AfterSeparation::PlaceTerminals },
            Phase::PlaceTerminals,
            Phase::SeparateRooms { then: AfterSeparation::SegregateLayers },
            Phase::SegregateLayers,
            Phase::SeparateRooms { then: AfterSeparation::SnapAndCull },
            Phase::SnapAndCull,
            Phase::MarkAndFillHallways,
            Phase::Done,
        ];
        assert_eq!(seen, expected);
    }

    #[test]
    fn reentrant_init_is_ignored() {
        let mut generator = LevelGenerator::headless(tiny_config(), 1);
        assert!(!generator.init(tiny_config(), NullVisuals::default(), Some(2)));
        assert_eq!(generator.seed(), 1);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut generator = LevelGenerator::headless(tiny_config(), 1);
        generator.update();
        generator.dispose();
        generator.dispose();
        assert!(generator.rooms().is_empty());
        assert!(!generator.update());
        assert!(!generator.is_active());
    }

    #[test]
    fn update_without_init_does_nothing() {
        let mut generator: LevelGenerator = LevelGenerator::new();
        assert!(!generator.update());
        assert_eq!(generator.run_to_completion(), 0);
        assert_eq!(generator.stats().ticks, 0);
    }

    #[test]
    fn finished_or_disposed_generator_reports_no_work() {
        let mut generator = LevelGenerator::headless(tiny_config(), 4);
        let ticks = generator.run_to_completion();
        assert_eq!(ticks, generator.stats().ticks);
        assert_eq!(generator.run_to_completion(), 0);

        generator.dispose();
        assert_eq!(generator.run_to_completion(), 0);
    }

    #[test]
    fn invalid_config_keeps_generator_inactive() {
        let mut config = tiny_config();
        config.grid_cell_size = 0;
        let mut generator: LevelGenerator = LevelGenerator::new();
        assert!(!generator.init(config, NullVisuals::default(), Some(1)));
        assert!(!generator.is_active());
        assert!(!generator.update());
        assert!(generator.rooms().is_empty());

        let mut config = LevelConfig::without_layers();
        config.add_layer(Layer::new(0.5, 1, 0));
        config.add_layer(Layer::new(1.0, 1, 0));
        assert!(!generator.init(config, NullVisuals::default(), Some(1)));
        assert!(generator.init(tiny_config(), NullVisuals::default(), Some(1)));
    }

    #[test]
    fn spawn_room_comes_first() {
        let mut generator = LevelGenerator::headless(LevelConfig::default(), 11);
        generator.update();
        assert_eq!(generator.rooms()[0].kind, RoomKind::Spawn);
        assert_eq!(generator.rooms().len(), 1 + generator.config().num_rooms);
        generator.run_to_completion();
        assert_eq!(generator.rooms()[0].kind, RoomKind::Spawn);
        assert_eq!(generator.rooms()[0].key, Some(0));
    }
}
