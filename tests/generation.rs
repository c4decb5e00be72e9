use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;
use levelgen::config::{Layer, LevelConfig};
use levelgen::generator::{AfterSeparation, LevelGenerator, Phase};
use levelgen::geometry::distance_to_segment;
use levelgen::room::RoomKind;
use proptest::prelude::*;

fn small_config() -> LevelConfig {
    let mut config = LevelConfig::default();
    config.num_rooms = 16;
    config
}

fn generate(config: &LevelConfig, seed: u64) -> LevelGenerator {
    let mut generator = LevelGenerator::headless(config.clone(), seed);
    generator.run_to_completion();
    generator
}

/// Активные коридоры внутри кольца, проходящие ближе его внутренней границы
fn core_crossings(generator: &LevelGenerator) -> BTreeMap<usize, BTreeSet<(usize, usize)>> {
    let config = generator.config();
    let rooms = generator.rooms();
    let last = config.layers.len() - 1;
    let mut crossings: BTreeMap<usize, BTreeSet<(usize, usize)>> = BTreeMap::new();
    for (_, edge) in generator.active_edges() {
        let (a, b) = (&rooms[edge.source.0], &rooms[edge.neighbor.0]);
        let ring = a.ring.min(last);
        if ring == 0 || b.ring.min(last) != ring {
            continue;
        }
        let boundary = config.inner_radius(ring) * config.expansion_factor;
        if distance_to_segment(DVec2::ZERO, a.mid(), b.mid()) < boundary {
            crossings
                .entry(ring)
                .or_default()
                .insert((edge.source.0, edge.neighbor.0));
        }
    }
    crossings
}

/// Связаны ли со спавном все комнаты колец `0..=ring` без коридоров `skip`
fn rings_connected_without(
    generator: &LevelGenerator,
    ring: usize,
    skip: &BTreeSet<(usize, usize)>,
) -> bool {
    let last = generator.config().layers.len() - 1;
    let rooms = generator.rooms();
    let inside = |i: usize| rooms[i].ring.min(last) <= ring;

    let mut adjacency = vec![Vec::new(); rooms.len()];
    for (_, edge) in generator.active_edges() {
        let (a, b) = (edge.source.0, edge.neighbor.0);
        if inside(a) && inside(b) && !skip.contains(&(a, b)) {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    let mut seen = vec![false; rooms.len()];
    seen[0] = true;
    let mut stack = vec![0];
    while let Some(i) = stack.pop() {
        for &j in &adjacency[i] {
            if !seen[j] {
                seen[j] = true;
                stack.push(j);
            }
        }
    }
    (0..rooms.len()).filter(|&i| inside(i)).all(|i| seen[i])
}

/// Проход через центр допустим, только если без него кольцо не связать
fn core_crossings_are_required(generator: &LevelGenerator) -> Result<(), String> {
    let crossings = core_crossings(generator);
    let total: usize = crossings.values().map(BTreeSet::len).sum();
    if total > generator.stats().core_crossings {
        return Err(format!(
            "{total} core-crossing hallways, {} admitted",
            generator.stats().core_crossings
        ));
    }
    for (&ring, skip) in &crossings {
        if rings_connected_without(generator, ring, skip) {
            return Err(format!("ring {ring}: {skip:?} cross the core without need"));
        }
    }
    Ok(())
}

/// Прогоняет генератор по одной стадии, проверяя пересечения на каждой передаче после разведения
fn generate_checking_handoffs(config: &LevelConfig, seed: u64) -> Result<LevelGenerator, String> {
    let mut generator = LevelGenerator::headless(config.clone(), seed);
    let mut previous = generator.phase();
    while generator.update() {
        let current = generator.phase();
        let handed_off = matches!(previous, Phase::SeparateRooms { .. })
            && !matches!(current, Phase::SeparateRooms { .. });
        if handed_off && generator.stats().separation_cap_hits == 0 {
            let overlaps = generator.overlapping_pairs();
            if overlaps > 0 {
                return Err(format!("{overlaps} overlapping pairs after {previous:?}"));
            }
        }
        previous = current;
    }
    Ok(generator)
}

fn off_grid_rooms(generator: &LevelGenerator) -> usize {
    let step = f64::from(generator.config().grid_cell_size);
    generator
        .rooms()
        .iter()
        .filter(|r| r.position.x.rem_euclid(step) != 0.0 || r.position.y.rem_euclid(step) != 0.0)
        .count()
}

#[test]
fn same_seed_gives_identical_layouts() {
    let config = LevelConfig::default();
    let a = generate(&config, 2024).layout();
    let b = generate(&config, 2024).layout();
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn different_seeds_give_different_layouts() {
    let config = LevelConfig::default();
    assert_ne!(generate(&config, 1).layout(), generate(&config, 2).layout());
}

#[test]
fn ticking_matches_tight_loop() {
    let config = small_config();
    let tight = generate(&config, 31);

    let mut ticked = LevelGenerator::headless(config, 31);
    let mut calls = 0;
    loop {
        calls += 1;
        if !ticked.update() {
            break;
        }
    }

    assert_eq!(ticked.layout(), tight.layout());
    assert_eq!(calls, tight.stats().ticks);
    assert!(ticked.is_finished());
}

#[test]
fn no_overlaps_when_separation_hands_off() {
    let mut generator = LevelGenerator::headless(LevelConfig::default(), 64);
    let mut previous = generator.phase();
    while generator.update() {
        let current = generator.phase();
        if matches!(previous, Phase::SeparateRooms { .. })
            && !matches!(current, Phase::SeparateRooms { .. })
        {
            assert_eq!(generator.overlapping_pairs(), 0, "after {previous:?}");
        }
        previous = current;
    }
    assert_eq!(generator.stats().separation_sweeps.len(), 3);
    assert_eq!(generator.stats().separation_cap_hits, 0);
}

#[test]
fn final_positions_sit_on_the_grid() {
    let mut config = small_config();
    config.grid_cell_size = 4;
    let generator = generate(&config, 5);
    assert_eq!(off_grid_rooms(&generator), 0);
}

#[test]
fn hallways_cross_the_core_only_when_a_ring_needs_it() {
    let config = LevelConfig::default();
    for seed in 0..40 {
        let generator = generate(&config, seed);
        assert!(generator.layout().is_connected(), "seed {seed}");
        if let Err(message) = core_crossings_are_required(&generator) {
            panic!("seed {seed}: {message}");
        }
    }
}

#[test]
fn room_keys_are_dense_and_spawn_is_zero() {
    let generator = generate(&LevelConfig::default(), 99);
    for (i, room) in generator.rooms().iter().enumerate() {
        assert_eq!(room.key, Some(i));
    }
    assert_eq!(generator.rooms()[0].kind, RoomKind::Spawn);
}

#[test]
fn terminal_count_matches_layers() {
    let config = LevelConfig::default();
    let layout = generate(&config, 17).layout();
    let expected: usize = config.layers.iter().map(|l| l.num_terminals).sum();
    assert_eq!(layout.rooms_of_kind(RoomKind::Terminal), expected);
    assert_eq!(layout.rooms_of_kind(RoomKind::Spawn), 1);
}

#[test]
fn minimal_level_is_spawn_and_terminal() {
    let mut config = LevelConfig::without_layers();
    config.num_rooms = 0;
    config.add_layer(Layer::new(1.0, 1, 0));

    let layout = generate(&config, 0).layout();
    assert_eq!(layout.rooms.len(), 2);
    assert_eq!(layout.hallways.len(), 1);
    assert!(layout.is_connected());
}

#[test]
fn dispose_mid_pipeline_stops_work() {
    let mut generator = LevelGenerator::headless(LevelConfig::default(), 8);
    let target = Phase::SeparateRooms {
        then: AfterSeparation::SegregateLayers,
    };
    while generator.phase() != target {
        assert!(generator.update());
    }
    generator.dispose();
    assert!(!generator.update());
    assert!(generator.rooms().is_empty());
    assert!(generator.edges().is_empty());

    let config = small_config();
    assert!(generator.init(config.clone(), Default::default(), Some(8)));
    generator.run_to_completion();
    assert_eq!(generator.layout(), generate(&config, 8).layout());
}

#[test]
fn config_from_toml_drives_generation() {
    let config = LevelConfig::from_toml_str(
        r"
        num_rooms = 8
        spawn_radius = 40.0

        [[layers]]
        radius_fraction = 1.0
        num_terminals = 2
        num_out_edges = 0

        [[layers]]
        radius_fraction = 0.5
        num_terminals = 1
        num_out_edges = 2
        ",
    )
    .unwrap();
    assert!(config.layers[0].radius < config.layers[1].radius);

    let layout = generate(&config, 3).layout();
    assert!(layout.is_connected());
    assert_eq!(layout.rooms_of_kind(RoomKind::Terminal), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]
    #[test]
    fn any_seed_yields_a_connected_bounded_level(seed in any::<u64>()) {
        let config = small_config();
        let generator = generate_checking_handoffs(&config, seed)
            .map_err(|message| TestCaseError::fail(format!("seed={seed}: {message}")))?;
        let layout = generator.layout();

        prop_assert!(layout.is_connected(), "seed={seed} should produce a connected level");
        prop_assert!(
            generator.stats().over_cap() > 0 || layout.max_degree() <= config.max_num_of_edges,
            "seed={seed} exceeds the edge limit without a connectivity reason"
        );
        prop_assert_eq!(generator.overlapping_pairs(), 0);
        prop_assert_eq!(off_grid_rooms(&generator), 0, "seed={} left rooms off the grid", seed);
        if let Err(message) = core_crossings_are_required(&generator) {
            return Err(TestCaseError::fail(format!("seed={seed}: {message}")));
        }
    }

    #[test]
    fn coarse_grid_keeps_rooms_aligned(seed in any::<u64>(), cell in 2..6i32) {
        let mut config = small_config();
        config.grid_cell_size = cell;
        let generator = generate(&config, seed);
        prop_assert_eq!(off_grid_rooms(&generator), 0, "seed={} cell={}", seed, cell);
        prop_assert!(generator.layout().is_connected());
    }
}
