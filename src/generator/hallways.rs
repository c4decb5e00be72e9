// src/generator/hallways.rs
//! Разметка и прокладка коридоров
//!
//! Для каждого кольца, начиная с внутреннего:
//! 1. Триангуляция Делоне центров комнат кольца (рёбра через внутреннюю дыру кольца откладываются)
//! 2. MST по Приму от комнат, уже связанных со спавном, — гарантирует связность кольца
//! 3. Возврат части отброшенных рёбер триангуляции, чтобы появились циклы
//! 4. Переходы в следующее кольцо через вращающееся угловое окно
//!
//! В конце всем активным рёбрам назначаются двери и строятся пути.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;

use super::LevelGenerator;
use crate::edge::EdgeId;
use crate::geometry::{angle_in_window, distance_to_segment, polar_angle};
use crate::mst::{Candidate, Prim};
use crate::room::RoomId;
use crate::room::door::{assign_doors, doors_within_angle};
use crate::triangulation::triangulate;
use crate::visuals::LevelVisuals;

impl<V: LevelVisuals> LevelGenerator<V> {
    pub(super) fn mark_and_fill_hallways(&mut self) {
        let ring_count = self.config.layers.len();
        if ring_count == 0 {
            log::warn!("Слоёв нет, коридоры не прокладываются");
            return;
        }
        let mut members: Vec<Vec<RoomId>> = vec![Vec::new(); ring_count];
        for (i, room) in self.rooms.iter().enumerate() {
            members[room.ring.min(ring_count - 1)].push(RoomId(i));
        }

        for ring in 0..ring_count {
            self.connect_ring(ring, &members[ring]);
            // пустое кольцо пропускается, переходы ведут в ближайшее непустое
            if let Some(next) = (ring + 1..ring_count).find(|&r| !members[r].is_empty()) {
                self.link_layers(ring, &members[ring], &members[next]);
            }
        }

        self.fill_hallways();
        let reached = self.mark_reachable();
        if reached < self.rooms.len() {
            log::warn!(
                "От спавна недостижимо {} комнат из {}",
                self.rooms.len() - reached,
                self.rooms.len()
            );
        }
        self.relayout();
    }

    /// Обход в ширину по активным рёбрам от спавна; помечает `visited`
    fn mark_reachable(&mut self) -> usize {
        for room in &mut self.rooms {
            room.visited = false;
        }
        let Some(spawn) = self.rooms.first_mut() else {
            return 0;
        };
        spawn.visited = true;

        let mut queue = VecDeque::from([RoomId(0)]);
        let mut reached = 1;
        while let Some(room) = queue.pop_front() {
            for i in 0..self.rooms[room.0].edges.len() {
                let edge = &self.edges[self.rooms[room.0].edges[i].0];
                if !edge.active {
                    continue;
                }
                let next = edge.other(room);
                if !self.rooms[next.0].visited {
                    self.rooms[next.0].visited = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached
    }

    /// Триангуляция, MST и возврат рёбер внутри одного кольца
    fn connect_ring(&mut self, ring: usize, members: &[RoomId]) {
        if members.is_empty() {
            return;
        }

        let points: Vec<DVec2> = members.iter().map(|id| self.rooms[id.0].mid()).collect();
        let triangulation = triangulate(&points);
        let inner_boundary = self.config.inner_radius(ring) * self.config.expansion_factor;

        let mut ring_edges = Vec::new();
        let mut held_back = Vec::new();
        for (a, b) in triangulation.unique_edges() {
            let crosses_core = inner_boundary > 0.0
                && distance_to_segment(DVec2::ZERO, points[a], points[b]) < inner_boundary;
            if crosses_core {
                held_back.push((a, b));
            } else {
                ring_edges.push(self.push_edge(members[a], members[b]));
            }
        }

        self.span_ring(ring, members, &ring_edges, &held_back);
        self.restore_edges(&ring_edges);
    }

    /// MST кольца. Корни — комнаты, уже связанные со спавном переходами из
    /// внутреннего кольца (для кольца 0 — сам спавн). Рёбра через центр
    /// допускаются, только если без них часть кольца не связать.
    fn span_ring(
        &mut self,
        ring: usize,
        members: &[RoomId],
        ring_edges: &[EdgeId],
        held_back: &[(usize, usize)],
    ) {
        let cap = self.config.max_num_of_edges;
        let local = |id: RoomId| members.binary_search(&id).unwrap_or(0);
        let mut degree: Vec<usize> = members.iter().map(|&id| self.active_degree(id)).collect();

        // до MST активны только переходы, поэтому ненулевая степень = связь со спавном
        let anchored: Vec<usize> = (0..members.len()).filter(|&i| degree[i] > 0).collect();

        let mut spanned = ring_edges.to_vec();
        let mut candidates: Vec<Candidate> = spanned
            .iter()
            .map(|id| {
                let e = &self.edges[id.0];
                Candidate {
                    a: local(e.source),
                    b: local(e.neighbor),
                    weight: e.weight,
                }
            })
            .collect();

        let mut prim = Prim::new(members.len(), anchored.first().copied().unwrap_or(0));
        prim.grow(&candidates, &mut degree, cap);
        for &anchor in &anchored {
            if prim.add_root(anchor) {
                prim.grow(&candidates, &mut degree, cap);
            }
        }

        if !prim.is_complete() && !held_back.is_empty() {
            let missing = prim.reached.iter().filter(|&&r| !r).count();
            log::warn!(
                "Кольцо {ring}: {missing} комнат недостижимы без рёбер через центр, допускаем {} рёбер",
                held_back.len()
            );
            for &(a, b) in held_back {
                let id = self.push_edge(members[a], members[b]);
                candidates.push(Candidate {
                    a,
                    b,
                    weight: self.edges[id.0].weight,
                });
                spanned.push(id);
            }
            prim.grow(&candidates, &mut degree, cap);
        }

        if !prim.is_complete() {
            let missing = prim.reached.iter().filter(|&&r| !r).count();
            log::warn!("Кольцо {ring}: {missing} комнат не связаны с остальными");
        }
        if prim.over_cap > 0 {
            log::warn!(
                "Кольцо {ring}: предел рёбер превышен {} раз ради связности",
                prim.over_cap
            );
        }
        self.stats.mst_over_cap += prim.over_cap;
        // допущенные рёбра через центр стоят в `spanned` после рёбер кольца
        let crossings = prim.chosen.iter().filter(|&&c| c >= ring_edges.len()).count();
        self.stats.core_crossings += crossings;

        for &c in &prim.chosen {
            self.edges[spanned[c].0].active = true;
        }
    }

    /// Возвращает неактивные рёбра триангуляции, прошедшие все проверки
    fn restore_edges(&mut self, ring_edges: &[EdgeId]) {
        let cap = self.config.max_num_of_edges;
        let max_length = self.config.max_hallway_length;
        let probability = self.config.add_edges_back_prob.clamp(0.0, 1.0);

        for &id in ring_edges {
            let edge = &self.edges[id.0];
            if edge.active || edge.weight >= max_length {
                continue;
            }
            let (source, neighbor) = (edge.source, edge.neighbor);
            if self.active_degree(source) >= cap || self.active_degree(neighbor) >= cap {
                continue;
            }
            if edge.crossing(&self.rooms, source).in_corner
                || edge.crossing(&self.rooms, neighbor).in_corner
            {
                continue;
            }

            self.edges[id.0].active = true;
            if !self.doors_valid(source) || !self.doors_valid(neighbor) {
                self.edges[id.0].active = false;
                continue;
            }
            if !self.rng.gen_bool(probability) {
                self.edges[id.0].active = false;
                continue;
            }
            self.edges[id.0].restored = true;
            self.stats.restored_edges += 1;
        }

        // Поздние добавления могли сдвинуть двери ранее возвращённых рёбер
        for &id in ring_edges {
            let edge = &self.edges[id.0];
            if !edge.restored || !edge.active {
                continue;
            }
            let (source, neighbor) = (edge.source, edge.neighbor);
            if !self.doors_valid(source) || !self.doors_valid(neighbor) {
                let edge = &mut self.edges[id.0];
                edge.active = false;
                edge.restored = false;
                self.stats.restored_edges -= 1;
            }
        }
    }

    fn doors_valid(&self, room: RoomId) -> bool {
        let doors = assign_doors(&self.rooms, &self.edges, room);
        doors_within_angle(&self.rooms, &self.edges, room, &doors)
    }

    /// Переходы из кольца `inner` в следующее через вращающееся угловое окно
    fn link_layers(&mut self, ring: usize, inner: &[RoomId], outer: &[RoomId]) {
        let count = self.config.layers[ring].num_out_edges;
        if inner.is_empty() || outer.is_empty() {
            return;
        }

        let width = PI / count as f64;
        let stride = TAU / count as f64;
        let start = self.rng.gen_range(0.0..TAU);
        let mut selected: Vec<(RoomId, RoomId)> = Vec::new();

        for pick in 0..count {
            let window = start + pick as f64 * stride;
            let in_window: Vec<RoomId> = inner
                .iter()
                .copied()
                .filter(|id| angle_in_window(polar_angle(self.rooms[id.0].mid()), window, width))
                .collect();
            if let Some(pair) = self.shortest_link(&in_window, outer, &selected, true) {
                selected.push(pair);
                self.activate_link(pair);
            }
        }

        if selected.is_empty() {
            // без перехода внешние кольца оторвались бы от спавна
            let within_cap = self.shortest_link(inner, outer, &selected, true);
            let over_cap = within_cap.is_none();
            let fallback = within_cap.or_else(|| self.shortest_link(inner, outer, &selected, false));
            if let Some(pair) = fallback {
                log::warn!("Кольцо {ring}: ни одно окно не дало перехода, берётся кратчайший");
                self.stats.inter_layer_fallbacks += 1;
                if over_cap {
                    self.stats.links_over_cap += 1;
                }
                selected.push(pair);
                self.activate_link(pair);
            }
        }

        log::debug!("Кольцо {ring} → {}: {} переходов", ring + 1, selected.len());
    }

    /// Кратчайшая пара без общих концов с уже выбранными.
    /// При `respect_cap` обе комнаты должны иметь запас по числу рёбер.
    fn shortest_link(
        &self,
        inner: &[RoomId],
        outer: &[RoomId],
        selected: &[(RoomId, RoomId)],
        respect_cap: bool,
    ) -> Option<(RoomId, RoomId)> {
        let cap = self.config.max_num_of_edges;
        let used = |id: RoomId| selected.iter().any(|&(a, b)| a == id || b == id);
        let full = |id: RoomId| respect_cap && self.active_degree(id) >= cap;
        let mut best: Option<((RoomId, RoomId), f64)> = None;

        for &a in inner {
            if used(a) || full(a) {
                continue;
            }
            let mid_a = self.rooms[a.0].mid();
            for &b in outer {
                if used(b) || full(b) {
                    continue;
                }
                let d = mid_a.distance(self.rooms[b.0].mid());
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some(((a, b), d));
                }
            }
        }
        best.map(|(pair, _)| pair)
    }

    fn activate_link(&mut self, (a, b): (RoomId, RoomId)) {
        let existing = self.rooms[a.0]
            .edges
            .iter()
            .copied()
            .find(|id| self.edges[id.0].connects(a, b));
        let id = existing.unwrap_or_else(|| self.push_edge(a, b));
        self.edges[id.0].active = true;
    }

    /// Двери и пути для всех активных рёбер, ещё не построенных
    fn fill_hallways(&mut self) {
        let doors: Vec<_> = (0..self.rooms.len())
            .map(|i| assign_doors(&self.rooms, &self.edges, RoomId(i)))
            .collect();
        for (room, doors) in self.rooms.iter_mut().zip(doors) {
            room.doors = doors;
        }

        let tile = self.config.tile_size;
        for i in 0..self.edges.len() {
            let edge = &self.edges[i];
            if !edge.active || edge.calculated {
                continue;
            }
            let id = EdgeId(i);
            let source = &self.rooms[edge.source.0];
            let neighbor = &self.rooms[edge.neighbor.0];
            let (Some(&door_a), Some(&door_b)) = (source.doors.get(&id), neighbor.doors.get(&id))
            else {
                log::warn!("Ребро {i} осталось без дверей");
                continue;
            };

            let path = vec![
                source.door_world_position(door_a, tile),
                neighbor.door_world_position(door_b, tile),
            ];
            let edge = &mut self.edges[i];
            edge.path = path;
            edge.calculated = true;

            if let Some(visuals) = self.visuals.as_mut() {
                let handle = visuals.add_edge_visual(&self.edges[i], &self.rooms);
                self.edges[i].visual = Some(handle);
            }
        }
    }
}
