// src/generator/placement.rs
//! Стадии размещения: разброс комнат, разведение, терминалы, слои, привязка к сетке

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;

use super::LevelGenerator;
use crate::geometry::{FALLBACK_DIRECTION, snap_to_multiple};
use crate::room::templates::{self, SPAWN_TEMPLATE, TERMINAL_TEMPLATE};
use crate::room::{Room, RoomId, RoomKind};
use crate::visuals::LevelVisuals;

impl<V: LevelVisuals> LevelGenerator<V> {
    /// Спавн в центре и обычные комнаты в кольце `[радиус спавна, spawn_radius]`
    pub(super) fn generate_rooms(&mut self) {
        let mut spawn = Room::from_template(RoomKind::Spawn, &SPAWN_TEMPLATE, DVec2::ZERO);
        spawn.pinned = self.config.pin_spawn;
        let inner = spawn.radius();
        self.push_room(spawn);

        let outer = self.config.spawn_radius.max(inner);
        for _ in 0..self.config.num_rooms {
            let template = templates::pick_standard(&mut self.rng);
            let radius = self.rng.gen_range(inner..=outer);
            let angle = self.rng.gen_range(0.0..TAU);
            let room = Room::from_template(
                RoomKind::Standard,
                template,
                DVec2::from_angle(angle) * radius,
            );
            self.push_room(room);
        }

        log::info!("Размещено {} комнат", self.rooms.len());
        self.relayout();
    }

    /// Один проход разведения. `true`, когда можно переходить к следующей стадии.
    pub(super) fn separate_rooms(&mut self) -> bool {
        self.sweeps_in_stint += 1;
        let mut moved = 0;

        for j in 1..self.rooms.len() {
            let (head, tail) = self.rooms.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                if !a.intersects(b) {
                    continue;
                }
                let direction = (a.mid() - b.mid()).normalize_or(FALLBACK_DIRECTION);
                a.nudge(direction);
                b.nudge(-direction);
                moved += 1;
            }
        }

        if moved == 0 {
            log::debug!("Комнаты разведены за {} проходов", self.sweeps_in_stint);
            self.finish_separation();
            return true;
        }

        self.relayout();
        if self.sweeps_in_stint >= self.config.max_separation_sweeps {
            log::warn!(
                "Разведение не сошлось за {} проходов, остаётся {} пересечений",
                self.sweeps_in_stint,
                self.overlapping_pairs()
            );
            self.stats.separation_cap_hits += 1;
            self.finish_separation();
            return true;
        }
        false
    }

    fn finish_separation(&mut self) {
        self.stats.separation_sweeps.push(self.sweeps_in_stint);
        self.sweeps_in_stint = 0;
    }

    /// Терминалы каждого слоя в полукольцевом секторе; обычная комната,
    /// сильнее всех перекрытая новым терминалом, удаляется сразу
    pub(super) fn place_terminals(&mut self) {
        let spawn_radius = self.rooms.first().map_or(0.0, Room::radius);
        let layers = self.config.layers.clone();

        for (index, layer) in layers.iter().enumerate() {
            if layer.num_terminals == 0 {
                continue;
            }
            let inner = if index == 0 {
                spawn_radius
            } else {
                self.config.inner_radius(index)
            };
            let arc = PI / layer.num_terminals as f64;
            let base = self.rng.gen_range(0.0..TAU);
            let low = inner + TERMINAL_TEMPLATE.half_diagonal();
            let high = layer.radius - TERMINAL_TEMPLATE.half_diagonal();

            for k in 0..layer.num_terminals {
                let radius = if low < high {
                    self.rng.gen_range(low..high)
                } else {
                    (inner + layer.radius) * 0.5
                };
                let angle = base + (k as f64 + self.rng.gen_range(0.0..1.0)) * arc;

                let mut terminal = Room::from_template(
                    RoomKind::Terminal,
                    &TERMINAL_TEMPLATE,
                    DVec2::from_angle(angle) * radius,
                );
                terminal.ring = index;
                let id = self.push_room(terminal);
                self.cull_worst_overlap_of(id);
            }
        }

        log::info!(
            "Терминалы размещены, удалено {} перекрытых комнат",
            self.stats.culled_by_terminals
        );
        self.relayout();
    }

    fn cull_worst_overlap_of(&mut self, id: RoomId) {
        let Some(worst) = self.most_overlapping(id, |_| true) else {
            return;
        };
        if !self.rooms[worst.0].is_standard() {
            return;
        }
        let removed = self.rooms.remove(worst.0);
        if let (Some(visuals), Some(handle)) = (self.visuals.as_mut(), removed.visual) {
            visuals.remove_visual(handle);
        }
        self.stats.culled_by_terminals += 1;
    }

    /// Комната с наибольшей площадью пересечения с `id` (при равенстве — с меньшим индексом)
    fn most_overlapping(&self, id: RoomId, eligible: impl Fn(&Room) -> bool) -> Option<RoomId> {
        let room = &self.rooms[id.0];
        let mut best: Option<(RoomId, f64)> = None;
        for (i, other) in self.rooms.iter().enumerate() {
            if i == id.0 || !eligible(other) {
                continue;
            }
            let area = room.overlap_area(other);
            if area > 0.0 && best.is_none_or(|(_, a)| area > a) {
                best = Some((RoomId(i), area));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Раскладывает обычные комнаты по кольцам и отодвигает всё от центра
    pub(super) fn segregate_layers(&mut self) {
        let factor = self.config.expansion_factor;
        let offset = self.config.layer_offset;
        let mut per_ring = vec![0usize; self.config.layers.len()];

        for room in &mut self.rooms {
            match room.kind {
                RoomKind::Spawn => {
                    room.ring = 0;
                    continue;
                }
                RoomKind::Standard => {
                    room.ring = self.config.layer_for_distance(room.mid().length());
                }
                RoomKind::Terminal => {}
            }
            per_ring[room.ring] += 1;

            let mid = room.mid();
            let mut target = mid * factor;
            if room.ring > 0 {
                target = target + mid.normalize_or(FALLBACK_DIRECTION) * offset;
            }
            room.set_mid(target);
        }

        log::info!("Комнаты по слоям: {per_ring:?}");
        self.relayout();
    }

    /// Привязка к сетке и удаление проигравших в оставшихся пересечениях
    pub(super) fn snap_and_cull(&mut self) {
        let step = f64::from(self.config.grid_cell_size);
        for room in &mut self.rooms {
            room.position = DVec2::new(
                snap_to_multiple(room.position.x, step),
                snap_to_multiple(room.position.y, step),
            );
        }

        for i in 0..self.rooms.len() {
            if self.rooms[i].to_delete {
                continue;
            }
            let Some(other) = self.most_overlapping(RoomId(i), |r| !r.to_delete) else {
                continue;
            };
            if self.rooms[other.0].is_standard() {
                self.rooms[other.0].to_delete = true;
            } else if self.rooms[i].is_standard() {
                self.rooms[i].to_delete = true;
            }
        }

        let before = self.rooms.len();
        if let Some(visuals) = self.visuals.as_mut() {
            for room in self.rooms.iter().filter(|r| r.to_delete) {
                if let Some(handle) = room.visual {
                    visuals.remove_visual(handle);
                }
            }
        }
        self.rooms.retain(|r| !r.to_delete);
        self.stats.culled_by_snap = before - self.rooms.len();

        for (key, room) in self.rooms.iter_mut().enumerate() {
            room.key = Some(key);
        }

        log::info!(
            "Привязка к сетке: удалено {} комнат, осталось {}",
            self.stats.culled_by_snap,
            self.rooms.len()
        );
        self.relayout();
    }
}
