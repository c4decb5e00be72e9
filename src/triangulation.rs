// src/triangulation.rs
//! Триангуляция Делоне центров комнат
//!
//! Чистая функция над набором точек. Результат — треугольники и полурёбра с
//! индексами противоположных полурёбер; уникальное ребро берётся по правилу
//! `i < twins[i]`. Если все точки лежат на одной прямой, треугольников нет,
//! но рёбра между соседними точками всё равно есть.

use glam::DVec2;
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation as _};

/// Сдвиг точки, совпавшей с уже вставленной (spade заменил бы вершину)
const DUPLICATE_NUDGE: f64 = 1e-6;

struct Site {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    /// Тройки индексов входных точек
    pub triangles: Vec<[usize; 3]>,
    /// Полурёбра `(from, to)` в индексах входных точек
    pub half_edges: Vec<(usize, usize)>,
    /// Индекс противоположного полуребра для каждого полуребра
    pub twins: Vec<usize>,
}

impl Triangulation {
    /// Уникальные неориентированные рёбра в порядке полурёбер
    pub fn unique_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.half_edges
            .iter()
            .enumerate()
            .filter(|&(i, _)| i < self.twins[i])
            .map(|(_, &edge)| edge)
    }
}

#[must_use]
pub fn triangulate(points: &[DVec2]) -> Triangulation {
    let mut dt: DelaunayTriangulation<Site> = DelaunayTriangulation::new();
    for (index, p) in points.iter().enumerate() {
        let mut position = Point2::new(p.x, p.y);
        let mut nudged = false;
        while dt.locate_vertex(position).is_some() {
            position.x += DUPLICATE_NUDGE;
            nudged = true;
        }
        if nudged {
            log::warn!("Точка {index} ({}, {}) совпала с другой и сдвинута", p.x, p.y);
        }

        let before = dt.num_vertices();
        match dt.insert(Site { position, index }) {
            Ok(_) if dt.num_vertices() == before => {
                log::warn!("Точка {index} заменила существующую вершину триангуляции");
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("Точка {index} ({}, {}) пропущена при триангуляции: {err:?}", p.x, p.y);
            }
        }
    }

    let triangles = dt
        .inner_faces()
        .map(|face| face.vertices().map(|v| v.data().index))
        .collect();

    let count = dt.num_directed_edges();
    let mut half_edges = vec![(0, 0); count];
    let mut twins = vec![0; count];
    for edge in dt.directed_edges() {
        let i = edge.fix().index();
        half_edges[i] = (edge.from().data().index, edge.to().data().index);
        twins[i] = edge.rev().fix().index();
    }

    Triangulation {
        triangles,
        half_edges,
        twins,
    }
}
