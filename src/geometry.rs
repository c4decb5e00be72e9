// src/geometry.rs
//! Базовая 2D-геометрия генератора уровней
//!
//! Все расчёты ведутся в `f64` и в единицах сетки (клетках). Перевод в мировые
//! координаты делается только при построении коридоров (см. `LevelConfig::tile_size`).
//!
//! Точки и векторы — `glam::DVec2`; здесь только прямоугольники и чистые
//! функции без случайности.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Запасное направление для разведения комнат с совпадающими центрами
pub const FALLBACK_DIRECTION: DVec2 = DVec2::X;

/// Полярный угол точки в диапазоне `[0, 2π)`
#[must_use]
pub fn polar_angle(v: DVec2) -> f64 {
    v.y.atan2(v.x).rem_euclid(std::f64::consts::TAU)
}

/// Осевыровненный прямоугольник: левый верхний угол + размеры
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Строгое пересечение: касание сторонами пересечением не считается
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Площадь пересечения (0.0, если прямоугольники не пересекаются)
    #[must_use]
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }
}

/// Минимальное расстояние от точки `p` до отрезка `a`–`b`
#[must_use]
pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Округление к ближайшему кратному `step`, половина — от нуля (знак сохраняется)
#[must_use]
pub fn snap_to_multiple(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Попадает ли угол `angle` в дугу `[start, start + width)` с учётом перехода через 2π
#[must_use]
pub fn angle_in_window(angle: f64, start: f64, width: f64) -> bool {
    (angle - start).rem_euclid(std::f64::consts::TAU) < width
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(4.0, 0.0, 4.0, 4.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection_area(&b), 0.0);

        let c = Rect::new(3.0, 1.0, 4.0, 4.0);
        assert!(a.intersects(&c));
        assert_eq!(a.intersection_area(&c), 3.0);
    }

    #[test]
    fn snap_is_sign_preserving() {
        assert_eq!(snap_to_multiple(5.0, 2.0), 6.0);
        assert_eq!(snap_to_multiple(-5.0, 2.0), -6.0);
        assert_eq!(snap_to_multiple(-4.9, 2.0), -4.0);
        assert_eq!(snap_to_multiple(0.4, 2.0), 0.0);
    }

    #[test]
    fn polar_angle_is_never_negative() {
        assert_eq!(polar_angle(DVec2::new(2.0, 0.0)), 0.0);
        assert!((polar_angle(DVec2::new(0.0, -1.0)) - 1.5 * PI).abs() < 1e-12);
        assert!((polar_angle(DVec2::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert_eq!(DVec2::ZERO.normalize_or(FALLBACK_DIRECTION), FALLBACK_DIRECTION);
    }

    #[test]
    fn angle_window_wraps_around() {
        assert!(angle_in_window(0.1, 1.5 * PI, PI));
        assert!(!angle_in_window(FRAC_PI_2 + 0.1, 1.5 * PI, PI));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = distance_to_segment(DVec2::ZERO, DVec2::new(-5.0, 3.0), DVec2::new(5.0, 3.0));
        assert!((d - 3.0).abs() < 1e-12);
        let d = distance_to_segment(DVec2::ZERO, DVec2::new(2.0, 0.0), DVec2::new(5.0, 0.0));
        assert!((d - 2.0).abs() < 1e-12);
    }
}
