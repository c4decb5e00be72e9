// src/render/png.rs
//! Растеризация холста уровня в PNG
//!
//! ## Порядок отрисовки
//!
//! 1. Тёмный фон
//! 2. Коридоры — отрезки между дверями
//! 3. Комнаты — залитые прямоугольники цвета [`RoomKind::to_rgb`](crate::room::RoomKind::to_rgb)
//!    с более тёмной рамкой
//!
//! Коридоры рисуются до комнат, поэтому их концы уходят под стены, а
//! видимая часть начинается ровно у двери.
//!
//! ## Координаты
//!
//! Холст хранит всё в клетках. Левый верхний угол изображения соответствует
//! левому верхнему углу [`Canvas::bounds`] минус поле `MARGIN_CELLS`; каждая
//! клетка занимает `scale × scale` пикселей.
//!
//! ## Пример
//! ```text
//! let mut generator = LevelGenerator::new();
//! generator.init(config, Canvas::new(4, 16.0), Some(seed));
//! generator.run_to_completion();
//! if let Some(canvas) = generator.take_visuals() {
//!     canvas.save_as_png("output/level.png")?;
//! }
//! ```

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use glam::DVec2;
use imageproc::rect::Rect as PixelRect;

use super::Canvas;
use crate::error::LevelGenError;
use crate::geometry::Rect;

const BACKGROUND: Rgb<u8> = Rgb([18, 18, 24]);
const HALLWAY: Rgb<u8> = Rgb([230, 200, 90]);
const MARGIN_CELLS: f64 = 4.0;

impl Canvas {
    /// Рисует холст в RGB-изображение
    ///
    /// # Возвращает
    /// Изображение размером `(ширина_в_клетках + 2·поле) × scale` на
    /// `(высота_в_клетках + 2·поле) × scale`. Пустой холст даёт картинку
    /// из одного поля без объектов.
    #[must_use]
    pub fn to_rgb_image(&self) -> RgbImage {
        let bounds = self.bounds().unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let origin = DVec2::new(bounds.x - MARGIN_CELLS, bounds.y - MARGIN_CELLS);
        let scale = f64::from(self.scale);
        let width = ((bounds.width + 2.0 * MARGIN_CELLS) * scale).ceil().max(1.0) as u32;
        let height = ((bounds.height + 2.0 * MARGIN_CELLS) * scale).ceil().max(1.0) as u32;

        let to_pixels = |p: DVec2| -> (f32, f32) {
            let local = (p - origin) * scale;
            (local.x as f32, local.y as f32)
        };

        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

        for hallway in self.hallways() {
            for segment in hallway.points.windows(2) {
                draw_line_segment_mut(&mut img, to_pixels(segment[0]), to_pixels(segment[1]), HALLWAY);
            }
        }

        for sprite in self.rooms() {
            let (x, y) = to_pixels(DVec2::new(sprite.rect.x, sprite.rect.y));
            let w = (sprite.rect.width * scale).round().max(1.0) as u32;
            let h = (sprite.rect.height * scale).round().max(1.0) as u32;
            let rect = PixelRect::at(x.round() as i32, y.round() as i32).of_size(w, h);

            let [r, g, b] = sprite.kind.to_rgb();
            draw_filled_rect_mut(&mut img, rect, Rgb([r, g, b]));
            draw_hollow_rect_mut(&mut img, rect, Rgb([r / 2, g / 2, b / 2]));
        }

        img
    }

    /// Сохраняет холст в PNG-файл
    ///
    /// # Ошибки
    /// [`LevelGenError::Image`], если файл не удалось записать
    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<(), LevelGenError> {
        self.to_rgb_image().save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layer, LevelConfig};
    use crate::generator::LevelGenerator;
    use crate::room::RoomKind;

    #[test]
    fn spawn_is_painted_in_its_colour() {
        let mut config = LevelConfig::without_layers();
        config.num_rooms = 0;
        config.add_layer(Layer::new(1.0, 1, 0));

        let mut generator = LevelGenerator::new();
        generator.init(config, Canvas::new(3, 16.0), Some(6));
        generator.run_to_completion();
        let spawn = generator.rooms()[0].mid();
        let canvas = generator.take_visuals().unwrap();
        let img = canvas.to_rgb_image();

        let bounds = canvas.bounds().unwrap();
        let px = ((spawn.x - bounds.x + MARGIN_CELLS) * 3.0) as u32;
        let py = ((spawn.y - bounds.y + MARGIN_CELLS) * 3.0) as u32;
        let [r, g, b] = RoomKind::Spawn.to_rgb();
        assert_eq!(*img.get_pixel(px, py), Rgb([r, g, b]));
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn empty_canvas_renders_margin_only() {
        let img = Canvas::new(2, 16.0).to_rgb_image();
        assert_eq!(img.dimensions(), (16, 16));
    }
}
