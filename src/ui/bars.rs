use eframe::egui;
use std::fmt;

use crate::config::{BACKGROUND, BAR_GAP};

/// A 2D drawing target with its top-left corner at the origin.
pub trait Surface {
    fn size(&self) -> egui::Vec2;
    /// Same contract as a canvas `fillRect`: a negative height extends upwards.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: BarColor);
}

pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    size: egui::Vec2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2, size: egui::Vec2) -> Self {
        Self { painter, origin, size }
    }
}

impl Surface for PainterSurface<'_> {
    fn size(&self) -> egui::Vec2 {
        self.size
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: BarColor) {
        let rect = egui::Rect::from_two_pos(
            self.origin + egui::vec2(x, y),
            self.origin + egui::vec2(x + width, y + height),
        );
        self.painter.rect_filled(rect, 0.0, color.to_color32());
    }
}

/// Unclamped channel values, as they would be written into an `rgb()` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BarColor {
    pub const BACKGROUND: BarColor = BarColor {
        r: BACKGROUND[0] as f32,
        g: BACKGROUND[1] as f32,
        b: BACKGROUND[2] as f32,
    };

    pub fn for_bar(magnitude: u8, index: usize, count: usize) -> Self {
        let t = index as f32 / count as f32;
        Self {
            r: magnitude as f32 + 25.0 * t,
            g: 250.0 * t,
            b: 50.0,
        }
    }

    pub fn to_color32(self) -> egui::Color32 {
        let channel = |v: f32| v.clamp(0.0, 255.0).round() as u8;
        egui::Color32::from_rgb(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl fmt::Display for BarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

pub fn bar_width(surface_width: f32, count: usize) -> f32 {
    surface_width / count as f32
}

/// Clears the surface and paints one mirrored bar per sample. Returns the
/// cursor position after the last bar.
pub fn draw_bars(surface: &mut impl Surface, data: &[u8]) -> f32 {
    let size = surface.size();
    surface.fill_rect(0.0, 0.0, size.x, size.y, BarColor::BACKGROUND);

    if data.is_empty() {
        return 0.0;
    }

    let count = data.len();
    let width = bar_width(size.x, count);
    let mid_y = size.y / 2.0;
    let mut x = 0.0;

    for (i, &magnitude) in data.iter().enumerate() {
        let height = magnitude as f32;
        let color = BarColor::for_bar(magnitude, i, count);

        surface.fill_rect(x, mid_y, width, -height, color);
        surface.fill_rect(x, mid_y, width, height, color);

        x += width + BAR_GAP;
    }

    x
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FillCall {
        pub x: f32,
        pub y: f32,
        pub width: f32,
        pub height: f32,
        pub color: BarColor,
    }

    pub struct RecordingSurface {
        pub size: egui::Vec2,
        pub calls: Vec<FillCall>,
    }

    impl RecordingSurface {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                size: egui::vec2(width, height),
                calls: Vec::new(),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> egui::Vec2 {
            self.size
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: BarColor) {
            self.calls.push(FillCall { x, y, width, height, color });
        }
    }
}
