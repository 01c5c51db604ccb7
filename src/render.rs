//! Drawing collaborator
//!
//! The simulation paints itself through the [`Surface`] trait. The browser
//! host backs it with a Canvas 2D context; tests and the headless binary use
//! [`RecordingSurface`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::format_time;

/// An opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    /// Background (#515151)
    pub const BACKGROUND: Colour = Colour::rgb(0x51, 0x51, 0x51);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(shade: u8) -> Self {
        Self::rgb(shade, shade, shade)
    }

    /// CSS colour string, e.g. `rgb(81, 81, 81)`
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Axis-aligned rectangle given by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `size` centered on `center`
    pub fn centered_square(center: Vec2, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }
}

/// Drop shadow behind a filled shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub colour: Colour,
    pub blur: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            colour: Colour::BLACK,
            blur: SHADOW_BLUR,
        }
    }
}

/// Border drawn inside a filled shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub colour: Colour,
    pub width: f32,
}

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// `x` is the left edge
    Start,
    /// `x` is the right edge
    End,
}

/// Drawing primitives consumed by the game
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn clear(&mut self, colour: Colour);
    fn fill_rect(&mut self, rect: Rect, colour: Colour);
    fn fill_rect_with_shadow(&mut self, rect: Rect, colour: Colour, shadow: Shadow);
    /// Text vertically centered on `y`
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, colour: Colour, align: TextAlign);
    fn line(&mut self, from: Vec2, to: Vec2, colour: Colour, width: f32);

    /// Shadowed rect in the border colour, then the inner fill on top
    fn fill_rect_with_shadow_and_border(
        &mut self,
        rect: Rect,
        colour: Colour,
        shadow: Shadow,
        border: Border,
    ) {
        self.fill_rect_with_shadow(rect, border.colour, shadow);
        let inner = Rect::new(
            rect.x + border.width,
            rect.y + border.width,
            rect.w - border.width,
            rect.h - border.width,
        );
        self.fill_rect(inner, colour);
    }
}

/// Paint the HUD: obstacle count on the left, best and current time on the right
pub fn draw_hud(surface: &mut dyn Surface, obstacles: usize, timer_ms: f64, best_ms: Option<f64>) {
    surface.fill_text(
        &format!("Asteroids: {}", obstacles),
        HUD_MARGIN,
        HUD_MARGIN,
        HUD_FONT_SIZE,
        Colour::WHITE,
        TextAlign::Start,
    );

    let right = surface.width() - HUD_MARGIN;
    let best = best_ms.map(format_time).unwrap_or_else(|| "N/A".to_string());
    surface.fill_text(
        &format!("Best time: {}", best),
        right,
        HUD_MARGIN,
        HUD_FONT_SIZE,
        Colour::WHITE,
        TextAlign::End,
    );
    surface.fill_text(
        &format!("Time: {}", format_time(timer_ms)),
        right,
        HUD_LINE_2_Y,
        HUD_FONT_SIZE,
        Colour::WHITE,
        TextAlign::End,
    );
}

/// A single captured draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Colour),
    Rect {
        rect: Rect,
        colour: Colour,
        shadow: Option<Shadow>,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        align: TextAlign,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
}

/// Surface that records draw calls instead of painting pixels.
/// `clear` starts a new frame.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
    pub frames: u64,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            frames: 0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// All text drawn in the current frame
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of filled rects in the current frame
    pub fn rect_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, colour: Colour) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear(colour));
    }

    fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        self.commands.push(DrawCommand::Rect {
            rect,
            colour,
            shadow: None,
        });
    }

    fn fill_rect_with_shadow(&mut self, rect: Rect, colour: Colour, shadow: Shadow) {
        self.commands.push(DrawCommand::Rect {
            rect,
            colour,
            shadow: Some(shadow),
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _size: f32, _colour: Colour, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            align,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, _colour: Colour, _width: f32) {
        self.commands.push(DrawCommand::Line { from, to });
    }
}
