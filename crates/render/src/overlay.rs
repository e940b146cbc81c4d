//! Hover overlay: a translucent highlight over the hovered tile and a stack of
//! text boxes beside it, kept inside the viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tileview_camera::ScreenRect;
use tileview_common::Color;

use crate::backend::{RenderBackend, TextItem};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub font_size: f32,
    pub padding: f32,
}

impl LabelStyle {
    /// Style with the conventional quarter-font padding.
    pub fn with_font(font_size: f32) -> Self {
        Self {
            font_size,
            padding: font_size * 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub text: String,
    pub style: LabelStyle,
}

impl LabelLine {
    pub fn new(text: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelBox {
    pub background: ScreenRect,
    pub text: String,
    /// Baseline-left text position.
    pub text_at: Vec2,
    pub font_size: f32,
}

/// Colors used to paint the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayColors {
    pub highlight: Color,
    pub background: Color,
    pub text: Color,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            highlight: Color::WHITE.with_alpha(0.25),
            background: Color::BLACK.with_alpha(0.5),
            text: Color::WHITE,
        }
    }
}

/// Stack `lines` downward starting at `anchor`, then shift boxes left and the
/// whole stack up as needed so nothing crosses the `viewport` edge.
pub fn layout_labels(
    anchor: Vec2,
    lines: &[LabelLine],
    viewport: Vec2,
    measure: impl Fn(&str, f32) -> Vec2,
) -> Vec<LabelBox> {
    let mut boxes = Vec::with_capacity(lines.len());
    let mut y = anchor.y;
    for line in lines {
        let LabelStyle { font_size, padding } = line.style;
        let text_size = measure(&line.text, font_size);
        let size = Vec2::new(
            text_size.x + 2.0 * padding,
            text_size.y.max(font_size) + 2.0 * padding,
        );
        let x = anchor.x.min(viewport.x - size.x).max(0.0);
        boxes.push(LabelBox {
            background: ScreenRect::new(Vec2::new(x, y), size),
            text: line.text.clone(),
            text_at: Vec2::new(padding, padding + font_size),
            font_size,
        });
        y += size.y;
    }

    let overflow = (y - viewport.y).max(0.0).min(anchor.y.max(0.0));
    for b in &mut boxes {
        b.background.min.y -= overflow;
        // Stored relative to the box until placement is final.
        b.text_at += b.background.min;
    }
    boxes
}

/// Resolved hover overlay for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverOverlay {
    pub highlight: ScreenRect,
    pub labels: Vec<LabelBox>,
}

impl HoverOverlay {
    /// Highlight `tile_rect` and place `lines` just right of it.
    pub fn new(
        tile_rect: ScreenRect,
        lines: &[LabelLine],
        viewport: Vec2,
        measure: impl Fn(&str, f32) -> Vec2,
    ) -> Self {
        let anchor = Vec2::new(tile_rect.max().x, tile_rect.min.y);
        Self {
            highlight: tile_rect,
            labels: layout_labels(anchor, lines, viewport, measure),
        }
    }

    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, colors: &OverlayColors) {
        backend.draw_rect(self.highlight, colors.highlight);
        for label in &self.labels {
            backend.draw_rect(label.background, colors.background);
            backend.draw_text(TextItem {
                at: label.text_at,
                text: label.text.clone(),
                color: colors.text,
                font_size: label.font_size,
            });
        }
    }
}
