//! Render boundary between the game core and whatever draws it.
//!
//! The core only ever talks to [`Renderer`]: it creates a sprite per tile, moves it
//! vertically and removes it. [`SpriteTable`] is the headless implementation used by
//! native tests; [`CanvasRenderer`] keeps the same table and paints it onto a 2D canvas
//! once per frame.

use std::collections::BTreeMap;

use web_sys::CanvasRenderingContext2d;

use crate::tile::Color;

/// Opaque handle to a renderer-owned sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileHandle(u32);

pub trait Renderer {
    fn create_tile(&mut self, x: f64, y: f64, letter: char, color: Color) -> TileHandle;
    fn set_tile_position(&mut self, handle: TileHandle, y: f64);
    fn remove_tile(&mut self, handle: TileHandle);
    fn screen_width(&self) -> f64;
    fn screen_height(&self) -> f64;
}

/// Retained description of one tile on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub letter: char,
    pub color: Color,
}

/// Headless renderer: live sprites keyed by handle (handles are issued in increasing
/// order, so iteration order is spawn order).
#[derive(Debug, Default)]
pub struct SpriteTable {
    width: f64,
    height: f64,
    next_id: u32,
    sprites: BTreeMap<TileHandle, Sprite>,
    removed: usize,
}

impl SpriteTable {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn get(&self, handle: TileHandle) -> Option<&Sprite> {
        self.sprites.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileHandle, &Sprite)> {
        self.sprites.iter().map(|(h, s)| (*h, s))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of sprites removed over the table's lifetime.
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl Renderer for SpriteTable {
    fn create_tile(&mut self, x: f64, y: f64, letter: char, color: Color) -> TileHandle {
        let handle = TileHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.sprites.insert(handle, Sprite { x, y, letter, color });
        handle
    }

    fn set_tile_position(&mut self, handle: TileHandle, y: f64) {
        if let Some(s) = self.sprites.get_mut(&handle) {
            s.y = y;
        }
    }

    fn remove_tile(&mut self, handle: TileHandle) {
        if self.sprites.remove(&handle).is_some() {
            self.removed += 1;
        }
    }

    fn screen_width(&self) -> f64 {
        self.width
    }

    fn screen_height(&self) -> f64 {
        self.height
    }
}

/// Canvas 2D renderer. Sprite bookkeeping is delegated to a [`SpriteTable`]; the canvas
/// itself is repainted from scratch by [`CanvasRenderer::draw`].
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    sprites: SpriteTable,
    tile_size: f64,
    font_px: f64,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64, tile_size: f64) -> Self {
        Self {
            ctx,
            sprites: SpriteTable::new(width, height),
            tile_size,
            font_px: (tile_size * 0.8).round(),
        }
    }

    pub fn sprites(&self) -> &SpriteTable {
        &self.sprites
    }

    /// Paint background, border and every live sprite.
    pub fn draw(&self) {
        let (w, h) = (self.sprites.screen_width(), self.sprites.screen_height());
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_stroke_style_str("#000000");
        ctx.set_line_width(1.0);
        ctx.stroke_rect(0.5, 0.5, w - 1.0, h - 1.0);

        ctx.set_font(&format!("{}px Arial", self.font_px));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let half = self.tile_size / 2.0;
        let mut buf = [0u8; 4];
        for (_, s) in self.sprites.iter() {
            ctx.set_fill_style_str(&s.color.to_css());
            ctx.fill_rect(s.x, s.y, self.tile_size, self.tile_size);
            ctx.set_fill_style_str("#000000");
            ctx.fill_text(s.letter.encode_utf8(&mut buf), s.x + half, s.y + half)
                .ok();
        }
    }

    /// Dim the board and print a centered message (win / loss banner).
    pub fn draw_banner(&self, text: &str) {
        let (w, h) = (self.sprites.screen_width(), self.sprites.screen_height());
        let ctx = &self.ctx;
        ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_font("48px Arial");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_line_width(6.0);
        ctx.set_stroke_style_str("#000000");
        ctx.stroke_text(text, w / 2.0, h / 2.0).ok();
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(text, w / 2.0, h / 2.0).ok();
    }
}

impl Renderer for CanvasRenderer {
    fn create_tile(&mut self, x: f64, y: f64, letter: char, color: Color) -> TileHandle {
        self.sprites.create_tile(x, y, letter, color)
    }
    fn set_tile_position(&mut self, handle: TileHandle, y: f64) {
        self.sprites.set_tile_position(handle, y);
    }
    fn remove_tile(&mut self, handle: TileHandle) {
        self.sprites.remove_tile(handle);
    }
    fn screen_width(&self) -> f64 {
        self.sprites.screen_width()
    }
    fn screen_height(&self) -> f64 {
        self.sprites.screen_height()
    }
}
