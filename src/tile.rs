//! Falling letter tiles and the fixed alphabet / palette they are drawn from.

use crate::render::{Renderer, TileHandle};

/// Letters a tile can carry by default.
pub const LETTERS: &[char] = &['A', 'B', 'C', 'D'];

/// Default tile colors (0xRRGGBB), paired loosely with `LETTERS` but chosen independently.
pub const PALETTE: &[Color] = &[
    Color(0xFF0000),
    Color(0x00FF00),
    Color(0x0000FF),
    Color(0xFF00FF),
];

/// Packed 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// CSS hex form, e.g. `#ff00ff`.
    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xFF_FFFF)
    }
}

/// A single falling letter.
#[derive(Debug)]
pub struct Tile {
    x: f64,
    y: u32,
    letter: char,
    color: Color,
    active: bool,
    handle: Option<TileHandle>, // released once, on deactivation
}

impl Tile {
    pub(crate) fn new(x: f64, letter: char, color: Color, handle: TileHandle) -> Self {
        Self {
            x,
            y: 0,
            letter,
            color,
            active: true,
            handle: Some(handle),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn y(&self) -> u32 {
        self.y
    }
    pub fn letter(&self) -> char {
        self.letter
    }
    pub fn color(&self) -> Color {
        self.color
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn handle(&self) -> Option<TileHandle> {
        self.handle
    }

    /// Move the tile down by `speed`. Inactive tiles still fall (they are judged against
    /// the floor until pruned) but are no longer drawn.
    pub(crate) fn advance<R: Renderer + ?Sized>(&mut self, speed: u32, renderer: &mut R) -> u32 {
        self.y = self.y.saturating_add(speed);
        if self.active {
            if let Some(h) = self.handle {
                renderer.set_tile_position(h, self.y as f64);
            }
        }
        self.y
    }

    pub(crate) fn deactivate<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.active = false;
        if let Some(h) = self.handle.take() {
            renderer.remove_tile(h);
        }
    }

    pub(crate) fn matches(&self, letter: char) -> bool {
        self.active && self.letter == letter
    }
}

/// Normalize a key event's `key` string to a tile letter. Anything that is not a single
/// character once uppercased (`"Shift"`, `"Enter"`, `"ß"`) yields `None`.
pub fn normalize_key(key: &str) -> Option<char> {
    let mut upper = key.chars().flat_map(char::to_uppercase);
    match (upper.next(), upper.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SpriteTable;

    #[test]
    fn color_css_is_lowercase_hex() {
        assert_eq!(Color(0xFF00FF).to_css(), "#ff00ff");
        assert_eq!(Color(0x0000FF).to_css(), "#0000ff");
    }

    #[test]
    fn normalize_key_uppercases_single_chars() {
        assert_eq!(normalize_key("a"), Some('A'));
        assert_eq!(normalize_key("D"), Some('D'));
        assert_eq!(normalize_key("7"), Some('7'));
        assert_eq!(normalize_key("Shift"), None);
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key("ß"), None); // uppercases to "SS"
    }

    #[test]
    fn deactivate_releases_handle_once() {
        let mut sprites = SpriteTable::new(600.0, 600.0);
        let h = sprites.create_tile(10.0, 0.0, 'A', Color(0xFF0000));
        let mut tile = Tile::new(10.0, 'A', Color(0xFF0000), h);
        tile.deactivate(&mut sprites);
        tile.deactivate(&mut sprites);
        assert!(!tile.is_active());
        assert!(tile.handle().is_none());
        assert_eq!(sprites.removed(), 1);
        assert!(sprites.is_empty());
    }

    #[test]
    fn inactive_tile_falls_but_is_not_redrawn() {
        let mut sprites = SpriteTable::new(600.0, 600.0);
        let h = sprites.create_tile(0.0, 0.0, 'B', Color(0x00FF00));
        let mut tile = Tile::new(0.0, 'B', Color(0x00FF00), h);
        assert_eq!(tile.advance(3, &mut sprites), 3);
        assert_eq!(sprites.get(h).map(|s| s.y), Some(3.0));
        tile.deactivate(&mut sprites);
        assert_eq!(tile.advance(3, &mut sprites), 6);
        assert!(sprites.get(h).is_none());
    }
}
