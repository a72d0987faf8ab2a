//! Gameplay and playfield constants.

use crate::tile::{Color, LETTERS, PALETTE};

/// Tunable game parameters. `Default` reproduces the classic 600x600 board.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    /// Side length of the square tile background.
    pub tile_size: f64,
    pub base_speed: u32,
    /// Score points per extra unit of fall speed.
    pub speed_step: u32,
    /// Per-frame chance of spawning a tile.
    pub spawn_chance: f64,
    pub win_score: u32,
    pub letters: Vec<char>,
    pub colors: Vec<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            tile_size: 50.0,
            base_speed: 1,
            speed_step: 10,
            spawn_chance: 0.02,
            win_score: 50,
            letters: LETTERS.to_vec(),
            colors: PALETTE.to_vec(),
        }
    }
}

impl GameConfig {
    /// Largest playfield side, in whole pixels (browsers cap canvas dimensions).
    pub const MAX_PLAYFIELD: f64 = 4096.0;

    /// Repair out-of-range values so every gameplay operation stays total.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(self.width.is_finite() && self.width >= 1.0) {
            self.width = d.width;
        }
        if !(self.height.is_finite() && self.height >= 1.0) {
            self.height = d.height;
        }
        self.width = self.width.round().min(Self::MAX_PLAYFIELD);
        self.height = self.height.round().min(Self::MAX_PLAYFIELD);
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            self.tile_size = d.tile_size;
        }
        self.tile_size = self.tile_size.min(self.width);
        self.spawn_chance = if self.spawn_chance.is_nan() {
            0.0
        } else {
            self.spawn_chance.clamp(0.0, 1.0)
        };
        self.speed_step = self.speed_step.max(1);
        self.letters = self
            .letters
            .iter()
            .filter_map(|c| crate::tile::normalize_key(c.encode_utf8(&mut [0u8; 4])))
            .collect();
        if self.letters.is_empty() {
            self.letters = d.letters;
        }
        if self.colors.is_empty() {
            self.colors = d.colors;
        }
        self
    }

    /// Fall speed for a given score.
    pub fn speed_for(&self, score: u32) -> u32 {
        self.base_speed.saturating_add(score / self.speed_step.max(1))
    }

    /// Canvas pixel size. Exact for sanitized configs.
    pub fn canvas_size(&self) -> (u32, u32) {
        let px = |v: f64| v.round().clamp(1.0, Self::MAX_PLAYFIELD) as u32;
        (px(self.width), px(self.height))
    }

    /// Tiles spawn with their left edge in `[0, max_spawn_x)`.
    pub fn max_spawn_x(&self) -> f64 {
        (self.width - self.tile_size).max(0.0)
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }
}
