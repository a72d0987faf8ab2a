//! Tile registry and scoring.
//!
//! Owns the falling tiles and the score. Key presses are matched against active tiles:
//! two or more matches clear them all for a point, a lone match is cleared at a two point
//! penalty, and a miss costs two points as well. Score never drops below zero.

use log::{debug, trace};

use crate::render::Renderer;
use crate::tile::{normalize_key, Color, Tile};

/// Points awarded for clearing a match set of two or more tiles.
pub const MULTI_MATCH_REWARD: u32 = 1;
/// Points lost for a single match or a miss.
pub const MISS_PENALTY: u32 = 2;

/// What a key press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyVerdict {
    /// Game not running; the key was ignored.
    Ignored,
    /// Two or more tiles cleared.
    Cleared(usize),
    /// Exactly one tile cleared, at a penalty.
    Single,
    /// Nothing matched, penalty applied.
    Miss,
}

#[derive(Debug, Default)]
pub struct Registry {
    tiles: Vec<Tile>,
    score: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_active()).count()
    }

    /// Add a new active tile at the top of the playfield.
    pub fn spawn<R: Renderer + ?Sized>(
        &mut self,
        x: f64,
        letter: char,
        color: Color,
        renderer: &mut R,
    ) -> usize {
        let handle = renderer.create_tile(x, 0.0, letter, color);
        self.tiles.push(Tile::new(x, letter, color, handle));
        debug!("spawned '{letter}' at x={x:.1}");
        self.tiles.len() - 1
    }

    /// Advance one tile and return its new vertical position, or `None` for an index
    /// past the end of the collection.
    pub fn advance<R: Renderer + ?Sized>(
        &mut self,
        index: usize,
        speed: u32,
        renderer: &mut R,
    ) -> Option<u32> {
        self.tiles
            .get_mut(index)
            .map(|t| t.advance(speed, renderer))
    }

    /// Mark a tile inactive and release its sprite. The tile stays in the collection
    /// until the next [`Registry::prune`].
    pub fn deactivate<R: Renderer + ?Sized>(&mut self, index: usize, renderer: &mut R) {
        if let Some(t) = self.tiles.get_mut(index) {
            t.deactivate(renderer);
        }
    }

    /// Drop every inactive tile in a single pass; returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(Tile::is_active);
        let pruned = before - self.tiles.len();
        if pruned > 0 {
            trace!("pruned {pruned} tiles");
        }
        pruned
    }

    /// Release every tile and reset the score.
    pub fn clear<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for t in &mut self.tiles {
            t.deactivate(renderer);
        }
        self.tiles.clear();
        self.score = 0;
    }

    /// Apply one key press to the active tiles.
    pub fn handle_key<R: Renderer + ?Sized>(&mut self, key: &str, renderer: &mut R) -> KeyVerdict {
        let matched: Vec<usize> = match normalize_key(key) {
            Some(letter) => self
                .tiles
                .iter()
                .enumerate()
                .filter(|(_, t)| t.matches(letter))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };

        let verdict = match matched.len() {
            0 => {
                self.score = self.score.saturating_sub(MISS_PENALTY);
                KeyVerdict::Miss
            }
            1 => {
                self.score = self.score.saturating_sub(MISS_PENALTY);
                self.tiles[matched[0]].deactivate(renderer);
                KeyVerdict::Single
            }
            n => {
                self.score = self.score.saturating_add(MULTI_MATCH_REWARD);
                for &i in &matched {
                    self.tiles[i].deactivate(renderer);
                }
                KeyVerdict::Cleared(n)
            }
        };
        debug!("key {key:?}: {verdict:?}, score {}", self.score);
        verdict
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SpriteTable;

    const RED: Color = Color(0xFF0000);

    fn setup(letters: &[char]) -> (Registry, SpriteTable) {
        let mut sprites = SpriteTable::new(600.0, 600.0);
        let mut reg = Registry::new();
        for (i, &l) in letters.iter().enumerate() {
            reg.spawn(i as f64 * 50.0, l, RED, &mut sprites);
        }
        (reg, sprites)
    }

    #[test]
    fn double_match_scores_and_clears_only_matches() {
        let (mut reg, mut sprites) = setup(&['A', 'B', 'A', 'C']);
        reg.set_score(3);
        assert_eq!(reg.handle_key("a", &mut sprites), KeyVerdict::Cleared(2));
        assert_eq!(reg.score(), 4);
        let active: Vec<char> = reg.tiles().iter().filter(|t| t.is_active()).map(|t| t.letter()).collect();
        assert_eq!(active, vec!['B', 'C']);
        assert_eq!(sprites.len(), 2);
        // still in the collection until pruned
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.prune(), 2);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn single_match_penalizes_and_clears() {
        let (mut reg, mut sprites) = setup(&['B', 'C']);
        reg.set_score(8);
        assert_eq!(reg.handle_key("b", &mut sprites), KeyVerdict::Single);
        assert_eq!(reg.score(), 6);
        assert!(!reg.tiles()[0].is_active());
        assert!(reg.tiles()[1].is_active());
    }

    #[test]
    fn miss_penalizes_and_floors_at_zero() {
        let (mut reg, mut sprites) = setup(&['A']);
        reg.set_score(1);
        assert_eq!(reg.handle_key("z", &mut sprites), KeyVerdict::Miss);
        assert_eq!(reg.score(), 0);
        assert_eq!(reg.handle_key("Shift", &mut sprites), KeyVerdict::Miss);
        assert_eq!(reg.score(), 0);
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn deactivated_tiles_are_not_matched_again() {
        let (mut reg, mut sprites) = setup(&['D', 'D']);
        assert_eq!(reg.handle_key("d", &mut sprites), KeyVerdict::Cleared(2));
        assert_eq!(reg.handle_key("d", &mut sprites), KeyVerdict::Miss);
        assert_eq!(reg.score(), 0);
        assert_eq!(sprites.removed(), 2);
    }

    #[test]
    fn deactivate_keeps_tile_until_prune() {
        let (mut reg, mut sprites) = setup(&['A', 'B']);
        reg.deactivate(1, &mut sprites);
        reg.deactivate(7, &mut sprites); // out of range: ignored
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.active_count(), 1);
        assert_eq!(sprites.len(), 1);
        assert_eq!(reg.handle_key("b", &mut sprites), KeyVerdict::Miss);
        assert_eq!(reg.prune(), 1);
        assert_eq!(reg.tiles()[0].letter(), 'A');
    }

    #[test]
    fn advance_moves_one_tile_and_rejects_bad_index() {
        let (mut reg, mut sprites) = setup(&['A', 'B']);
        assert_eq!(reg.advance(1, 4, &mut sprites), Some(4));
        assert_eq!(reg.advance(1, 4, &mut sprites), Some(8));
        assert_eq!(reg.advance(2, 4, &mut sprites), None);
        assert_eq!(reg.tiles()[0].y(), 0);
        assert_eq!(reg.tiles()[1].y(), 8);
    }

    #[test]
    fn clear_releases_all_sprites_and_resets_score() {
        let (mut reg, mut sprites) = setup(&['A', 'B', 'C']);
        reg.set_score(12);
        reg.handle_key("b", &mut sprites);
        reg.clear(&mut sprites);
        assert!(reg.is_empty());
        assert_eq!(reg.score(), 0);
        assert!(sprites.is_empty());
        assert_eq!(sprites.removed(), 3);
    }
}
