//! Game loop controller: run/stop state and the per-frame simulation step.

use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::registry::{KeyVerdict, Registry};
use crate::render::Renderer;
use crate::tile::Tile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// Stopped by the player.
    Stopped,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Won => "You won!",
            Outcome::Lost => "Game over!",
            Outcome::Stopped => "Stopped",
        }
    }
}

/// Result of one [`GameController::tick`]. The host schedules another frame only on
/// `Continue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Not running; nothing was simulated.
    Idle,
    Continue,
    Finished(Outcome),
}

pub struct GameController<R: Renderer, G: Rng> {
    config: GameConfig,
    renderer: R,
    rng: G,
    registry: Registry,
    state: RunState,
    speed: u32,
    last_outcome: Option<Outcome>,
}

impl<R: Renderer, G: Rng> GameController<R, G> {
    pub fn new(config: GameConfig, renderer: R, rng: G) -> Self {
        let config = config.sanitized();
        let speed = config.base_speed;
        Self {
            config,
            renderer,
            rng,
            registry: Registry::new(),
            state: RunState::Idle,
            speed,
            last_outcome: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
    pub fn state(&self) -> RunState {
        self.state
    }
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }
    pub fn score(&self) -> u32 {
        self.registry.score()
    }
    pub fn speed(&self) -> u32 {
        self.speed
    }
    pub fn tiles(&self) -> &[Tile] {
        self.registry.tiles()
    }
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Begin a fresh run. Any tiles left over from a previous run are released.
    pub fn start(&mut self) {
        self.registry.clear(&mut self.renderer);
        self.speed = self.config.base_speed;
        self.last_outcome = None;
        self.state = RunState::Running;
        info!("run started");
    }

    /// Halt the run. Returns `Some(Outcome::Stopped)` only when a run was actually
    /// in progress; a second call changes nothing.
    pub fn stop(&mut self) -> Option<Outcome> {
        self.finish(Outcome::Stopped)
    }

    /// Start/stop button behaviour.
    pub fn toggle(&mut self) -> Option<Outcome> {
        if self.is_running() {
            self.stop()
        } else {
            self.start();
            None
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Option<Outcome> {
        if self.state != RunState::Running {
            return None;
        }
        self.state = RunState::Idle;
        self.last_outcome = Some(outcome);
        info!("run ended: {outcome:?} with score {}", self.registry.score());
        Some(outcome)
    }

    /// Place a tile at the top of the board (also used by the random spawner).
    pub fn spawn_tile(&mut self, x: f64, letter: char, color: crate::tile::Color) {
        self.registry.spawn(x, letter, color, &mut self.renderer);
    }

    /// Forward a key press to the registry while running.
    pub fn handle_key(&mut self, key: &str) -> KeyVerdict {
        if !self.is_running() {
            return KeyVerdict::Ignored;
        }
        let verdict = self.registry.handle_key(key, &mut self.renderer);
        self.speed = self.config.speed_for(self.registry.score());
        verdict
    }

    /// One simulation frame: spawn, advance + floor check, prune, win check, speed.
    pub fn tick(&mut self) -> Step {
        if !self.is_running() {
            return Step::Idle;
        }

        if self.rng.gen_bool(self.config.spawn_chance) {
            self.spawn_random();
        }

        let floor = self.config.height;
        for i in 0..self.registry.len() {
            let Some(y) = self.registry.advance(i, self.speed, &mut self.renderer) else {
                break;
            };
            if f64::from(y) >= floor {
                return self.end_step(Outcome::Lost);
            }
        }

        self.registry.prune();

        if self.registry.score() >= self.config.win_score {
            return self.end_step(Outcome::Won);
        }

        self.speed = self.config.speed_for(self.registry.score());
        Step::Continue
    }

    fn end_step(&mut self, outcome: Outcome) -> Step {
        self.finish(outcome);
        Step::Finished(outcome)
    }

    fn spawn_random(&mut self) {
        let cfg = &self.config;
        let letter = cfg.letters[self.rng.gen_range(0..cfg.letters.len())];
        let color = cfg.colors[self.rng.gen_range(0..cfg.colors.len())];
        let max_x = cfg.max_spawn_x();
        let x = if max_x > 0.0 {
            self.rng.gen_range(0.0..max_x)
        } else {
            0.0
        };
        self.spawn_tile(x, letter, color);
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.registry.set_score(score);
        self.speed = self.config.speed_for(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SpriteTable;
    use crate::tile::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet() -> GameController<SpriteTable, StdRng> {
        let cfg = GameConfig {
            spawn_chance: 0.0,
            ..GameConfig::default()
        };
        GameController::new(cfg, SpriteTable::new(600.0, 600.0), StdRng::seed_from_u64(7))
    }

    #[test]
    fn idle_controller_ignores_ticks_and_keys() {
        let mut g = quiet();
        assert_eq!(g.tick(), Step::Idle);
        assert_eq!(g.handle_key("a"), KeyVerdict::Ignored);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn single_match_from_eight() {
        let mut g = quiet();
        g.start();
        g.set_score(8);
        g.spawn_tile(0.0, 'B', Color(0x00FF00));
        assert_eq!(g.handle_key("b"), KeyVerdict::Single);
        assert_eq!(g.score(), 6);
        assert!(!g.tiles()[0].is_active());
    }

    #[test]
    fn speed_follows_score_after_key() {
        let mut g = quiet();
        g.start();
        g.set_score(9);
        g.spawn_tile(0.0, 'A', Color(0xFF0000));
        g.spawn_tile(60.0, 'A', Color(0xFF0000));
        g.handle_key("A");
        assert_eq!(g.score(), 10);
        assert_eq!(g.speed(), 2);
        g.handle_key("x");
        assert_eq!(g.speed(), 1);
    }

    #[test]
    fn matched_tile_on_floor_still_loses() {
        let mut g = quiet();
        g.start();
        g.set_score(40); // speed 5
        g.spawn_tile(0.0, 'C', Color(0x0000FF));
        g.spawn_tile(60.0, 'C', Color(0x0000FF));
        for _ in 0..119 {
            assert_eq!(g.tick(), Step::Continue);
        }
        assert_eq!(g.tiles()[0].y(), 595);
        assert_eq!(g.handle_key("c"), KeyVerdict::Cleared(2));
        assert_eq!(g.speed(), 5);
        assert_eq!(g.tick(), Step::Finished(Outcome::Lost));
        // prune skipped on the losing tick; second tile never advanced
        assert_eq!(g.tiles().len(), 2);
        assert_eq!(g.tiles()[1].y(), 595);
    }

    #[test]
    fn loss_stops_advancing_later_tiles() {
        let mut g = quiet();
        g.start();
        g.spawn_tile(0.0, 'A', Color(0xFF0000));
        for _ in 0..300 {
            g.tick();
        }
        g.spawn_tile(100.0, 'B', Color(0x00FF00));
        for _ in 0..300 {
            if g.tick() != Step::Continue {
                break;
            }
        }
        assert_eq!(g.last_outcome(), Some(Outcome::Lost));
        assert_eq!(g.tiles()[0].y(), 600);
        assert_eq!(g.tiles()[1].y(), 299);
    }

    #[test]
    fn restart_clears_previous_run() {
        let mut g = quiet();
        g.start();
        g.set_score(30);
        g.spawn_tile(0.0, 'A', Color(0xFF0000));
        g.stop();
        g.start();
        assert_eq!(g.score(), 0);
        assert_eq!(g.speed(), 1);
        assert!(g.tiles().is_empty());
        assert!(g.renderer().is_empty());
        assert_eq!(g.last_outcome(), None);
    }

    #[test]
    fn random_spawns_stay_in_bounds() {
        let cfg = GameConfig {
            spawn_chance: 1.0,
            ..GameConfig::default()
        };
        let mut g = GameController::new(cfg, SpriteTable::new(600.0, 600.0), StdRng::seed_from_u64(42));
        g.start();
        for _ in 0..100 {
            assert_eq!(g.tick(), Step::Continue);
        }
        assert_eq!(g.tiles().len(), 100);
        for t in g.tiles() {
            assert!(t.x() >= 0.0 && t.x() < 550.0);
            assert!(crate::tile::LETTERS.contains(&t.letter()));
            assert!(crate::tile::PALETTE.contains(&t.color()));
        }
    }
}
