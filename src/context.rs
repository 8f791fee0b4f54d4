// Per-game context registry
//
// Tracks, for every game in progress, the display color handed out at
// /start and what the board looked like on the previous turn. The decision
// engine only reads the previous food positions (to infer which snakes just
// ate); the transport layer writes after every response.
//
// Games are handled concurrently, so the map sits behind a reader/writer
// lock. Critical sections copy data in or out and never run game logic.

use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::PaletteColor;
use crate::types::{Battlesnake, Coord};

/// Read access to what was true on the previous turn of a game
pub trait TurnHistory {
    /// Food positions recorded for the previous turn. Empty if the game is unknown.
    fn food_last_turn(&self, game_id: &str) -> HashSet<Coord>;
}

/// History with nothing recorded, as on the first turn of a fresh game
pub struct NoHistory;

impl TurnHistory for NoHistory {
    fn food_last_turn(&self, _game_id: &str) -> HashSet<Coord> {
        HashSet::new()
    }
}

/// Previous-turn food handed in directly, used by replays and tests
impl TurnHistory for HashSet<Coord> {
    fn food_last_turn(&self, _game_id: &str) -> HashSet<Coord> {
        self.clone()
    }
}

/// Everything remembered about one game between turns
#[derive(Debug, Clone)]
pub struct GameContext {
    pub color: PaletteColor,
    pub heads: HashMap<String, Coord>,
    pub food: Vec<Coord>,
}

/// Concurrent store of game contexts keyed by game id
pub struct ContextStore {
    games: RwLock<HashMap<String, GameContext>>,
    palette: Vec<PaletteColor>,
    next_color: AtomicUsize,
}

impl ContextStore {
    pub fn new(palette: Vec<PaletteColor>) -> Self {
        ContextStore {
            games: RwLock::new(HashMap::new()),
            palette,
            next_color: AtomicUsize::new(0),
        }
    }

    /// Picks the next palette color, round-robin across games. The counter is
    /// bumped before indexing, so the first game gets the second color.
    fn assign_color(&self) -> PaletteColor {
        if self.palette.is_empty() {
            return PaletteColor::default();
        }
        let n = self.next_color.fetch_add(1, Ordering::Relaxed) + 1;
        self.palette[n % self.palette.len()].clone()
    }

    /// Registers a new game, replacing any stale entry with the same id.
    /// Returns the color assigned to it.
    pub fn start_game(&self, game_id: &str) -> PaletteColor {
        let color = self.assign_color();
        let context = GameContext {
            color: color.clone(),
            heads: HashMap::new(),
            food: Vec::new(),
        };
        self.games.write().insert(game_id.to_string(), context);
        color
    }

    /// Records the board as it stood when we answered this turn.
    /// A game we never saw start (e.g. after a restart) gets a fresh entry.
    pub fn record_turn(&self, game_id: &str, snakes: &[Battlesnake], food: &[Coord]) {
        let heads: HashMap<String, Coord> = snakes
            .iter()
            .filter_map(|s| s.head().map(|h| (s.id.clone(), h)))
            .collect();

        let mut seen = HashSet::new();
        let food: Vec<Coord> = food.iter().copied().filter(|f| seen.insert(*f)).collect();

        let mut games = self.games.write();
        if !games.contains_key(game_id) {
            debug!("Recording turn for unregistered game {}", game_id);
            let color = self.assign_color();
            games.insert(
                game_id.to_string(),
                GameContext {
                    color,
                    heads: HashMap::new(),
                    food: Vec::new(),
                },
            );
        }
        if let Some(context) = games.get_mut(game_id) {
            context.heads = heads;
            context.food = food;
        }
    }

    /// Forgets a finished game. Returns whether it was known.
    pub fn end_game(&self, game_id: &str) -> bool {
        self.games.write().remove(game_id).is_some()
    }

    /// Color name used to tag this game's log lines
    pub fn color_name(&self, game_id: &str) -> String {
        self.games
            .read()
            .get(game_id)
            .map(|c| c.color.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(test)]
    fn previous_head(&self, game_id: &str, snake_id: &str) -> Option<Coord> {
        self.games
            .read()
            .get(game_id)
            .and_then(|c| c.heads.get(snake_id).copied())
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.games.read().contains_key(game_id)
    }

    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TurnHistory for ContextStore {
    fn food_last_turn(&self, game_id: &str) -> HashSet<Coord> {
        self.games
            .read()
            .get(game_id)
            .map(|c| c.food.iter().copied().collect())
            .unwrap_or_default()
    }
}
