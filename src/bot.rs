// Spacey Snake
//
// The Bot ties the decision cascade to the game server's lifecycle: it owns
// the configuration and the per-game context registry, runs each turn's
// decision off the async executor, and records the board afterwards so the
// next turn can tell which snakes just ate.

use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::context::{ContextStore, TurnHistory};
use crate::debug_logger::{DebugLogEntry, DebugLogger};
use crate::decision::{decide_move, Decision, Reason};
use crate::types::{Battlesnake, Board, Game, MoveResponse, StartResponse};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    contexts: Arc<ContextStore>,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration and no debug log
    pub fn new(config: Config) -> Self {
        Self::with_debug_logger(config, DebugLogger::disabled())
    }

    /// Creates a new Bot instance that records every decision to `debug_logger`
    pub fn with_debug_logger(config: Config, debug_logger: DebugLogger) -> Self {
        let contexts = Arc::new(ContextStore::new(config.appearance.palette.clone()));
        Bot {
            config,
            contexts,
            debug_logger,
        }
    }

    /// Per-game context registry
    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let color = self
            .config
            .appearance
            .palette
            .first()
            .map(|c| c.hex.clone())
            .unwrap_or_default();
        json!({
            "author": self.config.appearance.author,
            "color": color,
            "head": self.config.appearance.head_type,
            "tail": self.config.appearance.tail_type,
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Called when a game starts. Assigns the game its color and records the
    /// opening board.
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) -> StartResponse {
        let color = self.contexts.start_game(&game.id);
        self.contexts.record_turn(&game.id, &board.snakes, &board.food);

        info!("[{}] GAME START {}", color.name, game.id);

        StartResponse {
            color: color.hex,
            head_type: self.config.appearance.head_type.clone(),
            tail_type: self.config.appearance.tail_type.clone(),
        }
    }

    /// Called when a game ends. Forgets the game's context.
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        let color = self.contexts.color_name(&game.id);
        if !self.contexts.end_game(&game.id) {
            warn!("[{}] GAME OVER for unknown game {}", color, game.id);
            return;
        }
        info!("[{}] GAME OVER after turn {}", color, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The decision is CPU-bound, so it runs on tokio's blocking pool under
    /// the configured time budget. If the budget runs out the fallback
    /// direction is returned. Either way the board is recorded afterwards.
    ///
    /// # Arguments
    /// * `game` - Current game metadata
    /// * `turn` - Current turn number
    /// * `board` - Current board state
    /// * `you` - Your snake's current state
    ///
    /// # Returns
    /// * `MoveResponse` - The chosen move direction
    pub async fn get_move(
        &self,
        game: &Game,
        turn: &i32,
        board: &Board,
        you: &Battlesnake,
    ) -> MoveResponse {
        let start_time = Instant::now();
        let color = self.contexts.color_name(&game.id);

        info!("[{}] -------------------------------------------------------", color);
        info!("[{}] Move turn={}", color, turn);

        let previous_food = if self.debug_logger.is_enabled() {
            self.contexts.food_last_turn(&game.id).into_iter().collect()
        } else {
            Vec::new()
        };

        let decision = self.compute_decision(game, *turn, board, you).await;

        self.contexts.record_turn(&game.id, &board.snakes, &board.food);

        info!(
            "[{}] Move result={} ({:?}), elapsed={}ms",
            color,
            decision.direction.as_str(),
            decision.reason,
            start_time.elapsed().as_millis()
        );

        self.debug_logger.log_move(DebugLogEntry::new(
            &game.id,
            *turn,
            you,
            board,
            previous_food,
            decision.direction,
            format!("{:?}", decision.reason),
        ));

        MoveResponse {
            direction: decision.direction,
            shout: None,
        }
    }

    /// Runs the decision cascade on the blocking pool, bounded by the effective budget
    async fn compute_decision(&self, game: &Game, turn: i32, board: &Board, you: &Battlesnake) -> Decision {
        let contexts = self.contexts.clone();
        let decision_config = self.config.decision.clone();
        let game_id = game.id.clone();
        let board = board.clone();
        let you = you.clone();

        let task = tokio::task::spawn_blocking(move || {
            decide_move(&game_id, turn, &board, &you, contexts.as_ref(), &decision_config)
        });

        let fallback = self.config.decision.fallback_direction;
        let budget = Duration::from_millis(self.config.timing.effective_budget_ms());
        match tokio::time::timeout(budget, task).await {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                error!("Turn {}: decision task failed: {}", turn, e);
                Decision::new(fallback, Reason::Timeout)
            }
            Err(_) => {
                warn!(
                    "Turn {}: decision exceeded {}ms budget, returning {}",
                    turn,
                    budget.as_millis(),
                    fallback.as_str()
                );
                Decision::new(fallback, Reason::Timeout)
            }
        }
    }
}
