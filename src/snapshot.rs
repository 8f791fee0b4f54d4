// Board snapshot for a single turn
//
// Turns the raw request into the dense occupancy grid plus two registries:
// snakes ordered by head distance from our head (ours always first) and
// food ordered by distance from our head.

use log::debug;
use std::collections::HashSet;

use crate::context::TurnHistory;
use crate::grid::{Cell, Grid};
use crate::types::{Battlesnake, Board, Coord};

/// Index of our own snake in the sorted registry
pub const SELF_INDEX: usize = 0;

/// A snake as seen this turn
#[derive(Debug, Clone)]
pub struct SnakeState {
    pub id: String,
    pub head: Coord,
    pub tail: Coord,
    pub length: usize,
    pub segments: Vec<Coord>,
    /// Manhattan distance from this snake's head to ours
    pub dist: i32,
    /// The tail stays put this turn
    pub growing: bool,
}

/// A food disc as seen this turn
#[derive(Debug, Clone)]
pub struct FoodState {
    pub pos: Coord,
    /// Manhattan distance from our head
    pub dist: i32,
    /// Snakes whose head is strictly closer to this food than ours
    pub closer_snakes: usize,
}

impl FoodState {
    pub fn is_contested(&self) -> bool {
        self.closer_snakes > 0
    }
}

/// Grid and registries built from one turn's request
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub game_id: String,
    pub turn: i32,
    pub grid: Grid,
    pub snakes: Vec<SnakeState>,
    pub food: Vec<FoodState>,
}

impl Snapshot {
    /// Builds the snapshot for this turn.
    ///
    /// # Arguments
    /// * `game_id` - Key used to look up the previous turn
    /// * `turn` - Current turn number, starting at 0
    /// * `board` - Dimensions, food and every snake (including ours)
    /// * `you` - Our snake
    /// * `history` - Previous-turn context; unknown games count as "nothing eaten"
    /// * `opening_turns` - Turns during which every snake is assumed to be growing
    ///
    /// Returns `None` only if our snake has no body, which the game server never sends.
    pub fn build(
        game_id: &str,
        turn: i32,
        board: &Board,
        you: &Battlesnake,
        history: &dyn TurnHistory,
        opening_turns: i32,
    ) -> Option<Snapshot> {
        let my_head = you.head()?;
        let mut grid = Grid::new(board.width, board.height);

        let mut seen = HashSet::new();
        let mut food: Vec<FoodState> = board
            .food
            .iter()
            .filter(|f| seen.insert(**f))
            .map(|&pos| {
                grid.set(&pos, Cell::Food);
                FoodState {
                    pos,
                    dist: pos.distance(&my_head),
                    closer_snakes: 0,
                }
            })
            .collect();
        food.sort_by_key(|f| f.dist);

        let food_last_turn = history.food_last_turn(game_id);

        // The board normally lists us too; make sure we are there either way.
        let missing_you = if board.snakes.iter().any(|s| s.id == you.id) {
            None
        } else {
            Some(you)
        };
        let mut snakes: Vec<SnakeState> = board
            .snakes
            .iter()
            .chain(missing_you)
            .filter_map(|snake| {
                Self::snake_state(snake, &my_head, turn, opening_turns, &food_last_turn)
            })
            .collect();

        // Only our head sits at distance 0 from itself; the id check keeps us
        // first even if a rival head overlaps ours after a collision.
        snakes.sort_by_key(|s| (s.dist, s.id != you.id));

        for (index, snake) in snakes.iter().enumerate() {
            for segment in &snake.segments {
                grid.set(segment, Cell::Body(index));
            }
            grid.set(&snake.tail, Cell::Tail(index));
            grid.set(&snake.head, Cell::Head(index));
        }

        for item in food.iter_mut() {
            item.closer_snakes = snakes
                .iter()
                .filter(|s| s.head.distance(&item.pos) < item.dist)
                .count();
        }

        for snake in &snakes {
            debug!(
                "Snake {} at: [H]({},{}), [T]({},{}), len={}, dist={}{}",
                snake.id,
                snake.head.x,
                snake.head.y,
                snake.tail.x,
                snake.tail.y,
                snake.length,
                snake.dist,
                if snake.growing { " growing" } else { "" }
            );
        }
        for item in &food {
            debug!(
                "Food at: ({},{}), dist={}, closer snakes={}",
                item.pos.x, item.pos.y, item.dist, item.closer_snakes
            );
        }

        Some(Snapshot {
            game_id: game_id.to_string(),
            turn,
            grid,
            snakes,
            food,
        })
    }

    fn snake_state(
        snake: &Battlesnake,
        my_head: &Coord,
        turn: i32,
        opening_turns: i32,
        food_last_turn: &HashSet<Coord>,
    ) -> Option<SnakeState> {
        let mut seen = HashSet::new();
        let segments: Vec<Coord> = snake
            .body
            .iter()
            .copied()
            .filter(|s| seen.insert(*s))
            .collect();

        let head = *segments.first()?;
        let tail = *segments.last()?;

        Some(SnakeState {
            id: snake.id.clone(),
            head,
            tail,
            length: segments.len(),
            dist: head.distance(my_head),
            growing: turn < opening_turns || food_last_turn.contains(&head),
            segments,
        })
    }

    pub fn me(&self) -> &SnakeState {
        &self.snakes[SELF_INDEX]
    }

    pub fn nearest_food(&self) -> Option<&FoodState> {
        self.food.first()
    }

    /// Whether a snake may not enter `c` next turn: bodies, heads, and the
    /// tails of snakes that are growing.
    pub fn is_blocked(&self, c: &Coord) -> bool {
        match self.grid.classify(c) {
            Cell::Body(_) | Cell::Head(_) => true,
            Cell::Tail(i) => self.snakes[i].growing,
            Cell::Empty | Cell::Food => false,
        }
    }
}
