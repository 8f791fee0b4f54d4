// Move decision cascade
//
// Each turn runs the same staged pipeline over the up-to-four cells next to
// our head. A stage either settles on a direction or hands a narrowed set of
// candidates to the next one:
//
//   0. opening   - turn 0: head for the nearest food, the board is open
//   1. enumerate - drop cells held by bodies, heads and growing tails
//   2. threats   - avoid head-to-head with longer-or-equal snakes, take kills
//   3. space     - avoid regions too small to live in
//   4. food      - eat, or make progress towards food
//
// No stage fails: every dead end has a least-bad fallback, because the game
// server expects exactly one direction every turn.

use log::{debug, warn};

use crate::config::DecisionConfig;
use crate::context::TurnHistory;
use crate::grid::Cell;
use crate::region::RegionMap;
use crate::snapshot::{Snapshot, SELF_INDEX};
use crate::types::{Battlesnake, Board, Coord, Direction};

/// Why the cascade settled on a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Turn 0, moving towards the nearest food
    Opening,
    /// No legal move at all; the fallback direction was returned
    Enclosed,
    /// Exactly one legal move
    OnlyMove,
    /// Every move risks a head-to-head with a longer-or-equal snake
    LeastThreatened,
    /// Head-to-head with a shorter snake while health allows it
    Kill,
    /// Only one move leads into a region big enough
    OnlySafeSpace,
    /// Every region is too small; took the largest
    LargestSpace,
    /// Food directly on the move
    Food,
    /// Best progress towards food
    FoodProgress,
    /// The decision did not finish within the response budget
    Timeout,
}

/// The outcome of one turn's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub reason: Reason,
}

impl Decision {
    pub fn new(direction: Direction, reason: Reason) -> Self {
        Decision { direction, reason }
    }
}

/// A legal cell next to our head
#[derive(Debug, Clone)]
struct Candidate {
    dir: Direction,
    cell: Coord,
    /// Adjacent enemy heads at least as long as us
    nlonger: usize,
    /// Escape options those heads have besides this cell
    alternate: u32,
    /// Adjacent enemy heads shorter than us
    nshorter: usize,
    region_size: usize,
}

enum Stage {
    Done(Decision),
    Continue(Vec<Candidate>),
}

/// Decides this turn's move.
///
/// # Arguments
/// * `game_id` - Game key for the previous-turn lookup
/// * `turn` - Turn number, starting at 0
/// * `board` - Dimensions, food and every snake
/// * `you` - Our snake; its health gates opportunistic kills
/// * `history` - What the board looked like last turn
/// * `config` - Decision constants
pub fn decide_move(
    game_id: &str,
    turn: i32,
    board: &Board,
    you: &Battlesnake,
    history: &dyn TurnHistory,
    config: &DecisionConfig,
) -> Decision {
    match Snapshot::build(game_id, turn, board, you, history, config.growth_opening_turns) {
        Some(snapshot) => Cascade::new(snapshot, you.health, config).run(),
        None => {
            warn!("Turn {}: our snake has no body, returning fallback", turn);
            Decision::new(config.fallback_direction, Reason::Enclosed)
        }
    }
}

/// One turn's pipeline state
pub struct Cascade<'a> {
    snapshot: Snapshot,
    regions: RegionMap,
    health: i32,
    config: &'a DecisionConfig,
}

impl<'a> Cascade<'a> {
    pub fn new(snapshot: Snapshot, health: i32, config: &'a DecisionConfig) -> Self {
        Cascade {
            snapshot,
            regions: RegionMap::new(),
            health,
            config,
        }
    }

    pub fn run(mut self) -> Decision {
        if let Some(decision) = self.opening() {
            return decision;
        }

        let candidates = match self.enumerate() {
            Stage::Done(decision) => return decision,
            Stage::Continue(candidates) => candidates,
        };
        let candidates = match self.threats(candidates) {
            Stage::Done(decision) => return decision,
            Stage::Continue(candidates) => candidates,
        };
        let candidates = match self.space(candidates) {
            Stage::Done(decision) => return decision,
            Stage::Continue(candidates) => candidates,
        };
        self.food(&candidates)
    }

    /// Stage 0: on turn 0 every direction is open, so just go for the closest food
    fn opening(&self) -> Option<Decision> {
        if self.snapshot.turn != 0 {
            return None;
        }
        let target = self.snapshot.nearest_food()?.pos;
        let head = self.snapshot.me().head;
        debug!(
            "Turn 0 special case, head=({},{}), food=({},{})",
            head.x, head.y, target.x, target.y
        );

        let direction = if target.x < head.x {
            Direction::Left
        } else if target.x > head.x {
            Direction::Right
        } else if target.y < head.y {
            Direction::Up
        } else {
            Direction::Down
        };
        Some(Decision::new(direction, Reason::Opening))
    }

    /// Stage 1: every neighbour of our head that nothing will occupy next turn
    fn enumerate(&self) -> Stage {
        let head = self.snapshot.me().head;
        let candidates: Vec<Candidate> = self
            .snapshot
            .grid
            .neighbours(head)
            .filter(|(_, cell)| !self.snapshot.is_blocked(cell))
            .map(|(dir, cell)| Candidate {
                dir,
                cell,
                nlonger: 0,
                alternate: 0,
                nshorter: 0,
                region_size: 0,
            })
            .collect();

        match candidates.len() {
            0 => {
                warn!(
                    "Turn {}: no legal move, accepting loss with {}",
                    self.snapshot.turn,
                    self.config.fallback_direction.as_str()
                );
                Stage::Done(Decision::new(self.config.fallback_direction, Reason::Enclosed))
            }
            1 => {
                debug!("Select {} because it is the only viable move", candidates[0].dir.as_str());
                Stage::Done(Decision::new(candidates[0].dir, Reason::OnlyMove))
            }
            _ => {
                for c in &candidates {
                    debug!("Possible move: {}=({},{})", c.dir.as_str(), c.cell.x, c.cell.y);
                }
                Stage::Continue(candidates)
            }
        }
    }

    /// Stage 2: head-to-head threats and opportunities
    fn threats(&self, mut candidates: Vec<Candidate>) -> Stage {
        let my_length = self.snapshot.me().length;

        for candidate in candidates.iter_mut() {
            for (_, neighbour) in self.snapshot.grid.neighbours(candidate.cell) {
                let enemy = match self.snapshot.grid.classify(&neighbour) {
                    Cell::Head(i) if i != SELF_INDEX => i,
                    _ => continue,
                };
                if self.snapshot.snakes[enemy].length >= my_length {
                    candidate.nlonger += 1;
                    candidate.alternate += self.escape_options(neighbour, candidate.cell);
                } else {
                    candidate.nshorter += 1;
                }
            }
        }

        if candidates.iter().all(|c| c.nlonger > 0) {
            let mut best = 0;
            for (i, c) in candidates.iter().enumerate() {
                let b = &candidates[best];
                if c.nlonger < b.nlonger || (c.nlonger == b.nlonger && c.alternate > b.alternate) {
                    best = i;
                }
            }
            debug!(
                "All moves are threatened by longer snakes, choose {} where they have more alternatives",
                candidates[best].dir.as_str()
            );
            return Stage::Done(Decision::new(candidates[best].dir, Reason::LeastThreatened));
        }

        candidates.retain(|c| {
            if c.nlonger > 0 {
                debug!("Direction {} is threatened by a longer snake", c.dir.as_str());
            }
            c.nlonger == 0
        });

        let healthy = match self.snapshot.nearest_food() {
            Some(food) => self.health > food.dist,
            None => true,
        };
        if healthy {
            if let Some(kill) = candidates.iter().find(|c| c.nshorter > 0) {
                debug!(
                    "Select {} because we have the opportunity to eat a shorter snake",
                    kill.dir.as_str()
                );
                return Stage::Done(Decision::new(kill.dir, Reason::Kill));
            }
        }

        Stage::Continue(candidates)
    }

    /// Cells the snake whose head is at `enemy_head` could move to other than `contested`
    fn escape_options(&self, enemy_head: Coord, contested: Coord) -> u32 {
        self.snapshot
            .grid
            .neighbours(enemy_head)
            .filter(|(_, n)| *n != contested && !self.snapshot.grid.is_solid(n))
            .map(|(_, n)| {
                if self.snapshot.grid.is_food(&n) {
                    1 + self.config.escape_food_bonus
                } else {
                    1
                }
            })
            .sum()
    }

    /// Stage 3: keep out of regions too small to survive in
    fn space(&mut self, mut candidates: Vec<Candidate>) -> Stage {
        let my_length = self.snapshot.me().length;
        let threshold = self.config.space_threshold;

        let mut roomy = Vec::with_capacity(candidates.len());
        for candidate in candidates.iter_mut() {
            let region = self.regions.region_at(&mut self.snapshot, candidate.cell);
            candidate.region_size = region.size;
            debug!(
                "Direction {} leads to space {}: size={}, food={}, snakes={}{}",
                candidate.dir.as_str(),
                region.id,
                region.size,
                region.food,
                region.snake_count(),
                if region.is_self_bounded() { " (self)" } else { "" }
            );

            let too_small = if region.is_self_bounded() {
                (region.size as i64) < threshold.minimum_size(my_length, region.food)
            } else {
                region.size < my_length
            };
            if too_small {
                debug!("Avoid {} because its space is too small", candidate.dir.as_str());
            } else {
                roomy.push(candidate.clone());
            }
        }

        match roomy.len() {
            0 => {
                let mut largest = 0;
                for (i, c) in candidates.iter().enumerate() {
                    if c.region_size > candidates[largest].region_size {
                        largest = i;
                    }
                }
                debug!(
                    "All our choices are small spaces, so choose {} which is the largest of them",
                    candidates[largest].dir.as_str()
                );
                Stage::Done(Decision::new(candidates[largest].dir, Reason::LargestSpace))
            }
            1 => {
                debug!("Select {} because it is the only roomy move", roomy[0].dir.as_str());
                Stage::Done(Decision::new(roomy[0].dir, Reason::OnlySafeSpace))
            }
            _ => Stage::Continue(roomy),
        }
    }

    /// Stage 4: eat if we can, otherwise close in on food
    fn food(&self, candidates: &[Candidate]) -> Decision {
        if let Some(c) = candidates.iter().find(|c| self.snapshot.grid.is_food(&c.cell)) {
            debug!("Select {} because there is a food disc there", c.dir.as_str());
            return Decision::new(c.dir, Reason::Food);
        }

        let sentinel = self.snapshot.grid.width() + self.snapshot.grid.height();
        let avoid_contested = self.snapshot.snakes.len() >= self.config.contested_food_min_snakes;

        let mut scores: Vec<i32> = candidates
            .iter()
            .map(|c| self.food_progress(c.cell, avoid_contested, sentinel))
            .collect();
        if avoid_contested && scores.iter().all(|&s| s == sentinel) {
            scores = candidates
                .iter()
                .map(|c| self.food_progress(c.cell, false, sentinel))
                .collect();
        }

        let mut best = 0;
        for (i, &score) in scores.iter().enumerate() {
            if score < scores[best] {
                best = i;
            }
        }
        debug!(
            "Select {} because it makes the best progress toward food",
            candidates[best].dir.as_str()
        );
        Decision::new(candidates[best].dir, Reason::FoodProgress)
    }

    /// Distance from `cell` to the nearest food it is closer to than our head is.
    /// Returns `sentinel` when no food gets closer.
    fn food_progress(&self, cell: Coord, avoid_contested: bool, sentinel: i32) -> i32 {
        self.snapshot
            .food
            .iter()
            .filter(|f| !(avoid_contested && f.is_contested()))
            .map(|f| (cell.distance(&f.pos), f.dist))
            .filter(|&(from_cell, from_head)| from_cell < from_head)
            .map(|(from_cell, _)| from_cell)
            .min()
            .unwrap_or(sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::NoHistory;

    fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            body: body.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        }
    }

    fn board(w: i32, h: i32, food: &[(i32, i32)], snakes: Vec<Battlesnake>) -> Board {
        Board {
            width: w,
            height: h,
            food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
            snakes,
        }
    }

    fn decide(turn: i32, b: &Board) -> Decision {
        let config = Config::default_hardcoded();
        decide_move("g", turn, b, &b.snakes[0], &NoHistory, &config.decision)
    }

    #[test]
    fn test_opening_prefers_x_axis() {
        let me = snake("me", 100, &[(3, 3), (3, 3), (3, 3)]);
        let b = board(7, 7, &[(5, 1)], vec![me]);
        assert_eq!(decide(0, &b), Decision::new(Direction::Right, Reason::Opening));

        let me = snake("me", 100, &[(3, 3), (3, 3), (3, 3)]);
        let b = board(7, 7, &[(3, 0)], vec![me]);
        assert_eq!(decide(0, &b).direction, Direction::Up);

        let me = snake("me", 100, &[(3, 3), (3, 3), (3, 3)]);
        let b = board(7, 7, &[(3, 6)], vec![me]);
        assert_eq!(decide(0, &b).direction, Direction::Down);
    }

    #[test]
    fn test_opening_without_food_uses_full_cascade() {
        let me = snake("me", 100, &[(0, 0), (0, 0), (0, 0)]);
        let b = board(7, 7, &[], vec![me]);
        let decision = decide(0, &b);
        assert_ne!(decision.reason, Reason::Opening);
        assert!(matches!(decision.direction, Direction::Right | Direction::Down));
    }

    #[test]
    fn test_enclosed_returns_fallback() {
        // Head in the corner, boxed in by our own body
        let me = snake("me", 100, &[(0, 0), (1, 0), (1, 1), (0, 1), (0, 2)]);
        let b = board(5, 5, &[], vec![me]);
        assert_eq!(decide(5, &b), Decision::new(Direction::Left, Reason::Enclosed));
    }

    #[test]
    fn test_kill_requires_health_margin() {
        // A shorter rival head sits next to the cell right of our head
        let me = snake("me", 100, &[(2, 2), (1, 2), (0, 2)]);
        let rival = snake("rival", 100, &[(4, 2), (5, 2)]);
        let b = board(7, 7, &[(2, 6)], vec![me, rival]);
        assert_eq!(decide(5, &b), Decision::new(Direction::Right, Reason::Kill));

        let me = snake("me", 3, &[(2, 2), (1, 2), (0, 2)]);
        let rival = snake("rival", 100, &[(4, 2), (5, 2)]);
        let b = board(7, 7, &[(2, 6)], vec![me, rival]);
        assert_ne!(decide(5, &b).reason, Reason::Kill);
    }

    #[test]
    fn test_all_threatened_picks_fewest_threats() {
        // We are short (length 2); two long rivals flank us. Turn 1, so every
        // tail stays put and up is blocked by our own tail.
        let me = snake("me", 100, &[(2, 1), (2, 0)]);
        let a = snake("a", 100, &[(0, 1), (0, 0), (1, 0)]);
        let b_snake = snake("b", 100, &[(3, 2), (4, 2), (4, 1)]);
        let b = board(5, 4, &[], vec![me, a, b_snake]);
        // left (1,1) touches a's head, which has one other way out.
        // right (3,1) and down (2,2) touch b's head, which has two.
        let decision = decide(1, &b);
        assert_eq!(decision, Decision::new(Direction::Right, Reason::LeastThreatened));
    }

    #[test]
    fn test_kill_taken_when_board_has_no_food() {
        // Health 3 would fail the margin against any food, but there is none
        let me = snake("me", 3, &[(2, 2), (1, 2), (0, 2)]);
        let rival = snake("rival", 100, &[(4, 2), (5, 2)]);
        let b = board(7, 7, &[], vec![me, rival]);
        assert_eq!(decide(5, &b), Decision::new(Direction::Right, Reason::Kill));
    }

    #[test]
    fn test_food_next_to_threatening_head_weighs_its_escapes() {
        // The all-threatened layout plus food beside a's head at (0,2). Without
        // the bonus a has one way out and b has two, so right wins; with it
        // a's single exit is worth 1 + bonus.
        let me = snake("me", 100, &[(2, 1), (2, 0)]);
        let a = snake("a", 100, &[(0, 1), (0, 0), (1, 0)]);
        let b_snake = snake("b", 100, &[(3, 2), (4, 2), (4, 1)]);
        let b = board(5, 4, &[(0, 2)], vec![me, a, b_snake]);

        let mut config = Config::default_hardcoded().decision;
        assert_eq!(config.escape_food_bonus, 4);
        let decision = decide_move("g", 1, &b, &b.snakes[0], &NoHistory, &config);
        assert_eq!(decision, Decision::new(Direction::Left, Reason::LeastThreatened));

        config.escape_food_bonus = 0;
        let decision = decide_move("g", 1, &b, &b.snakes[0], &NoHistory, &config);
        assert_eq!(decision, Decision::new(Direction::Right, Reason::LeastThreatened));
    }

    #[test]
    fn test_contested_food_reconsidered_when_nothing_else_helps() {
        // Three snakes, and the only food is closer to `near` than to us
        let me = snake("me", 100, &[(5, 5), (5, 6), (5, 7)]);
        let near = snake("near", 100, &[(1, 4), (1, 3), (1, 2)]);
        let far = snake("far", 100, &[(9, 0), (10, 0), (10, 1)]);
        let b = board(11, 11, &[(1, 5)], vec![me, near, far]);
        assert_eq!(decide(5, &b), Decision::new(Direction::Left, Reason::FoodProgress));
    }

    #[test]
    fn test_food_on_candidate_wins() {
        let me = snake("me", 100, &[(3, 3), (3, 4), (3, 5)]);
        let b = board(7, 7, &[(3, 2), (0, 3)], vec![me]);
        assert_eq!(decide(5, &b), Decision::new(Direction::Up, Reason::Food));
    }
}
