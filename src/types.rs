// Battlesnake API Types
//
// Coordinates use the classic convention: origin at the top-left corner,
// y grows downwards, so "up" decreases y.

use serde::{Deserialize, Serialize};

/// Game metadata. Only the ID is needed to key per-game context.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Game {
    pub id: String,
}

/// Board state including dimensions, food and snakes
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    #[serde(default)]
    pub food: Vec<Coord>,
    #[serde(default)]
    pub snakes: Vec<Battlesnake>,
}

/// Snake representation as sent by the game server. Bodies are listed head-first.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Battlesnake {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
}

impl Battlesnake {
    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Manhattan distance between two cells
    pub fn distance(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Coord {
        Coord {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Represents the four possible movement directions for a Battlesnake
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in neighbour enumeration order.
    /// Ties between otherwise equal moves are broken by this order.
    pub fn all() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses a direction name, case-insensitively
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => coord.translate(0, -1),
            Direction::Down => coord.translate(0, 1),
            Direction::Left => coord.translate(-1, 0),
            Direction::Right => coord.translate(1, 0),
        }
    }
}

/// Complete game state received from the API on /start, /move and /end
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}

/// Response body for /move
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

/// Response body for /start
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartResponse {
    pub color: String,
    #[serde(rename = "headType")]
    pub head_type: String,
    #[serde(rename = "tailType")]
    pub tail_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_decreases_y() {
        let c = Coord::new(3, 3);
        assert_eq!(Direction::Up.apply(&c), Coord::new(3, 2));
        assert_eq!(Direction::Down.apply(&c), Coord::new(3, 4));
        assert_eq!(Direction::Left.apply(&c), Coord::new(2, 3));
        assert_eq!(Direction::Right.apply(&c), Coord::new(4, 3));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Coord::new(0, 0).distance(&Coord::new(3, 4)), 7);
        assert_eq!(Coord::new(2, 5).distance(&Coord::new(2, 5)), 0);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(Direction::parse("UP").unwrap(), Direction::Up);
        assert_eq!(Direction::parse("Left").unwrap(), Direction::Left);
        assert!(Direction::parse("sideways").is_err());
    }

    #[test]
    fn test_move_response_serializes_lowercase() {
        let response = MoveResponse {
            direction: Direction::Right,
            shout: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "move": "right" }));
    }

    #[test]
    fn test_game_state_ignores_unknown_fields() {
        let raw = r#"{
            "game": {"id": "g1", "timeout": 500},
            "turn": 3,
            "board": {"height": 7, "width": 7, "food": [{"x": 1, "y": 2}],
                      "snakes": [{"id": "s1", "name": "a", "health": 90,
                                  "body": [{"x": 0, "y": 0}], "latency": "12"}]},
            "you": {"id": "s1", "name": "a", "health": 90, "body": [{"x": 0, "y": 0}]}
        }"#;
        let state: GameState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.game.id, "g1");
        assert_eq!(state.board.food, vec![Coord::new(1, 2)]);
        assert_eq!(state.you.head(), Some(Coord::new(0, 0)));
    }
}
