// Occupancy grid for a single turn
//
// Every cell carries exactly one classification plus the id of the
// flood-fill region that claimed it (0 while unassigned). The grid is
// allocated fresh each turn, so region tags never leak between turns.

use crate::types::{Coord, Direction};

/// Region tag of a cell no flood fill has reached yet
pub const UNASSIGNED: usize = 0;

/// What occupies a board cell this turn. Snake variants carry the owner's
/// index in the snapshot's snake registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Food,
    Body(usize),
    Head(usize),
    Tail(usize),
}

#[derive(Debug, Clone, Copy)]
struct GridCell {
    content: Cell,
    region: usize,
}

/// Dense W×H occupancy grid, stored row-major
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Creates a grid of the given dimensions with every cell empty
    pub fn new(width: i32, height: i32) -> Self {
        let area = (width.max(0) * height.max(0)) as usize;
        Grid {
            width,
            height,
            cells: vec![
                GridCell {
                    content: Cell::Empty,
                    region: UNASSIGNED,
                };
                area
            ],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, c: &Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    fn index(&self, c: &Coord) -> usize {
        debug_assert!(self.in_bounds(c), "coordinate {:?} off the board", c);
        (c.y * self.width + c.x) as usize
    }

    pub fn classify(&self, c: &Coord) -> Cell {
        self.cells[self.index(c)].content
    }

    pub fn set(&mut self, c: &Coord, content: Cell) {
        let i = self.index(c);
        self.cells[i].content = content;
    }

    pub fn region(&self, c: &Coord) -> usize {
        self.cells[self.index(c)].region
    }

    pub fn set_region(&mut self, c: &Coord, region: usize) {
        let i = self.index(c);
        self.cells[i].region = region;
    }

    pub fn is_food(&self, c: &Coord) -> bool {
        self.classify(c) == Cell::Food
    }

    /// Body or head cells always block; tails depend on whether their snake grows
    pub fn is_solid(&self, c: &Coord) -> bool {
        matches!(self.classify(c), Cell::Body(_) | Cell::Head(_))
    }

    /// On-board neighbours of `c`, in the order left, right, up, down
    pub fn neighbours(&self, c: Coord) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        Direction::all()
            .into_iter()
            .map(move |dir| (dir, dir.apply(&c)))
            .filter(move |(_, n)| self.in_bounds(n))
    }
}
