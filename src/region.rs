// Space mapping
//
// A flood fill that maps out the space adjacent to a candidate move. A space
// is any set of cells bounded by the bodies or heads of snakes (our own or
// others) and the edges of the board. Tails that will vacate this turn are
// part of the space; tails of growing snakes are walls.
//
// Every cell is tagged with the id of the region that claimed it, so a
// second candidate landing in an already mapped component costs nothing.

use crate::grid::{Cell, UNASSIGNED};
use crate::snapshot::{Snapshot, SELF_INDEX};
use crate::types::Coord;

/// One connected region of free space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: usize,
    pub size: usize,
    pub food: usize,
    /// `snakes[i]` is set when snake `i` touches the region's boundary
    pub snakes: Vec<bool>,
}

impl Region {
    fn new(id: usize, snake_count: usize) -> Self {
        Region {
            id,
            size: 0,
            food: 0,
            snakes: vec![false; snake_count],
        }
    }

    /// Number of distinct snakes bounding the region
    pub fn snake_count(&self) -> usize {
        self.snakes.iter().filter(|&&s| s).count()
    }

    /// Bounded by our own snake and nothing else
    pub fn is_self_bounded(&self) -> bool {
        self.snake_count() == 1 && self.snakes.get(SELF_INDEX).copied().unwrap_or(false)
    }
}

/// Regions mapped so far this turn. Ids start at 1; `regions[id - 1]` holds region `id`.
#[derive(Debug, Default)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    pub fn new() -> Self {
        RegionMap::default()
    }

    #[cfg(test)]
    fn get(&self, id: usize) -> Option<&Region> {
        id.checked_sub(1).and_then(|i| self.regions.get(i))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.regions.len()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Returns the region containing `start`, flooding it first if no
    /// earlier call reached this cell.
    pub fn region_at(&mut self, snapshot: &mut Snapshot, start: Coord) -> &Region {
        let tagged = snapshot.grid.region(&start);
        let id = if tagged != UNASSIGNED {
            tagged
        } else {
            let id = self.regions.len() + 1;
            let mut region = Region::new(id, snapshot.snakes.len());
            region.size = map_space(snapshot, start, &mut region);
            self.regions.push(region);
            id
        };
        &self.regions[id - 1]
    }
}

/// Floods the untagged component containing `start`, tagging each cell with
/// `region.id`. Accumulates food and boundary snakes into `region` and
/// returns the number of cells claimed.
///
/// Uses an explicit stack rather than recursion. Each cell is pushed at most
/// once per neighbour, so four times the board area bounds the stack.
pub fn map_space(snapshot: &mut Snapshot, start: Coord, region: &mut Region) -> usize {
    let mut stack: Vec<Coord> = Vec::with_capacity(snapshot.grid.area() * 4);
    stack.push(start);

    let mut count = 0;
    while let Some(p) = stack.pop() {
        if snapshot.grid.region(&p) != UNASSIGNED {
            continue;
        }

        count += 1;
        snapshot.grid.set_region(&p, region.id);
        if snapshot.grid.is_food(&p) {
            region.food += 1;
        }

        for (_, neighbour) in snapshot.grid.neighbours(p) {
            match snapshot.grid.classify(&neighbour) {
                Cell::Empty | Cell::Food => stack.push(neighbour),
                Cell::Tail(i) if !snapshot.snakes[i].growing => stack.push(neighbour),
                Cell::Tail(i) | Cell::Body(i) | Cell::Head(i) => region.snakes[i] = true,
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoHistory;
    use crate::types::{Battlesnake, Board};

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health: 100,
            body: body.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        }
    }

    fn snapshot(w: i32, h: i32, turn: i32, food: &[(i32, i32)], snakes: Vec<Battlesnake>) -> Snapshot {
        let you = snakes[0].clone();
        let board = Board {
            width: w,
            height: h,
            food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
            snakes,
        };
        Snapshot::build("g", turn, &board, &you, &NoHistory, 2).unwrap()
    }

    #[test]
    fn test_open_board_is_one_self_bounded_region() {
        let mut snap = snapshot(3, 3, 5, &[(0, 0)], vec![snake("me", &[(1, 1), (1, 0)])]);
        let mut regions = RegionMap::new();

        let region = regions.region_at(&mut snap, Coord::new(0, 1)).clone();
        // Everything but our head; the tail vacates.
        assert_eq!(region.size, 8);
        assert_eq!(region.food, 1);
        assert!(region.is_self_bounded());

        // Another candidate in the same component reuses the region
        let again = regions.region_at(&mut snap, Coord::new(2, 1)).clone();
        assert_eq!(again.id, region.id);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_wall_splits_board_into_regions() {
        // Our body runs down the middle column of a 5x3 board
        let mut snap = snapshot(
            5,
            3,
            5,
            &[(4, 2)],
            vec![snake("me", &[(2, 0), (2, 1), (2, 2)])],
        );
        snap.snakes[0].growing = true;
        let mut regions = RegionMap::new();

        let left = regions.region_at(&mut snap, Coord::new(1, 0)).clone();
        let right = regions.region_at(&mut snap, Coord::new(3, 0)).clone();
        assert_ne!(left.id, right.id);
        assert_eq!(left.size, 6);
        assert_eq!(right.size, 6);
        assert_eq!(left.food, 0);
        assert_eq!(right.food, 1);
        assert!(left.is_self_bounded());
    }

    #[test]
    fn test_growing_tail_is_a_wall_and_counts_as_boundary() {
        // Rival's tail at (1,0) seals (0,0) off from the rest of a 4x1 corridor
        let mut snap = snapshot(
            4,
            1,
            5,
            &[],
            vec![snake("me", &[(3, 0)]), snake("rival", &[(2, 0), (1, 0)])],
        );
        snap.snakes[1].growing = true;
        let mut regions = RegionMap::new();

        let region = regions.region_at(&mut snap, Coord::new(0, 0)).clone();
        assert_eq!(region.size, 1);
        assert_eq!(region.snake_count(), 1);
        assert!(region.snakes[1]);
        assert!(!region.is_self_bounded());
    }

    #[test]
    fn test_vacating_tail_is_floodable() {
        let mut snap = snapshot(
            4,
            1,
            5,
            &[],
            vec![snake("me", &[(3, 0)]), snake("rival", &[(2, 0), (1, 0)])],
        );
        let mut regions = RegionMap::new();

        let region = regions.region_at(&mut snap, Coord::new(0, 0)).clone();
        assert_eq!(region.size, 2);
        assert!(region.snakes[1]);
    }

    #[test]
    fn test_every_free_cell_gets_exactly_one_region() {
        let mut snap = snapshot(
            6,
            6,
            5,
            &[(0, 5), (5, 0)],
            vec![
                snake("me", &[(2, 2), (2, 3), (2, 4), (2, 5)]),
                snake("rival", &[(4, 1), (4, 2), (4, 3), (4, 4), (4, 5)]),
            ],
        );
        let mut regions = RegionMap::new();

        let head = snap.me().head;
        let starts: Vec<Coord> = snap
            .grid
            .neighbours(head)
            .map(|(_, c)| c)
            .filter(|c| !snap.is_blocked(c))
            .collect();
        for start in starts {
            regions.region_at(&mut snap, start);
        }

        let total: usize = regions.iter().map(|r| r.size).sum();
        let mut tagged = 0;
        for x in 0..6 {
            for y in 0..6 {
                let c = Coord::new(x, y);
                let id = snap.grid.region(&c);
                if id != UNASSIGNED {
                    tagged += 1;
                    assert!(regions.get(id).is_some());
                    assert!(!snap.grid.is_solid(&c));
                }
            }
        }
        assert_eq!(tagged, total);
        // 36 cells minus 3 of our body/head and 4 of the rival's; both tails vacate
        assert_eq!(total, 36 - 3 - 4);
    }
}
