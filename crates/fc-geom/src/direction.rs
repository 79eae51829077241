//! Cardinal directions and direction-based edge lookup

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::Tolerance;
use crate::edge::Edge;

/// One of the four screen-aligned directions (y-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn unit_vector(self) -> DVec2 {
        match self {
            Direction::Up => DVec2::Y,
            Direction::Down => DVec2::NEG_Y,
            Direction::Left => DVec2::NEG_X,
            Direction::Right => DVec2::X,
        }
    }

    /// Next direction a quarter turn counter-clockwise
    pub fn rotated_ccw(self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Rotate by a signed number of quarter turns (positive is counter-clockwise)
    pub fn rotated_quarters(self, quarters: i32) -> Self {
        (0..quarters.rem_euclid(4)).fold(self, |d, _| d.rotated_ccw())
    }

    pub fn opposite(self) -> Self {
        self.rotated_quarters(2)
    }

    /// Left or Right
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Nearest cardinal direction to `v`; `None` for the zero vector
    pub fn from_vector(v: DVec2) -> Option<Self> {
        if v == DVec2::ZERO || !v.is_finite() {
            return None;
        }
        Self::ALL
            .into_iter()
            .max_by(|a, b| a.unit_vector().dot(v).total_cmp(&b.unit_vector().dot(v)))
    }
}

/// Locates the edge of a closed loop facing a given direction
pub struct EdgeFinder;

impl EdgeFinder {
    /// Index of the edge whose outward normal best faces `direction`.
    ///
    /// Outward is resolved from the loop's winding. When several edges face
    /// the direction equally (within `tol.parallel`), the one lying furthest
    /// along it wins.
    pub fn find_index(direction: Direction, edges: &[Edge], tol: &Tolerance) -> Option<usize> {
        let dir = direction.unit_vector();
        let ccw = signed_area(edges) >= 0.0;

        let mut best: Option<(usize, f64, f64)> = None;
        for (i, edge) in edges.iter().enumerate() {
            let chord = edge.chord();
            let right = chord.normal();
            if right == DVec2::ZERO {
                continue;
            }
            let outward = if ccw { right } else { -right };
            let facing = outward.dot(dir);
            let reach = edge.middle().dot(dir);

            let better = match best {
                None => true,
                Some((_, f, r)) => {
                    facing > f + tol.parallel || ((facing - f).abs() <= tol.parallel && reach > r)
                }
            };
            if better {
                best = Some((i, facing, reach));
            }
        }
        best.map(|(i, _, _)| i)
    }
}

/// Shoelace area over edge start points (positive for counter-clockwise)
pub(crate) fn signed_area(edges: &[Edge]) -> f64 {
    let n = edges.len();
    (0..n)
        .map(|i| edges[i].start().perp_dot(edges[(i + 1) % n].start()))
        .sum::<f64>()
        * 0.5
}
