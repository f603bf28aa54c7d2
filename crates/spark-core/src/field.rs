use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Integer grid coordinate. Used directly as the hash key of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four axis-adjacent positions: right, left, down, up.
    pub const fn neighbors4(self) -> [Position; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

/// Canonical `"x-y"` key used by hosts that index cells by string.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.x, self.y)
    }
}

/// Sparse potential field over a bounded grid.
///
/// Holds every cell that has ever been touched together with the subset of
/// cells pinned at weight 1 ("active"). Untouched cells read as 0. Bounds are
/// inclusive: `0..=width` by `0..=height`.
#[derive(Clone, Debug)]
pub struct PotentialField {
    width: i32,
    height: i32,
    weights: HashMap<Position, f64>,
    active: Vec<Position>,
    active_index: HashSet<Position>,
}

impl PotentialField {
    /// Create a field with `seed` as its only (active) cell.
    pub fn seeded(width: i32, height: i32, seed: Position) -> Self {
        let mut field = Self {
            width,
            height,
            weights: HashMap::new(),
            active: Vec::new(),
            active_index: HashSet::new(),
        };
        field.activate(seed);
        field
    }

    /// Stored weight, or 0 for cells never touched.
    pub fn get(&self, pos: Position) -> f64 {
        self.weights.get(&pos).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.weights.contains_key(&pos)
    }

    pub fn is_out_of_bounds(&self, pos: Position) -> bool {
        pos.x > self.width || pos.x < 0 || pos.y > self.height || pos.y < 0
    }

    pub fn is_active(&self, pos: Position) -> bool {
        self.active_index.contains(&pos)
    }

    /// Active cells in activation order; index 0 is the seed.
    pub fn active(&self) -> &[Position] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of cells with a stored weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, f64)> + '_ {
        self.weights.iter().map(|(pos, w)| (*pos, *w))
    }

    /// Pin `pos` at weight 1. Returns `false` if it was already active.
    pub fn activate(&mut self, pos: Position) -> bool {
        if !self.active_index.insert(pos) {
            return false;
        }
        self.weights.insert(pos, 1.0);
        self.active.push(pos);
        true
    }

    /// Positions eligible for an update around `pos`, in the fixed order
    /// `pos`, right, left, down, up.
    ///
    /// A position qualifies when it is in bounds, not active, and not in
    /// `processed` (when given). `pos` itself heads the list so that the
    /// relaxation sweep re-averages non-active trace cells; during growth
    /// `pos` is always active and therefore never returned.
    pub fn candidate_neighbors(
        &self,
        pos: Position,
        processed: Option<&HashMap<Position, f64>>,
    ) -> Vec<Position> {
        let [right, left, down, up] = pos.neighbors4();
        [pos, right, left, down, up]
            .into_iter()
            .filter(|p| {
                !self.is_active(*p)
                    && !processed.is_some_and(|done| done.contains_key(p))
                    && !self.is_out_of_bounds(*p)
            })
            .collect()
    }

    /// Mean of the four axis neighbors' current weights.
    pub fn neighbor_mean(&self, pos: Position) -> f64 {
        pos.neighbors4().iter().map(|p| self.get(*p)).sum::<f64>() / 4.0
    }

    /// One Jacobi sweep over the frontier of the trace.
    ///
    /// Every eligible candidate of every stored cell is set to the mean of its
    /// neighbors as read before the sweep. Returns the number of cells updated.
    pub fn relax(&mut self) -> usize {
        let mut updates: HashMap<Position, f64> = HashMap::with_capacity(self.weights.len() * 2);
        for pos in self.weights.keys() {
            for candidate in self.candidate_neighbors(*pos, Some(&updates)) {
                let weight = self.neighbor_mean(candidate);
                updates.insert(candidate, weight);
            }
        }
        let updated = updates.len();
        self.weights.extend(updates);
        updated
    }
}
