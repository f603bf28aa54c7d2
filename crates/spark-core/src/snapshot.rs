use crate::field::{PotentialField, Position};
use serde::{Deserialize, Serialize};

/// Half-width of the emitted window; the window spans `-2..=2` on both axes.
pub const WINDOW_RADIUS: i32 = 2;
pub const WINDOW_SIDE: usize = (2 * WINDOW_RADIUS + 1) as usize;
pub const WINDOW_CELLS: usize = WINDOW_SIDE * WINDOW_SIDE;

/// One outbound record: `{x, y, weight}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparkWeight {
    pub x: i32,
    pub y: i32,
    pub weight: f64,
}

impl SparkWeight {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// 5x5 neighborhood of the field around one tick's activated cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotWindow {
    pub tick: usize,
    pub center: Position,
    /// `false` when the tick could not grow and re-emitted the previous center.
    pub grew: bool,
    /// Row-major: y outer, x inner, both from -2 to +2.
    pub cells: [SparkWeight; WINDOW_CELLS],
}

impl SnapshotWindow {
    pub fn capture(field: &PotentialField, tick: usize, center: Position, grew: bool) -> Self {
        let mut cells = [SparkWeight {
            x: 0,
            y: 0,
            weight: 0.0,
        }; WINDOW_CELLS];
        let corner = center.offset(-WINDOW_RADIUS, -WINDOW_RADIUS);
        for (i, cell) in cells.iter_mut().enumerate() {
            let pos = corner.offset((i % WINDOW_SIDE) as i32, (i / WINDOW_SIDE) as i32);
            *cell = SparkWeight {
                x: pos.x,
                y: pos.y,
                weight: field.get(pos),
            };
        }
        Self {
            tick,
            center,
            grew,
            cells,
        }
    }

    pub fn weight_at(&self, pos: Position) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.x == pos.x && c.y == pos.y)
            .map(|c| c.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_row_major_around_center() {
        let field = PotentialField::seeded(10, 10, Position::new(5, 5));
        let window = SnapshotWindow::capture(&field, 0, Position::new(5, 5), true);

        assert_eq!(window.cells[0].position(), Position::new(3, 3));
        assert_eq!(window.cells[1].position(), Position::new(4, 3));
        assert_eq!(window.cells[5].position(), Position::new(3, 4));
        assert_eq!(window.cells[12].position(), Position::new(5, 5));
        assert_eq!(window.cells[24].position(), Position::new(7, 7));
        assert_eq!(window.cells[12].weight, 1.0);
        assert_eq!(
            window.cells.iter().filter(|c| c.weight != 0.0).count(),
            1
        );
    }

    #[test]
    fn window_reports_zero_outside_the_grid() {
        let field = PotentialField::seeded(10, 10, Position::new(0, 0));
        let window = SnapshotWindow::capture(&field, 3, Position::new(0, 0), true);
        assert_eq!(window.weight_at(Position::new(-2, -2)), Some(0.0));
        assert_eq!(window.weight_at(Position::new(0, 0)), Some(1.0));
        assert_eq!(window.weight_at(Position::new(3, 0)), None);
    }

    #[test]
    fn records_serialize_as_plain_triples() {
        let record = SparkWeight {
            x: 4,
            y: -1,
            weight: 0.25,
        };
        let json = serde_json::to_value(record).expect("serialize");
        assert_eq!(json, serde_json::json!({"x": 4, "y": -1, "weight": 0.25}));
    }
}
