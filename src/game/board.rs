//! The 19x19 stone grid and win-line scanning.

use super::types::{Cell, Color, Point, BOARD_SIZE, WIN_LENGTH};

/// Scan directions in the order wins are reported: horizontal, vertical,
/// diagonal down-right, diagonal up-right.
const LINE_DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Convert signed coordinates to a board point, or None if off the board.
    pub fn point(x: i64, y: i64) -> Option<Point> {
        let size = BOARD_SIZE as i64;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some(Point::new(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Cell at (x, y); None when off the board.
    pub fn get(&self, x: i64, y: i64) -> Option<Cell> {
        Self::point(x, y).map(|p| self.cells[p.y][p.x])
    }

    pub fn cell(&self, point: Point) -> Cell {
        self.cells[point.y][point.x]
    }

    pub fn is_empty_at(&self, point: Point) -> bool {
        self.cell(point) == Cell::Empty
    }

    /// Put a stone on an empty cell. Returns false (and changes nothing) if
    /// the cell is occupied.
    pub fn place(&mut self, point: Point, color: Color) -> bool {
        if !self.is_empty_at(point) {
            return false;
        }
        self.cells[point.y][point.x] = Cell::Stone(color);
        true
    }

    pub fn stone_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c != Cell::Empty)
            .count()
    }

    /// Look for a line of at least WIN_LENGTH `color` stones through `origin`.
    ///
    /// Only the first qualifying direction in LINE_DIRECTIONS order is
    /// returned, ordered from the negative end to the positive end.
    pub fn find_win_line(&self, origin: Point, color: Color) -> Option<Vec<Point>> {
        LINE_DIRECTIONS.iter().find_map(|&(dx, dy)| {
            let line = self.collect_line(origin, color, dx, dy);
            (line.len() >= WIN_LENGTH).then_some(line)
        })
    }

    fn collect_line(&self, origin: Point, color: Color, dx: i64, dy: i64) -> Vec<Point> {
        let stone = Cell::Stone(color);
        let walk = |sx: i64, sy: i64| {
            let mut points = Vec::new();
            let (mut x, mut y) = (origin.x as i64 + sx, origin.y as i64 + sy);
            while self.get(x, y) == Some(stone) {
                points.push(Point::new(x as usize, y as usize));
                x += sx;
                y += sy;
            }
            points
        };

        let backward = walk(-dx, -dy);
        let forward = walk(dx, dy);

        let mut line = Vec::with_capacity(backward.len() + 1 + forward.len());
        line.extend(backward.into_iter().rev());
        line.push(origin);
        line.extend(forward);
        line
    }
}
