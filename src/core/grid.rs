//! Terminal Grid
//!
//! A 2D grid of cells representing the visible terminal area. Areas use
//! inclusive start and exclusive end coordinates.

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    pub fn resize(&mut self, cols: usize) {
        self.cells.resize(cols, Cell::default());
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Length of content, excluding trailing empty cells
    pub fn content_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|c| !c.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

/// The terminal grid - a 2D array of cells
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Row>,
    cols: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            cols,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Resize the grid, keeping the top-left content
    pub fn resize(&mut self, cols: usize, rows: usize) {
        for row in &mut self.rows {
            row.resize(cols);
        }
        self.rows.resize_with(rows, || Row::new(cols));
        self.cols = cols;
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Clear the rectangle `[x1, x2) x [y1, y2)`, clipped to the grid
    pub fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        let x2 = x2.min(self.cols);
        let y2 = y2.min(self.rows.len());
        for row in self.rows.iter_mut().take(y2).skip(y1) {
            for cell in row.cells.iter_mut().take(x2).skip(x1) {
                cell.clear();
            }
        }
    }

    /// Copy the `w` x `h` block at `(x, y)` to `(to_x, to_y)`.
    ///
    /// Source and destination may overlap. Parts falling outside the grid
    /// are dropped.
    pub fn move_region(&mut self, x: usize, y: usize, w: usize, h: usize, to_x: usize, to_y: usize) {
        let block: Vec<Vec<Cell>> = (y..y + h)
            .map(|row| {
                (x..x + w)
                    .map(|col| self.cell(col, row).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        for (dy, line) in block.into_iter().enumerate() {
            for (dx, cell) in line.into_iter().enumerate() {
                if let Some(target) = self.cell_mut(to_x + dx, to_y + dy) {
                    *target = cell;
                }
            }
        }
    }

    /// Scroll rows `[y1, y2)` by `lines`, blanking the rows that open up
    pub fn scroll(&mut self, y1: usize, y2: usize, lines: usize, up: bool) {
        let y2 = y2.min(self.rows.len());
        if y1 >= y2 {
            return;
        }
        let lines = lines.min(y2 - y1);
        let region = &mut self.rows[y1..y2];

        if up {
            region.rotate_left(lines);
            let len = region.len();
            for row in &mut region[len - lines..] {
                row.clear();
            }
        } else {
            region.rotate_right(lines);
            for row in &mut region[..lines] {
                row.clear();
            }
        }
    }
}
