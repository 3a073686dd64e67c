//! Mapping boxes onto the cell grid

use crate::document::Bounds;

use super::CellGrid;

/// Grid address of a box: its first cell and the minimal range it spans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellRef {
    pub cell: Option<String>,
    pub range: Option<String>,
}

impl CellGrid {
    /// Locate a box on the grid.
    ///
    /// Overlap is strict on both axes: touching a column or row edge does not
    /// count. A box outside every column or every row has no address.
    pub fn locate(&self, bounds: &Bounds) -> CellRef {
        let cols = span(&self.columns, |c| bounds.left < c.right && bounds.right > c.left);
        let rows = span(&self.rows, |r| bounds.top > r.bottom && bounds.bottom < r.top);

        let (Some((first_col, last_col)), Some((first_row, last_row))) = (cols, rows) else {
            return CellRef::default();
        };

        let start = self.cell_name(first_col, first_row);
        let range = if first_col == last_col && first_row == last_row {
            start.clone()
        } else {
            format!("{}:{}", start, self.cell_name(last_col, last_row))
        };

        CellRef {
            cell: Some(start),
            range: Some(range),
        }
    }

    /// Column label followed by row label, e.g. `B` + `3` = `B3`
    fn cell_name(&self, col: usize, row: usize) -> String {
        format!("{}{}", self.columns[col].name, self.rows[row].name)
    }
}

/// First and last index whose entry satisfies `overlaps`
fn span<T>(entries: &[T], overlaps: impl Fn(&T) -> bool) -> Option<(usize, usize)> {
    let mut found: Option<(usize, usize)> = None;
    for (i, entry) in entries.iter().enumerate() {
        if overlaps(entry) {
            found = Some(match found {
                Some((first, _)) => (first, i),
                None => (i, i),
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Column, Row};

    /// x-guides {0, 10, 20} labeled A, B, C and y-guides {100, 90, 80}
    fn abc_grid() -> CellGrid {
        CellGrid {
            columns: vec![
                Column { name: "A".into(), left: 0.0, right: 10.0 },
                Column { name: "B".into(), left: 10.0, right: 20.0 },
            ],
            rows: vec![
                Row { name: "1".into(), top: 100.0, bottom: 90.0 },
                Row { name: "2".into(), top: 90.0, bottom: 80.0 },
            ],
        }
    }

    #[test]
    fn test_single_cell() {
        let r = abc_grid().locate(&Bounds::new(5.0, 95.0, 8.0, 92.0));
        assert_eq!(r.cell.as_deref(), Some("A1"));
        assert_eq!(r.range.as_deref(), Some("A1"));
    }

    #[test]
    fn test_cell_range() {
        let r = abc_grid().locate(&Bounds::new(5.0, 95.0, 15.0, 85.0));
        assert_eq!(r.cell.as_deref(), Some("A1"));
        assert_eq!(r.range.as_deref(), Some("A1:B2"));
    }

    #[test]
    fn test_touching_edge_is_not_overlap() {
        // Right edge sits exactly on the A/B boundary
        let r = abc_grid().locate(&Bounds::new(2.0, 95.0, 10.0, 92.0));
        assert_eq!(r.range.as_deref(), Some("A1"));
        // Bottom edge exactly on the 1/2 boundary
        let r = abc_grid().locate(&Bounds::new(12.0, 99.0, 18.0, 90.0));
        assert_eq!(r.range.as_deref(), Some("B1"));
    }

    #[test]
    fn test_outside_grid() {
        let grid = abc_grid();
        assert_eq!(grid.locate(&Bounds::new(30.0, 95.0, 40.0, 92.0)), CellRef::default());
        assert_eq!(grid.locate(&Bounds::new(5.0, 200.0, 8.0, 150.0)), CellRef::default());
        assert_eq!(CellGrid::default().locate(&Bounds::new(5.0, 95.0, 8.0, 92.0)), CellRef::default());
    }

    #[test]
    fn test_arbitrary_labels() {
        let grid = CellGrid {
            columns: vec![Column { name: "left-".into(), left: 0.0, right: 10.0 }],
            rows: vec![Row { name: "".into(), top: 10.0, bottom: 0.0 }],
        };
        let r = grid.locate(&Bounds::new(1.0, 9.0, 2.0, 8.0));
        assert_eq!(r.cell.as_deref(), Some("left-"));
    }

    #[test]
    fn test_duplicate_labels_still_form_range() {
        let grid = CellGrid {
            columns: vec![
                Column { name: "A".into(), left: 0.0, right: 10.0 },
                Column { name: "A".into(), left: 10.0, right: 20.0 },
            ],
            rows: vec![Row { name: "1".into(), top: 10.0, bottom: 0.0 }],
        };
        let r = grid.locate(&Bounds::new(5.0, 9.0, 15.0, 1.0));
        assert_eq!(r.range.as_deref(), Some("A1:A1"));
    }
}
