//! Cell grid construction from guides

use tracing::debug;

use crate::config::RowLabels;
use crate::naming::Axis;

use super::{CellGrid, Column, Guide, Row};

/// Build the cell grid from collected guides.
///
/// x-guides are sorted ascending and y-guides descending (larger y is higher
/// on the page); each consecutive pair bounds one column or row. Sorting is
/// stable, and coincident guides yield zero-size cells rather than errors.
pub fn build_grid(guides: &[Guide], row_labels: RowLabels) -> CellGrid {
    let mut xs = axis_lines(guides, Axis::X);
    let mut ys = axis_lines(guides, Axis::Y);
    xs.sort_by(|a, b| a.1.total_cmp(&b.1));
    ys.sort_by(|a, b| b.1.total_cmp(&a.1));

    let columns: Vec<Column> = xs
        .windows(2)
        .map(|pair| Column {
            name: pair[0].0.to_string(),
            left: pair[0].1,
            right: pair[1].1,
        })
        .collect();

    let rows: Vec<Row> = ys
        .windows(2)
        .enumerate()
        .map(|(i, pair)| Row {
            name: match row_labels {
                RowLabels::Ordinal => (i + 1).to_string(),
                RowLabels::Guide => pair[0].0.to_string(),
            },
            top: pair[0].1,
            bottom: pair[1].1,
        })
        .collect();

    debug!(columns = columns.len(), rows = rows.len(), "built cell grid");
    CellGrid { columns, rows }
}

fn axis_lines(guides: &[Guide], axis: Axis) -> Vec<(&str, f64)> {
    guides
        .iter()
        .filter(|g| g.axis == Some(axis))
        .filter_map(|g| g.coord.map(|coord| (g.label.as_str(), coord)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Bounds, ItemId};

    fn guide(axis: Option<Axis>, label: &str, coord: f64) -> Guide {
        Guide {
            id: ItemId(0),
            name: format!("GUIDE_{label}"),
            axis,
            label: label.to_string(),
            coord: axis.map(|_| coord),
            bounds: Bounds::new(coord, coord, coord, coord),
            layer: "Guides".to_string(),
        }
    }

    #[test]
    fn test_cardinality() {
        for n in 0..5 {
            let guides: Vec<Guide> = (0..n)
                .map(|i| guide(Some(Axis::X), &i.to_string(), i as f64 * 10.0))
                .collect();
            let grid = build_grid(&guides, RowLabels::Ordinal);
            assert_eq!(grid.columns.len(), n.max(1) - 1);
            assert!(grid.rows.is_empty());
        }
    }

    #[test]
    fn test_columns_sorted_ascending() {
        let guides = vec![
            guide(Some(Axis::X), "C", 20.0),
            guide(Some(Axis::X), "A", 0.0),
            guide(Some(Axis::X), "B", 10.0),
        ];
        let grid = build_grid(&guides, RowLabels::Ordinal);
        assert_eq!(
            grid.columns,
            vec![
                Column { name: "A".into(), left: 0.0, right: 10.0 },
                Column { name: "B".into(), left: 10.0, right: 20.0 },
            ]
        );
    }

    #[test]
    fn test_rows_sorted_descending() {
        let guides = vec![
            guide(Some(Axis::Y), "b", 80.0),
            guide(Some(Axis::Y), "t", 100.0),
            guide(Some(Axis::Y), "m", 90.0),
        ];
        let grid = build_grid(&guides, RowLabels::Ordinal);
        assert_eq!(
            grid.rows,
            vec![
                Row { name: "1".into(), top: 100.0, bottom: 90.0 },
                Row { name: "2".into(), top: 90.0, bottom: 80.0 },
            ]
        );
        assert!(grid.rows.windows(2).all(|w| w[0].top >= w[1].top));

        let labeled = build_grid(&guides, RowLabels::Guide);
        let names: Vec<&str> = labeled.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["t", "m"]);
    }

    #[test]
    fn test_unresolved_guides_excluded() {
        let guides = vec![
            guide(Some(Axis::X), "A", 0.0),
            guide(None, "odd", 5.0),
            guide(Some(Axis::X), "B", 10.0),
        ];
        let grid = build_grid(&guides, RowLabels::Ordinal);
        assert_eq!(grid.columns.len(), 1);
        assert_eq!(grid.columns[0].right, 10.0);
    }

    #[test]
    fn test_coincident_guides_make_degenerate_cell() {
        let guides = vec![
            guide(Some(Axis::X), "A", 10.0),
            guide(Some(Axis::X), "B", 10.0),
            guide(Some(Axis::X), "C", 20.0),
        ];
        let grid = build_grid(&guides, RowLabels::Ordinal);
        assert_eq!(grid.columns.len(), 2);
        assert_eq!(grid.columns[0].left, grid.columns[0].right);
        // Stable sort keeps document order for ties
        assert_eq!(grid.columns[0].name, "A");
    }
}
