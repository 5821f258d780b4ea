//! Property invariants for row reconstruction, stretch and structural edits.
//!
//! Random width sequences are pushed through the public solvers and the
//! conservation rules every row must satisfy are checked after each step.

use flexgrid_core::{CellId, GridCoord, UnitValue};
use flexgrid_layout::{Grid, GridCell, Placement, Slot, ValueGrid, stretch, total};
use proptest::prelude::*;

const PRECISION: u32 = 4;

fn nominal() -> UnitValue {
    UnitValue::from_f64(100.0, PRECISION)
}

fn full_row(raw: &[i64], first_id: u64) -> Vec<Slot> {
    let values: Vec<UnitValue> = raw
        .iter()
        .map(|&scaled| UnitValue::from_scaled(scaled, PRECISION))
        .collect();
    stretch(&values, nominal())
        .into_iter()
        .enumerate()
        .map(|(i, value)| Slot {
            cell: CellId(first_id + i as u64),
            value,
        })
        .collect()
}

fn order(grid: &ValueGrid) -> Vec<CellId> {
    grid.flatten().map(|slot| slot.cell).collect()
}

fn assert_rows_full(grid: &ValueGrid) {
    for (y, row) in grid.rows().iter().enumerate() {
        if !row.is_empty() {
            assert_eq!(grid.row_total(y), Some(nominal()), "row {y} not full");
        }
    }
}

proptest! {
    #[test]
    fn stretch_hits_target_exactly(
        raw in prop::collection::vec(0i64..5_000_000, 1..24),
        target in 0i64..10_000_000,
    ) {
        let values: Vec<UnitValue> = raw
            .iter()
            .map(|&scaled| UnitValue::from_scaled(scaled, PRECISION))
            .collect();
        let target = UnitValue::from_scaled(target, PRECISION);
        let out = stretch(&values, target);
        prop_assert_eq!(out.len(), values.len());
        prop_assert_eq!(total(&out, PRECISION), target);
    }

    #[test]
    fn reconstructed_rows_fit_container(
        widths in prop::collection::vec(1.0f64..700.0, 0..40),
        available in 200.0f64..1600.0,
    ) {
        let cells: Vec<GridCell> = widths
            .iter()
            .enumerate()
            .map(|(index, &pixels)| GridCell { index, cell: CellId(index as u64), pixels })
            .collect();
        let grid = Grid::reconstruct(cells, available);

        prop_assert!(grid.row_count() >= 1);
        prop_assert_eq!(grid.cell_count(), widths.len());
        let flat: Vec<usize> = grid.iter().map(|(_, cell)| cell.index).collect();
        prop_assert_eq!(flat, (0..widths.len()).collect::<Vec<_>>());

        for row in grid.rows() {
            let sum: f64 = row.iter().map(|cell| cell.pixels).sum();
            prop_assert!(row.len() == 1 || sum.round() <= available.round());
        }
        // Greedy: a row never had room for the first cell of the next one.
        for pair in grid.rows().windows(2) {
            let sum: f64 = pair[0].iter().map(|cell| cell.pixels).sum();
            let head = pair[1][0].pixels;
            prop_assert!((sum + head).round() > available.round());
        }
    }

    #[test]
    fn split_then_join_keeps_rows_full(
        raw in prop::collection::vec(1i64..1_000_000, 2..12),
        at in 0usize..11,
    ) {
        let at = at % (raw.len() - 1);
        let grid = ValueGrid::new(vec![full_row(&raw, 1)], nominal());

        let split = grid.split(GridCoord::new(at, 0)).expect("split inside row");
        prop_assert_eq!(split.rows().len(), 2);
        prop_assert_eq!(split.rows()[0].len(), at + 1);
        assert_rows_full(&split);
        prop_assert_eq!(order(&split), order(&grid));

        let joined = split.join(GridCoord::new(0, 1)).expect("join second row");
        prop_assert_eq!(joined.rows().len(), 1);
        assert_rows_full(&joined);
        prop_assert_eq!(order(&joined), order(&grid));
    }

    #[test]
    fn detach_and_insert_keep_rows_full(
        raw in prop::collection::vec(1i64..1_000_000, 2..12),
        at in 0usize..12,
        width in prop::option::of(0i64..2_000_000),
    ) {
        let at = at % raw.len();
        let grid = ValueGrid::new(vec![full_row(&raw, 1)], nominal());

        let detached = grid.detach(GridCoord::new(at, 0)).expect("detach existing");
        prop_assert_eq!(detached.flatten().count(), raw.len() - 1);
        assert_rows_full(&detached);

        let width = width.map(|scaled| UnitValue::from_scaled(scaled, PRECISION));
        let inserted = grid
            .insert(GridCoord::new(at, 0), Placement::After, CellId(999), width)
            .expect("insert next to existing");
        prop_assert_eq!(inserted.rows()[0][at + 1].cell, CellId(999));
        assert_rows_full(&inserted);
    }

    #[test]
    fn normalize_gives_near_equal_shares(
        raw in prop::collection::vec(1i64..1_000_000, 1..16),
    ) {
        let grid = ValueGrid::new(vec![full_row(&raw, 1)], nominal());
        let normalized = grid.normalize(None).expect("all rows");
        assert_rows_full(&normalized);
        let values: Vec<i64> = normalized.rows()[0].iter().map(|slot| slot.value.scaled()).collect();
        let min = values.iter().min().copied().unwrap_or_default();
        let max = values.iter().max().copied().unwrap_or_default();
        prop_assert!(max - min <= values.len() as i64);
    }
}
