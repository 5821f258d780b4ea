#![no_main]

use arbitrary::Arbitrary;
use flexgrid_core::sim::SimHost;
use flexgrid_core::{ContainerKey, SizerOptions};
use flexgrid_web::{PointerButton, Sizer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Split(u8),
    Join(u8),
    Detach(u8),
    Remove(u8),
    InsertBefore(u8, u8),
    InsertAfter(u8, u8),
    InsertNew { index: u8, width: u8, after: bool },
    Normalize(Option<u8>),
    Refresh,
    Restart,
    Drag { handle: u8, moves: Vec<i16> },
    Resize(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    widths: Vec<u8>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let widths: Vec<f64> = input
        .widths
        .iter()
        .take(12)
        .map(|&w| f64::from(w) + 1.0)
        .collect();
    let host = SimHost::with_cells(1000.0, &widths);
    let Ok(mut sizer) = Sizer::init(ContainerKey(1), host, SizerOptions::default()) else {
        return;
    };

    for op in input.ops.into_iter().take(64) {
        let len = sizer.cells().len() + 1;
        let index = |raw: u8| usize::from(raw) % len;
        match op {
            Op::Split(i) => {
                sizer.split(index(i));
            }
            Op::Join(i) => {
                sizer.join(index(i));
            }
            Op::Detach(i) => {
                sizer.detach(index(i));
            }
            Op::Remove(i) => {
                sizer.remove(index(i));
            }
            Op::InsertBefore(i, moved) => {
                if let Some(&cell) = sizer.cells().get(index(moved)) {
                    let at = index(i);
                    sizer.insert_before(at, cell);
                }
            }
            Op::InsertAfter(i, moved) => {
                if let Some(&cell) = sizer.cells().get(index(moved)) {
                    let at = index(i);
                    sizer.insert_after(at, cell);
                }
            }
            Op::InsertNew {
                index: i,
                width,
                after,
            } => {
                let at = index(i);
                let cell = sizer
                    .host_mut()
                    .create_detached(f64::from(width) + 1.0, None);
                if after {
                    sizer.insert_after(at, cell);
                } else {
                    sizer.insert_before(at, cell);
                }
            }
            Op::Normalize(i) => {
                let i = i.map(index);
                sizer.normalize(i);
            }
            Op::Refresh => sizer.refresh(),
            Op::Restart => sizer.restart(),
            Op::Drag { handle, moves } => {
                let handle = index(handle);
                let start = 500.0;
                sizer.pointer_down(handle, 1, PointerButton::Primary, start);
                let mut x = start;
                for offset in moves.into_iter().take(16) {
                    x = start + f64::from(offset);
                    sizer.pointer_move(1, x);
                }
                sizer.pointer_up(1, PointerButton::Primary, x);
            }
            Op::Resize(outer) => {
                sizer.host_mut().set_outer_width(f64::from(outer.max(100)));
                sizer.refresh();
            }
        }

        assert!(!sizer.is_dragging(), "gesture left open");
    }

    // Every row fills the container up to one display step per cell.
    sizer.refresh();
    let precision = sizer.options().precision;
    let nominal = sizer.converter().nominal_width(precision);
    for row in sizer.grid() {
        let total: i64 = row.iter().map(|length| length.value.rescale(precision).scaled()).sum();
        let slack = i64::try_from(row.len()).unwrap_or(i64::MAX);
        if row.is_empty() {
            continue;
        }
        let overflow_row = row.len() == 1;
        assert!(
            overflow_row || (total - nominal.scaled()).abs() <= slack,
            "row {row:?} sums to {total}, expected {}",
            nominal.scaled()
        );
    }
});
