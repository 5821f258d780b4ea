//! End-to-end scenarios against the simulated host.
//!
//! Each test drives a sizer the way a page would (init, edits, pointer
//! gestures) and checks the rows reported by `grid()` plus the events seen
//! by a listener.

use flexgrid_core::sim::{EventRecorder, SimHost};
use flexgrid_core::{
    CellFlags, ContainerKey, GridCoord, Length, SizerEventKind, SizerOptions, Unit, UnitValue,
};
use flexgrid_web::{PointerButton, Sizer, SizerRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;

const KEY: ContainerKey = ContainerKey(1);

fn sizer_with(widths: &[f64], options: SizerOptions) -> Sizer<SimHost> {
    Sizer::init(KEY, SimHost::with_cells(1000.0, widths), options).expect("init")
}

fn rendered(sizer: &Sizer<SimHost>) -> Vec<Vec<String>> {
    sizer
        .grid()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}

fn row_totals(sizer: &Sizer<SimHost>) -> Vec<UnitValue> {
    let precision = sizer.options().precision;
    sizer
        .grid()
        .iter()
        .map(|row| {
            row.iter()
                .fold(UnitValue::zero(precision), |sum, width| sum + width.value)
        })
        .collect()
}

#[test]
fn four_cells_fill_one_row() {
    let sizer = sizer_with(&[300.0, 300.0, 300.0, 100.0], SizerOptions::default());
    assert_eq!(
        rendered(&sizer),
        vec![vec!["30.0000%", "30.0000%", "30.0000%", "10.0000%"]]
    );
}

#[test]
fn split_produces_two_full_rows() {
    let mut sizer = sizer_with(&[300.0, 300.0, 300.0, 100.0], SizerOptions::default());
    sizer.split(1).expect("split applies");
    let hundred = UnitValue::from_f64(100.0, 4);
    assert_eq!(row_totals(&sizer), vec![hundred, hundred]);
    assert_eq!(rendered(&sizer)[0], vec!["50.0000%", "50.0000%"]);
    assert_eq!(sizer.coord(2), Some(GridCoord::new(0, 1)));

    let tags = sizer
        .host()
        .cell(sizer.cells()[1])
        .expect("cell 1")
        .tags;
    assert!(tags.flags.contains(CellFlags::LAST_COLUMN));
    assert!(!tags.flags.contains(CellFlags::LAST_ROW));
}

#[test]
fn drag_by_fifty_pixels_commits_once() {
    let mut sizer = sizer_with(&[300.0, 300.0, 300.0, 100.0], SizerOptions::default());
    let recorder = EventRecorder::attach(sizer.events_mut());

    sizer.pointer_down(0, 1, PointerButton::Primary, 400.0);
    for x in [410.0, 430.0, 450.0] {
        sizer.pointer_move(1, x);
    }
    sizer.pointer_up(1, PointerButton::Primary, 450.0);

    let changes = recorder.changes();
    assert_eq!(changes.len(), 1);
    let pair = &changes[0].changes;
    assert_eq!(pair[0].after.to_string(), "35.0000%");
    assert_eq!(pair[1].after.to_string(), "25.0000%");
    assert_eq!(
        pair[0].after.value + pair[1].after.value,
        UnitValue::from_f64(60.0, 4)
    );
    let before: Vec<Option<String>> = pair
        .iter()
        .map(|change| change.before.map(|b| b.to_string()))
        .collect();
    assert_eq!(
        before,
        vec![Some("30.0000%".to_owned()), Some("30.0000%".to_owned())]
    );
}

#[test]
fn scrollbar_appearing_mid_drag_is_absorbed_by_neighbour() {
    let mut sizer = sizer_with(&[500.0, 500.0], SizerOptions::default());
    let recorder = EventRecorder::attach(sizer.events_mut());
    sizer.pointer_down(0, 1, PointerButton::Primary, 0.0);
    sizer.host_mut().set_outer_width(985.0);
    sizer.pointer_move(1, 100.0);

    let moves: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|event| event.kind() == SizerEventKind::DragMove)
        .collect();
    let gesture = moves[0].gesture().expect("gesture payload");
    assert_eq!(gesture.column.size.current, Some(600.0));
    assert_eq!(gesture.next.size.current, Some(385.0));
    assert_eq!(gesture.target.outer_width, 1000.0);
}

#[test]
fn handle_labels_follow_the_drag() {
    let mut sizer = sizer_with(&[500.0, 500.0], SizerOptions::default());
    let column = sizer.cells()[0];
    sizer.pointer_down(0, 1, PointerButton::Primary, 0.0);
    sizer.pointer_move(1, 125.0);
    let labels = sizer
        .host()
        .cell(column)
        .and_then(|cell| cell.labels.clone())
        .expect("labels written");
    assert_eq!(labels.column, "62.5%");
    assert_eq!(labels.next, "37.5%");
}

#[test]
fn em_unit_rows_sum_to_container_ems() {
    let host = SimHost::with_cells(1000.0, &[250.0, 250.0, 500.0]).with_fonts(20.0, 16.0);
    let sizer = Sizer::init(KEY, host, SizerOptions::default().with_unit(Unit::Em)).expect("init");
    assert_eq!(
        rendered(&sizer),
        vec![vec!["12.5000em", "12.5000em", "25.0000em"]]
    );
}

#[test]
fn pixel_unit_labels_without_suffix() {
    let options = SizerOptions {
        unit: Unit::Px,
        display_unit: false,
        display_precision: 0,
        ..SizerOptions::default()
    };
    let sizer = sizer_with(&[400.0, 600.0], options);
    let labels = sizer
        .host()
        .cell(sizer.cells()[0])
        .and_then(|cell| cell.labels.clone())
        .expect("labels");
    assert_eq!(labels.column, "400");
    assert_eq!(labels.next, "600");
    assert_eq!(
        sizer.width(1),
        Some(Length::new(UnitValue::from_f64(600.0, 4), Unit::Px))
    );
}

#[test]
fn class_selector_limits_managed_cells() {
    let mut host = SimHost::with_cells(1000.0, &[500.0, 100.0, 500.0]);
    let ids = host.child_ids();
    for &id in [ids[0], ids[2]].iter() {
        host.cell_mut(id).expect("cell").class = Some("cell".to_owned());
    }
    let options = SizerOptions {
        children: ".cell".to_owned(),
        ..SizerOptions::default()
    };
    let sizer = Sizer::init(KEY, host, options).expect("init");
    assert_eq!(sizer.cells(), &[ids[0], ids[2]]);
    assert!(!sizer.host().cell(ids[1]).is_some_and(|cell| cell.has_handle));
}

#[test]
fn edits_on_unlaid_cells_are_silent() {
    let mut sizer = sizer_with(&[500.0, 500.0], SizerOptions::default());
    let recorder = EventRecorder::attach(sizer.events_mut());
    assert!(sizer.join(1).is_none());
    assert!(sizer.detach(5).is_none());
    assert!(sizer.normalize(Some(5)).is_none());
    let stray = sizer.host_mut().create_detached(100.0, None);
    assert!(sizer.insert_before(5, stray).is_none());
    assert!(recorder.events().is_empty());
    assert_eq!(rendered(&sizer), vec![vec!["50.0000%", "50.0000%"]]);
}

#[test]
fn registry_round_trip_over_json() {
    let mut registry = SizerRegistry::new();
    registry
        .init_json(
            KEY,
            SimHost::with_cells(1000.0, &[250.0, 250.0, 500.0]),
            json!({ "precision": 2, "unit": "%" }),
        )
        .expect("init");
    let fresh = registry
        .get_mut(KEY)
        .expect("sizer")
        .host_mut()
        .create_detached(100.0, None);

    let event = registry
        .invoke(KEY, "insertAfter", &[json!(2), json!(fresh.0)])
        .expect("insert");
    assert_eq!(event["changes"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        registry.invoke(KEY, "grid", &[]).expect("grid"),
        json!([["18.75%", "18.75%", "37.50%", "25.00%"]])
    );
}
