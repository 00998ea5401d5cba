//! Property-based invariant tests for zone geometry and the layout document.
//!
//! 1. `Rect::clamped` always yields a valid rectangle
//! 2. Drag positions keep the zone fully on the canvas
//! 3. Resizes never produce an invalid rectangle, whatever the input
//! 4. Resizing is deterministic
//! 5. Arbitrary document operation sequences never break the invariants

use layout_core::{
    compute_drag_position, compute_resize, ContentType, DisplayId, LayoutDocument, Point, Rect,
    ResizeHandle, ZoneId, ZoneUpdate, CANVAS_EXTENT,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn coord() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -200.0f64..300.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn any_rect() -> impl Strategy<Value = Rect> {
    (coord(), coord(), coord(), coord()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn valid_rect() -> impl Strategy<Value = Rect> {
    any_rect().prop_map(Rect::clamped)
}

fn handle() -> impl Strategy<Value = ResizeHandle> {
    prop::sample::select(ResizeHandle::ALL.to_vec())
}

fn point() -> impl Strategy<Value = Point> {
    (-150.0f64..250.0, -150.0f64..250.0).prop_map(|(x, y)| Point::new(x, y))
}

#[derive(Debug, Clone)]
enum Op {
    AddZone(Point),
    MoveZone(u64, Rect),
    DeleteZone(u64),
    AddDisplay,
    RemoveDisplay(u64),
    SwitchDisplay(usize),
    SetPrimary(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        point().prop_map(Op::AddZone),
        (1u64..12, any_rect()).prop_map(|(id, r)| Op::MoveZone(id, r)),
        (1u64..12).prop_map(Op::DeleteZone),
        Just(Op::AddDisplay),
        (1u64..6).prop_map(Op::RemoveDisplay),
        (0usize..6).prop_map(Op::SwitchDisplay),
        (1u64..6).prop_map(Op::SetPrimary),
    ]
}

fn apply(doc: &mut LayoutDocument, op: &Op) {
    match op {
        Op::AddZone(p) => {
            let display = doc.current_display().id;
            doc.add_zone(Some(display), ContentType::Text, *p);
        }
        Op::MoveZone(id, r) => {
            doc.update_zone(ZoneId(*id), ZoneUpdate::with_rect(*r));
        }
        Op::DeleteZone(id) => {
            doc.delete_zone(ZoneId(*id));
        }
        Op::AddDisplay => {
            doc.add_display();
        }
        Op::RemoveDisplay(id) => {
            doc.remove_display(DisplayId(*id));
        }
        Op::SwitchDisplay(index) => {
            doc.switch_display(*index);
        }
        Op::SetPrimary(id) => {
            doc.set_primary(DisplayId(*id));
        }
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn clamped_is_always_valid(r in any_rect()) {
        prop_assert!(r.clamped().is_valid(), "{:?} clamped to {:?}", r, r.clamped());
    }

    #[test]
    fn clamping_a_valid_rect_is_identity(r in valid_rect()) {
        prop_assert_eq!(r.clamped(), r);
    }

    #[test]
    fn drag_stays_on_canvas(r in valid_rect(), pointer in point(), grab in point()) {
        let origin = compute_drag_position(&r, pointer, grab);
        let moved = Rect::new(origin.x, origin.y, r.width, r.height);
        prop_assert!(moved.is_valid(), "{:?}", moved);
        prop_assert!(moved.right() <= CANVAS_EXTENT);
    }

    #[test]
    fn resize_is_always_valid(r in any_rect(), h in handle(), dx in coord(), dy in coord()) {
        let out = compute_resize(&r, h, Point::new(dx, dy));
        prop_assert!(out.is_valid(), "{:?} via {:?} -> {:?}", r, h, out);
    }

    #[test]
    fn resize_is_deterministic(r in valid_rect(), h in handle(), d in point()) {
        prop_assert_eq!(compute_resize(&r, h, d), compute_resize(&r, h, d));
    }

    #[test]
    fn document_invariants_survive_any_sequence(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut doc = LayoutDocument::new();
        for op in &ops {
            apply(&mut doc, op);
            prop_assert!(doc.check_invariants().is_ok(), "after {:?}: {:?}", op, doc.check_invariants());
        }
    }
}
