//! Editor Integration Tests
//!
//! Drives an `EditorSession` the way a canvas front end would:
//! - Gesture sequences (pan, zoom, move, scale, taps)
//! - Drops and background fetches
//! - Undo/redo across whole gestures
//! - Persistence through the document library

use emojiart_core::{
    Background, BackgroundImage, ChangeEvent, Document, DocumentLibrary, DropOffer, EditorConfig,
    EditorSession, FetchStatus, Gesture, GesturePhase, ImageSource, InputEvent, ItemId, Point,
    Size, Vector,
};
use std::sync::{Arc, Mutex};
use url::Url;

const VIEWPORT: Size = Size::new(800.0, 600.0);

/// View point of the document origin for an untransformed canvas.
const CENTER: Point = Point::new(400.0, 300.0);

fn url_background(s: &str) -> Background {
    Background::Url(Url::parse(s).expect("valid url"))
}

fn image(width: u32, height: u32) -> BackgroundImage {
    BackgroundImage {
        width,
        height,
        rgba: vec![255; (width * height * 4) as usize].into(),
    }
}

fn drag(session: &mut EditorSession, to: Vector) {
    session.handle_gesture(&Gesture::drag(GesturePhase::Began, Vector::ZERO));
    session.handle_gesture(&Gesture::drag(GesturePhase::Changed, to.scaled(0.5)));
    session.handle_gesture(&Gesture::drag(GesturePhase::Ended, to));
}

fn pinch(session: &mut EditorSession, scale: f64) {
    session.handle_gesture(&Gesture::pinch(GesturePhase::Began, 1.0));
    session.handle_gesture(&Gesture::pinch(GesturePhase::Changed, scale));
    session.handle_gesture(&Gesture::pinch(GesturePhase::Ended, scale));
}

// ============================================================================
// Document Scenarios
// ============================================================================

#[test]
fn test_ids_are_never_reused() {
    let mut session = EditorSession::new(VIEWPORT);
    let ghost = session.add_item("👻", (0, 0), 80).expect("ghost");
    let pumpkin = session.add_item("🎃", (0, 0), 40).expect("pumpkin");
    assert_eq!(ghost, ItemId::from_raw(1));
    assert_eq!(pumpkin, ItemId::from_raw(2));

    assert!(session.delete_item(ghost));
    let clown = session.add_item("🤡", (0, 0), 30).expect("clown");
    assert_eq!(clown, ItemId::from_raw(3));
}

#[test]
fn test_mutations_on_deleted_item_are_silent() {
    let mut session = EditorSession::new(VIEWPORT);
    let id = session.add_item("🐝", (0, 0), 40).expect("added");
    session.delete_item(id);
    let revision = session.revision();

    assert!(!session.move_item(id, Vector::new(5.0, 5.0)));
    assert!(!session.scale_item(id, 2.0));
    assert!(!session.delete_item(id));
    assert_eq!(session.revision(), revision);
    assert_eq!(session.undo_description(), Some("Delete"));
}

#[test]
fn test_scale_stays_in_range() {
    let mut session = EditorSession::new(VIEWPORT);
    let id = session.add_item("🐳", (0, 0), 40).expect("added");
    session.scale_item(id, 1000.0);
    assert_eq!(session.document().item(id).map(|i| i.size), Some(600));
    session.scale_item(id, 0.0001);
    assert_eq!(session.document().item(id).map(|i| i.size), Some(10));
}

// ============================================================================
// Gesture Scenarios
// ============================================================================

#[test]
fn test_pan_and_zoom_canvas_without_selection() {
    let mut session = EditorSession::new(VIEWPORT);
    session.add_item("🐙", (0, 0), 40);

    drag(&mut session, Vector::new(100.0, 50.0));
    pinch(&mut session, 2.0);

    let transform = session.transform();
    assert_eq!(transform.pan_offset, Vector::new(100.0, 50.0));
    assert!((transform.zoom_scale - 2.0).abs() < 1e-12);

    // Canvas gestures never touch the document or undo history.
    assert_eq!(session.undo_description(), Some("Add 🐙"));
    assert_eq!(session.document().items()[0].x, 0);
}

#[test]
fn test_move_selection_is_one_undo_step() {
    let mut session = EditorSession::new(VIEWPORT);
    let a = session.add_item("🐬", (0, 0), 40).expect("a");
    let b = session.add_item("🐟", (100, 0), 40).expect("b");

    session.handle_gesture(&Gesture::tap(CENTER));
    session.handle_gesture(&Gesture::tap(Point::new(500.0, 300.0)));
    assert_eq!(session.selection().sorted(), vec![a, b]);

    drag(&mut session, Vector::new(30.0, -20.0));
    let positions: Vec<_> = session
        .document()
        .items()
        .iter()
        .map(|i| (i.x, i.y))
        .collect();
    assert_eq!(positions, vec![(30, -20), (130, -20)]);
    assert_eq!(session.undo_description(), Some("Move"));

    session.undo();
    let positions: Vec<_> = session
        .document()
        .items()
        .iter()
        .map(|i| (i.x, i.y))
        .collect();
    assert_eq!(positions, vec![(0, 0), (100, 0)]);
}

#[test]
fn test_drag_offset_accounts_for_zoom() {
    let mut session = EditorSession::new(VIEWPORT);
    pinch(&mut session, 4.0);
    let id = session.add_item("🦀", (0, 0), 40).expect("added");
    session.handle_gesture(&Gesture::tap(CENTER));

    drag(&mut session, Vector::new(40.0, 8.0));
    assert_eq!(
        session.document().item(id).map(|i| (i.x, i.y)),
        Some((10, 2))
    );
}

#[test]
fn test_scale_selection() {
    let mut session = EditorSession::new(VIEWPORT);
    let id = session.add_item("🦞", (0, 0), 40).expect("added");
    session.handle_gesture(&Gesture::tap(CENTER));

    session.handle_gesture(&Gesture::pinch(GesturePhase::Began, 1.0));
    session.handle_gesture(&Gesture::pinch(GesturePhase::Changed, 1.5));
    assert_eq!(session.item_view_size(id), Some(60.0));
    assert_eq!(session.document().item(id).map(|i| i.size), Some(40));

    session.handle_gesture(&Gesture::pinch(GesturePhase::Ended, 1.5));
    assert_eq!(session.document().item(id).map(|i| i.size), Some(60));
    assert!(session.transform().is_identity());
}

#[test]
fn test_cancelled_selection_drag_changes_nothing() {
    let mut session = EditorSession::new(VIEWPORT);
    let id = session.add_item("🦐", (0, 0), 40).expect("added");
    session.handle_gesture(&Gesture::tap(CENTER));
    let revision = session.revision();

    session.handle_gesture(&Gesture::drag(GesturePhase::Began, Vector::ZERO));
    session.handle_gesture(&Gesture::drag(GesturePhase::Changed, Vector::new(50.0, 0.0)));
    session.handle_gesture(&Gesture::drag(GesturePhase::Cancelled, Vector::new(50.0, 0.0)));

    assert_eq!(session.revision(), revision);
    assert_eq!(session.item_view_position(id), Some(CENTER));
}

#[test]
fn test_tap_on_background_clears_selection() {
    let mut session = EditorSession::new(VIEWPORT);
    let a = session.add_item("🐡", (0, 0), 40).expect("a");
    session.handle_gesture(&Gesture::tap(CENTER));
    assert!(session.selection().contains(a));

    session.handle_gesture(&Gesture::tap(Point::new(10.0, 10.0)));
    assert!(session.selection().is_empty());
}

#[test]
fn test_double_tap_zoom_to_fit() {
    let mut session = EditorSession::new(Size::new(300.0, 200.0));
    session.set_background(url_background("https://example.com/wide.png"));
    let ticket = session.take_fetch_request().expect("ticket");
    assert!(session.complete_fetch(&ticket, Some(image(600, 100))));

    drag(&mut session, Vector::new(40.0, 40.0));
    session.handle_gesture(&Gesture::double_tap(Point::new(5.0, 5.0)));

    let transform = session.transform();
    assert_eq!(transform.pan_offset, Vector::ZERO);
    assert!((transform.zoom_scale - 0.5).abs() < f64::EPSILON);
}

// ============================================================================
// Drop and Fetch
// ============================================================================

#[test]
fn test_drop_url_and_text_sets_background_only() {
    let mut session = EditorSession::new(VIEWPORT);
    session.handle_event(&InputEvent::Drop {
        x: 400.0,
        y: 300.0,
        offers: vec![
            DropOffer::Url("https://example.com/sky.jpg".into()),
            DropOffer::Text("😀".into()),
        ],
    });

    assert_eq!(
        session.document().background(),
        &url_background("https://example.com/sky.jpg")
    );
    assert!(session.document().is_empty());
}

#[test]
fn test_stale_fetch_never_shows() {
    let mut session = EditorSession::new(VIEWPORT);
    session.set_background(url_background("https://example.com/a.png"));
    let ticket_a = session.take_fetch_request().expect("a");
    session.set_background(url_background("https://example.com/b.png"));
    let ticket_b = session.take_fetch_request().expect("b");

    assert!(session.complete_fetch(&ticket_b, Some(image(2, 2))));
    assert!(!session.complete_fetch(&ticket_a, Some(image(9, 9))));
    assert_eq!(session.background_image().map(|i| i.width), Some(2));
}

#[test]
fn test_failed_fetch_reports_source() {
    let mut session = EditorSession::new(VIEWPORT);
    let bg = url_background("https://example.com/missing.png");
    session.set_background(bg.clone());
    let ticket = session.take_fetch_request().expect("ticket");
    assert_eq!(session.fetch_status(), &FetchStatus::Fetching);

    session.complete_fetch(&ticket, None);
    assert_eq!(
        session.fetch_status(),
        &FetchStatus::Failed(ImageSource::of(&bg).expect("source"))
    );
}

#[test]
fn test_events_are_published_in_order() {
    let mut session = EditorSession::new(VIEWPORT);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.subscribe(move |event, _| sink.lock().expect("lock").push(event));

    session.set_background(url_background("https://example.com/a.png"));
    assert_eq!(
        events.lock().expect("lock").as_slice(),
        &[
            ChangeEvent::Document,
            ChangeEvent::BackgroundImage,
            ChangeEvent::FetchStatus
        ]
    );
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_library_round_trip_and_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let library = DocumentLibrary::open(dir.path()).expect("library");

    let mut session = EditorSession::new(VIEWPORT);
    session.set_background(Background::ImageData(vec![1, 2, 3, 4]));
    session.add_item("🌻", (12, -7), 55);
    library.save("garden", session.document()).expect("save");

    let loaded = library.load("garden").expect("load");
    assert_eq!(&loaded, session.document());

    let mut reopened = EditorSession::open(loaded, VIEWPORT, EditorConfig::default());
    let ticket = reopened.take_fetch_request().expect("inline fetch");
    assert_eq!(ticket.background().image_data(), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(reopened.add_item("🌼", (0, 0), 40).map(ItemId::get), Some(2));
}

#[test]
fn test_malformed_document_is_an_error() {
    let result = Document::from_json(r#"{"background": {"kind": "url", "url": "::"}, "items": []}"#);
    assert!(result.is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

mod properties {
    use super::*;
    use emojiart_core::{ViewTransform, MAX_ITEM_SIZE, MIN_ITEM_SIZE};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(i32, i32),
        Delete(u64),
        Toggle(i32, i32),
        ClearTap,
        DeleteSelection,
        Undo,
        Redo,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-200i32..200, -200i32..200).prop_map(|(x, y)| Op::Add(x, y)),
            (1u64..20).prop_map(Op::Delete),
            (-200i32..200, -200i32..200).prop_map(|(x, y)| Op::Toggle(x, y)),
            Just(Op::ClearTap),
            Just(Op::DeleteSelection),
            Just(Op::Undo),
            Just(Op::Redo),
        ]
    }

    proptest! {
        #[test]
        fn prop_view_document_round_trip(
            x in -1.0e4f64..1.0e4,
            y in -1.0e4f64..1.0e4,
            pan_x in -1.0e3f64..1.0e3,
            pan_y in -1.0e3f64..1.0e3,
            zoom in 0.01f64..50.0,
        ) {
            let transform = ViewTransform::new(Vector::new(pan_x, pan_y), zoom);
            let center = Point::new(512.0, 384.0);
            let p = Point::new(x, y);
            let back = transform.to_document(transform.to_view(p, center), center);
            prop_assert!((back.x - p.x).abs() < 1e-6, "x drifted: {} vs {}", back.x, p.x);
            prop_assert!((back.y - p.y).abs() < 1e-6, "y drifted: {} vs {}", back.y, p.y);
        }

        #[test]
        fn prop_selection_only_holds_existing_items(
            ops in prop::collection::vec(arb_op(), 0..40)
        ) {
            let mut session = EditorSession::new(VIEWPORT);
            for op in ops {
                match op {
                    Op::Add(x, y) => {
                        session.add_item("🐞", (x, y), 40);
                    }
                    Op::Delete(raw) => {
                        session.delete_item(ItemId::from_raw(raw));
                    }
                    Op::Toggle(x, y) => {
                        let at = Point::new(CENTER.x + f64::from(x), CENTER.y + f64::from(y));
                        session.handle_gesture(&Gesture::tap(at));
                    }
                    Op::ClearTap => {
                        session.handle_gesture(&Gesture::tap(Point::new(-5000.0, -5000.0)));
                    }
                    Op::DeleteSelection => {
                        session.delete_selection();
                    }
                    Op::Undo => {
                        session.undo();
                    }
                    Op::Redo => {
                        session.redo();
                    }
                }
                for id in session.selection().iter() {
                    prop_assert!(session.document().contains(id), "selected {} is missing", id);
                }
            }
        }

        #[test]
        fn prop_scaled_size_stays_in_range(
            start in 10i32..=600,
            factor in prop_oneof![0.0f64..10.0, 10.0f64..1.0e6, Just(0.0001), Just(1000.0)],
        ) {
            let mut doc = Document::new();
            let id = doc.add_item("🐜", (0, 0), start);
            doc.scale_item(id, factor);
            let size = doc.item(id).map(|i| i.size).unwrap_or_default();
            prop_assert!((MIN_ITEM_SIZE..=MAX_ITEM_SIZE).contains(&size));
        }

        #[test]
        fn prop_document_json_round_trip(
            items in prop::collection::vec((-1000i32..1000, -1000i32..1000, 10i32..=600), 0..10),
            deleted in 0usize..10,
        ) {
            let mut doc = Document::new();
            let mut ids = Vec::new();
            for (x, y, size) in items {
                ids.push(doc.add_item("🦋", (x, y), size));
            }
            if let Some(id) = ids.get(deleted) {
                doc.delete_item(*id);
            }
            let json = doc.to_json().expect("serialize");
            let restored = Document::from_json(&json).expect("parse");
            prop_assert_eq!(restored, doc);
        }
    }
}
