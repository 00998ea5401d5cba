//! End-to-end editing session: build a two-display layout with pointer
//! gestures, save it to a JSON file repository and open it again.

use std::sync::Arc;

use layout_core::{
    CanvasMetrics, ContentType, DisplayId, Point, Rect, ResizeHandle, SurfacePoint, SurfaceState,
    ZoneUpdate,
};
use layout_editor::application::edit_layout::{EditLayoutUseCase, SessionSettings};
use layout_editor::application::save_layout::{SaveLayoutUseCase, SaveOutcome};
use layout_editor::infrastructure::storage::file_repository::JsonFileRepository;

const METRICS: CanvasMetrics = CanvasMetrics::new(1000.0, 500.0);

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("layout_editing_{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn test_edit_save_and_reopen() {
    // Arrange
    let dir = temp_dir();
    let saver = SaveLayoutUseCase::new(Arc::new(JsonFileRepository::new(&dir)));
    let mut session = EditLayoutUseCase::new(SurfaceState::new(), SessionSettings::default());
    session.set_details("Lobby", "Two screens by the entrance");

    // Act: a video zone on display 1, dragged to the top-left corner.
    let video = session.drop_zone(ContentType::Video, Point::new(50.0, 50.0));
    session.pointer_down(video.id, None, SurfacePoint::new(500.0, 250.0), METRICS);
    session.pointer_move(SurfacePoint::new(0.0, 0.0), METRICS);
    session.pointer_up();

    // A ticker on display 2, stretched from its south-east corner.
    session.add_display();
    assert!(session.switch_display(1));
    let ticker = session.drop_zone(ContentType::Ticker, Point::new(50.0, 50.0));
    session.pointer_down(ticker.id, Some(ResizeHandle::Se), SurfacePoint::new(600.0, 300.0), METRICS);
    session.pointer_move(SurfacePoint::new(800.0, 350.0), METRICS);
    session.pointer_up();
    session.update_zone(
        ticker.id,
        ZoneUpdate {
            name: Some("Headlines".to_string()),
            ..ZoneUpdate::default()
        },
    );

    let outcome = saver.save(session.document(), None).await.unwrap();
    let SaveOutcome::Created(id) = outcome else {
        panic!("first save must create");
    };
    let reopened = saver.load(&id).await.unwrap();

    // Assert
    let video = reopened.zone(video.id).unwrap();
    assert_eq!(video.rect, Rect::new(0.0, 0.0, 20.0, 20.0));
    assert_eq!(video.display_id, Some(DisplayId(1)));

    let ticker = reopened.zone(ticker.id).unwrap();
    assert_eq!(ticker.name, "Headlines");
    assert_eq!(ticker.rect, Rect::new(40.0, 40.0, 40.0, 30.0));
    assert_eq!(ticker.display_id, Some(DisplayId(2)));

    assert_eq!(reopened.displays().len(), 2);
    assert_eq!(reopened.description(), "Two screens by the entrance");
    assert_eq!(reopened.zones_for_display(DisplayId(1)).len(), 1);
    reopened.check_invariants().unwrap();

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_resave_replaces_same_file() {
    let dir = temp_dir();
    let saver = SaveLayoutUseCase::new(Arc::new(JsonFileRepository::new(&dir)));
    let mut session = EditLayoutUseCase::new(SurfaceState::new(), SessionSettings::default());
    session.set_details("Menu", "");
    session.drop_zone(ContentType::Image, Point::new(50.0, 50.0));

    let id = saver.save(session.document(), None).await.unwrap().id().clone();
    session.set_layout_id(id.clone());
    session.drop_zone(ContentType::Clock, Point::new(90.0, 10.0));
    let second = saver.save(session.document(), session.layout_id()).await.unwrap();

    assert_eq!(second, SaveOutcome::Replaced(id.clone()));
    assert_eq!(saver.load(&id).await.unwrap().zones().len(), 2);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_removed_display_zones_survive_save() {
    let dir = temp_dir();
    let saver = SaveLayoutUseCase::new(Arc::new(JsonFileRepository::new(&dir)));
    let mut session = EditLayoutUseCase::new(SurfaceState::new(), SessionSettings::default());
    session.set_details("Orphans", "");
    let second = session.add_display();
    session.switch_display(1);
    let zone = session.drop_zone(ContentType::Weather, Point::new(50.0, 50.0));

    assert!(session.remove_display(second.id));
    assert!(session.document().active_zones().is_empty());

    let id = saver.save(session.document(), None).await.unwrap().id().clone();
    let reopened = saver.load(&id).await.unwrap();

    assert_eq!(reopened.zone(zone.id).unwrap().display_id, Some(second.id));
    assert!(reopened.active_zones().is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
