//! Unit tests for category export files.

use bookmark_lists::services::export_service::{export_category, file_stem_for, remove_export};
use bookmark_lists::types::category::{CategorySnapshot, ExportedBookmark};
use bookmark_lists::types::errors::ExportError;
use tempfile::TempDir;

fn snapshot(name: &str) -> CategorySnapshot {
    CategorySnapshot {
        name: name.to_string(),
        visible: false,
        bookmarks: vec![
            ExportedBookmark {
                name: "Harbour".to_string(),
                latitude: 53.54,
                longitude: 9.98,
            },
            ExportedBookmark {
                name: "Station".to_string(),
                latitude: 53.55,
                longitude: 10.0,
            },
        ],
    }
}

#[tokio::test]
async fn test_export_writes_named_json_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("exports");

    let path = export_category(&snapshot("Hamburg"), &dir).await.unwrap();
    assert_eq!(path, dir.join("Hamburg.json"));

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: CategorySnapshot = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, snapshot("Hamburg"));
}

#[tokio::test]
async fn test_export_sanitizes_file_name() {
    let tmp = TempDir::new().unwrap();
    let path = export_category(&snapshot("Trips/2024"), tmp.path()).await.unwrap();
    assert_eq!(path.file_name().unwrap(), "Trips_2024.json");
}

#[tokio::test]
async fn test_export_overwrites_previous_file() {
    let tmp = TempDir::new().unwrap();
    let first = export_category(&snapshot("Same"), tmp.path()).await.unwrap();
    let mut changed = snapshot("Same");
    changed.bookmarks.clear();
    let second = export_category(&changed, tmp.path()).await.unwrap();

    assert_eq!(first, second);
    let content = std::fs::read_to_string(&second).unwrap();
    assert!(!content.contains("Harbour"));
}

#[tokio::test]
async fn test_export_into_file_path_fails() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();

    let err = export_category(&snapshot("A"), &blocker).await.unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}

#[tokio::test]
async fn test_remove_export_tolerates_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = export_category(&snapshot("Gone"), tmp.path()).await.unwrap();
    remove_export(&path).await.unwrap();
    assert!(!path.exists());
    remove_export(&path).await.unwrap();
}

#[test]
fn test_file_stem_keeps_unicode() {
    assert_eq!(file_stem_for("Café Berlin"), "Café Berlin");
    assert_eq!(file_stem_for("a|b"), "a_b");
}
