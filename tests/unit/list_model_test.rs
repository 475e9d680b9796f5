//! Unit tests for the list presentation model.
//!
//! Each test builds a fresh in-memory store (which always starts with the
//! default "My Places" category) and a model over it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bookmark_lists::database::Database;
use bookmark_lists::managers::category_manager::{CategoryManager, CategoryStore};
use bookmark_lists::presentation::{ListPresentationModel, ModelConfig, ShareOutcome, SharedStore};
use bookmark_lists::types::errors::{CategoryError, ValidationError};
use bookmark_lists::types::section::{IndexPath, SectionKind, ViewUpdate};
use rstest::rstest;
use tempfile::TempDir;

type Model = ListPresentationModel<CategoryManager>;

/// Helper: store with "My Places" plus `extra`, and a model with 1..=20 char names.
fn setup(extra: &[&str]) -> (SharedStore<CategoryManager>, Model, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db = Rc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    let store = Rc::new(RefCell::new(CategoryManager::open(db, "My Places").unwrap()));
    for name in extra {
        store.borrow_mut().create_category(name).unwrap();
    }
    let config = ModelConfig {
        min_category_name_length: 1,
        max_category_name_length: 20,
        notifications_prompt_visible: true,
        export_dir: tmp.path().join("exports"),
    };
    let model = ListPresentationModel::new(store.clone(), config);
    (store, model, tmp)
}

fn names(model: &Model) -> Vec<String> {
    (0..model.number_of_rows(SectionKind::Categories))
        .map(|row| model.category(row).unwrap().name)
        .collect()
}

// ─── Section/row model ───

#[test]
fn test_rows_follow_live_category_count() {
    let (store, model, _tmp) = setup(&["A", "B"]);
    assert_eq!(model.number_of_rows(SectionKind::Categories), 3);
    assert_eq!(model.number_of_rows(SectionKind::Actions), 1);
    assert_eq!(model.number_of_rows(SectionKind::Notifications), 1);
    assert_eq!(model.number_of_sections(), 3);

    // Read-through: a change made behind the model's back shows up immediately
    store.borrow_mut().create_category("C").unwrap();
    assert_eq!(model.number_of_rows(SectionKind::Categories), 4);
}

#[test]
fn test_section_types_in_fixed_order() {
    let (_store, model, _tmp) = setup(&[]);
    assert_eq!(model.section_type(0), Some(SectionKind::Categories));
    assert_eq!(model.section_type(1), Some(SectionKind::Actions));
    assert_eq!(model.section_type(2), Some(SectionKind::Notifications));
    assert_eq!(model.section_type(3), None);
}

#[test]
fn test_delete_affordance_requires_two_categories() {
    let (_store, model, _tmp) = setup(&[]);
    assert!(!model.can_delete_categories());

    let (_store, model, _tmp) = setup(&["A"]);
    assert!(model.can_delete_categories());
}

#[test]
fn test_category_out_of_range_fails_loudly() {
    let (_store, model, _tmp) = setup(&[]);
    match model.category(5) {
        Err(CategoryError::OutOfRange { index, count }) => {
            assert_eq!(index, 5);
            assert_eq!(count, 1);
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
}

#[test]
fn test_action_row() {
    let (_store, model, _tmp) = setup(&[]);
    assert!(model.action(0).is_ok());
    assert!(matches!(model.action(1), Err(CategoryError::OutOfRange { .. })));
}

// ─── Validation ───

#[rstest]
#[case("", false)]
#[case("   ", false)]
#[case("My Places", false)]
#[case("my places", true)]
#[case("Trips", true)]
#[case("abcdefghijklmnopqrst", true)]
#[case("abcdefghijklmnopqrstu", false)]
fn test_check_category(#[case] name: &str, #[case] expected: bool) {
    let (_store, model, _tmp) = setup(&[]);
    assert_eq!(model.check_category(name), expected, "name {:?}", name);
}

#[test]
fn test_validation_reasons() {
    let (_store, model, _tmp) = setup(&[]);
    assert!(matches!(
        model.validate_category_name(""),
        Err(CategoryError::Validation(ValidationError::Empty))
    ));
    assert!(matches!(
        model.validate_category_name(&"x".repeat(21)),
        Err(CategoryError::Validation(ValidationError::TooLong { max: 20 }))
    ));
    assert!(matches!(
        model.validate_category_name("My Places"),
        Err(CategoryError::Validation(ValidationError::Duplicate(_)))
    ));
}

#[test]
fn test_check_category_does_not_mutate() {
    let (_store, mut model, _tmp) = setup(&[]);
    assert!(model.check_category("Trips"));
    assert_eq!(model.number_of_rows(SectionKind::Categories), 1);
    assert!(model.take_updates().is_empty());
}

// ─── Mutations ───

#[test]
fn test_add_category_emits_single_insert_at_last_row() {
    let (_store, mut model, _tmp) = setup(&["A"]);
    let row = model.add_category("B").unwrap();

    assert_eq!(row, 2);
    assert_eq!(model.number_of_rows(SectionKind::Categories), 3);
    assert_eq!(model.category(2).unwrap().name, "B");
    assert!(model.category(2).unwrap().visible);
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::RowsInserted {
            paths: vec![IndexPath::new(0, 2)]
        }]
    );
}

#[test]
fn test_add_invalid_category_changes_nothing() {
    let (_store, mut model, _tmp) = setup(&[]);
    let res = model.add_category("My Places");
    assert!(matches!(
        res,
        Err(CategoryError::Validation(ValidationError::Duplicate(_)))
    ));
    assert_eq!(model.number_of_rows(SectionKind::Categories), 1);
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_delete_emits_single_delete_and_keeps_identities() {
    let (_store, mut model, _tmp) = setup(&["A", "B", "C"]);
    let id_b = model.category(2).unwrap().id;
    let id_c = model.category(3).unwrap().id;

    model.delete_category(1).unwrap();

    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::RowsDeleted {
            paths: vec![IndexPath::new(0, 1)]
        }]
    );
    assert_eq!(names(&model), vec!["My Places", "B", "C"]);
    // Rows after the deleted one shift index, not identity
    assert_eq!(model.category(1).unwrap().id, id_b);
    assert_eq!(model.category(2).unwrap().id, id_c);
}

#[test]
fn test_delete_down_to_last_category() {
    let (_store, mut model, _tmp) = setup(&["A", "B"]);

    model.delete_category(0).unwrap();
    assert_eq!(model.number_of_rows(SectionKind::Categories), 2);
    assert!(model.can_delete_categories());

    model.delete_category(0).unwrap();
    assert_eq!(model.number_of_rows(SectionKind::Categories), 1);
    assert!(!model.can_delete_categories());
    model.take_updates();

    let remaining = model.category(0).unwrap();
    let res = model.delete_category(0);
    assert!(matches!(res, Err(CategoryError::LastCategory)));
    assert_eq!(model.category(0).unwrap(), remaining);
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_rename_reloads_categories_section() {
    let (_store, mut model, _tmp) = setup(&[]);
    model.rename_category(0, "Favourites").unwrap();
    assert_eq!(model.category(0).unwrap().name, "Favourites");
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::SectionsChanged {
            sections: vec![SectionKind::Categories]
        }]
    );
}

#[test]
fn test_rename_to_existing_name_rejected() {
    let (_store, mut model, _tmp) = setup(&["A"]);
    assert!(model.rename_category(1, "My Places").is_err());
    assert_eq!(model.category(1).unwrap().name, "A");
}

// ─── Visibility ───

#[test]
fn test_set_visible_round_trip_without_delta() {
    let (_store, mut model, _tmp) = setup(&["A"]);
    model.set_category_visible(1, false).unwrap();
    assert!(!model.category(1).unwrap().visible);
    model.set_category_visible(1, true).unwrap();
    assert!(model.category(1).unwrap().visible);
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_update_all_visibility() {
    let (_store, mut model, _tmp) = setup(&["A", "B"]);
    assert!(!model.are_all_categories_hidden());

    model.update_all_categories_visibility(false).unwrap();
    assert!(model.are_all_categories_hidden());

    model.update_all_categories_visibility(true).unwrap();
    assert!(!model.are_all_categories_hidden());
}

#[test]
fn test_all_hidden_derived_after_single_toggle() {
    let (_store, mut model, _tmp) = setup(&["A"]);
    model.set_category_visible(0, false).unwrap();
    assert!(!model.are_all_categories_hidden());
    model.set_category_visible(1, false).unwrap();
    assert!(model.are_all_categories_hidden());
}

// ─── Notifications prompt ───

#[test]
fn test_dismissed_prompt_removes_section() {
    let (_store, mut model, _tmp) = setup(&[]);
    model.dismiss_notifications_prompt();
    assert_eq!(model.number_of_sections(), 2);
    assert_eq!(model.number_of_rows(SectionKind::Notifications), 0);
    assert_eq!(model.section_type(2), None);
    assert_eq!(model.take_updates(), vec![ViewUpdate::reload_all()]);

    // Dismissing twice is a no-op
    model.dismiss_notifications_prompt();
    assert!(model.take_updates().is_empty());
}

// ─── Store observation ───

#[test]
fn test_suppressed_mutations_deliver_one_catch_up() {
    let (store, mut model, _tmp) = setup(&["A"]);
    model.enter_foreground();
    assert!(model.is_observing());
    assert!(!store.borrow().notifications_enabled());

    {
        let mut s = store.borrow_mut();
        s.create_category("X").unwrap();
        s.create_category("Y").unwrap();
        let id = s.category_at(0).unwrap().id;
        s.set_category_visible(&id, false).unwrap();
    }
    model.process_store_events();
    assert!(model.take_updates().is_empty());

    model.leave_foreground();
    assert_eq!(model.take_updates(), vec![ViewUpdate::reload_all()]);
    assert!(!model.is_observing());
    assert!(store.borrow().notifications_enabled());
}

#[test]
fn test_foreground_guard_scopes_suppression() {
    let (store, mut model, _tmp) = setup(&[]);
    {
        let guard = model.foreground();
        assert!(guard.is_observing());
        guard.store().borrow_mut().create_category("Elsewhere").unwrap();
    }
    assert!(!model.is_observing());
    assert!(store.borrow().notifications_enabled());
    assert_eq!(model.take_updates(), vec![ViewUpdate::reload_all()]);
}

#[test]
fn test_external_changes_become_row_deltas() {
    let (store, mut model, _tmp) = setup(&["A"]);
    model.add_to_observer_list();

    store.borrow_mut().create_category("External").unwrap();
    model.process_store_events();
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::RowsInserted {
            paths: vec![IndexPath::new(0, 2)]
        }]
    );

    let id = store.borrow().category_at(0).unwrap().id;
    store.borrow_mut().delete_category(&id).unwrap();
    model.process_store_events();
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::RowsDeleted {
            paths: vec![IndexPath::new(0, 0)]
        }]
    );
}

#[test]
fn test_own_mutation_echo_is_not_applied_twice() {
    let (_store, mut model, _tmp) = setup(&[]);
    model.add_to_observer_list();

    model.add_category("Mine").unwrap();
    assert_eq!(model.take_updates().len(), 1);

    model.process_store_events();
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_mixed_external_batch_falls_back_to_reload() {
    let (store, mut model, _tmp) = setup(&["A"]);
    model.add_to_observer_list();
    {
        let mut s = store.borrow_mut();
        s.create_category("New").unwrap();
        let id = s.category_at(0).unwrap().id;
        s.delete_category(&id).unwrap();
    }
    model.process_store_events();
    assert_eq!(model.take_updates(), vec![ViewUpdate::reload_all()]);
}

/// Deletes the category currently at `index` straight through the store.
fn delete_at(store: &SharedStore<CategoryManager>, index: usize) {
    let id = store.borrow().category_at(index).unwrap().id;
    store.borrow_mut().delete_category(&id).unwrap();
}

#[test]
fn test_batched_external_inserts_become_one_update() {
    let (store, mut model, _tmp) = setup(&["A"]);
    model.add_to_observer_list();
    {
        let mut s = store.borrow_mut();
        s.create_category("X").unwrap();
        s.create_category("Y").unwrap();
        s.create_category("Z").unwrap();
    }
    model.process_store_events();
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::RowsInserted {
            paths: vec![IndexPath::new(0, 2), IndexPath::new(0, 3), IndexPath::new(0, 4)]
        }]
    );
}

#[rstest]
#[case::same_index(&[0, 0], &[0, 1])]
#[case::increasing(&[0, 1], &[0, 2])]
#[case::decreasing(&[2, 0], &[0, 2])]
#[case::tail_first(&[3, 1, 1], &[1, 2, 3])]
fn test_batched_external_deletes_use_rows_before_batch(
    #[case] deleted_at: &[usize],
    #[case] expected_rows: &[usize],
) {
    let (store, mut model, _tmp) = setup(&["A", "B", "C"]);
    model.add_to_observer_list();
    for index in deleted_at {
        delete_at(&store, *index);
    }
    model.process_store_events();

    let paths = expected_rows.iter().map(|row| IndexPath::new(0, *row)).collect();
    assert_eq!(model.take_updates(), vec![ViewUpdate::RowsDeleted { paths }]);
    assert_eq!(model.number_of_rows(SectionKind::Categories), 4 - deleted_at.len());
}

#[test]
fn test_own_insert_followed_by_external_insert() {
    let (store, mut model, _tmp) = setup(&[]);
    model.add_to_observer_list();

    model.add_category("Mine").unwrap();
    store.borrow_mut().create_category("Theirs").unwrap();
    model.process_store_events();

    assert_eq!(
        model.take_updates(),
        vec![
            ViewUpdate::RowsInserted {
                paths: vec![IndexPath::new(0, 1)]
            },
            ViewUpdate::RowsInserted {
                paths: vec![IndexPath::new(0, 2)]
            },
        ]
    );
    assert_eq!(names(&model), vec!["My Places", "Mine", "Theirs"]);
}

#[test]
fn test_external_delete_flushed_before_own_delete() {
    let (store, mut model, _tmp) = setup(&["A", "B"]);
    model.add_to_observer_list();

    delete_at(&store, 0);
    model.delete_category(0).unwrap();
    model.process_store_events();

    // The pending external delete is applied first, then the model's own one
    assert_eq!(
        model.take_updates(),
        vec![
            ViewUpdate::RowsDeleted {
                paths: vec![IndexPath::new(0, 0)]
            },
            ViewUpdate::RowsDeleted {
                paths: vec![IndexPath::new(0, 0)]
            },
        ]
    );
    assert_eq!(names(&model), vec!["B"]);
}

#[test]
fn test_own_visibility_change_is_not_echoed() {
    let (_store, mut model, _tmp) = setup(&["A"]);
    model.add_to_observer_list();
    model.set_category_visible(1, false).unwrap();
    model.update_all_categories_visibility(true).unwrap();
    model.process_store_events();
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_store_read_failure_keeps_rendered_rows() {
    let tmp = TempDir::new().unwrap();
    let db = Rc::new(Database::open_in_memory().unwrap());
    let store = Rc::new(RefCell::new(CategoryManager::open(db.clone(), "My Places").unwrap()));
    store.borrow_mut().create_category("A").unwrap();
    let config = ModelConfig {
        min_category_name_length: 1,
        max_category_name_length: 20,
        notifications_prompt_visible: true,
        export_dir: tmp.path().join("exports"),
    };
    let mut model = ListPresentationModel::new(store, config);
    model.reload_data();
    model.take_updates();

    db.connection().execute_batch("DROP TABLE categories;").unwrap();

    assert!(matches!(model.live_categories_count(), Err(CategoryError::DatabaseError(_))));
    assert_eq!(model.number_of_sections(), 3);
    assert_eq!(model.number_of_rows(SectionKind::Categories), 2);
    assert!(model.delete_category(0).is_err());
    assert!(model.add_category("B").is_err());
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_visibility_change_reloads_categories_section() {
    let (store, mut model, _tmp) = setup(&[]);
    model.add_to_observer_list();
    store.borrow_mut().set_all_visible(false).unwrap();
    model.process_store_events();
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::SectionsChanged {
            sections: vec![SectionKind::Categories]
        }]
    );
}

#[test]
fn test_deregistered_model_processes_nothing() {
    let (store, mut model, _tmp) = setup(&[]);
    model.add_to_observer_list();
    store.borrow_mut().create_category("Queued").unwrap();
    model.remove_from_observer_list();

    model.process_store_events();
    assert!(model.take_updates().is_empty());
}

#[test]
fn test_dropping_model_restores_store_notifications() {
    let (store, mut model, _tmp) = setup(&[]);
    model.enter_foreground();
    assert!(!store.borrow().notifications_enabled());
    drop(model);
    assert!(store.borrow().notifications_enabled());
}

#[test]
fn test_conversion_result_forwarded() {
    let (store, mut model, _tmp) = setup(&[]);
    model.add_to_observer_list();
    store.borrow_mut().notify_conversion_finished(false);
    model.process_store_events();
    assert_eq!(
        model.take_updates(),
        vec![ViewUpdate::ConversionFinished { success: false }]
    );
}

// ─── Export ───

#[tokio::test]
async fn test_share_category_file_success() {
    let (store, mut model, _tmp) = setup(&[]);
    let id = store.borrow().category_at(0).unwrap().id;
    store
        .borrow_mut()
        .add_bookmark(&id, "Home", 52.52, 13.405)
        .unwrap();

    let calls = Cell::new(0);
    let mut outcome = None;
    model
        .share_category_file(0, |result| {
            calls.set(calls.get() + 1);
            outcome = Some(result);
        })
        .await;

    assert_eq!(calls.get(), 1);
    let path = match outcome {
        Some(ShareOutcome::Success(path)) => path,
        other => panic!("expected success, got {:?}", other),
    };
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("My Places"));
    assert!(content.contains("Home"));

    model.finish_share_category().await;
    assert!(!path.exists());
}

#[tokio::test]
async fn test_share_out_of_range_reports_error_once() {
    let (_store, mut model, _tmp) = setup(&[]);
    let calls = Cell::new(0);
    let mut outcome = None;
    model
        .share_category_file(7, |result| {
            calls.set(calls.get() + 1);
            outcome = Some(result);
        })
        .await;

    assert_eq!(calls.get(), 1);
    assert!(matches!(outcome, Some(ShareOutcome::Error { .. })));
}

#[tokio::test]
async fn test_share_failure_surfaces_title_and_message() {
    let tmp = TempDir::new().unwrap();
    // A regular file where the export directory should be
    let blocker = tmp.path().join("exports");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let db = Rc::new(Database::open_in_memory().unwrap());
    let store = Rc::new(RefCell::new(CategoryManager::open(db, "My Places").unwrap()));
    let config = ModelConfig {
        min_category_name_length: 1,
        max_category_name_length: 20,
        notifications_prompt_visible: true,
        export_dir: blocker,
    };
    let mut model = ListPresentationModel::new(store, config);

    let mut outcome = None;
    model
        .share_category_file(0, |result| outcome = Some(result))
        .await;
    match outcome {
        Some(ShareOutcome::Error { title, message }) => {
            assert!(!title.is_empty());
            assert!(!message.is_empty());
        }
        other => panic!("expected error, got {:?}", other),
    }
}
