//! Integration tests for report filing, listing and status transitions

mod common;

use artspace::moderation::{
    CreateOutcome, ModerationAction, ModerationError, NewReport, Page, ReportStatus, ReportType,
    StatusCounts,
};
use artspace::orm::{posts, reports};
use common::{database::*, fixtures::*};
use sea_orm::{EntityTrait, PaginatorTrait};

#[actix_rt::test]
async fn test_duplicate_report_is_benign() {
    let (db, engine) = setup_engine().await.expect("Failed to set up database");

    let author = create_test_user(&db, "author", false).await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Sunset", "oil on canvas").await.unwrap();

    let auth = auth_for(&reporter);
    let first = engine
        .file_report(&auth, "post", post.id, "spam", None)
        .await
        .expect("First report should be filed");
    assert!(matches!(first, CreateOutcome::Created(_)));

    let pending_before = engine.reports().count_by_status().await.unwrap().pending;

    let second = engine
        .file_report(&auth, "post", post.id, "harassment", Some("again".into()))
        .await
        .expect("Duplicate report should not be an error");
    assert_eq!(second, CreateOutcome::AlreadyReported);

    let counts = engine.reports().count_by_status().await.unwrap();
    assert_eq!(counts.pending, pending_before);
    assert_eq!(counts.pending, 1);
    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_duplicate_after_removal_is_benign() {
    let (db, engine) = setup_engine().await.expect("Failed to set up database");

    let admin = auth_for(&create_test_user(&db, "admin", true).await.unwrap());
    let author = create_test_user(&db, "author", false).await.unwrap();
    let first_reporter = create_test_user(&db, "first", false).await.unwrap();
    let second_reporter = create_test_user(&db, "second", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Copy", "traced").await.unwrap();

    let auth = auth_for(&first_reporter);
    let first = engine.file_report(&auth, "post", post.id, "copyright", None).await.unwrap();
    assert!(matches!(first, CreateOutcome::Created(_)));

    let other = engine
        .file_report(&auth_for(&second_reporter), "post", post.id, "copyright", None)
        .await
        .unwrap();
    let other_id = match other {
        CreateOutcome::Created(id) => id,
        CreateOutcome::AlreadyReported => panic!("Second reporter should file a new report"),
    };

    engine
        .take_action(&admin, other_id, ModerationAction::RemoveContent, "Traced artwork")
        .await
        .expect("Removal should succeed");

    let again = engine
        .file_report(&auth, "post", post.id, "copyright", None)
        .await
        .expect("Re-filing on removed content should not be an error");
    assert_eq!(again, CreateOutcome::AlreadyReported);
    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 2);
}

#[actix_rt::test]
async fn test_other_reporters_may_report_same_content() {
    let (db, engine) = setup_engine().await.unwrap();

    let author = create_test_user(&db, "author", false).await.unwrap();
    let first = create_test_user(&db, "first", false).await.unwrap();
    let second = create_test_user(&db, "second", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Sketch", "pencil").await.unwrap();

    engine
        .file_report(&auth_for(&first), "post", post.id, "spam", None)
        .await
        .unwrap();
    let outcome = engine
        .file_report(&auth_for(&second), "post", post.id, "spam", None)
        .await
        .unwrap();

    assert!(matches!(outcome, CreateOutcome::Created(_)));
    assert_eq!(engine.reports().count_matching(None).await.unwrap(), 2);
}

#[actix_rt::test]
async fn test_unknown_report_type_rejected_without_row() {
    let (db, engine) = setup_engine().await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();

    let result = engine
        .file_report(&auth_for(&reporter), "playlist", 1, "spam", None)
        .await;

    match result {
        Err(ModerationError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "report_type");
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_report_on_missing_content_rejected() {
    let (db, engine) = setup_engine().await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();

    let result = engine
        .file_report(&auth_for(&reporter), "comment", 999, "spam", None)
        .await;

    assert!(matches!(result, Err(ModerationError::ContentMissing(_))));
    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_counts_present_on_empty_table() {
    let (_db, engine) = setup_engine().await.unwrap();

    let counts = engine.reports().count_by_status().await.unwrap();
    assert_eq!(counts, StatusCounts::default());

    let json = serde_json::to_value(counts).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
}

#[actix_rt::test]
async fn test_status_update_to_pending_rejected() {
    let (db, engine) = setup_engine().await.unwrap();
    let author = create_test_user(&db, "author", false).await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Study", "charcoal").await.unwrap();

    let report = NewReport::parse(reporter.id, "post", post.id, "spam", None).unwrap();
    let CreateOutcome::Created(report_id) = engine.reports().create_report(report).await.unwrap() else {
        panic!("Report should be created");
    };

    let result = engine
        .reports()
        .update_status(report_id, ReportStatus::Pending, None)
        .await;
    assert!(matches!(result, Err(ModerationError::Validation(_))));

    let stored = engine.reports().find(report_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReportStatus::Pending);
}

#[actix_rt::test]
async fn test_status_update_resolves_pending_report() {
    let (db, engine) = setup_engine().await.unwrap();
    let author = create_test_user(&db, "author", false).await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Study", "charcoal").await.unwrap();

    let report = NewReport::parse(reporter.id, "post", post.id, "copyright", None).unwrap();
    let CreateOutcome::Created(report_id) = engine.reports().create_report(report).await.unwrap() else {
        panic!("Report should be created");
    };

    // Timestamps are stored with sub-second precision.
    actix_rt::time::sleep(std::time::Duration::from_millis(20)).await;

    let updated = engine
        .reports()
        .update_status(report_id, ReportStatus::Resolved, Some("Verified".into()))
        .await
        .unwrap();
    assert!(updated);

    let stored = engine.reports().find(report_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReportStatus::Resolved);
    assert_eq!(stored.admin_notes.as_deref(), Some("Verified"));
    assert!(stored.updated_at > stored.created_at);

    // Closed reports do not move again.
    let again = engine
        .reports()
        .update_status(report_id, ReportStatus::Rejected, None)
        .await
        .unwrap();
    assert!(!again);

    let missing = engine
        .reports()
        .update_status(report_id + 100, ReportStatus::Rejected, None)
        .await;
    assert!(matches!(missing, Err(ModerationError::ReportNotFound(_))));
}

#[actix_rt::test]
async fn test_list_filters_and_orders_newest_first() {
    let (db, engine) = setup_engine().await.unwrap();
    let author = create_test_user(&db, "author", false).await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();

    let old = create_aged_report(&db, reporter.id, ReportType::User, author.id, 30).await.unwrap();
    let newest = create_aged_report(&db, reporter.id, ReportType::Post, 1, 1).await.unwrap();
    let middle = create_aged_report(&db, reporter.id, ReportType::Comment, 1, 10).await.unwrap();

    engine
        .reports()
        .update_status(middle.id, ReportStatus::Rejected, None)
        .await
        .unwrap();

    let all = engine
        .reports()
        .list_for_review(None, Page { limit: 10, offset: 0 })
        .await
        .unwrap();
    let ids: Vec<i32> = all.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, old.id]);

    let pending = engine
        .reports()
        .list_for_review(Some(ReportStatus::Pending), Page { limit: 10, offset: 0 })
        .await
        .unwrap();
    let ids: Vec<i32> = pending.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, old.id]);

    let second_page = engine
        .reports()
        .list_for_review(None, Page { limit: 1, offset: 1 })
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, middle.id);

    assert_eq!(
        engine.reports().count_matching(Some(ReportStatus::Pending)).await.unwrap(),
        2
    );
}

#[actix_rt::test]
async fn test_orphaned_report_shows_missing_content() {
    let (db, engine) = setup_engine().await.unwrap();
    let author = create_test_user(&db, "author", false).await.unwrap();
    let reporter = create_test_user(&db, "reporter", false).await.unwrap();
    let post = create_test_post(&db, author.id, "Gone soon", "watercolor").await.unwrap();

    let report = NewReport::parse(reporter.id, "post", post.id, "spam", None).unwrap();
    let CreateOutcome::Created(report_id) = engine.reports().create_report(report).await.unwrap() else {
        panic!("Report should be created");
    };

    posts::Entity::delete_by_id(post.id).exec(&db).await.unwrap();

    let details = engine.reports().get_report(report_id).await.unwrap();
    assert!(details.content_details.is_missing());
    assert_eq!(details.reporter_name.as_deref(), Some("reporter"));
}
