//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `survey_test`)
//!   `TEST_DB_PASSWORD` (default: `survey_test`)
//!   `TEST_DB_NAME` (default: `survey_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde_json::json;
use survey_common::AppError;
use survey_db::entities::{survey, survey_session::SessionStatus};
use survey_db::repositories::{
    ParticipantDraftRepository, SurveyRepository, SurveySessionRepository,
};
use survey_db::test_utils::{TestDatabase, TestDbConfig};

async fn published_survey(db: &TestDatabase) -> survey::Model {
    let now = Utc::now();
    survey::ActiveModel {
        conductor_id: Set(1),
        title: Set("Integration".to_string()),
        description: Set(String::new()),
        is_self_recruitment: Set(false),
        status: Set(survey::SurveyStatus::Published),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db.connection())
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_in_progress_session_is_a_conflict() {
    let db = TestDatabase::create_unique().await.unwrap();
    let survey = published_survey(&db).await;
    let sessions = SurveySessionRepository::new(Arc::clone(&db.conn));

    let first = sessions.create_in_progress(survey.id, 5).await.unwrap();
    let second = sessions.create_in_progress(survey.id, 5).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    // Once completed, a new attempt may start.
    let txn = db.connection().begin().await.unwrap();
    assert_eq!(sessions.complete_with(&txn, first.id).await.unwrap(), 1);
    txn.commit().await.unwrap();

    let third = sessions.create_in_progress(survey.id, 5).await.unwrap();
    assert_eq!(third.session_status, SessionStatus::InProgress);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_draft_upsert_keeps_one_row() {
    let db = TestDatabase::create_unique().await.unwrap();
    let survey = published_survey(&db).await;
    let conn = Arc::clone(&db.conn);
    let sessions = SurveySessionRepository::new(Arc::clone(&conn));
    let drafts = ParticipantDraftRepository::new(Arc::clone(&conn));

    let session = sessions.create_in_progress(survey.id, 5).await.unwrap();
    let content = json!({"1": "yes"});
    let a = drafts.upsert(session.id, Some(1), content.clone()).await.unwrap();
    let b = drafts.upsert(session.id, Some(1), content.clone()).await.unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(b.draft_answers_content, content);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_survey_cascades() {
    let db = TestDatabase::create_unique().await.unwrap();
    let survey = published_survey(&db).await;
    let conn = Arc::clone(&db.conn);
    let surveys = SurveyRepository::new(Arc::clone(&conn));
    let sessions = SurveySessionRepository::new(Arc::clone(&conn));

    let session = sessions.create_in_progress(survey.id, 5).await.unwrap();
    surveys.delete(survey.id).await.unwrap();

    assert!(sessions.find_by_id(session.id).await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}
