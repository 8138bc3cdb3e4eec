//! Database migrations.
//!
//! Schema migrations shared by the participants and survey management services.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_survey_table;
mod m20250101_000002_create_question_table;
mod m20250101_000003_create_survey_draft_table;
mod m20250101_000004_create_survey_session_table;
mod m20250101_000005_create_participant_survey_draft_table;
mod m20250101_000006_create_answer_table;
mod m20250101_000007_create_survey_media_file_table;
mod m20250101_000008_create_conductor_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_survey_table::Migration),
            Box::new(m20250101_000002_create_question_table::Migration),
            Box::new(m20250101_000003_create_survey_draft_table::Migration),
            Box::new(m20250101_000004_create_survey_session_table::Migration),
            Box::new(m20250101_000005_create_participant_survey_draft_table::Migration),
            Box::new(m20250101_000006_create_answer_table::Migration),
            Box::new(m20250101_000007_create_survey_media_file_table::Migration),
            Box::new(m20250101_000008_create_conductor_table::Migration),
        ]
    }
}
