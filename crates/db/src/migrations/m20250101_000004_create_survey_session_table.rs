//! Create survey_sessions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SurveySessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveySessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SurveySessions::SurveyId).integer().not_null())
                    .col(
                        ColumnDef::new(SurveySessions::ParticipantId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SurveySessions::LastQuestionId).integer())
                    .col(
                        ColumnDef::new(SurveySessions::SessionStatus)
                            .string_len(16)
                            .not_null()
                            .default("IN_PROGRESS"),
                    )
                    .col(
                        ColumnDef::new(SurveySessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SurveySessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_sessions_survey")
                            .from(SurveySessions::Table, SurveySessions::SurveyId)
                            .to(Surveys::Table, Surveys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_sessions_survey_id")
                    .table(SurveySessions::Table)
                    .col(SurveySessions::SurveyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_sessions_participant_id")
                    .table(SurveySessions::Table)
                    .col(SurveySessions::ParticipantId)
                    .to_owned(),
            )
            .await?;

        // At most one in-progress session per participant and survey
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_survey_sessions_one_in_progress
                ON survey_sessions (survey_id, participant_id)
                WHERE session_status = 'IN_PROGRESS';
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveySessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SurveySessions {
    Table,
    Id,
    SurveyId,
    ParticipantId,
    LastQuestionId,
    SessionStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Surveys {
    Table,
    Id,
}
