//! Create participant_survey_drafts table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParticipantSurveyDrafts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::SessionId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ParticipantSurveyDrafts::LastAnsweredQuestionId).integer())
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::DraftAnswersContent)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::LastSaved)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ParticipantSurveyDrafts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_survey_drafts_session")
                            .from(
                                ParticipantSurveyDrafts::Table,
                                ParticipantSurveyDrafts::SessionId,
                            )
                            .to(SurveySessions::Table, SurveySessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParticipantSurveyDrafts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ParticipantSurveyDrafts {
    Table,
    Id,
    SessionId,
    LastAnsweredQuestionId,
    DraftAnswersContent,
    LastSaved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SurveySessions {
    Table,
    Id,
}
