//! Create survey_drafts table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SurveyDrafts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveyDrafts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SurveyDrafts::SurveyId).integer())
                    .col(ColumnDef::new(SurveyDrafts::AuthorId).integer().not_null())
                    .col(ColumnDef::new(SurveyDrafts::DraftContent).json_binary().not_null())
                    .col(ColumnDef::new(SurveyDrafts::LastEditedQuestion).integer())
                    .col(
                        ColumnDef::new(SurveyDrafts::LastSaved)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SurveyDrafts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SurveyDrafts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_drafts_survey")
                            .from(SurveyDrafts::Table, SurveyDrafts::SurveyId)
                            .to(Surveys::Table, Surveys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (survey_id, last_saved) - latest draft lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_drafts_survey_last_saved")
                    .table(SurveyDrafts::Table)
                    .col(SurveyDrafts::SurveyId)
                    .col(SurveyDrafts::LastSaved)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_drafts_author_id")
                    .table(SurveyDrafts::Table)
                    .col(SurveyDrafts::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveyDrafts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SurveyDrafts {
    Table,
    Id,
    SurveyId,
    AuthorId,
    DraftContent,
    LastEditedQuestion,
    LastSaved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Surveys {
    Table,
    Id,
}
