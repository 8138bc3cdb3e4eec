//! Create survey_media_files table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SurveyMediaFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveyMediaFiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SurveyMediaFiles::SurveyId).integer().not_null())
                    .col(ColumnDef::new(SurveyMediaFiles::SessionId).integer())
                    .col(ColumnDef::new(SurveyMediaFiles::QuestionId).integer())
                    .col(ColumnDef::new(SurveyMediaFiles::FileUrl).text().not_null())
                    .col(ColumnDef::new(SurveyMediaFiles::FileType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(SurveyMediaFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_media_files_survey")
                            .from(SurveyMediaFiles::Table, SurveyMediaFiles::SurveyId)
                            .to(Surveys::Table, Surveys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_media_files_survey_id")
                    .table(SurveyMediaFiles::Table)
                    .col(SurveyMediaFiles::SurveyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveyMediaFiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SurveyMediaFiles {
    Table,
    Id,
    SurveyId,
    SessionId,
    QuestionId,
    FileUrl,
    FileType,
    CreatedAt,
}

#[derive(Iden)]
enum Surveys {
    Table,
    Id,
}
