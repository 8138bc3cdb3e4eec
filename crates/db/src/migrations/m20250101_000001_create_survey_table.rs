//! Create surveys and survey_requirements tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Surveys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Surveys::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Surveys::ConductorId).integer().not_null())
                    .col(ColumnDef::new(Surveys::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Surveys::Description).text().not_null())
                    .col(
                        ColumnDef::new(Surveys::IsSelfRecruitment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Surveys::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Surveys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Surveys::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: conductor_id (for listing a conductor's surveys)
        manager
            .create_index(
                Index::create()
                    .name("idx_surveys_conductor_id")
                    .table(Surveys::Table)
                    .col(Surveys::ConductorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SurveyRequirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveyRequirements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SurveyRequirements::SurveyId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SurveyRequirements::SkillName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SurveyRequirements::MinProficiencyLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SurveyRequirements::ExperienceLevel)
                            .string_len(64)
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_requirements_survey")
                            .from(SurveyRequirements::Table, SurveyRequirements::SurveyId)
                            .to(Surveys::Table, Surveys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_requirements_survey_id")
                    .table(SurveyRequirements::Table)
                    .col(SurveyRequirements::SurveyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveyRequirements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Surveys::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Surveys {
    Table,
    Id,
    ConductorId,
    Title,
    Description,
    IsSelfRecruitment,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SurveyRequirements {
    Table,
    Id,
    SurveyId,
    SkillName,
    MinProficiencyLevel,
    ExperienceLevel,
}
