//! Submitted answer entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub session_id: i32,

    /// Not a foreign key: answers outlive republished questions.
    #[sea_orm(indexed)]
    pub question_id: i32,

    /// JSON-encoded response value
    #[sea_orm(column_type = "Text")]
    pub response: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey_session::Entity",
        from = "Column::SessionId",
        to = "super::survey_session::Column::Id",
        on_delete = "Cascade"
    )]
    SurveySession,
}

impl Related<super::survey_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveySession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
