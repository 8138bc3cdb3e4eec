//! Conductor (survey-running organisation) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConductorType {
    #[sea_orm(string_value = "INSTITUTE")]
    Institute,
    #[sea_orm(string_value = "COMPANY")]
    Company,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conductors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub name: String,

    pub conductor_type: ConductorType,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub contact_email: String,

    pub contact_phone: String,

    #[sea_orm(column_type = "Text")]
    pub address: String,

    #[sea_orm(unique)]
    pub official_email: String,

    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
