//! Media attached to a survey or uploaded by a participant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFileType {
    #[sea_orm(string_value = "IMAGE")]
    Image,
    #[sea_orm(string_value = "VIDEO")]
    Video,
    #[sea_orm(string_value = "AUDIO")]
    Audio,
    #[sea_orm(string_value = "DOCUMENT")]
    Document,
}

impl MediaFileType {
    /// Classify a MIME type.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else if content_type.starts_with("audio/") {
            Self::Audio
        } else {
            Self::Document
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey_media_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub survey_id: i32,

    /// Set for participant uploads, empty for authored media
    #[sea_orm(nullable)]
    pub session_id: Option<i32>,

    #[sea_orm(nullable)]
    pub question_id: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub file_url: String,

    pub file_type: MediaFileType,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey::Entity",
        from = "Column::SurveyId",
        to = "super::survey::Column::Id",
        on_delete = "Cascade"
    )]
    Survey,
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type() {
        assert_eq!(MediaFileType::from_content_type("image/png"), MediaFileType::Image);
        assert_eq!(MediaFileType::from_content_type("video/mp4"), MediaFileType::Video);
        assert_eq!(MediaFileType::from_content_type("audio/ogg"), MediaFileType::Audio);
        assert_eq!(
            MediaFileType::from_content_type("application/pdf"),
            MediaFileType::Document
        );
    }
}
