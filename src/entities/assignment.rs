//! `SeaORM` Entity for assignments table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_deserializing)]
    pub assignment_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_at: Option<DateTime>,
    pub points_possible: i32,
    pub moodle_id: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::CourseId"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::lms_link::Entity",
        from = "Column::MoodleId",
        to = "super::lms_link::Column::MoodleId"
    )]
    LmsLink,
    #[sea_orm(has_many = "super::grade::Entity")]
    Grades,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::lms_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LmsLink.def()
    }
}

impl Related<super::grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
