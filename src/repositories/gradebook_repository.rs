use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DeleteResult, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::lms_link_repository::LmsLinkRepository;
use crate::entities::{assignment, course, grade, user};
use crate::static_service::DATABASE_CONNECTION;

/// Business outcome of recording a grade.
#[derive(Debug, Clone)]
pub enum GradeOutcome {
    Recorded(grade::Model),
    AssignmentNotFound,
    PointsOutOfRange { points_possible: i32 },
}

impl GradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GradeOutcome::Recorded(_))
    }

    pub fn message(&self) -> String {
        match self {
            GradeOutcome::Recorded(_) => "Grade recorded".to_string(),
            GradeOutcome::AssignmentNotFound => "Assignment not found".to_string(),
            GradeOutcome::PointsOutOfRange { points_possible } => {
                format!("Points must be between 0 and {}", points_possible)
            }
        }
    }
}

/// One row of a student's grade report.
#[derive(Debug, Clone)]
pub struct GradeReportRow {
    pub grade: grade::Model,
    pub assignment: assignment::Model,
    pub course_code: String,
    pub course_title: String,
}

pub struct GradebookRepository;

impl GradebookRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_assignment(&self, assignment_id: Uuid) -> Result<Option<assignment::Model>> {
        let db = self.get_connection();
        let row = assignment::Entity::find_by_id(assignment_id).one(db).await?;
        Ok(row)
    }

    pub async fn find_assignments_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<assignment::Model>> {
        let db = self.get_connection();
        let rows = assignment::Entity::find()
            .filter(assignment::Column::CourseId.eq(course_id))
            .order_by_asc(assignment::Column::DueAt)
            .all(db)
            .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_assignment(
        &self,
        assignment_id: Uuid,
        course_id: Uuid,
        title: String,
        description: String,
        due_at: Option<NaiveDateTime>,
        points_possible: i32,
        moodle_id: Option<String>,
    ) -> Result<assignment::Model> {
        let db = self.get_connection();
        if let Some(moodle_id) = &moodle_id {
            LmsLinkRepository::new().ensure(moodle_id).await?;
        }
        let now = Utc::now().naive_utc();
        let assignment_model = assignment::ActiveModel {
            assignment_id: Set(assignment_id),
            course_id: Set(course_id),
            title: Set(title),
            description: Set(description),
            due_at: Set(due_at),
            points_possible: Set(points_possible),
            moodle_id: Set(moodle_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = assignment_model.insert(db).await?;
        Ok(result)
    }

    pub async fn delete_assignment(&self, assignment_id: Uuid) -> Result<DeleteResult> {
        let assignment = self
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Assignment not found"))?;
        let db = self.get_connection();

        let active_model: assignment::ActiveModel = assignment.into();
        let result = active_model.delete(db).await?;
        Ok(result)
    }

    /// Records or overwrites one student's grade for one assignment.
    /// The unique index on (assignment, student) means a re-grade
    /// updates the existing row instead of adding a second one.
    pub async fn record_grade(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
        points: Decimal,
        graded_by: Uuid,
    ) -> Result<GradeOutcome> {
        let db = self.get_connection();

        let Some(assignment) = self.find_assignment(assignment_id).await? else {
            return Ok(GradeOutcome::AssignmentNotFound);
        };

        if points < Decimal::ZERO || points > Decimal::from(assignment.points_possible) {
            return Ok(GradeOutcome::PointsOutOfRange {
                points_possible: assignment.points_possible,
            });
        }

        let existing = grade::Entity::find()
            .filter(grade::Column::AssignmentId.eq(assignment_id))
            .filter(grade::Column::StudentId.eq(student_id))
            .one(db)
            .await?;

        let now = Utc::now().naive_utc();
        let model = match existing {
            Some(row) => {
                let mut active_model: grade::ActiveModel = row.into();
                active_model.points = Set(points);
                active_model.graded_by = Set(graded_by);
                active_model.graded_at = Set(now);
                active_model.updated_at = Set(now);
                active_model.update(db).await?
            }
            None => {
                grade::ActiveModel {
                    grade_id: Set(Uuid::new_v4()),
                    assignment_id: Set(assignment_id),
                    student_id: Set(student_id),
                    points: Set(points),
                    graded_by: Set(graded_by),
                    graded_at: Set(now),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?
            }
        };

        Ok(GradeOutcome::Recorded(model))
    }

    /// Everything graded for one student, joined out to assignment and
    /// course, newest grade first.
    pub async fn find_grades_for_student(&self, student_id: Uuid) -> Result<Vec<GradeReportRow>> {
        let db = self.get_connection();

        let grades = grade::Entity::find()
            .filter(grade::Column::StudentId.eq(student_id))
            .order_by_desc(grade::Column::GradedAt)
            .all(db)
            .await?;
        if grades.is_empty() {
            return Ok(Vec::new());
        }

        let assignment_ids: Vec<Uuid> = grades.iter().map(|g| g.assignment_id).collect();
        let assignments: HashMap<Uuid, assignment::Model> = assignment::Entity::find()
            .filter(assignment::Column::AssignmentId.is_in(assignment_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.assignment_id, a))
            .collect();

        let course_ids: Vec<Uuid> = assignments.values().map(|a| a.course_id).collect();
        let courses: HashMap<Uuid, course::Model> = course::Entity::find()
            .filter(course::Column::CourseId.is_in(course_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.course_id, c))
            .collect();

        let rows = grades
            .into_iter()
            .filter_map(|grade| {
                let assignment = assignments.get(&grade.assignment_id)?.clone();
                let course = courses.get(&assignment.course_id)?;
                Some(GradeReportRow {
                    grade,
                    course_code: course.code.clone(),
                    course_title: course.title.clone(),
                    assignment,
                })
            })
            .collect();

        Ok(rows)
    }

    /// All grades for one assignment with the graded students.
    pub async fn find_grades_for_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<(grade::Model, Option<user::Model>)>> {
        let db = self.get_connection();
        let rows = grade::Entity::find()
            .filter(grade::Column::AssignmentId.eq(assignment_id))
            .find_also_related(user::Entity)
            .order_by_desc(grade::Column::GradedAt)
            .all(db)
            .await?;
        Ok(rows)
    }
}
