use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::AssignmentId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().not_null())
                    .col(ColumnDef::new(Assignments::DueAt).timestamp().null())
                    .col(
                        ColumnDef::new(Assignments::PointsPossible)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::MoodleId).string_len(64).null())
                    .col(ColumnDef::new(Assignments::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Assignments::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_course")
                            .from_tbl(Assignments::Table)
                            .from_col(Assignments::CourseId)
                            .to_tbl(Courses::Table)
                            .to_col(Courses::CourseId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_lms_link")
                            .from_tbl(Assignments::Table)
                            .from_col(Assignments::MoodleId)
                            .to_tbl(LmsLinks::Table)
                            .to_col(LmsLinks::MoodleId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::GradeId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::AssignmentId).uuid().not_null())
                    .col(ColumnDef::new(Grades::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Grades::Points).decimal_len(5, 2).not_null())
                    .col(ColumnDef::new(Grades::GradedBy).uuid().not_null())
                    .col(ColumnDef::new(Grades::GradedAt).timestamp().not_null())
                    .col(ColumnDef::new(Grades::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Grades::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_grades_assignment")
                            .from_tbl(Grades::Table)
                            .from_col(Grades::AssignmentId)
                            .to_tbl(Assignments::Table)
                            .to_col(Assignments::AssignmentId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_grades_student")
                            .from_tbl(Grades::Table)
                            .from_col(Grades::StudentId)
                            .to_tbl(Users::Table)
                            .to_col(Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_grades_graded_by")
                            .from_tbl(Grades::Table)
                            .from_col(Grades::GradedBy)
                            .to_tbl(Users::Table)
                            .to_col(Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_course")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        // One grade per (assignment, student); regrading updates in place.
        manager
            .create_index(
                Index::create()
                    .name("uq_grades_assignment_student")
                    .table(Grades::Table)
                    .col(Grades::AssignmentId)
                    .col(Grades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grades_student")
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_grades_student")
                    .table(Grades::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_grades_assignment_student")
                    .table(Grades::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_assignments_course")
                    .table(Assignments::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    AssignmentId,
    CourseId,
    Title,
    Description,
    DueAt,
    PointsPossible,
    MoodleId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Grades {
    Table,
    GradeId,
    AssignmentId,
    StudentId,
    Points,
    GradedBy,
    GradedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    CourseId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum LmsLinks {
    Table,
    MoodleId,
}
