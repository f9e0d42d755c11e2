use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // External LMS anchor: opaque Moodle identifier plus the last time
        // the external system confirmed a sync. No sync protocol lives here.
        manager
            .create_table(
                Table::create()
                    .table(LmsLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LmsLinks::MoodleId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LmsLinks::LastSynced).timestamp().null())
                    .col(ColumnDef::new(LmsLinks::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(LmsLinks::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::CourseId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::Code)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::Credits).integer().not_null())
                    .col(ColumnDef::new(Courses::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).uuid().null())
                    .col(ColumnDef::new(Courses::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Courses::DeliveryMode)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::Level).integer().not_null())
                    .col(ColumnDef::new(Courses::Semester).string_len(20).not_null())
                    .col(ColumnDef::new(Courses::Year).integer().not_null())
                    .col(ColumnDef::new(Courses::MoodleId).string_len(64).null())
                    .col(ColumnDef::new(Courses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_department")
                            .from_tbl(Courses::Table)
                            .from_col(Courses::DepartmentId)
                            .to_tbl(Departments::Table)
                            .to_col(Departments::DepartmentId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_instructor")
                            .from_tbl(Courses::Table)
                            .from_col(Courses::InstructorId)
                            .to_tbl(Users::Table)
                            .to_col(Users::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_lms_link")
                            .from_tbl(Courses::Table)
                            .from_col(Courses::MoodleId)
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
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::ScheduleId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Schedules::DayOfWeek)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Schedules::StartTime).string_len(8).not_null())
                    .col(ColumnDef::new(Schedules::EndTime).string_len(8).not_null())
                    .col(ColumnDef::new(Schedules::Location).string().not_null())
                    .col(ColumnDef::new(Schedules::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Schedules::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedules_course")
                            .from_tbl(Schedules::Table)
                            .from_col(Schedules::CourseId)
                            .to_tbl(Courses::Table)
                            .to_col(Courses::CourseId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_department")
                    .table(Courses::Table)
                    .col(Courses::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedules_course")
                    .table(Schedules::Table)
                    .col(Schedules::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_schedules_course")
                    .table(Schedules::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_courses_department")
                    .table(Courses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LmsLinks::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum LmsLinks {
    Table,
    MoodleId,
    LastSynced,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    CourseId,
    Code,
    Title,
    Description,
    Credits,
    DepartmentId,
    InstructorId,
    Capacity,
    DeliveryMode,
    Level,
    Semester,
    Year,
    MoodleId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schedules {
    Table,
    ScheduleId,
    CourseId,
    DayOfWeek,
    StartTime,
    EndTime,
    Location,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
