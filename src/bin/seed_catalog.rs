//! Seeds a demo catalog: departments, instructors, students, courses
//! with meeting slots, one assignment per seeded course and a term
//! calendar event.
//!
//! Run migrations first (`cargo run -p migration`), then:
//!
//! ```text
//! cargo run --bin seed_catalog
//! ```

use chrono::NaiveDate;
use uuid::Uuid;

use registrar_service::entities::sea_orm_active_enums::{DayOfWeek, DeliveryMode, RoleEnum};
use registrar_service::repositories::{
    CalendarEventRepository, CourseRepository, DepartmentRepository, GradebookRepository,
    UserRepository,
};
use registrar_service::static_service::get_database_connection;
use registrar_service::utils::tracing::init_standard_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_standard_tracing(env!("CARGO_CRATE_NAME"));

    get_database_connection().await;

    let department_repo = DepartmentRepository::new();
    if !department_repo.find_all().await?.is_empty() {
        tracing::info!("Departments already present, not seeding again");
        return Ok(());
    }

    tracing::info!("Seeding demo catalog...");

    let cs = department_repo
        .create(Uuid::new_v4(), "CS".to_string(), "Computer Science".to_string())
        .await?;
    let math = department_repo
        .create(Uuid::new_v4(), "MATH".to_string(), "Mathematics".to_string())
        .await?;
    let bio = department_repo
        .create(Uuid::new_v4(), "BIO".to_string(), "Biology".to_string())
        .await?;

    let user_repo = UserRepository::new();
    let hopper = user_repo
        .create(
            Uuid::new_v4(),
            "Grace".to_string(),
            "Hopper".to_string(),
            "grace.hopper@university.edu".to_string(),
            RoleEnum::Faculty,
            None,
            Some(cs.department_id),
        )
        .await?;
    let noether = user_repo
        .create(
            Uuid::new_v4(),
            "Emmy".to_string(),
            "Noether".to_string(),
            "emmy.noether@university.edu".to_string(),
            RoleEnum::Faculty,
            None,
            Some(math.department_id),
        )
        .await?;

    for (first, last, code) in [
        ("Ada", "Lovelace", "S2026-0001"),
        ("Alan", "Turing", "S2026-0002"),
        ("Rosalind", "Franklin", "S2026-0003"),
    ] {
        user_repo
            .create(
                Uuid::new_v4(),
                first.to_string(),
                last.to_string(),
                format!(
                    "{}.{}@university.edu",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
                RoleEnum::Student,
                Some(code.to_string()),
                None,
            )
            .await?;
    }

    let course_repo = CourseRepository::new();
    let courses = [
        (
            "CS 101",
            "Introduction to Programming",
            4,
            cs.department_id,
            Some(hopper.user_id),
            60,
            DeliveryMode::InPerson,
            100,
        ),
        (
            "CS 350",
            "Operating Systems",
            4,
            cs.department_id,
            Some(hopper.user_id),
            30,
            DeliveryMode::InPerson,
            300,
        ),
        (
            "CS 442",
            "Distributed Systems",
            3,
            cs.department_id,
            Some(hopper.user_id),
            2,
            DeliveryMode::Hybrid,
            400,
        ),
        (
            "MATH 201",
            "Linear Algebra",
            3,
            math.department_id,
            Some(noether.user_id),
            45,
            DeliveryMode::InPerson,
            200,
        ),
        (
            "MATH 310",
            "Abstract Algebra",
            3,
            math.department_id,
            Some(noether.user_id),
            25,
            DeliveryMode::Online,
            300,
        ),
        (
            "BIO 110",
            "General Biology",
            4,
            bio.department_id,
            None,
            80,
            DeliveryMode::InPerson,
            100,
        ),
    ];

    let mut seeded = Vec::new();
    for (code, title, credits, department_id, instructor_id, capacity, mode, level) in courses {
        let course = course_repo
            .create(
                Uuid::new_v4(),
                code.to_string(),
                title.to_string(),
                format!("{} ({})", title, code),
                credits,
                department_id,
                instructor_id,
                capacity,
                mode,
                level,
                "fall".to_string(),
                2026,
                None,
            )
            .await?;
        seeded.push(course);
    }

    for course in &seeded {
        course_repo
            .add_slot(
                Uuid::new_v4(),
                course.course_id,
                DayOfWeek::Monday,
                "10:00".to_string(),
                "11:30".to_string(),
                "Science Hall 204".to_string(),
            )
            .await?;
        course_repo
            .add_slot(
                Uuid::new_v4(),
                course.course_id,
                DayOfWeek::Wednesday,
                "10:00".to_string(),
                "11:30".to_string(),
                "Science Hall 204".to_string(),
            )
            .await?;
    }

    let gradebook_repo = GradebookRepository::new();
    let due = NaiveDate::from_ymd_opt(2026, 10, 5)
        .and_then(|d| d.and_hms_opt(23, 59, 0))
        .expect("valid seed due date");
    for course in &seeded {
        gradebook_repo
            .create_assignment(
                Uuid::new_v4(),
                course.course_id,
                "Problem set 1".to_string(),
                format!("First problem set for {}", course.code),
                Some(due),
                100,
                None,
            )
            .await?;
    }

    let term_start = NaiveDate::from_ymd_opt(2026, 9, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid seed event date");
    let term_end = NaiveDate::from_ymd_opt(2026, 9, 1)
        .and_then(|d| d.and_hms_opt(17, 0, 0))
        .expect("valid seed event date");
    CalendarEventRepository::new()
        .create(
            Uuid::new_v4(),
            "Fall term begins".to_string(),
            Some("First day of classes".to_string()),
            None,
            term_start,
            term_end,
            None,
            hopper.user_id,
        )
        .await?;

    tracing::info!(
        "Seeded {} departments, {} courses with slots and assignments",
        3,
        seeded.len()
    );

    Ok(())
}
