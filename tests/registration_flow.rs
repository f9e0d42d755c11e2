//! End-to-end registration flow against a real (in-memory) database:
//! filling a course, waitlisting, dropping and re-registering, and the
//! views that hang off enrollment state.

mod common;

use registrar_service::catalog::display_status::DisplayStatus;
use registrar_service::catalog::schedule_format::SCHEDULE_UNAVAILABLE;
use registrar_service::entities::sea_orm_active_enums::{
    DayOfWeek, DeliveryMode, EnrollmentStatus, RoleEnum,
};
use registrar_service::repositories::{
    CourseRepository, DepartmentRepository, DropOutcome, EnrollmentRepository, RegisterOutcome,
    UserRepository,
};
use uuid::Uuid;

async fn seed_student(name: &str, code: &str) -> Uuid {
    let user = UserRepository::new()
        .create(
            Uuid::new_v4(),
            name.to_string(),
            "Test".to_string(),
            format!("{}@university.edu", name.to_lowercase()),
            RoleEnum::Student,
            Some(code.to_string()),
            None,
        )
        .await
        .expect("student should insert");
    user.user_id
}

#[tokio::test]
async fn register_waitlist_drop_and_reregister() {
    common::setup_database().await;

    let department = DepartmentRepository::new()
        .create(Uuid::new_v4(), "CS".to_string(), "Computer Science".to_string())
        .await
        .expect("department should insert");

    let instructor = UserRepository::new()
        .create(
            Uuid::new_v4(),
            "Grace".to_string(),
            "Hopper".to_string(),
            "grace@university.edu".to_string(),
            RoleEnum::Faculty,
            None,
            Some(department.department_id),
        )
        .await
        .expect("instructor should insert");

    let course_repo = CourseRepository::new();
    let tiny_course = course_repo
        .create(
            Uuid::new_v4(),
            "CS 442".to_string(),
            "Distributed Systems".to_string(),
            String::new(),
            3,
            department.department_id,
            Some(instructor.user_id),
            1,
            DeliveryMode::InPerson,
            400,
            "fall".to_string(),
            2026,
            None,
        )
        .await
        .expect("course should insert");
    let second_course = course_repo
        .create(
            Uuid::new_v4(),
            "CS 101".to_string(),
            "Introduction to Programming".to_string(),
            String::new(),
            4,
            department.department_id,
            Some(instructor.user_id),
            30,
            DeliveryMode::InPerson,
            100,
            "fall".to_string(),
            2026,
            None,
        )
        .await
        .expect("course should insert");

    course_repo
        .add_slot(
            Uuid::new_v4(),
            tiny_course.course_id,
            DayOfWeek::Wednesday,
            "10:00".to_string(),
            "11:30".to_string(),
            "Science Hall 204".to_string(),
        )
        .await
        .expect("slot should insert");
    course_repo
        .add_slot(
            Uuid::new_v4(),
            tiny_course.course_id,
            DayOfWeek::Monday,
            "10:00".to_string(),
            "11:30".to_string(),
            "Science Hall 204".to_string(),
        )
        .await
        .expect("slot should insert");

    let alice = seed_student("Alice", "S-0001").await;
    let bob = seed_student("Bob", "S-0002").await;

    let enrollment_repo = EnrollmentRepository::new();

    // Unknown course is reported, not an error.
    let outcome = enrollment_repo
        .register(alice, Uuid::new_v4(), false)
        .await
        .expect("register should not fail");
    assert!(matches!(outcome, RegisterOutcome::CourseNotFound));

    // Alice takes the only seat.
    let outcome = enrollment_repo
        .register(alice, tiny_course.course_id, false)
        .await
        .expect("register should not fail");
    let alice_enrollment_id = match outcome {
        RegisterOutcome::Registered(row) => {
            assert_eq!(row.status, EnrollmentStatus::Registered);
            row.enrollment_id
        }
        other => panic!("expected Registered, got {:?}", other.message()),
    };
    assert_eq!(
        enrollment_repo
            .count_registered(tiny_course.course_id)
            .await
            .expect("count should work"),
        1
    );

    // Bob is refused outright without the waitlist flag, and no row
    // is left behind by the refusal.
    let outcome = enrollment_repo
        .register(bob, tiny_course.course_id, false)
        .await
        .expect("register should not fail");
    assert!(matches!(outcome, RegisterOutcome::CourseFull));
    assert!(
        enrollment_repo
            .find_one(bob, tiny_course.course_id)
            .await
            .expect("lookup should work")
            .is_none(),
        "a refused registration must not leave an enrollment row"
    );

    // With the flag he lands on the waitlist instead.
    let outcome = enrollment_repo
        .register(bob, tiny_course.course_id, true)
        .await
        .expect("register should not fail");
    assert!(matches!(outcome, RegisterOutcome::Waitlisted(_)));

    // Waitlisted rows do not consume capacity.
    assert_eq!(
        enrollment_repo
            .count_registered(tiny_course.course_id)
            .await
            .expect("count should work"),
        1
    );

    // Registering twice is refused for both of them.
    let outcome = enrollment_repo
        .register(alice, tiny_course.course_id, false)
        .await
        .expect("register should not fail");
    assert!(matches!(outcome, RegisterOutcome::AlreadyEnrolled));
    let outcome = enrollment_repo
        .register(bob, tiny_course.course_id, true)
        .await
        .expect("register should not fail");
    assert!(matches!(outcome, RegisterOutcome::AlreadyEnrolled));

    // The status map drives per-viewer card resolution.
    let statuses = enrollment_repo
        .find_status_map(bob, &[tiny_course.course_id, second_course.course_id])
        .await
        .expect("status map should load");
    assert_eq!(
        statuses.get(&tiny_course.course_id),
        Some(&EnrollmentStatus::Waitlisted)
    );
    assert!(!statuses.contains_key(&second_course.course_id));

    let registered = enrollment_repo
        .count_registered(tiny_course.course_id)
        .await
        .expect("count should work");
    assert_eq!(
        DisplayStatus::resolve(
            registered,
            tiny_course.capacity,
            statuses.get(&tiny_course.course_id).copied()
        ),
        DisplayStatus::Waitlisted
    );
    // A viewer with no enrollment sees the course as closed at capacity.
    assert_eq!(
        DisplayStatus::resolve(registered, tiny_course.capacity, None),
        DisplayStatus::Closed
    );

    // Schedules carry the formatted slot summary; courses without
    // slots fall back to the placeholder.
    enrollment_repo
        .register(alice, second_course.course_id, false)
        .await
        .expect("register should not fail");
    let schedule = enrollment_repo
        .find_my_schedule(alice)
        .await
        .expect("schedule should load");
    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule[0].course.code, "CS 101");
    assert_eq!(schedule[0].schedule_summary, SCHEDULE_UNAVAILABLE);
    assert_eq!(schedule[1].course.code, "CS 442");
    assert_eq!(schedule[1].schedule_summary, "Mon, Wed \u{2022} 10:00-11:30");

    // Dropping keeps the row but frees the seat.
    let outcome = enrollment_repo
        .drop_course(alice, tiny_course.course_id)
        .await
        .expect("drop should not fail");
    assert!(matches!(outcome, DropOutcome::Dropped(_)));
    assert_eq!(
        enrollment_repo
            .count_registered(tiny_course.course_id)
            .await
            .expect("count should work"),
        0
    );
    let dropped_row = enrollment_repo
        .find_one(alice, tiny_course.course_id)
        .await
        .expect("lookup should work")
        .expect("dropped row should survive");
    assert_eq!(dropped_row.status, EnrollmentStatus::Dropped);

    // Dropping again reports the fact instead of erroring.
    let outcome = enrollment_repo
        .drop_course(alice, tiny_course.course_id)
        .await
        .expect("drop should not fail");
    assert!(matches!(outcome, DropOutcome::NotEnrolled));

    // The dropped course leaves the schedule but stays in history.
    let schedule = enrollment_repo
        .find_my_schedule(alice)
        .await
        .expect("schedule should load");
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].course.code, "CS 101");
    let history = enrollment_repo
        .find_history(alice)
        .await
        .expect("history should load");
    assert_eq!(history.len(), 2);
    assert!(
        history
            .iter()
            .any(|(e, c)| c.code == "CS 442" && e.status == EnrollmentStatus::Dropped)
    );

    // Re-registering reactivates the original row.
    let outcome = enrollment_repo
        .register(alice, tiny_course.course_id, false)
        .await
        .expect("register should not fail");
    match outcome {
        RegisterOutcome::Registered(row) => {
            assert_eq!(row.enrollment_id, alice_enrollment_id);
            assert_eq!(row.status, EnrollmentStatus::Registered);
        }
        other => panic!("expected Registered, got {:?}", other.message()),
    }

    // Roster lists both of them, earliest enrollment first.
    let roster = enrollment_repo
        .find_roster(tiny_course.course_id)
        .await
        .expect("roster should load");
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].student_id, alice);
    assert_eq!(roster[1].student_id, bob);

    let roster = enrollment_repo
        .find_roster_with_students(tiny_course.course_id)
        .await
        .expect("roster should load");
    assert_eq!(roster[0].1.first_name, "Alice");
    assert_eq!(roster[1].1.first_name, "Bob");
}
