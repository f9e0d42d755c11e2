//! Gradebook, notification and calendar flows against a real database.

mod common;

use chrono::{NaiveDate, NaiveDateTime};
use registrar_service::entities::sea_orm_active_enums::{DeliveryMode, RoleEnum};
use registrar_service::repositories::{
    CalendarEventRepository, CalendarEventUpdate, CourseRepository, DepartmentRepository,
    EnrollmentRepository, GradeOutcome, GradebookRepository, NotificationRepository,
    UserRepository,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

async fn seed_user(role: RoleEnum, first: &str, email: &str) -> Uuid {
    let student_code = (role == RoleEnum::Student).then(|| format!("S-{}", first.to_uppercase()));
    UserRepository::new()
        .create(
            Uuid::new_v4(),
            first.to_string(),
            "Tester".to_string(),
            email.to_string(),
            role,
            student_code,
            None,
        )
        .await
        .expect("user should insert")
        .user_id
}

#[tokio::test]
async fn grading_notifying_and_scheduling() {
    common::setup_database().await;

    let department = DepartmentRepository::new()
        .create(Uuid::new_v4(), "CS".to_string(), "Computer Science".to_string())
        .await
        .expect("department should insert");
    let hopper = seed_user(RoleEnum::Faculty, "Grace", "grace@university.edu").await;
    let ada = seed_user(RoleEnum::Student, "Ada", "ada@university.edu").await;
    let bob = seed_user(RoleEnum::Student, "Bob", "bob@university.edu").await;

    let course = CourseRepository::new()
        .create(
            Uuid::new_v4(),
            "CS 350".to_string(),
            "Operating Systems".to_string(),
            String::new(),
            4,
            department.department_id,
            Some(hopper),
            30,
            DeliveryMode::InPerson,
            300,
            "fall".to_string(),
            2026,
            None,
        )
        .await
        .expect("course should insert");

    let outcome = EnrollmentRepository::new()
        .register(ada, course.course_id, false)
        .await
        .expect("register should not fail");
    assert!(outcome.is_success());

    // --- gradebook ---

    let gradebook = GradebookRepository::new();
    let problem_set = gradebook
        .create_assignment(
            Uuid::new_v4(),
            course.course_id,
            "Problem set 1".to_string(),
            "Paging and protection".to_string(),
            Some(dt(2026, 10, 5, 23, 59)),
            100,
            None,
        )
        .await
        .expect("assignment should insert");
    let quiz = gradebook
        .create_assignment(
            Uuid::new_v4(),
            course.course_id,
            "Quiz 1".to_string(),
            String::new(),
            Some(dt(2026, 9, 20, 12, 0)),
            20,
            None,
        )
        .await
        .expect("assignment should insert");

    // Assignments list in due-date order.
    let assignments = gradebook
        .find_assignments_for_course(course.course_id)
        .await
        .expect("assignments should load");
    let titles: Vec<&str> = assignments.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Quiz 1", "Problem set 1"]);

    // Points are validated against the assignment, not clamped.
    let outcome = gradebook
        .record_grade(problem_set.assignment_id, ada, Decimal::from(120), hopper)
        .await
        .expect("record should not fail");
    assert!(matches!(
        outcome,
        GradeOutcome::PointsOutOfRange {
            points_possible: 100
        }
    ));
    assert_eq!(outcome.message(), "Points must be between 0 and 100");

    let outcome = gradebook
        .record_grade(problem_set.assignment_id, ada, Decimal::from(-1), hopper)
        .await
        .expect("record should not fail");
    assert!(!outcome.is_success());

    let outcome = gradebook
        .record_grade(Uuid::new_v4(), ada, Decimal::from(10), hopper)
        .await
        .expect("record should not fail");
    assert!(matches!(outcome, GradeOutcome::AssignmentNotFound));

    let outcome = gradebook
        .record_grade(problem_set.assignment_id, ada, Decimal::from(85), hopper)
        .await
        .expect("record should not fail");
    let GradeOutcome::Recorded(first_grade) = outcome else {
        panic!("expected a recorded grade");
    };
    assert_eq!(first_grade.points, Decimal::from(85));
    assert_eq!(first_grade.graded_by, hopper);

    gradebook
        .record_grade(quiz.assignment_id, ada, Decimal::new(185, 1), hopper)
        .await
        .expect("record should not fail");

    // Re-grading overwrites the existing row instead of adding one.
    let outcome = gradebook
        .record_grade(problem_set.assignment_id, ada, Decimal::from(92), hopper)
        .await
        .expect("record should not fail");
    let GradeOutcome::Recorded(regraded) = outcome else {
        panic!("expected a recorded grade");
    };
    assert_eq!(regraded.grade_id, first_grade.grade_id);
    assert_eq!(regraded.points, Decimal::from(92));

    let assignment_grades = gradebook
        .find_grades_for_assignment(problem_set.assignment_id)
        .await
        .expect("grades should load");
    assert_eq!(assignment_grades.len(), 1);
    let (grade_row, student) = &assignment_grades[0];
    assert_eq!(grade_row.points, Decimal::from(92));
    assert_eq!(
        student.as_ref().map(|s| s.first_name.as_str()),
        Some("Ada")
    );

    // Report joins out to assignment and course, newest grade first;
    // the re-grade bumped the problem set to the top.
    let report = gradebook
        .find_grades_for_student(ada)
        .await
        .expect("report should load");
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].assignment.title, "Problem set 1");
    assert_eq!(report[0].course_code, "CS 350");
    assert_eq!(report[0].course_title, "Operating Systems");
    assert_eq!(report[1].grade.points, Decimal::new(185, 1));

    let empty = gradebook
        .find_grades_for_student(bob)
        .await
        .expect("report should load");
    assert!(empty.is_empty());

    // --- notifications ---

    let notifications = NotificationRepository::new();
    let welcome = notifications
        .create(
            Uuid::new_v4(),
            ada,
            "Welcome".to_string(),
            "Term starts soon".to_string(),
        )
        .await
        .expect("notification should insert");
    assert_eq!(notifications.unread_count(ada).await.expect("count"), 1);

    // Only the owner can mark it read.
    let denied = notifications
        .mark_read(welcome.notification_id, hopper)
        .await
        .expect("mark should not fail");
    assert!(denied.is_none());

    let read = notifications
        .mark_read(welcome.notification_id, ada)
        .await
        .expect("mark should not fail")
        .expect("row exists");
    let first_read_at = read.read_at.expect("read timestamp set");

    // A second read keeps the original timestamp.
    let read_again = notifications
        .mark_read(welcome.notification_id, ada)
        .await
        .expect("mark should not fail")
        .expect("row exists");
    assert_eq!(read_again.read_at, Some(first_read_at));
    assert_eq!(notifications.unread_count(ada).await.expect("count"), 0);

    for title in ["Grade posted", "Room change"] {
        notifications
            .create(Uuid::new_v4(), ada, title.to_string(), String::new())
            .await
            .expect("notification should insert");
    }
    assert_eq!(notifications.mark_all_read(ada).await.expect("mark all"), 2);
    assert_eq!(notifications.unread_count(ada).await.expect("count"), 0);

    // Broadcast reaches active users only.
    UserRepository::new()
        .deactivate(bob)
        .await
        .expect("deactivate should work");
    let sent = notifications
        .broadcast("Maintenance window", "Saturday 02:00-04:00")
        .await
        .expect("broadcast should not fail");
    assert_eq!(sent, 2);
    assert!(notifications
        .find_for_user(bob)
        .await
        .expect("list should load")
        .is_empty());
    assert_eq!(
        notifications
            .find_for_user(ada)
            .await
            .expect("list should load")
            .len(),
        4
    );
    assert_eq!(notifications.unread_count(ada).await.expect("count"), 1);

    // --- calendar ---

    let calendar = CalendarEventRepository::new();
    let term_start = calendar
        .create(
            Uuid::new_v4(),
            "Fall term begins".to_string(),
            None,
            None,
            dt(2026, 9, 1, 8, 0),
            dt(2026, 9, 1, 9, 0),
            None,
            hopper,
        )
        .await
        .expect("event should insert");
    let midterm = calendar
        .create(
            Uuid::new_v4(),
            "Midterm exam".to_string(),
            Some("Closed book".to_string()),
            Some("Turing 12".to_string()),
            dt(2026, 10, 15, 10, 0),
            dt(2026, 10, 15, 12, 0),
            Some(course.course_id),
            hopper,
        )
        .await
        .expect("event should insert");
    calendar
        .create(
            Uuid::new_v4(),
            "Winter break".to_string(),
            None,
            None,
            dt(2026, 12, 20, 0, 0),
            dt(2027, 1, 5, 0, 0),
            None,
            hopper,
        )
        .await
        .expect("event should insert");

    // The window query keeps anything overlapping it, soonest first.
    // Winter break extends past the window but still overlaps.
    let in_window = calendar
        .find_in_range(Some(dt(2026, 10, 1, 0, 0)), Some(dt(2026, 12, 31, 0, 0)))
        .await
        .expect("range should load");
    let titles: Vec<&str> = in_window.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Midterm exam", "Winter break"]);

    // Open start, exclusive end: nothing starts strictly before 08:00.
    let before_term = calendar
        .find_in_range(None, Some(dt(2026, 9, 1, 8, 0)))
        .await
        .expect("range should load");
    assert!(before_term.is_empty());

    let course_events = calendar
        .find_for_course(course.course_id)
        .await
        .expect("course events should load");
    assert_eq!(course_events.len(), 1);
    assert_eq!(course_events[0].event_id, midterm.event_id);

    // Rescheduling moves it out of the old window.
    calendar
        .update(
            midterm.event_id,
            CalendarEventUpdate {
                title: None,
                description: None,
                location: None,
                starts_at: Some(dt(2027, 1, 10, 10, 0)),
                ends_at: Some(dt(2027, 1, 10, 12, 0)),
            },
        )
        .await
        .expect("update should work");
    let in_window = calendar
        .find_in_range(Some(dt(2026, 10, 1, 0, 0)), Some(dt(2026, 12, 31, 0, 0)))
        .await
        .expect("range should load");
    let titles: Vec<&str> = in_window.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Winter break"]);

    calendar
        .delete(term_start.event_id)
        .await
        .expect("delete should work");
    assert!(calendar
        .find_by_id(term_start.event_id)
        .await
        .expect("lookup should work")
        .is_none());
}
