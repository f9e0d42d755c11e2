//! Handler-level behavior the repository flows cannot see: query
//! parameter shapes, role gates, referential guards on destructive
//! paths and cache eviction riding on successful writes.

mod common;

use axum::{
    Json,
    extract::{Path, Query},
    http::{StatusCode, Uri},
};
use chrono::{NaiveDate, NaiveDateTime};
use registrar_service::cache::{CoursePageKey, QUERY_CACHE};
use registrar_service::catalog::filter::CourseFilter;
use registrar_service::entities::sea_orm_active_enums::{
    DayOfWeek, DeliveryMode, EnrollmentStatus, RoleEnum,
};
use registrar_service::extractor::{AuthClaims, TokenClaims};
use registrar_service::repositories::{
    CalendarEventRepository, CourseRepository, DepartmentRepository, GradebookRepository,
    LmsLinkRepository, UserRepository,
};
use registrar_service::routes::courses::route::remove_schedule_slot;
use registrar_service::routes::departments::route::delete_department;
use registrar_service::routes::enrollments::dto::RegisterRequest;
use registrar_service::routes::enrollments::route::register;
use registrar_service::routes::events::dto::ListEventsParams;
use registrar_service::routes::events::route::list_events;
use registrar_service::routes::notifications::dto::SendNotificationRequest;
use registrar_service::routes::notifications::route::send;
use uuid::Uuid;

fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

fn claims(user_id: Uuid, role: RoleEnum) -> AuthClaims {
    AuthClaims(TokenClaims::new(user_id, role))
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
async fn guards_parameters_and_eviction() {
    common::setup_database().await;

    let department_repo = DepartmentRepository::new();
    let cs = department_repo
        .create(Uuid::new_v4(), "CS".to_string(), "Computer Science".to_string())
        .await
        .expect("department should insert");
    let history = department_repo
        .create(Uuid::new_v4(), "HIST".to_string(), "History".to_string())
        .await
        .expect("department should insert");

    let hopper = seed_user(RoleEnum::Faculty, "Grace", "grace@university.edu").await;
    let ada = seed_user(RoleEnum::Student, "Ada", "ada@university.edu").await;
    let bob = seed_user(RoleEnum::Student, "Bob", "bob@university.edu").await;

    let course_repo = CourseRepository::new();
    let cs350 = course_repo
        .create(
            Uuid::new_v4(),
            "CS 350".to_string(),
            "Operating Systems".to_string(),
            String::new(),
            4,
            cs.department_id,
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
    let cs101 = course_repo
        .create(
            Uuid::new_v4(),
            "CS 101".to_string(),
            "Introduction to Programming".to_string(),
            String::new(),
            4,
            cs.department_id,
            Some(hopper),
            30,
            DeliveryMode::InPerson,
            100,
            "fall".to_string(),
            2026,
            None,
        )
        .await
        .expect("course should insert");

    // --- calendar listing bounds ---

    // A bare listing and one-sided ranges are all valid shapes.
    let uri = "/api/v1/events".parse::<Uri>().expect("uri should parse");
    let Query(params) =
        Query::<ListEventsParams>::try_from_uri(&uri).expect("missing bounds should deserialize");
    assert!(params.from.is_none());
    assert!(params.to.is_none());

    let uri = "/api/v1/events?from=2026-09-01T00:00:00"
        .parse::<Uri>()
        .expect("uri should parse");
    let Query(params) =
        Query::<ListEventsParams>::try_from_uri(&uri).expect("single bound should deserialize");
    assert_eq!(params.from.as_deref(), Some("2026-09-01T00:00:00"));
    assert!(params.to.is_none());

    let calendar = CalendarEventRepository::new();
    calendar
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
    calendar
        .create(
            Uuid::new_v4(),
            "Final exam".to_string(),
            None,
            Some("Turing 12".to_string()),
            dt(2026, 12, 15, 9, 0),
            dt(2026, 12, 15, 12, 0),
            Some(cs350.course_id),
            hopper,
        )
        .await
        .expect("event should insert");

    // No bounds lists the whole calendar, soonest first.
    let (status, Json(listing)) = list_events(
        claims(ada, RoleEnum::Student),
        Query(ListEventsParams::default()),
    )
    .await
    .expect("unbounded listing should load");
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = listing.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Fall term begins", "Final exam"]);

    // A lone lower bound leaves the end open.
    let (_, Json(listing)) = list_events(
        claims(ada, RoleEnum::Student),
        Query(ListEventsParams {
            from: Some("2026-11-01T00:00:00".to_string()),
            to: None,
        }),
    )
    .await
    .expect("open-ended listing should load");
    let titles: Vec<&str> = listing.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Final exam"]);

    // Two bounds still have to form a range.
    let (status, message) = list_events(
        claims(ada, RoleEnum::Student),
        Query(ListEventsParams {
            from: Some("2026-12-01T00:00:00".to_string()),
            to: Some("2026-09-01T00:00:00".to_string()),
        }),
    )
    .await
    .expect_err("reversed range should be refused");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.contains("after"));

    // --- who may send notifications ---

    // Faculty message their students directly; students cannot send.
    let (status, Json(sent)) = send(
        claims(hopper, RoleEnum::Faculty),
        Json(SendNotificationRequest {
            user_id: ada,
            title: "Office hours moved".to_string(),
            body: "Now Thursdays at 14:00.".to_string(),
        }),
    )
    .await
    .expect("faculty should send");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent.title, "Office hours moved");

    let (status, _) = send(
        claims(ada, RoleEnum::Student),
        Json(SendNotificationRequest {
            user_id: bob,
            title: "Hi".to_string(),
            body: "Lunch?".to_string(),
        }),
    )
    .await
    .expect_err("students should be refused");
    assert_eq!(status, StatusCode::FORBIDDEN);

    // --- moodle ids anchor themselves ---

    // The first reference creates the anchor row, so the link never
    // dangles; later references share it.
    let linked = course_repo
        .create(
            Uuid::new_v4(),
            "CS 520".to_string(),
            "Compilers".to_string(),
            String::new(),
            4,
            cs.department_id,
            Some(hopper),
            20,
            DeliveryMode::Hybrid,
            500,
            "fall".to_string(),
            2026,
            Some("moodle-cs520".to_string()),
        )
        .await
        .expect("course with a fresh moodle id should insert");
    assert_eq!(linked.moodle_id.as_deref(), Some("moodle-cs520"));

    let anchor = LmsLinkRepository::new()
        .find("moodle-cs520")
        .await
        .expect("lookup should work")
        .expect("anchor row should exist");
    assert!(anchor.last_synced.is_none());

    let assignment = GradebookRepository::new()
        .create_assignment(
            Uuid::new_v4(),
            linked.course_id,
            "Parser project".to_string(),
            String::new(),
            Some(dt(2026, 11, 1, 23, 59)),
            100,
            Some("moodle-cs520".to_string()),
        )
        .await
        .expect("assignment sharing the anchor should insert");
    assert_eq!(assignment.moodle_id.as_deref(), Some("moodle-cs520"));

    // --- slot removal is scoped to its course ---

    let slot = course_repo
        .add_slot(
            Uuid::new_v4(),
            cs350.course_id,
            DayOfWeek::Monday,
            "10:00".to_string(),
            "11:30".to_string(),
            "Science Hall 204".to_string(),
        )
        .await
        .expect("slot should insert");

    // Reaching a slot through the wrong course reads as missing and
    // must leave the slot alone.
    let (status, _) = remove_schedule_slot(
        claims(Uuid::new_v4(), RoleEnum::Admin),
        Path((cs101.course_id, slot.schedule_id)),
    )
    .await
    .expect_err("foreign slot should read as missing");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        course_repo
            .find_slot(slot.schedule_id)
            .await
            .expect("lookup should work")
            .is_some(),
        "the slot must survive a cross-course delete attempt"
    );

    let (status, _) = remove_schedule_slot(
        claims(Uuid::new_v4(), RoleEnum::Admin),
        Path((cs350.course_id, Uuid::new_v4())),
    )
    .await
    .expect_err("unknown slot should read as missing");
    assert_eq!(status, StatusCode::NOT_FOUND);

    let status = remove_schedule_slot(
        claims(Uuid::new_v4(), RoleEnum::Admin),
        Path((cs350.course_id, slot.schedule_id)),
    )
    .await
    .expect("owning course should remove its slot");
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(
        course_repo
            .find_slot(slot.schedule_id)
            .await
            .expect("lookup should work")
            .is_none()
    );

    // --- departments with courses refuse to die ---

    let (status, message) = delete_department(
        claims(Uuid::new_v4(), RoleEnum::Admin),
        Path(cs.department_id),
    )
    .await
    .expect_err("referenced department should be refused");
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(message.contains("course"));

    let status = delete_department(
        claims(Uuid::new_v4(), RoleEnum::Admin),
        Path(history.department_id),
    )
    .await
    .expect("empty department should delete");
    assert_eq!(status, StatusCode::NO_CONTENT);

    // --- user paging stays calm on absurd pages ---

    let (users, total) = UserRepository::new()
        .find_all_with_pagination(u64::MAX, 10, None, None)
        .await
        .expect("page should load");
    assert!(users.is_empty());
    assert_eq!(total, 3);

    // --- eviction rides on successful registrations only ---

    let tiny = course_repo
        .create(
            Uuid::new_v4(),
            "CS 442".to_string(),
            "Distributed Systems".to_string(),
            String::new(),
            3,
            cs.department_id,
            Some(hopper),
            1,
            DeliveryMode::InPerson,
            400,
            "fall".to_string(),
            2026,
            None,
        )
        .await
        .expect("course should insert");

    let (status, Json(first)) = register(
        claims(ada, RoleEnum::Student),
        Json(RegisterRequest {
            course_id: tiny.course_id,
            join_waitlist: false,
        }),
    )
    .await
    .expect("registering should work");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first.status, EnrollmentStatus::Registered);

    // Warm a catalog page, then write through the handler: a refusal
    // leaves the page warm, a successful write evicts it.
    let key = CoursePageKey {
        filter: CourseFilter::default(),
        page: 1,
    };
    let warmed = course_repo
        .find_page(&CourseFilter::default(), 1, 10)
        .await
        .expect("page should load");
    QUERY_CACHE.insert_course_page(key.clone(), warmed);
    assert!(QUERY_CACHE.get_course_page(&key).is_some());

    let (status, _) = register(
        claims(bob, RoleEnum::Student),
        Json(RegisterRequest {
            course_id: tiny.course_id,
            join_waitlist: false,
        }),
    )
    .await
    .expect_err("full course should refuse");
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(
        QUERY_CACHE.get_course_page(&key).is_some(),
        "a refused registration must not evict"
    );

    let (status, Json(waitlisted)) = register(
        claims(bob, RoleEnum::Student),
        Json(RegisterRequest {
            course_id: tiny.course_id,
            join_waitlist: true,
        }),
    )
    .await
    .expect("waitlisting should work");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(waitlisted.status, EnrollmentStatus::Waitlisted);
    assert!(
        QUERY_CACHE.get_course_page(&key).is_none(),
        "a successful registration must evict"
    );
}
