//! Catalog filtering, search and pagination against a real database,
//! including the assembled listing fields the cards are built from.

mod common;

use registrar_service::catalog::filter::CourseFilter;
use registrar_service::catalog::schedule_format::SCHEDULE_UNAVAILABLE;
use registrar_service::entities::sea_orm_active_enums::{
    DayOfWeek, DeliveryMode, EnrollmentStatus, RoleEnum,
};
use registrar_service::repositories::{
    CourseRepository, DepartmentRepository, EnrollmentRepository, UserRepository,
};
use uuid::Uuid;

struct Seed {
    cs_department: Uuid,
    hopper: Uuid,
    cs350: Uuid,
}

async fn seed() -> Seed {
    let department_repo = DepartmentRepository::new();
    let cs = department_repo
        .create(Uuid::new_v4(), "CS".to_string(), "Computer Science".to_string())
        .await
        .expect("department should insert");
    let bio = department_repo
        .create(Uuid::new_v4(), "BIO".to_string(), "Biology".to_string())
        .await
        .expect("department should insert");

    let user_repo = UserRepository::new();
    let hopper = user_repo
        .create(
            Uuid::new_v4(),
            "Grace".to_string(),
            "Hopper".to_string(),
            "grace@university.edu".to_string(),
            RoleEnum::Faculty,
            None,
            Some(cs.department_id),
        )
        .await
        .expect("instructor should insert");
    let mendel = user_repo
        .create(
            Uuid::new_v4(),
            "Gregor".to_string(),
            "Mendel".to_string(),
            "gregor@university.edu".to_string(),
            RoleEnum::Faculty,
            None,
            Some(bio.department_id),
        )
        .await
        .expect("instructor should insert");

    let course_repo = CourseRepository::new();
    let mut cs350 = Uuid::nil();
    let courses: [(&str, &str, Uuid, Option<Uuid>, DeliveryMode, i32, &str, i32); 5] = [
        (
            "CS 101",
            "Introduction to Programming",
            cs.department_id,
            Some(hopper.user_id),
            DeliveryMode::InPerson,
            100,
            "fall",
            2026,
        ),
        (
            "CS 350",
            "Operating Systems",
            cs.department_id,
            Some(hopper.user_id),
            DeliveryMode::InPerson,
            300,
            "fall",
            2026,
        ),
        (
            "CS 442",
            "Distributed Systems",
            cs.department_id,
            Some(hopper.user_id),
            DeliveryMode::Hybrid,
            400,
            "spring",
            2027,
        ),
        (
            "BIO 110",
            "General Biology",
            bio.department_id,
            None,
            DeliveryMode::InPerson,
            100,
            "fall",
            2026,
        ),
        (
            "BIO 465",
            "Genomics",
            bio.department_id,
            Some(mendel.user_id),
            DeliveryMode::Online,
            400,
            "fall",
            2026,
        ),
    ];
    for (code, title, department_id, instructor_id, mode, level, semester, year) in courses {
        let course = course_repo
            .create(
                Uuid::new_v4(),
                code.to_string(),
                title.to_string(),
                String::new(),
                3,
                department_id,
                instructor_id,
                30,
                mode,
                level,
                semester.to_string(),
                year,
                None,
            )
            .await
            .expect("course should insert");
        if code == "CS 350" {
            cs350 = course.course_id;
        }
    }

    Seed {
        cs_department: cs.department_id,
        hopper: hopper.user_id,
        cs350,
    }
}

fn codes(page: &registrar_service::repositories::course_repository::CoursePage) -> Vec<String> {
    page.listings.iter().map(|l| l.course.code.clone()).collect()
}

#[tokio::test]
async fn filters_search_and_pagination() {
    common::setup_database().await;
    let seed = seed().await;
    let course_repo = CourseRepository::new();

    // Unfiltered catalog pages in code order, two cards at a time.
    let page = course_repo
        .find_page(&CourseFilter::default(), 1, 2)
        .await
        .expect("page should load");
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(codes(&page), vec!["BIO 110", "BIO 465"]);

    let page = course_repo
        .find_page(&CourseFilter::default(), 3, 2)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["CS 442"]);

    // Pages past the end are empty but keep the totals.
    let page = course_repo
        .find_page(&CourseFilter::default(), 4, 2)
        .await
        .expect("page should load");
    assert!(page.listings.is_empty());
    assert_eq!(page.total_items, 5);

    // Even an absurd page number; the offset arithmetic must not wrap.
    let page = course_repo
        .find_page(&CourseFilter::default(), u64::MAX, 2)
        .await
        .expect("page should load");
    assert!(page.listings.is_empty());
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);

    // Page zero is treated as page one.
    let page = course_repo
        .find_page(&CourseFilter::default(), 0, 2)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["BIO 110", "BIO 465"]);

    // Filters are conjunctive.
    let filter = CourseFilter {
        department_id: Some(seed.cs_department),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["CS 101", "CS 350", "CS 442"]);

    let filter = CourseFilter {
        min_level: Some(300),
        max_level: Some(400),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["BIO 465", "CS 350", "CS 442"]);

    let filter = CourseFilter {
        delivery_mode: Some(DeliveryMode::Online),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["BIO 465"]);

    // Term matching ignores the stored casing.
    let filter = CourseFilter {
        semester: Some("FALL".to_string()),
        year: Some(2026),
        ..Default::default()
    }
    .normalized();
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(page.total_items, 4);

    // Search is case-insensitive over code and title.
    let filter = CourseFilter {
        search: Some("operating".to_string()),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["CS 350"]);

    let filter = CourseFilter {
        search: Some("bio".to_string()),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["BIO 110", "BIO 465"]);

    // Search also reaches the instructor's name.
    let filter = CourseFilter {
        search: Some("hopper".to_string()),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["CS 101", "CS 350", "CS 442"]);

    let filter = CourseFilter {
        search: Some("  Grace Hopper ".to_string()),
        semester: Some("fall".to_string()),
        ..Default::default()
    }
    .normalized();
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(codes(&page), vec!["CS 101", "CS 350"]);

    // A filter nothing satisfies yields an empty, zero-page result.
    let filter = CourseFilter {
        search: Some("underwater basket weaving".to_string()),
        ..Default::default()
    };
    let page = course_repo
        .find_page(&filter, 1, 10)
        .await
        .expect("page should load");
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.listings.is_empty());

    // Assembled listings carry the card fields.
    let listing = course_repo
        .find_listing(seed.cs350)
        .await
        .expect("listing should load")
        .expect("course exists");
    assert_eq!(listing.department_code, "CS");
    assert_eq!(listing.instructor_name.as_deref(), Some("Grace Hopper"));
    assert_eq!(listing.schedule_summary, SCHEDULE_UNAVAILABLE);
    assert_eq!(listing.registered_count, 0);

    course_repo
        .add_slot(
            Uuid::new_v4(),
            seed.cs350,
            DayOfWeek::Thursday,
            "14:00".to_string(),
            "15:20".to_string(),
            "Turing 12".to_string(),
        )
        .await
        .expect("slot should insert");
    course_repo
        .add_slot(
            Uuid::new_v4(),
            seed.cs350,
            DayOfWeek::Tuesday,
            "14:00".to_string(),
            "15:20".to_string(),
            "Turing 12".to_string(),
        )
        .await
        .expect("slot should insert");

    // One registered and one waitlisted student; only the first
    // counts against capacity.
    let user_repo = UserRepository::new();
    let enrollment_repo = EnrollmentRepository::new();
    for (name, code, status) in [
        ("Ada", "S-0001", EnrollmentStatus::Registered),
        ("Alan", "S-0002", EnrollmentStatus::Waitlisted),
    ] {
        let student = user_repo
            .create(
                Uuid::new_v4(),
                name.to_string(),
                "Student".to_string(),
                format!("{}@university.edu", name.to_lowercase()),
                RoleEnum::Student,
                Some(code.to_string()),
                None,
            )
            .await
            .expect("student should insert");
        let outcome = enrollment_repo
            .register(student.user_id, seed.cs350, true)
            .await
            .expect("register should not fail");
        assert!(outcome.is_success());
        if status == EnrollmentStatus::Waitlisted {
            // Capacity is 30, so force the second row onto the
            // waitlist directly to exercise the count filter.
            let row = enrollment_repo
                .find_one(student.user_id, seed.cs350)
                .await
                .expect("lookup should work")
                .expect("row exists");
            use sea_orm::{ActiveModelTrait, Set};
            let mut active: registrar_service::entities::enrollment::ActiveModel = row.into();
            active.status = Set(EnrollmentStatus::Waitlisted);
            active
                .update(
                    registrar_service::static_service::DATABASE_CONNECTION
                        .get()
                        .expect("connection set"),
                )
                .await
                .expect("update should work");
        }
    }

    let listing = course_repo
        .find_listing(seed.cs350)
        .await
        .expect("listing should load")
        .expect("course exists");
    assert_eq!(listing.schedule_summary, "Tue, Thu \u{2022} 14:00-15:20");
    assert_eq!(listing.registered_count, 1);

    // Instructor view: everything Hopper teaches, code ascending.
    let teaching = course_repo
        .find_by_instructor(seed.hopper)
        .await
        .expect("teaching list should load");
    let teaching_codes: Vec<&str> = teaching.iter().map(|l| l.course.code.as_str()).collect();
    assert_eq!(teaching_codes, vec!["CS 101", "CS 350", "CS 442"]);
}
