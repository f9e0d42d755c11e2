use crate::entities::enrollment;

/// Business outcome of a registration attempt. The route layer maps
/// these to status codes; only the first two touch the database.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Registered(enrollment::Model),
    Waitlisted(enrollment::Model),
    CourseFull,
    AlreadyEnrolled,
    CourseNotFound,
}

impl RegisterOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RegisterOutcome::Registered(_) | RegisterOutcome::Waitlisted(_)
        )
    }

    pub fn message(&self) -> String {
        match self {
            RegisterOutcome::Registered(_) => "Registered successfully".to_string(),
            RegisterOutcome::Waitlisted(_) => "Course is full, added to waitlist".to_string(),
            RegisterOutcome::CourseFull => "Course is full".to_string(),
            RegisterOutcome::AlreadyEnrolled => {
                "Already registered or waitlisted for this course".to_string()
            }
            RegisterOutcome::CourseNotFound => "Course not found".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DropOutcome {
    Dropped(enrollment::Model),
    NotEnrolled,
}

impl DropOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DropOutcome::Dropped(_))
    }

    pub fn message(&self) -> String {
        match self {
            DropOutcome::Dropped(_) => "Course dropped".to_string(),
            DropOutcome::NotEnrolled => "No active enrollment for this course".to_string(),
        }
    }
}
