use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::entities::{department, user};
use crate::navigation::NavEntry;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: RoleEnum,
    pub student_code: Option<String>,
    pub department_code: Option<String>,
    pub department_name: Option<String>,
}

impl ProfileResponse {
    pub fn from_user(user: &user::Model, department: Option<&department::Model>) -> Self {
        ProfileResponse {
            user_id: user.user_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            student_code: user.student_code.clone(),
            department_code: department.map(|d| d.code.clone()),
            department_name: department.map(|d| d.name.clone()),
        }
    }
}

/// The navigation bar for the caller's role.
#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationResponse {
    pub role: RoleEnum,
    pub entries: &'static [NavEntry],
    pub unread_notifications: u64,
}
