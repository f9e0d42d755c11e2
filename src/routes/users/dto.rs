use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::catalog::filter::total_pages;
use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::entities::user;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQueryParams {
    /// 1-based page number.
    pub page: Option<u64>,
    pub role: Option<RoleEnum>,
    /// Substring over name, email and student code.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "ada.lovelace@university.edu")]
    pub email: String,
    pub role: RoleEnum,
    pub student_code: Option<String>,
    pub department_id: Option<Uuid>,
    pub active: bool,
}

impl From<&user::Model> for UserResponse {
    fn from(row: &user::Model) -> Self {
        UserResponse {
            user_id: row.user_id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
            role: row.role,
            student_code: row.student_code.clone(),
            department_id: row.department_id,
            active: row.active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl UserListResponse {
    pub fn from_rows(rows: &[user::Model], page: u64, total_items: u64, page_size: u64) -> Self {
        UserListResponse {
            users: rows.iter().map(UserResponse::from).collect(),
            page,
            total_items,
            total_pages: total_pages(total_items, page_size),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada")]
    pub first_name: String,

    #[schema(example = "Lovelace")]
    pub last_name: String,

    #[schema(example = "ada.lovelace@university.edu")]
    pub email: String,

    pub role: RoleEnum,

    /// Required for students, ignored for other roles.
    #[schema(example = "S2026-0042")]
    pub student_code: Option<String>,

    pub department_id: Option<Uuid>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Name cannot be blank".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("A valid email address is required".to_string());
        }
        if self.role == RoleEnum::Student
            && self
                .student_code
                .as_deref()
                .is_none_or(|code| code.trim().is_empty())
        {
            return Err("Students need a student code".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleEnum>,
    pub student_code: Option<String>,
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(email) = self.email.as_deref() {
            if email.trim().is_empty() || !email.contains('@') {
                return Err("A valid email address is required".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: RoleEnum, student_code: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@university.edu".to_string(),
            role,
            student_code: student_code.map(str::to_string),
            department_id: None,
        }
    }

    #[test]
    fn students_require_a_student_code() {
        assert!(request(RoleEnum::Student, None).validate().is_err());
        assert!(request(RoleEnum::Student, Some("  ")).validate().is_err());
        assert!(request(RoleEnum::Student, Some("S-1")).validate().is_ok());
        assert!(request(RoleEnum::Faculty, None).validate().is_ok());
    }

    #[test]
    fn email_needs_an_at_sign() {
        let mut bad = request(RoleEnum::Faculty, None);
        bad.email = "not-an-email".to_string();
        assert!(bad.validate().is_err());
    }
}
