use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::department;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateDepartmentRequest {
    #[schema(example = "CS")]
    pub code: String,

    #[schema(example = "Computer Science")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub department_id: Uuid,
    pub code: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<department::Model> for DepartmentResponse {
    fn from(model: department::Model) -> Self {
        Self {
            department_id: model.department_id,
            code: model.code,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentListResponse {
    pub total: usize,
    pub departments: Vec<DepartmentResponse>,
}

impl DepartmentListResponse {
    pub fn from_rows(rows: Vec<department::Model>) -> Self {
        Self {
            total: rows.len(),
            departments: rows.into_iter().map(DepartmentResponse::from).collect(),
        }
    }
}
