use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DeleteResult, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::department;
use crate::static_service::DATABASE_CONNECTION;

pub struct DepartmentRepository;

impl DepartmentRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_all(&self) -> Result<Vec<department::Model>> {
        let db = self.get_connection();
        let departments = department::Entity::find()
            .order_by_asc(department::Column::Code)
            .all(db)
            .await?;
        Ok(departments)
    }

    pub async fn find_by_id(&self, department_id: Uuid) -> Result<Option<department::Model>> {
        let db = self.get_connection();
        let department = department::Entity::find_by_id(department_id).one(db).await?;
        Ok(department)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<department::Model>> {
        let db = self.get_connection();
        let department = department::Entity::find()
            .filter(department::Column::Code.eq(code))
            .one(db)
            .await?;
        Ok(department)
    }

    pub async fn create(
        &self,
        department_id: Uuid,
        code: String,
        name: String,
    ) -> Result<department::Model> {
        let db = self.get_connection();
        let now = Utc::now().naive_utc();
        let department_model = department::ActiveModel {
            department_id: Set(department_id),
            code: Set(code),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = department_model.insert(db).await?;
        Ok(result)
    }

    pub async fn update(
        &self,
        department_id: Uuid,
        updates: DepartmentUpdate,
    ) -> Result<department::Model> {
        let department = self
            .find_by_id(department_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Department not found"))?;
        let db = self.get_connection();

        let mut active_model: department::ActiveModel = department.into();

        if let Some(code) = updates.code {
            active_model.code = Set(code);
        }
        if let Some(name) = updates.name {
            active_model.name = Set(name);
        }

        active_model.updated_at = Set(Utc::now().naive_utc());

        let result = active_model.update(db).await?;
        Ok(result)
    }

    pub async fn delete(&self, department_id: Uuid) -> Result<DeleteResult> {
        let department = self
            .find_by_id(department_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Department not found"))?;
        let db = self.get_connection();

        let active_model: department::ActiveModel = department.into();
        let result = active_model.delete(db).await?;
        Ok(result)
    }
}

pub struct DepartmentUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
}
