use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::entities::user;
use crate::static_service::DATABASE_CONNECTION;

pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    fn get_connection(&self) -> &'static DatabaseConnection {
        DATABASE_CONNECTION
            .get()
            .expect("DATABASE_CONNECTION not set")
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>> {
        let db = self.get_connection();
        let user = user::Entity::find_by_id(user_id).one(db).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let db = self.get_connection();
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_role(&self, role: RoleEnum) -> Result<Vec<user::Model>> {
        let db = self.get_connection();
        let users = user::Entity::find()
            .filter(user::Column::Role.eq(role))
            .filter(user::Column::Active.eq(true))
            .order_by_asc(user::Column::LastName)
            .all(db)
            .await?;
        Ok(users)
    }

    pub async fn find_all_with_pagination(
        &self,
        page: u64,
        page_size: u64,
        role_filter: Option<RoleEnum>,
        search: Option<String>,
    ) -> Result<(Vec<user::Model>, u64)> {
        let db = self.get_connection();
        let mut query = user::Entity::find();

        if let Some(role) = role_filter {
            query = query.filter(user::Column::Role.eq(role));
        }

        if let Some(search_term) = search {
            query = query.filter(
                user::Column::FirstName
                    .contains(&search_term)
                    .or(user::Column::LastName.contains(&search_term))
                    .or(user::Column::Email.contains(&search_term))
                    .or(user::Column::StudentCode.contains(&search_term)),
            );
        }

        let total = query.clone().count(db).await?;

        // Every page past the end is the same empty page, so the offset
        // never needs to grow beyond one page past the last.
        let last_page = total.div_ceil(page_size.max(1));
        let page = page.clamp(1, last_page.saturating_add(1));

        let users = query
            .order_by_desc(user::Column::CreatedAt)
            .limit(page_size)
            .offset((page - 1) * page_size)
            .all(db)
            .await?;

        Ok((users, total))
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        first_name: String,
        last_name: String,
        email: String,
        role: RoleEnum,
        student_code: Option<String>,
        department_id: Option<Uuid>,
    ) -> Result<user::Model> {
        let db = self.get_connection();
        let now = Utc::now().naive_utc();
        let user_model = user::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            role: Set(role),
            student_code: Set(student_code),
            department_id: Set(department_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = user_model.insert(db).await?;
        Ok(result)
    }

    pub async fn update(&self, user_id: Uuid, updates: UserUpdate) -> Result<user::Model> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found"))?;
        let db = self.get_connection();

        let mut active_model: user::ActiveModel = user.into();

        if let Some(first_name) = updates.first_name {
            active_model.first_name = Set(first_name);
        }
        if let Some(last_name) = updates.last_name {
            active_model.last_name = Set(last_name);
        }
        if let Some(email) = updates.email {
            active_model.email = Set(email);
        }
        if let Some(role) = updates.role {
            active_model.role = Set(role);
        }
        if let Some(student_code) = updates.student_code {
            active_model.student_code = Set(Some(student_code));
        }
        if let Some(department_id) = updates.department_id {
            active_model.department_id = Set(Some(department_id));
        }
        if let Some(active) = updates.active {
            active_model.active = Set(active);
        }

        active_model.updated_at = Set(Utc::now().naive_utc());

        let result = active_model.update(db).await?;
        Ok(result)
    }

    /// Soft delete. Rows are never removed, enrollments and grades
    /// keep pointing at them.
    pub async fn deactivate(&self, user_id: Uuid) -> Result<user::Model> {
        self.update(
            user_id,
            UserUpdate {
                active: Some(false),
                ..UserUpdate::default()
            },
        )
        .await
    }
}

#[derive(Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleEnum>,
    pub student_code: Option<String>,
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
}
