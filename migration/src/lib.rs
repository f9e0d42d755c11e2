pub use sea_orm_migration::prelude::*;

mod m20250902_101500_create_users_departments;
mod m20250902_153212_create_catalog_tables;
mod m20250905_090414_create_enrollments;
mod m20250918_134027_create_gradebook;
mod m20251002_112340_create_events_notifications;
mod m20251114_160211_add_catalog_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250902_101500_create_users_departments::Migration),
            Box::new(m20250902_153212_create_catalog_tables::Migration),
            Box::new(m20250905_090414_create_enrollments::Migration),
            Box::new(m20250918_134027_create_gradebook::Migration),
            Box::new(m20251002_112340_create_events_notifications::Migration),
            Box::new(m20251114_160211_add_catalog_indexes::Migration),
        ]
    }
}
