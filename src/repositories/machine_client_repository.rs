use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::machine_client::{
    ActiveModel as AssignmentActiveModel, Column, Entity as MachineClient,
    Model as AssignmentModel,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Repository for machine to client links
#[derive(Debug, Clone)]
pub struct MachineClientRepository {
    base: BaseRepository,
}

impl MachineClientRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_client(&self, client_id: i32) -> Result<Vec<AssignmentModel>, ServiceError> {
        MachineClient::find()
            .filter(Column::ClientId.eq(client_id))
            .order_by_asc(Column::MachineId)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn current(&self, machine_id: i32) -> Result<Option<AssignmentModel>, ServiceError> {
        Self::find_by_machine(self.base.get_db(), machine_id)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn find_by_machine<C>(
        conn: &C,
        machine_id: i32,
    ) -> Result<Option<AssignmentModel>, DbErr>
    where
        C: ConnectionTrait,
    {
        MachineClient::find()
            .filter(Column::MachineId.eq(machine_id))
            .one(conn)
            .await
    }

    /// Points the machine's single link row at `client_id`, creating it if needed
    pub async fn upsert<C>(
        conn: &C,
        machine_id: i32,
        client_id: i32,
    ) -> Result<AssignmentModel, DbErr>
    where
        C: ConnectionTrait,
    {
        match Self::find_by_machine(conn, machine_id).await? {
            Some(existing) => {
                let mut active: AssignmentActiveModel = existing.into();
                active.client_id = Set(client_id);
                active.assigned_at = Set(Utc::now());
                active.update(conn).await
            }
            None => {
                AssignmentActiveModel {
                    machine_id: Set(machine_id),
                    client_id: Set(client_id),
                    assigned_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(conn)
                .await
            }
        }
    }

    pub async fn delete_by_machine<C>(conn: &C, machine_id: i32) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        MachineClient::delete_many()
            .filter(Column::MachineId.eq(machine_id))
            .exec(conn)
            .await
            .map(|result| result.rows_affected)
    }
}
