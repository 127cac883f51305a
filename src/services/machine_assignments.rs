use chrono::{DateTime, Utc};
use sea_orm::{DbErr, EntityTrait, SqlErr, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        machine, machine_client,
        user::{self, UserRole},
    },
    errors::ServiceError,
    repositories::MachineClientRepository,
    services::users::UserService,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignMachineInput {
    pub client_id: i32,
    pub machine_id: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReassignMachineInput {
    pub machine_id: i32,
    pub new_client_id: i32,
    /// When given, the machine must currently belong to this client
    pub old_client_id: Option<i32>,
}

/// The client holding a machine right now
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentClient {
    pub client_id: i32,
    pub machine_id: i32,
    pub assigned_at: DateTime<Utc>,
    pub client: user::Model,
}

/// Keeps the one-client-per-machine link
#[derive(Clone)]
pub struct MachineAssignmentService {
    db_pool: Arc<DbPool>,
    links: MachineClientRepository,
    users: Arc<UserService>,
}

impl MachineAssignmentService {
    pub fn new(db_pool: Arc<DbPool>, users: Arc<UserService>) -> Self {
        Self {
            links: MachineClientRepository::new(db_pool.clone()),
            db_pool,
            users,
        }
    }

    /// Links a free machine to a client. Repeating the same link is a no-op;
    /// a machine held by someone else must go through `reassign`.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        client_id: i32,
        machine_id: i32,
    ) -> Result<machine_client::Model, ServiceError> {
        self.users
            .require_role(client_id, UserRole::Client, "Client")
            .await?;
        self.require_machine(machine_id).await?;

        let txn = self.db_pool.begin().await?;
        if let Some(existing) = MachineClientRepository::find_by_machine(&txn, machine_id).await? {
            txn.rollback().await?;
            if existing.client_id == client_id {
                return Ok(existing);
            }
            return Err(held_by_other(machine_id, existing.client_id));
        }

        let link = MachineClientRepository::upsert(&txn, machine_id, client_id)
            .await
            .map_err(|e| unique_to_conflict(e, machine_id))?;
        txn.commit().await?;

        info!(machine_id, client_id, "Machine assigned");
        Ok(link)
    }

    /// Moves the machine to `new_client_id`, optionally checking who holds it now
    #[instrument(skip(self, input), fields(machine_id = input.machine_id))]
    pub async fn reassign(
        &self,
        input: ReassignMachineInput,
    ) -> Result<machine_client::Model, ServiceError> {
        self.users
            .require_role(input.new_client_id, UserRole::Client, "Client")
            .await?;
        self.require_machine(input.machine_id).await?;

        let txn = self.db_pool.begin().await?;
        let current = MachineClientRepository::find_by_machine(&txn, input.machine_id).await?;
        if let Some(expected) = input.old_client_id {
            let holder = current.as_ref().map(|link| link.client_id);
            if holder != Some(expected) {
                txn.rollback().await?;
                return Err(ServiceError::Conflict(format!(
                    "Machine {} is not assigned to client {}",
                    input.machine_id, expected
                )));
            }
        }

        let link = MachineClientRepository::upsert(&txn, input.machine_id, input.new_client_id)
            .await
            .map_err(|e| unique_to_conflict(e, input.machine_id))?;
        txn.commit().await?;

        info!(
            machine_id = input.machine_id,
            from = ?current.map(|link| link.client_id),
            to = input.new_client_id,
            "Machine reassigned"
        );
        Ok(link)
    }

    #[instrument(skip(self))]
    pub async fn unassign(&self, machine_id: i32) -> Result<(), ServiceError> {
        let removed =
            MachineClientRepository::delete_by_machine(&*self.db_pool, machine_id).await?;
        if removed == 0 {
            return Err(ServiceError::NotFound(format!(
                "Machine {} has no client assigned",
                machine_id
            )));
        }
        info!(machine_id, "Machine unassigned");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn current_client(&self, machine_id: i32) -> Result<CurrentClient, ServiceError> {
        let link = self.links.current(machine_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Machine {} has no client assigned", machine_id))
        })?;
        let client = self.users.get_user(link.client_id).await?;
        Ok(CurrentClient {
            client_id: link.client_id,
            machine_id: link.machine_id,
            assigned_at: link.assigned_at,
            client,
        })
    }

    /// Machines currently held by a client
    #[instrument(skip(self))]
    pub async fn machines_by_client(
        &self,
        client_id: i32,
    ) -> Result<Vec<machine::Model>, ServiceError> {
        self.users.get_user(client_id).await?;
        let links = self.links.find_by_client(client_id).await?;

        let mut machines = Vec::with_capacity(links.len());
        for link in links {
            if let Some(found) = machine::Entity::find_by_id(link.machine_id)
                .one(&*self.db_pool)
                .await?
            {
                machines.push(found);
            }
        }
        Ok(machines)
    }

    async fn require_machine(&self, machine_id: i32) -> Result<machine::Model, ServiceError> {
        machine::Entity::find_by_id(machine_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Machine", machine_id))
    }
}

fn held_by_other(machine_id: i32, client_id: i32) -> ServiceError {
    ServiceError::Conflict(format!(
        "Machine {} is already assigned to client {}; use reassign",
        machine_id, client_id
    ))
}

/// A concurrent assign that lost the race trips the unique index
fn unique_to_conflict(err: DbErr, machine_id: i32) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(format!(
            "Machine {} was assigned concurrently; retry",
            machine_id
        )),
        _ => ServiceError::DatabaseError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_machine, insert_user, memory_db};
    use assert_matches::assert_matches;

    struct Fixture {
        service: MachineAssignmentService,
        machine: i32,
        first: i32,
        second: i32,
    }

    async fn fixture() -> Fixture {
        let db = memory_db().await;
        let machine = insert_machine(&db, "Lavadora").await.id;
        let first = insert_user(&db, "cliente7", UserRole::Client).await.id;
        let second = insert_user(&db, "cliente9", UserRole::Client).await.id;
        let users = Arc::new(UserService::new(db.clone()));
        Fixture {
            service: MachineAssignmentService::new(db, users),
            machine,
            first,
            second,
        }
    }

    #[tokio::test]
    async fn assign_then_reassign_moves_the_machine() {
        let f = fixture().await;

        f.service.assign(f.first, f.machine).await.unwrap();
        assert_eq!(f.service.current_client(f.machine).await.unwrap().client_id, f.first);

        f.service
            .reassign(ReassignMachineInput {
                machine_id: f.machine,
                new_client_id: f.second,
                old_client_id: None,
            })
            .await
            .unwrap();
        let current = f.service.current_client(f.machine).await.unwrap();
        assert_eq!(current.client_id, f.second);
        assert_eq!(current.client.username, "cliente9");
    }

    #[tokio::test]
    async fn assign_is_idempotent_for_the_same_client_only() {
        let f = fixture().await;
        let first = f.service.assign(f.first, f.machine).await.unwrap();
        let again = f.service.assign(f.first, f.machine).await.unwrap();
        assert_eq!(first.id, again.id);

        assert_matches!(
            f.service.assign(f.second, f.machine).await,
            Err(ServiceError::Conflict(_))
        );
        assert_eq!(f.service.current_client(f.machine).await.unwrap().client_id, f.first);
    }

    #[tokio::test]
    async fn reassign_checks_the_expected_holder() {
        let f = fixture().await;
        f.service.assign(f.first, f.machine).await.unwrap();

        let result = f
            .service
            .reassign(ReassignMachineInput {
                machine_id: f.machine,
                new_client_id: f.second,
                old_client_id: Some(f.second),
            })
            .await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
        assert_eq!(f.service.current_client(f.machine).await.unwrap().client_id, f.first);
    }

    #[tokio::test]
    async fn only_clients_can_hold_machines() {
        let db = memory_db().await;
        let machine = insert_machine(&db, "Lavadora").await.id;
        let tech = insert_user(&db, "tech", UserRole::Technician).await.id;
        let service = MachineAssignmentService::new(db.clone(), Arc::new(UserService::new(db)));

        assert_matches!(
            service.assign(tech, machine).await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(service.assign(tech, 999).await, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn unassign_and_listing() {
        let f = fixture().await;
        f.service.assign(f.first, f.machine).await.unwrap();
        assert_eq!(f.service.machines_by_client(f.first).await.unwrap().len(), 1);

        f.service.unassign(f.machine).await.unwrap();
        assert!(f.service.machines_by_client(f.first).await.unwrap().is_empty());
        assert_matches!(f.service.unassign(f.machine).await, Err(ServiceError::NotFound(_)));
        assert_matches!(
            f.service.current_client(f.machine).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
