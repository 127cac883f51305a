use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        machine,
        notification::NotificationType,
        part, part_used,
        repair_request::{self, RepairState, Severity},
        user::UserRole,
    },
    errors::ServiceError,
    repositories::PartRepository,
    services::{
        notifications::{DeliveryReport, NotificationService, Notice},
        users::UserService,
    },
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRepairRequestInput {
    pub client_id: i32,
    pub machine_id: i32,
    #[validate(length(min = 1, max = 2000))]
    pub fault_description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignTechnicianInput {
    pub technician_id: i32,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RepairDoneInput {
    #[validate(length(min = 1, max = 4000))]
    pub observations: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddPartUsedInput {
    pub part_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRepairRequestInput {
    #[validate(length(min = 1, max = 2000))]
    pub fault_description: Option<String>,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RepairRequestFilter {
    pub state: Option<RepairState>,
    pub client_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub machine_id: Option<i32>,
}

/// Result of a lifecycle step: the stored request and what happened to its
/// notifications
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RepairOutcome {
    pub request: repair_request::Model,
    pub notifications: DeliveryReport,
}

/// Drives repair requests through
/// `PENDING -> TECHNICIAN_ASSIGNED -> PRE_FINALIZED -> FINALIZED`.
///
/// Every transition checks the current state first and leaves the row
/// untouched when the check fails. Notifications are sent after the row is
/// written and never fail the transition.
#[derive(Clone)]
pub struct RepairRequestService {
    db_pool: Arc<DbPool>,
    users: Arc<UserService>,
    notifications: Arc<NotificationService>,
}

impl RepairRequestService {
    pub fn new(
        db_pool: Arc<DbPool>,
        users: Arc<UserService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_pool,
            users,
            notifications,
        }
    }

    /// Opens a PENDING request for a client's machine and tells the administrators
    #[instrument(skip(self, input), fields(client_id = input.client_id, machine_id = input.machine_id))]
    pub async fn create_request(
        &self,
        input: CreateRepairRequestInput,
    ) -> Result<RepairOutcome, ServiceError> {
        input.validate()?;
        let client = self
            .users
            .require_role(input.client_id, UserRole::Client, "Client")
            .await?;

        let txn = self.db_pool.begin().await?;
        let machine = match machine::Entity::find_by_id(input.machine_id).one(&txn).await? {
            Some(machine) => machine,
            None => {
                txn.rollback().await?;
                return Err(ServiceError::not_found("Machine", input.machine_id));
            }
        };
        let request = repair_request::ActiveModel {
            client_id: Set(client.id),
            machine_id: Set(machine.id),
            fault_description: Set(input.fault_description),
            severity: Set(input.severity),
            state: Set(RepairState::Pending),
            technician_id: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(request_id = request.id, "Repair request created");

        let notice = Notice::new(
            "Nueva solicitud de reparación",
            format!(
                "{} reportó una falla {} en la máquina {}: {}",
                client.full_name.as_deref().unwrap_or(&client.username),
                severity_label(request.severity),
                machine.name,
                request.fault_description
            ),
            NotificationType::RepairRequestCreated,
            Some(request.id),
        );
        let notifications = self.notifications.notify_administrators(&notice).await;

        Ok(RepairOutcome {
            request,
            notifications,
        })
    }

    /// PENDING or TECHNICIAN_ASSIGNED -> TECHNICIAN_ASSIGNED
    #[instrument(skip(self, input), fields(technician_id = input.technician_id))]
    pub async fn assign_technician(
        &self,
        id: i32,
        input: AssignTechnicianInput,
    ) -> Result<RepairOutcome, ServiceError> {
        let current = self.get_request(id).await?;
        if !current.state.accepts_assignment() {
            return Err(invalid_transition(&current, "assign a technician"));
        }
        let technician = self
            .users
            .require_role(input.technician_id, UserRole::Technician, "Technician")
            .await?;

        let mut active: repair_request::ActiveModel = current.into();
        active.technician_id = Set(Some(technician.id));
        active.scheduled_at = Set(Some(input.scheduled_at));
        active.state = Set(RepairState::TechnicianAssigned);
        let request = active.update(&*self.db_pool).await?;

        info!(request_id = id, technician_id = technician.id, "Technician assigned");

        let schedule = request
            .scheduled_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let technician_name = technician.full_name.as_deref().unwrap_or(&technician.username);

        let mut notifications = self
            .notifications
            .notify_user(
                request.client_id,
                &Notice::new(
                    "Técnico asignado",
                    format!(
                        "{} atenderá su solicitud #{} el {}",
                        technician_name, request.id, schedule
                    ),
                    NotificationType::TechnicianAssigned,
                    Some(request.id),
                ),
            )
            .await;
        notifications.merge(
            self.notifications
                .notify(
                    &technician,
                    &Notice::new(
                        "Nueva orden de trabajo",
                        format!(
                            "Se le asignó la solicitud #{} para el {}",
                            request.id, schedule
                        ),
                        NotificationType::WorkOrderAssigned,
                        Some(request.id),
                    ),
                )
                .await,
        );

        Ok(RepairOutcome {
            request,
            notifications,
        })
    }

    /// TECHNICIAN_ASSIGNED -> PRE_FINALIZED; the client is asked to verify
    #[instrument(skip(self, input))]
    pub async fn mark_repair_done(
        &self,
        id: i32,
        input: RepairDoneInput,
    ) -> Result<RepairOutcome, ServiceError> {
        input.validate()?;
        let current = self.get_request(id).await?;
        if current.state != RepairState::TechnicianAssigned {
            return Err(invalid_transition(&current, "mark the repair as done"));
        }

        let mut active: repair_request::ActiveModel = current.into();
        active.technician_observations = Set(Some(input.observations));
        active.repair_done_at = Set(Some(Utc::now()));
        active.state = Set(RepairState::PreFinalized);
        let request = active.update(&*self.db_pool).await?;

        info!(request_id = id, "Repair marked as done");

        let mut notifications = DeliveryReport::default();
        match self.users.repository().find_by_id(request.client_id).await {
            Ok(Some(client)) => {
                let notice = Notice::new(
                    "Reparación completada",
                    format!(
                        "La reparación de su solicitud #{} fue completada. Por favor verifique el equipo.",
                        request.id
                    ),
                    NotificationType::RepairCompleted,
                    Some(request.id),
                );
                notifications = self.notifications.notify(&client, &notice).await;
            }
            Ok(None) => {
                warn!(request_id = id, client_id = request.client_id, "Client not found, skipping notification");
                notifications.lookup_error = Some(format!("Client {} not found", request.client_id));
            }
            Err(e) => {
                warn!(request_id = id, "Could not load client, skipping notification: {}", e);
                notifications.lookup_error = Some(e.to_string());
            }
        }

        Ok(RepairOutcome {
            request,
            notifications,
        })
    }

    /// PRE_FINALIZED -> FINALIZED
    #[instrument(skip(self))]
    pub async fn finalize(&self, id: i32) -> Result<RepairOutcome, ServiceError> {
        let current = self.get_request(id).await?;
        if current.state != RepairState::PreFinalized {
            return Err(invalid_transition(&current, "finalize"));
        }

        let mut active: repair_request::ActiveModel = current.into();
        active.finalized_at = Set(Some(Utc::now()));
        active.state = Set(RepairState::Finalized);
        let request = active.update(&*self.db_pool).await?;

        info!(request_id = id, "Repair request finalized");

        let notice = Notice::new(
            "Solicitud finalizada",
            format!("La solicitud de reparación #{} fue finalizada", request.id),
            NotificationType::RepairFinalized,
            Some(request.id),
        );
        let mut notifications = self.notifications.notify_administrators(&notice).await;
        if let Some(technician_id) = request.technician_id {
            notifications.merge(self.notifications.notify_user(technician_id, &notice).await);
        }

        Ok(RepairOutcome {
            request,
            notifications,
        })
    }

    /// Records a part consumed by the repair and takes it out of stock.
    ///
    /// The insert and the decrement share one transaction and the decrement
    /// only applies when enough stock is on hand, so concurrent calls cannot
    /// drive the stock negative.
    #[instrument(skip(self, input), fields(part_id = input.part_id, quantity = input.quantity))]
    pub async fn add_part_used(
        &self,
        id: i32,
        input: AddPartUsedInput,
    ) -> Result<part_used::Model, ServiceError> {
        input.validate()?;

        let txn = self.db_pool.begin().await?;
        let request = match repair_request::Entity::find_by_id(id).one(&txn).await? {
            Some(request) => request,
            None => {
                txn.rollback().await?;
                return Err(ServiceError::not_found("Repair request", id));
            }
        };
        if request.state == RepairState::Finalized {
            txn.rollback().await?;
            return Err(invalid_transition(&request, "add parts"));
        }
        let stocked = match part::Entity::find_by_id(input.part_id).one(&txn).await? {
            Some(stocked) => stocked,
            None => {
                txn.rollback().await?;
                return Err(ServiceError::not_found("Part", input.part_id));
            }
        };

        if !PartRepository::consume_stock(&txn, stocked.id, input.quantity).await? {
            txn.rollback().await?;
            warn!(
                request_id = id,
                available = stocked.quantity,
                "Rejected part usage: insufficient stock"
            );
            return Err(ServiceError::InsufficientStock(format!(
                "Insufficient stock for part {}: requested {}, available {}",
                stocked.id, input.quantity, stocked.quantity
            )));
        }

        let used = part_used::ActiveModel {
            repair_request_id: Set(request.id),
            part_id: Set(stocked.id),
            quantity: Set(input.quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(request_id = id, part_used_id = used.id, "Part usage recorded");
        Ok(used)
    }

    pub async fn parts_used(&self, id: i32) -> Result<Vec<part_used::Model>, ServiceError> {
        self.get_request(id).await?;
        Ok(part_used::Entity::find()
            .filter(part_used::Column::RepairRequestId.eq(id))
            .order_by_asc(part_used::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn get_request(&self, id: i32) -> Result<repair_request::Model, ServiceError> {
        repair_request::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Repair request", id))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        filter: RepairRequestFilter,
    ) -> Result<Vec<repair_request::Model>, ServiceError> {
        let mut query = repair_request::Entity::find();
        if let Some(state) = filter.state {
            query = query.filter(repair_request::Column::State.eq(state));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(repair_request::Column::ClientId.eq(client_id));
        }
        if let Some(technician_id) = filter.technician_id {
            query = query.filter(repair_request::Column::TechnicianId.eq(technician_id));
        }
        if let Some(machine_id) = filter.machine_id {
            query = query.filter(repair_request::Column::MachineId.eq(machine_id));
        }
        Ok(query
            .order_by_desc(repair_request::Column::CreatedAt)
            .order_by_desc(repair_request::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// Only PENDING requests can be edited
    #[instrument(skip(self, input))]
    pub async fn update_request(
        &self,
        id: i32,
        input: UpdateRepairRequestInput,
    ) -> Result<repair_request::Model, ServiceError> {
        input.validate()?;
        let current = self.get_request(id).await?;
        if current.state != RepairState::Pending {
            return Err(invalid_transition(&current, "edit"));
        }

        let mut active: repair_request::ActiveModel = current.into();
        if let Some(description) = input.fault_description {
            active.fault_description = Set(description);
        }
        if let Some(severity) = input.severity {
            active.severity = Set(severity);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Only PENDING requests without recorded parts can be deleted
    #[instrument(skip(self))]
    pub async fn delete_request(&self, id: i32) -> Result<(), ServiceError> {
        let current = self.get_request(id).await?;
        if current.state != RepairState::Pending {
            return Err(invalid_transition(&current, "delete"));
        }
        let parts = part_used::Entity::find()
            .filter(part_used::Column::RepairRequestId.eq(id))
            .count(&*self.db_pool)
            .await?;
        if parts > 0 {
            return Err(ServiceError::Conflict(format!(
                "Repair request {} already has parts recorded",
                id
            )));
        }
        repair_request::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        info!(request_id = id, "Repair request deleted");
        Ok(())
    }
}

fn invalid_transition(request: &repair_request::Model, action: &str) -> ServiceError {
    ServiceError::InvalidState(format!(
        "Cannot {} repair request {} in state {}",
        action, request.id, request.state
    ))
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Leve => "leve",
        Severity::Moderada => "moderada",
        Severity::Grave => "grave",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user;
    use crate::test_support::{insert_machine, insert_part, insert_user, memory_db, RecordingMailer};
    use assert_matches::assert_matches;
    use sea_orm::ConnectionTrait;

    struct Shop {
        db: Arc<DbPool>,
        service: RepairRequestService,
        notifications: Arc<NotificationService>,
        client: user::Model,
        technician: user::Model,
        admin: user::Model,
        machine: machine::Model,
    }

    async fn shop() -> Shop {
        let db = memory_db().await;
        let client = insert_user(&db, "cliente", UserRole::Client).await;
        let technician = insert_user(&db, "tecnico", UserRole::Technician).await;
        let admin = insert_user(&db, "admin", UserRole::Administrator).await;
        let machine = insert_machine(&db, "Lavadora 3").await;

        let users = Arc::new(UserService::new(db.clone()));
        let notifications = Arc::new(NotificationService::with_database(
            db.clone(),
            Arc::new(RecordingMailer::default()),
            50,
        ));
        let service = RepairRequestService::new(db.clone(), users, notifications.clone());
        Shop {
            db,
            service,
            notifications,
            client,
            technician,
            admin,
            machine,
        }
    }

    impl Shop {
        async fn open(&self) -> repair_request::Model {
            self.service
                .create_request(CreateRepairRequestInput {
                    client_id: self.client.id,
                    machine_id: self.machine.id,
                    fault_description: "No centrifuga".into(),
                    severity: Severity::Moderada,
                })
                .await
                .unwrap()
                .request
        }

        async fn assign(&self, id: i32) -> RepairOutcome {
            self.service
                .assign_technician(
                    id,
                    AssignTechnicianInput {
                        technician_id: self.technician.id,
                        scheduled_at: Utc::now(),
                    },
                )
                .await
                .unwrap()
        }

        async fn done(&self, id: i32) -> RepairOutcome {
            self.service
                .mark_repair_done(
                    id,
                    RepairDoneInput {
                        observations: "Se cambió la correa".into(),
                    },
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn create_starts_pending_and_notifies_admins() {
        let shop = shop().await;
        let outcome = shop
            .service
            .create_request(CreateRepairRequestInput {
                client_id: shop.client.id,
                machine_id: shop.machine.id,
                fault_description: "No enciende".into(),
                severity: Severity::Grave,
            })
            .await
            .unwrap();

        assert_eq!(outcome.request.state, RepairState::Pending);
        assert!(outcome.request.technician_id.is_none());
        assert_eq!(outcome.notifications.delivered, vec![shop.admin.id]);

        let inbox = shop.notifications.list_by_user(shop.admin.id, true).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type, NotificationType::RepairRequestCreated);
        assert_eq!(inbox[0].related_id, Some(outcome.request.id));
    }

    #[tokio::test]
    async fn create_rejects_non_clients_and_missing_machines() {
        let shop = shop().await;
        let mut input = CreateRepairRequestInput {
            client_id: shop.technician.id,
            machine_id: shop.machine.id,
            fault_description: "Ruido".into(),
            severity: Severity::Leve,
        };
        assert_matches!(
            shop.service.create_request(input.clone()).await,
            Err(ServiceError::ValidationError(_))
        );

        input.client_id = shop.client.id;
        input.machine_id = 404;
        assert_matches!(
            shop.service.create_request(input).await,
            Err(ServiceError::NotFound(_))
        );
        assert!(shop
            .service
            .list_requests(RepairRequestFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn assign_sets_technician_and_schedule() {
        let shop = shop().await;
        let request = shop.open().await;
        let outcome = shop.assign(request.id).await;

        assert_eq!(outcome.request.state, RepairState::TechnicianAssigned);
        assert_eq!(outcome.request.technician_id, Some(shop.technician.id));
        assert!(outcome.request.scheduled_at.is_some());
        assert_eq!(
            outcome.notifications.delivered,
            vec![shop.client.id, shop.technician.id]
        );

        let work_orders = shop
            .notifications
            .list_by_user(shop.technician.id, false)
            .await
            .unwrap();
        assert_eq!(work_orders[0].notification_type, NotificationType::WorkOrderAssigned);
    }

    #[tokio::test]
    async fn assigning_unknown_technician_leaves_request_untouched() {
        let shop = shop().await;
        let request = shop.open().await;

        let result = shop
            .service
            .assign_technician(
                request.id,
                AssignTechnicianInput {
                    technician_id: 999,
                    scheduled_at: Utc::now(),
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));

        let stored = shop.service.get_request(request.id).await.unwrap();
        assert_eq!(stored.state, RepairState::Pending);
        assert!(stored.technician_id.is_none());
        assert!(stored.scheduled_at.is_none());
    }

    #[tokio::test]
    async fn full_lifecycle_sets_timestamps() {
        let shop = shop().await;
        let request = shop.open().await;
        shop.assign(request.id).await;

        let done = shop.done(request.id).await.request;
        assert_eq!(done.state, RepairState::PreFinalized);
        assert!(done.repair_done_at.is_some());
        assert_eq!(done.technician_observations.as_deref(), Some("Se cambió la correa"));

        let finalized = shop.service.finalize(request.id).await.unwrap();
        assert_eq!(finalized.request.state, RepairState::Finalized);
        assert!(finalized.request.finalized_at.is_some());
        assert_eq!(
            finalized.notifications.delivered,
            vec![shop.admin.id, shop.technician.id]
        );
    }

    #[tokio::test]
    async fn transitions_out_of_order_are_rejected() {
        let shop = shop().await;
        let request = shop.open().await;

        assert_matches!(
            shop.service.finalize(request.id).await,
            Err(ServiceError::InvalidState(_))
        );
        assert_matches!(
            shop.service
                .mark_repair_done(
                    request.id,
                    RepairDoneInput {
                        observations: "x".into()
                    }
                )
                .await,
            Err(ServiceError::InvalidState(_))
        );

        shop.assign(request.id).await;
        shop.done(request.id).await;
        let result = shop
            .service
            .assign_technician(
                request.id,
                AssignTechnicianInput {
                    technician_id: shop.technician.id,
                    scheduled_at: Utc::now(),
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::InvalidState(_)));
        assert_eq!(
            shop.service.get_request(request.id).await.unwrap().state,
            RepairState::PreFinalized
        );
    }

    #[tokio::test]
    async fn repair_done_succeeds_when_client_is_gone() {
        let shop = shop().await;
        let request = shop.open().await;
        shop.assign(request.id).await;

        shop.db
            .execute_unprepared("PRAGMA foreign_keys = OFF")
            .await
            .unwrap();
        user::Entity::delete_by_id(shop.client.id)
            .exec(&*shop.db)
            .await
            .unwrap();

        let outcome = shop.done(request.id).await;
        assert_eq!(outcome.request.state, RepairState::PreFinalized);
        assert!(outcome.notifications.delivered.is_empty());
        assert!(outcome.notifications.lookup_error.is_some());
    }

    #[tokio::test]
    async fn part_usage_decrements_stock_exactly() {
        let shop = shop().await;
        let request = shop.open().await;
        let belt = insert_part(&shop.db, "Correa", 5).await;

        let used = shop
            .service
            .add_part_used(
                request.id,
                AddPartUsedInput {
                    part_id: belt.id,
                    quantity: 3,
                },
            )
            .await
            .unwrap();
        assert_eq!(used.quantity, 3);
        assert_eq!(stock_of(&shop, belt.id).await, 2);

        let again = shop
            .service
            .add_part_used(
                request.id,
                AddPartUsedInput {
                    part_id: belt.id,
                    quantity: 3,
                },
            )
            .await;
        assert_matches!(again, Err(ServiceError::InsufficientStock(_)));
        assert_eq!(stock_of(&shop, belt.id).await, 2);
        assert_eq!(shop.service.parts_used(request.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn using_the_last_units_marks_part_out_of_stock() {
        let shop = shop().await;
        let request = shop.open().await;
        let pump = insert_part(&shop.db, "Bomba", 2).await;

        shop.service
            .add_part_used(
                request.id,
                AddPartUsedInput {
                    part_id: pump.id,
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        let stored = part::Entity::find_by_id(pump.id)
            .one(&*shop.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.quantity, 0);
        assert_eq!(stored.status, part::PartStatus::OutOfStock);
    }

    #[tokio::test]
    async fn part_usage_validates_references() {
        let shop = shop().await;
        let request = shop.open().await;
        let belt = insert_part(&shop.db, "Correa", 5).await;

        let missing_part = shop
            .service
            .add_part_used(request.id, AddPartUsedInput { part_id: 77, quantity: 1 })
            .await;
        assert_matches!(missing_part, Err(ServiceError::NotFound(_)));

        let missing_request = shop
            .service
            .add_part_used(404, AddPartUsedInput { part_id: belt.id, quantity: 1 })
            .await;
        assert_matches!(missing_request, Err(ServiceError::NotFound(_)));

        let zero = shop
            .service
            .add_part_used(request.id, AddPartUsedInput { part_id: belt.id, quantity: 0 })
            .await;
        assert_matches!(zero, Err(ServiceError::ValidationError(_)));
        assert_eq!(stock_of(&shop, belt.id).await, 5);
    }

    #[tokio::test]
    async fn only_pending_requests_are_editable() {
        let shop = shop().await;
        let request = shop.open().await;

        let edited = shop
            .service
            .update_request(
                request.id,
                UpdateRepairRequestInput {
                    severity: Some(Severity::Grave),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.severity, Severity::Grave);

        shop.assign(request.id).await;
        assert_matches!(
            shop.service
                .update_request(request.id, UpdateRepairRequestInput::default())
                .await,
            Err(ServiceError::InvalidState(_))
        );
        assert_matches!(
            shop.service.delete_request(request.id).await,
            Err(ServiceError::InvalidState(_))
        );
    }

    #[tokio::test]
    async fn list_filters_by_state_and_technician() {
        let shop = shop().await;
        let first = shop.open().await;
        shop.open().await;
        shop.assign(first.id).await;

        let assigned = shop
            .service
            .list_requests(RepairRequestFilter {
                technician_id: Some(shop.technician.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(assigned.len(), 1);

        let pending = shop
            .service
            .list_requests(RepairRequestFilter {
                state: Some(RepairState::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].id, first.id);
    }

    async fn stock_of(shop: &Shop, part_id: i32) -> i32 {
        part::Entity::find_by_id(part_id)
            .one(&*shop.db)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }
}
