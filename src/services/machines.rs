use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        machine::{self, MachineStatus},
        machine_client, receipt, repair_request,
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMachineInput {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub machine_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<MachineStatus>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMachineInput {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub machine_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<MachineStatus>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Service for the machine catalogue
#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
}

impl MachineService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_machine(
        &self,
        input: CreateMachineInput,
    ) -> Result<machine::Model, ServiceError> {
        input.validate()?;
        check_warranty(input.purchase_date, input.warranty_expiration)?;

        let created = machine::ActiveModel {
            name: Set(input.name),
            machine_type: Set(input.machine_type),
            brand: Set(input.brand),
            model: Set(input.model),
            serial_number: Set(input.serial_number),
            status: Set(input.status.unwrap_or(MachineStatus::Functioning)),
            location: Set(input.location),
            purchase_date: Set(input.purchase_date),
            warranty_expiration: Set(input.warranty_expiration),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(machine_id = created.id, "Machine created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_machine(&self, id: i32) -> Result<machine::Model, ServiceError> {
        machine::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Machine", id))
    }

    #[instrument(skip(self))]
    pub async fn list_machines(
        &self,
        status: Option<MachineStatus>,
    ) -> Result<Vec<machine::Model>, ServiceError> {
        let mut query = machine::Entity::find();
        if let Some(status) = status {
            query = query.filter(machine::Column::Status.eq(status));
        }
        Ok(query
            .order_by_asc(machine::Column::Name)
            .order_by_asc(machine::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_machine(
        &self,
        id: i32,
        input: UpdateMachineInput,
    ) -> Result<machine::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_machine(id).await?;
        check_warranty(
            input.purchase_date.or(existing.purchase_date),
            input.warranty_expiration.or(existing.warranty_expiration),
        )?;

        let mut active: machine::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(machine_type) = input.machine_type {
            active.machine_type = Set(machine_type);
        }
        if let Some(brand) = input.brand {
            active.brand = Set(Some(brand));
        }
        if let Some(model) = input.model {
            active.model = Set(Some(model));
        }
        if let Some(serial_number) = input.serial_number {
            active.serial_number = Set(Some(serial_number));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(date) = input.purchase_date {
            active.purchase_date = Set(Some(date));
        }
        if let Some(date) = input.warranty_expiration {
            active.warranty_expiration = Set(Some(date));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Deletes a machine that no client holds and nothing references
    #[instrument(skip(self))]
    pub async fn delete_machine(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get_machine(id).await?;
        let db = &*self.db_pool;

        let assigned = machine_client::Entity::find()
            .filter(machine_client::Column::MachineId.eq(id))
            .count(db)
            .await?;
        if assigned > 0 {
            return Err(ServiceError::Conflict(format!(
                "Machine {} is assigned to a client; unassign it first",
                id
            )));
        }

        let requests = repair_request::Entity::find()
            .filter(repair_request::Column::MachineId.eq(id))
            .count(db)
            .await?;
        let receipts = receipt::Entity::find()
            .filter(receipt::Column::MachineId.eq(id))
            .count(db)
            .await?;
        if requests + receipts > 0 {
            return Err(ServiceError::Conflict(format!(
                "Machine {} is referenced by repair requests or receipts",
                id
            )));
        }

        machine::Entity::delete_by_id(existing.id).exec(db).await?;
        info!(machine_id = id, "Machine deleted");
        Ok(())
    }
}

fn check_warranty(
    purchase: Option<NaiveDate>,
    warranty: Option<NaiveDate>,
) -> Result<(), ServiceError> {
    match (purchase, warranty) {
        (Some(purchase), Some(warranty)) if warranty < purchase => Err(
            ServiceError::ValidationError("Warranty expiration precedes the purchase date".into()),
        ),
        _ => Ok(()),
    }
}
