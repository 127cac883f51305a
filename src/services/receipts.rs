use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{machine, receipt, user::UserRole},
    errors::ServiceError,
    services::users::UserService,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReceiptInput {
    pub client_id: i32,
    pub machine_id: i32,
    #[schema(value_type = String)]
    pub income: Decimal,
    #[schema(value_type = String)]
    pub expense: Decimal,
    pub receipt_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReceiptInput {
    pub machine_id: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub income: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub expense: Option<Decimal>,
    pub receipt_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReceiptFilter {
    pub client_id: Option<i32>,
    pub machine_id: Option<i32>,
    pub batch_id: Option<i32>,
}

/// Per-machine income/expense records
#[derive(Clone)]
pub struct ReceiptService {
    db_pool: Arc<DbPool>,
    users: Arc<UserService>,
}

impl ReceiptService {
    pub fn new(db_pool: Arc<DbPool>, users: Arc<UserService>) -> Self {
        Self { db_pool, users }
    }

    #[instrument(skip(self, input), fields(client_id = input.client_id, machine_id = input.machine_id))]
    pub async fn create_receipt(
        &self,
        input: CreateReceiptInput,
    ) -> Result<receipt::Model, ServiceError> {
        input.validate()?;
        check_amount("income", input.income)?;
        check_amount("expense", input.expense)?;
        self.users
            .require_role(input.client_id, UserRole::Client, "Client")
            .await?;
        self.require_machine(input.machine_id).await?;

        let created = receipt::ActiveModel {
            batch_id: Set(None),
            client_id: Set(input.client_id),
            machine_id: Set(input.machine_id),
            income: Set(input.income),
            expense: Set(input.expense),
            total: Set(input.income - input.expense),
            receipt_date: Set(input.receipt_date),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(receipt_id = created.id, total = %created.total, "Receipt created");
        Ok(created)
    }

    pub async fn get_receipt(&self, id: i32) -> Result<receipt::Model, ServiceError> {
        receipt::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Receipt", id))
    }

    pub async fn list_receipts(
        &self,
        filter: ReceiptFilter,
    ) -> Result<Vec<receipt::Model>, ServiceError> {
        let mut query = receipt::Entity::find();
        if let Some(client_id) = filter.client_id {
            query = query.filter(receipt::Column::ClientId.eq(client_id));
        }
        if let Some(machine_id) = filter.machine_id {
            query = query.filter(receipt::Column::MachineId.eq(machine_id));
        }
        if let Some(batch_id) = filter.batch_id {
            query = query.filter(receipt::Column::BatchId.eq(batch_id));
        }
        Ok(query
            .order_by_desc(receipt::Column::ReceiptDate)
            .order_by_desc(receipt::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// Batched receipts are frozen; the batch totals depend on them
    #[instrument(skip(self, input))]
    pub async fn update_receipt(
        &self,
        id: i32,
        input: UpdateReceiptInput,
    ) -> Result<receipt::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_receipt(id).await?;
        ensure_unbatched(&existing)?;
        if let Some(machine_id) = input.machine_id {
            self.require_machine(machine_id).await?;
        }

        let income = input.income.unwrap_or(existing.income);
        let expense = input.expense.unwrap_or(existing.expense);
        check_amount("income", income)?;
        check_amount("expense", expense)?;

        let mut active: receipt::ActiveModel = existing.into();
        if let Some(machine_id) = input.machine_id {
            active.machine_id = Set(machine_id);
        }
        if let Some(date) = input.receipt_date {
            active.receipt_date = Set(date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.income = Set(income);
        active.expense = Set(expense);
        active.total = Set(income - expense);

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_receipt(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get_receipt(id).await?;
        ensure_unbatched(&existing)?;
        receipt::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        info!(receipt_id = id, "Receipt deleted");
        Ok(())
    }

    async fn require_machine(&self, machine_id: i32) -> Result<(), ServiceError> {
        machine::Entity::find_by_id(machine_id)
            .one(&*self.db_pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Machine", machine_id))
    }
}

/// Largest value a `DECIMAL(14, 2)` money column holds
pub(crate) fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

pub(crate) fn check_amount(field: &str, amount: Decimal) -> Result<(), ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    if amount > max_amount() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not exceed {}",
            field,
            max_amount()
        )));
    }
    Ok(())
}

fn ensure_unbatched(receipt: &receipt::Model) -> Result<(), ServiceError> {
    match receipt.batch_id {
        Some(batch_id) => Err(ServiceError::Conflict(format!(
            "Receipt {} belongs to batch {}; delete the batch instead",
            receipt.id, batch_id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_machine, insert_user, memory_db};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn setup() -> (ReceiptService, i32, i32) {
        let db = memory_db().await;
        let client = insert_user(&db, "cliente", UserRole::Client).await;
        let machine = insert_machine(&db, "Lavadora").await;
        let service = ReceiptService::new(db.clone(), Arc::new(UserService::new(db)));
        (service, client.id, machine.id)
    }

    fn input(client_id: i32, machine_id: i32) -> CreateReceiptInput {
        CreateReceiptInput {
            client_id,
            machine_id,
            income: dec!(250.50),
            expense: dec!(40.25),
            receipt_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn total_is_computed_server_side() {
        let (service, client, machine) = setup().await;
        let created = service.create_receipt(input(client, machine)).await.unwrap();
        assert_eq!(created.total, dec!(210.25));

        let updated = service
            .update_receipt(
                created.id,
                UpdateReceiptInput {
                    expense: Some(dec!(50.50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total, dec!(200));
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected() {
        let (service, client, machine) = setup().await;
        let mut bad = input(client, machine);
        bad.income = dec!(-1);
        assert_matches!(
            service.create_receipt(bad).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn amounts_beyond_the_column_range_are_rejected() {
        let (service, client, machine) = setup().await;
        let mut huge = input(client, machine);
        huge.income = Decimal::MAX;
        assert_matches!(
            service.create_receipt(huge).await,
            Err(ServiceError::ValidationError(_))
        );

        let mut edge = input(client, machine);
        edge.income = max_amount();
        edge.expense = Decimal::ZERO;
        assert!(service.create_receipt(edge).await.is_ok());
    }

    #[tokio::test]
    async fn filters_by_machine() {
        let (service, client, machine) = setup().await;
        service.create_receipt(input(client, machine)).await.unwrap();

        let mine = service
            .list_receipts(ReceiptFilter {
                machine_id: Some(machine),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let other = service
            .list_receipts(ReceiptFilter {
                machine_id: Some(machine + 1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other.is_empty());

        service.delete_receipt(mine[0].id).await.unwrap();
        assert_matches!(
            service.get_receipt(mine[0].id).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
