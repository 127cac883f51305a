use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{machine, receipt, receipt_batch, user::UserRole},
    errors::ServiceError,
    services::{
        receipts::{check_amount, max_amount},
        users::UserService,
    },
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReceiptLineInput {
    pub machine_id: i32,
    #[schema(value_type = String)]
    pub income: Decimal,
    #[schema(value_type = String)]
    pub expense: Decimal,
    pub receipt_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReceiptBatchInput {
    pub client_id: i32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to the configured company share
    #[schema(value_type = Option<String>)]
    pub company_percentage: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// New receipts recorded together with the batch. The client's unbatched
    /// receipts dated inside the period are added as well.
    #[serde(default)]
    pub receipts: Vec<ReceiptLineInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceiptBatchDetail {
    pub batch: receipt_batch::Model,
    pub receipts: Vec<receipt::Model>,
}

/// Sums of a set of receipt amounts and the company/client split of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub total: Decimal,
    pub company_share: Decimal,
    pub client_share: Decimal,
}

impl BatchTotals {
    /// Fails instead of overflowing when the sums leave the money column range
    pub fn compute<I>(amounts: I, company_percentage: Decimal) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        let (income, expense) = amounts.into_iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expense), (line_income, line_expense)| {
                Some((
                    income.checked_add(line_income)?,
                    expense.checked_add(line_expense)?,
                ))
            },
        )
        .ok_or_else(out_of_range)?;
        let total = income.checked_sub(expense).ok_or_else(out_of_range)?;
        let company_share = total
            .checked_mul(company_percentage)
            .and_then(|share| share.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(out_of_range)?
            .round_dp(2);
        let client_share = total.checked_sub(company_share).ok_or_else(out_of_range)?;

        let limit = max_amount();
        if income > limit || expense > limit || total.abs() > limit {
            return Err(out_of_range());
        }
        Ok(Self {
            income,
            expense,
            total,
            company_share,
            client_share,
        })
    }
}

fn out_of_range() -> ServiceError {
    ServiceError::ValidationError(format!(
        "Batch totals must not exceed {}",
        max_amount()
    ))
}

/// Billing periods: a client's receipts grouped and split with the company
#[derive(Clone)]
pub struct ReceiptBatchService {
    db_pool: Arc<DbPool>,
    users: Arc<UserService>,
    default_company_percentage: Decimal,
}

impl ReceiptBatchService {
    pub fn new(db_pool: Arc<DbPool>, users: Arc<UserService>, company_share_percent: u32) -> Self {
        Self {
            db_pool,
            users,
            default_company_percentage: Decimal::from(company_share_percent),
        }
    }

    /// Creates the batch, adopts the client's open receipts for the period
    /// and inserts the new lines, all in one transaction
    #[instrument(skip(self, input), fields(client_id = input.client_id, lines = input.receipts.len()))]
    pub async fn create_batch(
        &self,
        input: CreateReceiptBatchInput,
    ) -> Result<ReceiptBatchDetail, ServiceError> {
        input.validate()?;
        if input.period_end < input.period_start {
            return Err(ServiceError::ValidationError(
                "period_end must not precede period_start".into(),
            ));
        }
        let percentage = input
            .company_percentage
            .unwrap_or(self.default_company_percentage);
        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "company_percentage must be between 0 and 100".into(),
            ));
        }
        for line in &input.receipts {
            line.validate()?;
            check_amount("income", line.income)?;
            check_amount("expense", line.expense)?;
            if line.receipt_date < input.period_start || line.receipt_date > input.period_end {
                return Err(ServiceError::ValidationError(format!(
                    "Receipt date {} is outside the batch period",
                    line.receipt_date
                )));
            }
        }
        self.users
            .require_role(input.client_id, UserRole::Client, "Client")
            .await?;

        let txn = self.db_pool.begin().await?;
        for line in &input.receipts {
            if machine::Entity::find_by_id(line.machine_id)
                .one(&txn)
                .await?
                .is_none()
            {
                txn.rollback().await?;
                return Err(ServiceError::not_found("Machine", line.machine_id));
            }
        }

        let open = receipt::Entity::find()
            .filter(receipt::Column::ClientId.eq(input.client_id))
            .filter(receipt::Column::BatchId.is_null())
            .filter(receipt::Column::ReceiptDate.between(input.period_start, input.period_end))
            .all(&txn)
            .await?;
        if open.is_empty() && input.receipts.is_empty() {
            txn.rollback().await?;
            return Err(ServiceError::ValidationError(
                "A batch needs at least one receipt in its period".into(),
            ));
        }

        let amounts = open
            .iter()
            .map(|existing| (existing.income, existing.expense))
            .chain(input.receipts.iter().map(|line| (line.income, line.expense)));
        let totals = match BatchTotals::compute(amounts, percentage) {
            Ok(totals) => totals,
            Err(err) => {
                txn.rollback().await?;
                return Err(err);
            }
        };

        let batch = receipt_batch::ActiveModel {
            client_id: Set(input.client_id),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            total_income: Set(totals.income),
            total_expense: Set(totals.expense),
            total: Set(totals.total),
            company_percentage: Set(percentage),
            company_share: Set(totals.company_share),
            client_share: Set(totals.client_share),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let adopted = open.len();
        if !open.is_empty() {
            receipt::Entity::update_many()
                .col_expr(receipt::Column::BatchId, Expr::value(batch.id))
                .filter(receipt::Column::Id.is_in(open.iter().map(|existing| existing.id)))
                .exec(&txn)
                .await?;
        }

        for line in input.receipts {
            receipt::ActiveModel {
                batch_id: Set(Some(batch.id)),
                client_id: Set(input.client_id),
                machine_id: Set(line.machine_id),
                income: Set(line.income),
                expense: Set(line.expense),
                total: Set(line.income - line.expense),
                receipt_date: Set(line.receipt_date),
                notes: Set(line.notes),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        let receipts = batch_receipts(&txn, batch.id).await?;
        txn.commit().await?;

        info!(
            batch_id = batch.id,
            adopted,
            total = %batch.total,
            company_share = %batch.company_share,
            "Receipt batch created"
        );
        Ok(ReceiptBatchDetail { batch, receipts })
    }

    pub async fn get_batch(&self, id: i32) -> Result<ReceiptBatchDetail, ServiceError> {
        let batch = receipt_batch::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Receipt batch", id))?;
        let receipts = batch_receipts(&*self.db_pool, id).await?;
        Ok(ReceiptBatchDetail { batch, receipts })
    }

    pub async fn list_batches(
        &self,
        client_id: Option<i32>,
    ) -> Result<Vec<receipt_batch::Model>, ServiceError> {
        let mut query = receipt_batch::Entity::find();
        if let Some(client_id) = client_id {
            query = query.filter(receipt_batch::Column::ClientId.eq(client_id));
        }
        Ok(query
            .order_by_desc(receipt_batch::Column::PeriodStart)
            .order_by_desc(receipt_batch::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// Removes the receipts and then the batch in one transaction
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, id: i32) -> Result<u64, ServiceError> {
        let txn = self.db_pool.begin().await?;
        if receipt_batch::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .is_none()
        {
            txn.rollback().await?;
            return Err(ServiceError::not_found("Receipt batch", id));
        }

        let removed = receipt::Entity::delete_many()
            .filter(receipt::Column::BatchId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        receipt_batch::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(batch_id = id, receipts = removed, "Receipt batch deleted");
        Ok(removed)
    }
}

async fn batch_receipts<C: ConnectionTrait>(
    db: &C,
    batch_id: i32,
) -> Result<Vec<receipt::Model>, ServiceError> {
    Ok(receipt::Entity::find()
        .filter(receipt::Column::BatchId.eq(batch_id))
        .order_by_asc(receipt::Column::ReceiptDate)
        .order_by_asc(receipt::Column::Id)
        .all(db)
        .await?)
}
