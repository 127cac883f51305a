use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A client's receipts over a billing period, with the company/client split
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ReceiptBatch)]
#[sea_orm(table_name = "receipt_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_expense: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub company_percentage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub company_share: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub client_share: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
