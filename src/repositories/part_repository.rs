use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

use crate::entities::part::{
    ActiveModel as PartActiveModel, Column, Entity as Part, Model as PartModel, PartStatus,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Repository for stocked parts
#[derive(Debug, Clone)]
pub struct PartRepository {
    base: BaseRepository,
}

impl PartRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<PartModel>, ServiceError> {
        Part::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn list(
        &self,
        provider_id: Option<i32>,
        status: Option<PartStatus>,
    ) -> Result<Vec<PartModel>, ServiceError> {
        let mut query = Part::find();
        if let Some(provider_id) = provider_id {
            query = query.filter(Column::ProviderId.eq(provider_id));
        }
        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status));
        }
        query
            .order_by_asc(Column::Name)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Parts whose stock is at or below `threshold`, lowest first
    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<PartModel>, ServiceError> {
        Part::find()
            .filter(Column::Quantity.lte(threshold))
            .filter(Column::Status.ne(PartStatus::Discontinued))
            .order_by_asc(Column::Quantity)
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn count_by_provider(&self, provider_id: i32) -> Result<u64, ServiceError> {
        Part::find()
            .filter(Column::ProviderId.eq(provider_id))
            .count(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn create(&self, part: PartActiveModel) -> Result<PartModel, ServiceError> {
        part.insert(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn update(&self, part: PartActiveModel) -> Result<PartModel, ServiceError> {
        part.update(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Decrements stock by `quantity` only if at least that much is on hand.
    ///
    /// Returns `false` when the row is missing or the stock is insufficient;
    /// nothing is written in that case. Runs on whatever connection it is
    /// given so callers can include it in a transaction.
    pub async fn consume_stock<C>(conn: &C, part_id: i32, quantity: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Part::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).sub(quantity))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(Column::Id.eq(part_id))
            .filter(Column::Quantity.gte(quantity))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        Part::update_many()
            .col_expr(Column::Status, Expr::value(PartStatus::OutOfStock))
            .filter(Column::Id.eq(part_id))
            .filter(Column::Quantity.eq(0))
            .filter(Column::Status.eq(PartStatus::Available))
            .exec(conn)
            .await?;

        Ok(true)
    }
}
