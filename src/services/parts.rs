use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        part::{self, PartStatus},
        part_used, provider,
    },
    errors::ServiceError,
    repositories::PartRepository,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePartInput {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub description: Option<String>,
    pub provider_id: i32,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
    /// Only `discontinued` is honoured; otherwise status follows quantity
    pub status: Option<PartStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePartInput {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub provider_id: Option<i32>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
    pub status: Option<PartStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetStockInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PartFilter {
    pub provider_id: Option<i32>,
    pub status: Option<PartStatus>,
}

/// Service for the spare-part inventory
#[derive(Clone)]
pub struct PartService {
    db_pool: Arc<DbPool>,
    parts: PartRepository,
    low_stock_threshold: i32,
}

impl PartService {
    pub fn new(db_pool: Arc<DbPool>, low_stock_threshold: i32) -> Self {
        Self {
            parts: PartRepository::new(db_pool.clone()),
            db_pool,
            low_stock_threshold,
        }
    }

    pub fn repository(&self) -> &PartRepository {
        &self.parts
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_part(&self, input: CreatePartInput) -> Result<part::Model, ServiceError> {
        input.validate()?;
        check_price(input.unit_price)?;
        self.require_provider(input.provider_id).await?;

        let requested = input.status.unwrap_or(PartStatus::Available);
        let created = self
            .parts
            .create(part::ActiveModel {
                name: Set(input.name),
                description: Set(input.description),
                provider_id: Set(input.provider_id),
                quantity: Set(input.quantity),
                unit_price: Set(input.unit_price),
                location: Set(input.location),
                status: Set(PartStatus::for_quantity(requested, input.quantity)),
                ..Default::default()
            })
            .await?;

        info!(part_id = created.id, quantity = created.quantity, "Part created");
        Ok(created)
    }

    pub async fn get_part(&self, id: i32) -> Result<part::Model, ServiceError> {
        self.parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Part", id))
    }

    pub async fn list_parts(&self, filter: PartFilter) -> Result<Vec<part::Model>, ServiceError> {
        self.parts.list(filter.provider_id, filter.status).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_part(
        &self,
        id: i32,
        input: UpdatePartInput,
    ) -> Result<part::Model, ServiceError> {
        input.validate()?;
        check_price(input.unit_price)?;
        let existing = self.get_part(id).await?;
        if let Some(provider_id) = input.provider_id {
            self.require_provider(provider_id).await?;
        }

        let quantity = input.quantity.unwrap_or(existing.quantity);
        let status = PartStatus::for_quantity(input.status.unwrap_or(existing.status), quantity);

        let mut active: part::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(provider_id) = input.provider_id {
            active.provider_id = Set(provider_id);
        }
        if let Some(price) = input.unit_price {
            active.unit_price = Set(Some(price));
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        active.quantity = Set(quantity);
        active.status = Set(status);

        self.parts.update(active).await
    }

    /// Overwrites the stock level and re-derives the status
    #[instrument(skip(self, input))]
    pub async fn set_stock(&self, id: i32, input: SetStockInput) -> Result<part::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_part(id).await?;
        let status = PartStatus::for_quantity(existing.status, input.quantity);
        let previous = existing.quantity;

        let mut active: part::ActiveModel = existing.into();
        active.quantity = Set(input.quantity);
        active.status = Set(status);
        let updated = self.parts.update(active).await?;

        info!(part_id = id, previous, quantity = updated.quantity, "Stock set");
        Ok(updated)
    }

    pub async fn low_stock(&self, threshold: Option<i32>) -> Result<Vec<part::Model>, ServiceError> {
        self.parts
            .low_stock(threshold.unwrap_or(self.low_stock_threshold))
            .await
    }

    /// Parts already consumed by a repair cannot be removed
    #[instrument(skip(self))]
    pub async fn delete_part(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get_part(id).await?;
        let usages = part_used::Entity::find()
            .filter(part_used::Column::PartId.eq(id))
            .count(&*self.db_pool)
            .await?;
        if usages > 0 {
            return Err(ServiceError::Conflict(format!(
                "Part {} has been used in repairs and cannot be deleted",
                id
            )));
        }
        part::Entity::delete_by_id(existing.id)
            .exec(&*self.db_pool)
            .await?;
        info!(part_id = id, "Part deleted");
        Ok(())
    }

    async fn require_provider(&self, provider_id: i32) -> Result<(), ServiceError> {
        provider::Entity::find_by_id(provider_id)
            .one(&*self.db_pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Provider", provider_id))
    }
}

fn check_price(price: Option<Decimal>) -> Result<(), ServiceError> {
    match price {
        Some(price) if price < Decimal::ZERO => Err(
            ServiceError::ValidationError("unit_price must not be negative".into()),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_part, memory_db};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn status_tracks_stock() {
        let db = memory_db().await;
        let part = insert_part(&db, "Correa", 3).await;
        let service = PartService::new(db, 5);

        let empty = service
            .set_stock(part.id, SetStockInput { quantity: 0 })
            .await
            .unwrap();
        assert_eq!(empty.status, PartStatus::OutOfStock);

        let restocked = service
            .set_stock(part.id, SetStockInput { quantity: 12 })
            .await
            .unwrap();
        assert_eq!(restocked.status, PartStatus::Available);
        assert_eq!(restocked.quantity, 12);
    }

    #[tokio::test]
    async fn discontinued_parts_stay_discontinued() {
        let db = memory_db().await;
        let part = insert_part(&db, "Motor viejo", 2).await;
        let service = PartService::new(db, 5);

        service
            .update_part(
                part.id,
                UpdatePartInput {
                    status: Some(PartStatus::Discontinued),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let after = service
            .set_stock(part.id, SetStockInput { quantity: 9 })
            .await
            .unwrap();
        assert_eq!(after.status, PartStatus::Discontinued);
    }

    #[tokio::test]
    async fn low_stock_uses_threshold() {
        let db = memory_db().await;
        insert_part(&db, "Filtro", 2).await;
        insert_part(&db, "Bomba", 5).await;
        insert_part(&db, "Tambor", 30).await;
        let service = PartService::new(db, 5);

        let low: Vec<_> = service
            .low_stock(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(low, vec!["Filtro", "Bomba"]);
        assert_eq!(service.low_stock(Some(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_existing_provider_and_valid_values() {
        let db = memory_db().await;
        let existing = insert_part(&db, "Correa", 1).await;
        let service = PartService::new(db, 5);

        let mut input = CreatePartInput {
            name: "Sensor".into(),
            description: None,
            provider_id: 999,
            quantity: 4,
            unit_price: Some(dec!(12.5)),
            location: None,
            status: None,
        };
        assert_matches!(
            service.create_part(input.clone()).await,
            Err(ServiceError::NotFound(_))
        );

        input.provider_id = existing.provider_id;
        input.quantity = -1;
        assert_matches!(
            service.create_part(input.clone()).await,
            Err(ServiceError::ValidationError(_))
        );

        input.quantity = 0;
        let created = service.create_part(input).await.unwrap();
        assert_eq!(created.status, PartStatus::OutOfStock);
    }
}
