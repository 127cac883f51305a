use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{part, provider},
    errors::ServiceError,
    repositories::PartRepository,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProviderInput {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProviderInput {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Service for part suppliers
#[derive(Clone)]
pub struct ProviderService {
    db_pool: Arc<DbPool>,
    parts: PartRepository,
}

impl ProviderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            parts: PartRepository::new(db_pool.clone()),
            db_pool,
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_provider(
        &self,
        input: CreateProviderInput,
    ) -> Result<provider::Model, ServiceError> {
        input.validate()?;
        let created = provider::ActiveModel {
            name: Set(input.name),
            contact_name: Set(input.contact_name),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        info!(provider_id = created.id, "Provider created");
        Ok(created)
    }

    pub async fn get_provider(&self, id: i32) -> Result<provider::Model, ServiceError> {
        provider::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Provider", id))
    }

    pub async fn list_providers(&self) -> Result<Vec<provider::Model>, ServiceError> {
        Ok(provider::Entity::find()
            .order_by_asc(provider::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_provider(
        &self,
        id: i32,
        input: UpdateProviderInput,
    ) -> Result<provider::Model, ServiceError> {
        input.validate()?;
        let mut active: provider::ActiveModel = self.get_provider(id).await?.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(contact_name) = input.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Providers that still supply parts cannot be removed
    #[instrument(skip(self))]
    pub async fn delete_provider(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get_provider(id).await?;
        let supplied = self.parts.count_by_provider(id).await?;
        if supplied > 0 {
            return Err(ServiceError::Conflict(format!(
                "Provider {} still supplies {} part(s)",
                id, supplied
            )));
        }
        provider::Entity::delete_by_id(existing.id)
            .exec(&*self.db_pool)
            .await?;
        info!(provider_id = id, "Provider deleted");
        Ok(())
    }

    pub async fn list_parts(&self, id: i32) -> Result<Vec<part::Model>, ServiceError> {
        self.get_provider(id).await?;
        self.parts.list(Some(id), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_part, memory_db};
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn crud_round() {
        let service = ProviderService::new(memory_db().await);
        let created = service
            .create_provider(CreateProviderInput {
                name: "Repuestos Norte".into(),
                contact_name: Some("Luis".into()),
                phone: None,
                email: Some("ventas@norte.example".into()),
                address: None,
            })
            .await
            .unwrap();

        let updated = service
            .update_provider(
                created.id,
                UpdateProviderInput {
                    phone: Some("555-0101".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));
        assert_eq!(updated.contact_name.as_deref(), Some("Luis"));

        service.delete_provider(created.id).await.unwrap();
        assert_matches!(
            service.get_provider(created.id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn provider_with_parts_cannot_be_deleted() {
        let db = memory_db().await;
        let part = insert_part(&db, "Correa", 4).await;
        let service = ProviderService::new(db);

        assert_eq!(service.list_parts(part.provider_id).await.unwrap().len(), 1);
        assert_matches!(
            service.delete_provider(part.provider_id).await,
            Err(ServiceError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let service = ProviderService::new(memory_db().await);
        let result = service
            .create_provider(CreateProviderInput {
                name: "X".into(),
                contact_name: None,
                phone: None,
                email: Some("not-an-email".into()),
                address: None,
            })
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }
}
