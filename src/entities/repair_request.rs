use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a repair request.
///
/// `Pending -> TechnicianAssigned -> PreFinalized -> Finalized`
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairState {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "TECHNICIAN_ASSIGNED")]
    TechnicianAssigned,
    #[sea_orm(string_value = "PRE_FINALIZED")]
    PreFinalized,
    #[sea_orm(string_value = "FINALIZED")]
    Finalized,
}

impl RepairState {
    /// Whether a technician may be (re)assigned from this state
    pub fn accepts_assignment(self) -> bool {
        matches!(self, RepairState::Pending | RepairState::TechnicianAssigned)
    }
}

/// Fault urgency as reported by the client
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "leve")]
    Leve,
    #[sea_orm(string_value = "moderada")]
    Moderada,
    #[sea_orm(string_value = "grave")]
    Grave,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = RepairRequest)]
#[sea_orm(table_name = "repair_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub machine_id: i32,
    #[sea_orm(column_type = "Text")]
    pub fault_description: String,
    pub severity: Severity,
    pub state: RepairState,
    pub technician_id: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text", nullable)]
    pub technician_observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub repair_done_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClientId",
        to = "super::user::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TechnicianId",
        to = "super::user::Column::Id"
    )]
    Technician,
    #[sea_orm(
        belongs_to = "super::machine::Entity",
        from = "Column::MachineId",
        to = "super::machine::Column::Id"
    )]
    Machine,
    #[sea_orm(has_many = "super::part_used::Entity")]
    PartsUsed,
}

impl Related<super::machine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Machine.def()
    }
}

impl Related<super::part_used::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartsUsed.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}
