use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "statistics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// At most one row exists per (date, ip) pair.
    pub date: Date,
    pub ip: String,

    pub hostname: Option<String>,

    /// Raw request counter maintained by an external collaborator; only
    /// echoed by this crate.
    pub requests: i32,

    pub visits: i32,
    pub visits_drops: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
