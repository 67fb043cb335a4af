use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Literal address for exact rules, or a hostname pattern for
    /// hostname rules.
    pub host: String,

    /// Inactive rules are kept for auditing but never match.
    pub is_block: bool,

    /// Matches by reverse-DNS hostname substring or literal address equality.
    pub is_hostname: bool,

    /// Matches an inclusive numeric IPv4 range.
    pub is_period: bool,

    pub period_start: Option<i64>,
    pub period_stop: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
