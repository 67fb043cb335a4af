use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use ipgate_common::{AutoBlockRecord, IpGateError};
use ipgate_db_entities::{AutomaticBlock, Block};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tokio::sync::Mutex;

/// Read-only storage boundary consumed by the decision engine. Rules and
/// automatic-block records are administered elsewhere; this crate only
/// queries them.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Number of active exact rules whose `host` equals the address.
    async fn count_exact_blocks(&self, address: &str) -> Result<u64, IpGateError>;

    /// The automatic-block classifier's record for (address, date), if any.
    async fn automatic_block_for(
        &self,
        address: &str,
        date: NaiveDate,
    ) -> Result<Option<AutoBlockRecord>, IpGateError>;

    /// Number of active period rules whose inclusive range contains the
    /// numeric address.
    async fn count_period_blocks(&self, address: u32) -> Result<u64, IpGateError>;

    /// `host` values of every active hostname rule (full scan).
    async fn hostname_block_patterns(&self) -> Result<Vec<String>, IpGateError>;
}

#[derive(Clone)]
pub struct DatabaseBlockStore {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl DatabaseBlockStore {
    pub fn new(db: Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlockStore for DatabaseBlockStore {
    async fn count_exact_blocks(&self, address: &str) -> Result<u64, IpGateError> {
        let db = self.db.lock().await;
        Ok(Block::Entity::find()
            .filter(Block::Column::Host.eq(address))
            .filter(Block::Column::IsBlock.eq(true))
            .count(&*db)
            .await?)
    }

    async fn automatic_block_for(
        &self,
        address: &str,
        date: NaiveDate,
    ) -> Result<Option<AutoBlockRecord>, IpGateError> {
        let db = self.db.lock().await;
        Ok(AutomaticBlock::Entity::find()
            .filter(AutomaticBlock::Column::Ip.eq(address))
            .filter(AutomaticBlock::Column::Date.eq(date))
            .one(&*db)
            .await?
            .map(|record| AutoBlockRecord {
                drop_block: record.drop_block,
            }))
    }

    async fn count_period_blocks(&self, address: u32) -> Result<u64, IpGateError> {
        let db = self.db.lock().await;
        Ok(Block::Entity::find()
            .filter(Block::Column::IsPeriod.eq(true))
            .filter(Block::Column::IsBlock.eq(true))
            .filter(Block::Column::PeriodStart.lte(address as i64))
            .filter(Block::Column::PeriodStop.gte(address as i64))
            .count(&*db)
            .await?)
    }

    async fn hostname_block_patterns(&self) -> Result<Vec<String>, IpGateError> {
        let db = self.db.lock().await;
        Ok(Block::Entity::find()
            .filter(Block::Column::IsHostname.eq(true))
            .filter(Block::Column::IsBlock.eq(true))
            .all(&*db)
            .await?
            .into_iter()
            .map(|rule| rule.host)
            .collect())
    }
}
