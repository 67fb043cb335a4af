use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ipgate_common::{IpGateError, RequestContext, StatisticSnapshot};
use ipgate_db_entities::{Statistic, Visit};
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionTrait, Value,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Persists visit events and per-day statistics. The two operations are
/// independently fallible: a failed visit append must not stop the
/// statistics update and vice versa; the controller reports both.
#[derive(Clone)]
pub struct VisitRecorder {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl VisitRecorder {
    pub fn new(db: Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db }
    }

    /// Appends one write-once visit event with the request metadata
    /// captured verbatim.
    pub async fn record_visit(
        &self,
        address: Option<&str>,
        blocked: bool,
        ctx: &RequestContext,
    ) -> Result<(), IpGateError> {
        let request_data = serde_json::json!({
            "headers": ctx.headers,
            "query": ctx.query,
            "body": ctx.body,
        });

        let db = self.db.lock().await;
        Visit::ActiveModel {
            id: Set(Uuid::new_v4()),
            ip: Set(address.map(str::to_owned)),
            is_blocked: Set(blocked),
            page: Set(ctx.path.clone()),
            method: Set(ctx.method.clone()),
            referer: Set(ctx.referer.clone()),
            user_agent: Set(ctx.user_agent.clone()),
            request_data: Set(request_data),
            created_at: Set(Utc::now()),
        }
        .insert(&*db)
        .await?;

        Ok(())
    }

    /// Finds or creates the (date, address) counter row, bumps the blocked
    /// or clean counter, refreshes the stored hostname, and returns the
    /// post-update counters.
    ///
    /// The find-or-create and the increment run inside one transaction while
    /// the shared connection is held, and the increment itself is an atomic
    /// column expression, so concurrent visits from the same address never
    /// lose an update.
    pub async fn record_statistic(
        &self,
        date: NaiveDate,
        address: &str,
        hostname: Option<&str>,
        blocked: bool,
    ) -> Result<StatisticSnapshot, IpGateError> {
        let db = self.db.lock().await;
        let txn = db.begin().await?;

        let existing = Statistic::Entity::find()
            .filter(Statistic::Column::Date.eq(date))
            .filter(Statistic::Column::Ip.eq(address))
            .one(&txn)
            .await?;

        if existing.is_none() {
            Statistic::ActiveModel {
                id: Set(Uuid::new_v4()),
                date: Set(date),
                ip: Set(address.to_owned()),
                hostname: Set(hostname.map(str::to_owned)),
                requests: Set(0),
                visits: Set(0),
                visits_drops: Set(0),
            }
            .insert(&txn)
            .await?;
        }

        let counter = if blocked {
            Statistic::Column::VisitsDrops
        } else {
            Statistic::Column::Visits
        };
        Statistic::Entity::update_many()
            .col_expr(counter, Expr::col(counter).add(1))
            .col_expr(
                Statistic::Column::Hostname,
                Expr::value(Value::from(hostname.map(str::to_owned))),
            )
            .filter(Statistic::Column::Date.eq(date))
            .filter(Statistic::Column::Ip.eq(address))
            .exec(&txn)
            .await?;

        let row = Statistic::Entity::find()
            .filter(Statistic::Column::Date.eq(date))
            .filter(Statistic::Column::Ip.eq(address))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                IpGateError::Database(DbErr::RecordNotFound("statistics row vanished".to_owned()))
            })?;

        txn.commit().await?;

        Ok(StatisticSnapshot {
            requests: row.requests,
            visits: row.visits,
            visits_drops: row.visits_drops,
            visits_all: row.visits + row.visits_drops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_first_visit_creates_counter_row() {
        let recorder = VisitRecorder::new(test_db().await);
        let today = Utc::now().date_naive();

        let stats = recorder
            .record_statistic(today, "203.0.113.7", Some("host.example.com"), false)
            .await
            .unwrap();

        assert_eq!(stats.visits, 1);
        assert_eq!(stats.visits_drops, 0);
        assert_eq!(stats.visits_all, 1);
        assert_eq!(stats.requests, 0);
    }

    #[tokio::test]
    async fn test_blocked_visit_bumps_drops_only() {
        let recorder = VisitRecorder::new(test_db().await);
        let today = Utc::now().date_naive();

        let stats = recorder
            .record_statistic(today, "198.51.100.4", None, true)
            .await
            .unwrap();

        assert_eq!(stats.visits, 0);
        assert_eq!(stats.visits_drops, 1);
        assert_eq!(stats.visits_all, 1);
    }

    #[tokio::test]
    async fn test_repeat_visits_increment_same_row() {
        let db = test_db().await;
        let recorder = VisitRecorder::new(db.clone());
        let today = Utc::now().date_naive();

        recorder
            .record_statistic(today, "203.0.113.7", None, false)
            .await
            .unwrap();
        recorder
            .record_statistic(today, "203.0.113.7", None, true)
            .await
            .unwrap();
        let stats = recorder
            .record_statistic(today, "203.0.113.7", None, false)
            .await
            .unwrap();

        assert_eq!(stats.visits, 2);
        assert_eq!(stats.visits_drops, 1);
        assert_eq!(stats.visits_all, 3);

        // Still a single row for the (date, address) pair.
        let conn = db.lock().await;
        let rows = Statistic::Entity::find().all(&*conn).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_visits_lose_no_increments() {
        let recorder = VisitRecorder::new(test_db().await);
        let today = Utc::now().date_naive();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                recorder
                    .record_statistic(today, "203.0.113.7", None, false)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = recorder
            .record_statistic(today, "203.0.113.7", None, true)
            .await
            .unwrap();
        assert_eq!(stats.visits, 16);
        assert_eq!(stats.visits_drops, 1);
        assert_eq!(stats.visits_all, 17);
    }

    #[tokio::test]
    async fn test_hostname_is_refreshed_on_each_visit() {
        let db = test_db().await;
        let recorder = VisitRecorder::new(db.clone());
        let today = Utc::now().date_naive();

        recorder
            .record_statistic(today, "203.0.113.7", Some("old.example.com"), false)
            .await
            .unwrap();
        recorder
            .record_statistic(today, "203.0.113.7", Some("new.example.com"), false)
            .await
            .unwrap();

        let conn = db.lock().await;
        let row = Statistic::Entity::find()
            .one(&*conn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.hostname.as_deref(), Some("new.example.com"));
    }

    #[tokio::test]
    async fn test_visit_event_captures_request_meta() {
        let db = test_db().await;
        let recorder = VisitRecorder::new(db.clone());

        let mut ctx = RequestContext {
            method: Some("GET".to_owned()),
            path: Some("/search".to_owned()),
            referer: Some("https://example.com/".to_owned()),
            user_agent: Some("curl/8.0".to_owned()),
            query: serde_json::json!({"q": "rust"}),
            ..Default::default()
        };
        ctx.headers
            .insert("x-forwarded-for".to_owned(), "203.0.113.7".to_owned());

        recorder
            .record_visit(Some("203.0.113.7"), true, &ctx)
            .await
            .unwrap();

        let conn = db.lock().await;
        let visit = Visit::Entity::find().one(&*conn).await.unwrap().unwrap();
        assert_eq!(visit.ip.as_deref(), Some("203.0.113.7"));
        assert!(visit.is_blocked);
        assert_eq!(visit.page.as_deref(), Some("/search"));
        assert_eq!(visit.method.as_deref(), Some("GET"));
        assert_eq!(visit.request_data["query"]["q"], "rust");
        assert_eq!(
            visit.request_data["headers"]["x-forwarded-for"],
            "203.0.113.7"
        );
    }

    #[tokio::test]
    async fn test_visit_event_allows_unresolved_address() {
        let db = test_db().await;
        let recorder = VisitRecorder::new(db.clone());

        recorder
            .record_visit(None, false, &RequestContext::default())
            .await
            .unwrap();

        let conn = db.lock().await;
        let visit = Visit::Entity::find().one(&*conn).await.unwrap().unwrap();
        assert_eq!(visit.ip, None);
        assert!(!visit.is_blocked);
    }
}
