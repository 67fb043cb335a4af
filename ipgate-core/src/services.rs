use std::sync::Arc;

use anyhow::Result;
use ipgate_common::IpGateConfig;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::info;

use crate::address::AddressResolver;
use crate::db::connect_to_db;
use crate::dns::{DnsHostnameResolver, HostnameResolver, NoHostnameResolver};
use crate::engine::BlockDecisionEngine;
use crate::gate::GateController;
use crate::recorder::VisitRecorder;
use crate::store::DatabaseBlockStore;

#[derive(Clone)]
pub struct Services {
    pub db: Arc<Mutex<DatabaseConnection>>,
    pub config: Arc<Mutex<IpGateConfig>>,
    pub gate: Arc<GateController>,
}

impl Services {
    pub async fn new(config: IpGateConfig) -> Result<Self> {
        let db = connect_to_db(&config).await?;
        let db = Arc::new(Mutex::new(db));

        let store = Arc::new(DatabaseBlockStore::new(db.clone()));
        let engine = BlockDecisionEngine::new(store);
        let recorder = VisitRecorder::new(db.clone());
        let resolver = AddressResolver::new(config.forwarded_headers.clone());

        let hostnames: Box<dyn HostnameResolver> = if config.resolve_hostnames {
            Box::new(DnsHostnameResolver::new())
        } else {
            Box::new(NoHostnameResolver)
        };

        let gate = Arc::new(GateController::new(resolver, engine, recorder, hostnames));

        info!(
            resolve_hostnames = config.resolve_hostnames,
            "Gate services ready"
        );

        Ok(Self {
            db,
            config: Arc::new(Mutex::new(config)),
            gate,
        })
    }
}
