use std::time::Duration;

use ipgate_common::{IpGateConfig, IpGateError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Connects to the configured database. Schema creation and migration are
/// owned by the embedding application; the tables are assumed to exist.
pub async fn connect_to_db(config: &IpGateConfig) -> Result<DatabaseConnection, IpGateError> {
    let mut url = url::Url::parse(&config.database_url)?;
    if url.scheme() == "sqlite" && url.query().is_none() {
        url.set_query(Some("mode=rwc"));
    }

    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    Ok(Database::connect(options).await?)
}
