use std::sync::Arc;

use ipgate_db_entities::{AutomaticBlock, Block, Statistic, Visit};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tokio::sync::Mutex;

/// In-memory sqlite with the schema derived from the entities. A single
/// pooled connection, since every pool member gets its own `:memory:`
/// database otherwise.
pub async fn test_db() -> Arc<Mutex<DatabaseConnection>> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect test db");

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    for statement in [
        schema.create_table_from_entity(Block::Entity),
        schema.create_table_from_entity(AutomaticBlock::Entity),
        schema.create_table_from_entity(Visit::Entity),
        schema.create_table_from_entity(Statistic::Entity),
    ] {
        db.execute(backend.build(&statement))
            .await
            .expect("create table");
    }

    Arc::new(Mutex::new(db))
}
