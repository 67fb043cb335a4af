use std::error::Error;

#[derive(thiserror::Error, Debug)]
pub enum IpGateError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("serialization failed: {0}")]
    SerializeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IpGateError {
    pub fn other<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }
}
