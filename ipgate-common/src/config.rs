use serde::Deserialize;

fn _default_database_url() -> String {
    "sqlite:data/ipgate.sqlite3".to_owned()
}

fn _default_forwarded_headers() -> Vec<String> {
    vec!["client-ip".to_owned(), "x-forwarded-for".to_owned()]
}

fn _default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct IpGateConfig {
    #[serde(default = "_default_database_url")]
    pub database_url: String,

    /// Header names checked in order when resolving the caller's address.
    /// The first non-empty header wins; the raw connection address is the
    /// final fallback.
    #[serde(default = "_default_forwarded_headers")]
    pub forwarded_headers: Vec<String>,

    /// Reverse-resolve the caller's hostname for hostname-pattern rules.
    #[serde(default = "_default_true")]
    pub resolve_hostnames: bool,
}

impl Default for IpGateConfig {
    fn default() -> Self {
        Self {
            database_url: _default_database_url(),
            forwarded_headers: _default_forwarded_headers(),
            resolve_hostnames: _default_true(),
        }
    }
}
