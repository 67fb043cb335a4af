use std::collections::HashMap;

use sea_orm::query::JsonValue;
use serde::Serialize;

/// Explicit tri-state result of a single block check. `Unknown` means the
/// check could not be decided (storage failure, or a dimension that does not
/// apply to the address) and must never be collapsed into an allow or a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CheckOutcome {
    Blocked,
    Allowed,
    Unknown,
}

impl CheckOutcome {
    pub fn is_blocked(self) -> bool {
        self == CheckOutcome::Blocked
    }

    /// Nullable-boolean form used in the response payload.
    pub fn as_flag(self) -> Option<bool> {
        match self {
            CheckOutcome::Blocked => Some(true),
            CheckOutcome::Allowed => Some(false),
            CheckOutcome::Unknown => None,
        }
    }
}

/// Result of the full block-decision chain. Per-dimension values are `None`
/// when the dimension was never evaluated because an earlier check already
/// decided the verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub overall: CheckOutcome,
    pub exact: Option<CheckOutcome>,
    pub auto: Option<CheckOutcome>,
    pub period: Option<CheckOutcome>,
    pub host: Option<CheckOutcome>,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        self.overall.is_blocked()
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            overall: CheckOutcome::Unknown,
            exact: None,
            auto: None,
            period: None,
            host: None,
        }
    }
}

/// The automatic-block classifier's daily record for an address.
/// `drop_block == Some(1)` is an explicit allow; any other code, or a record
/// with no code at all, means the classifier decided to block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoBlockRecord {
    pub drop_block: Option<i32>,
}

/// Snapshot of the request the gate is checking. Replaces ambient access to
/// the server environment: the embedding application fills this in from its
/// own framework and passes it down explicitly.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RequestContext {
    pub remote_addr: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Header names are matched case-insensitively.
    pub headers: HashMap<String, String>,
    pub query: JsonValue,
    pub body: JsonValue,
}

impl RequestContext {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Post-update counters for one (date, address) statistics row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatisticSnapshot {
    pub requests: i32,
    pub visits: i32,
    pub visits_drops: i32,
    pub visits_all: i32,
}

/// The gate's response payload. Every field is always present so consumers
/// get a stable shape even when parts of the pipeline failed; `errors` is
/// only serialized when at least one failure occurred.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GateResponse {
    pub block: Option<bool>,
    pub block_auto: Option<bool>,
    pub block_host: Option<bool>,
    pub block_period: Option<bool>,
    pub block_ip: Option<bool>,
    pub ip: Option<String>,
    pub requests: i32,
    pub visits: i32,
    pub visits_drops: i32,
    pub visits_all: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl GateResponse {
    pub fn apply_verdict(&mut self, verdict: &Verdict) {
        self.block = verdict.overall.as_flag();
        self.block_ip = verdict.exact.and_then(CheckOutcome::as_flag);
        self.block_auto = verdict.auto.and_then(CheckOutcome::as_flag);
        self.block_period = verdict.period.and_then(CheckOutcome::as_flag);
        self.block_host = verdict.host.and_then(CheckOutcome::as_flag);
    }

    pub fn apply_statistics(&mut self, stats: &StatisticSnapshot) {
        self.requests = stats.requests;
        self.visits = stats.visits;
        self.visits_drops = stats.visits_drops;
        self.visits_all = stats.visits_all;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_flags() {
        assert_eq!(CheckOutcome::Blocked.as_flag(), Some(true));
        assert_eq!(CheckOutcome::Allowed.as_flag(), Some(false));
        assert_eq!(CheckOutcome::Unknown.as_flag(), None);
    }

    #[test]
    fn test_response_keeps_shape_on_empty_verdict() {
        let mut response = GateResponse::default();
        response.apply_verdict(&Verdict::default());

        assert_eq!(response.block, None);
        assert_eq!(response.block_ip, None);
        assert_eq!(response.block_host, None);
        assert_eq!(response.visits, 0);
        assert_eq!(response.visits_all, 0);
    }

    #[test]
    fn test_errors_omitted_from_json_when_empty() {
        let response = GateResponse::default();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("errors").is_none());
        assert!(json.get("block").is_some());
        assert!(json.get("visits_all").is_some());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut ctx = RequestContext::default();
        ctx.headers
            .insert("X-Forwarded-For".to_owned(), "10.0.0.1".to_owned());

        assert_eq!(ctx.header("x-forwarded-for"), Some("10.0.0.1"));
        assert_eq!(ctx.header("X-FORWARDED-FOR"), Some("10.0.0.1"));
        assert_eq!(ctx.header("client-ip"), None);
    }
}
