use std::sync::Arc;

use chrono::Utc;
use ipgate_common::helpers::ipv4_to_u32;
use ipgate_common::{CheckOutcome, Verdict};
use tracing::debug;

use crate::store::BlockStore;

/// Verdict plus the storage errors collected along the way. A failed check
/// degrades to `Unknown` instead of deciding anything; the error text is
/// surfaced for operators and must never drive blocking logic.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub errors: Vec<String>,
}

/// Runs the ordered block-check chain against the rule store.
///
/// The address-based sub-chain (exact match, automatic block, period range)
/// short-circuits on the first `Blocked` and continues past `Allowed` and
/// `Unknown`, so a later check's positive match overrides an earlier storage
/// failure. The hostname check only runs when the address chain did not
/// block.
pub struct BlockDecisionEngine {
    store: Arc<dyn BlockStore>,
}

impl BlockDecisionEngine {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self { store }
    }

    pub async fn evaluate(&self, address: &str, hostname: Option<&str>) -> Evaluation {
        let mut errors = Vec::new();
        let mut verdict = Verdict::default();

        let exact = self.check_exact(address, &mut errors).await;
        verdict.exact = Some(exact);

        let mut address_outcome = exact;
        if !exact.is_blocked() {
            let auto = self.check_auto(address, &mut errors).await;
            verdict.auto = Some(auto);

            if auto.is_blocked() {
                address_outcome = CheckOutcome::Blocked;
            } else {
                let period = self.check_period(address, &mut errors).await;
                verdict.period = Some(period);
                address_outcome = combine_chain([exact, auto, period]);
            }
        }

        verdict.overall = if address_outcome.is_blocked() {
            CheckOutcome::Blocked
        } else {
            let host = self.check_host(address, hostname, &mut errors).await;
            verdict.host = Some(host);
            match host {
                CheckOutcome::Unknown => address_outcome,
                decided => decided,
            }
        };

        if verdict.is_blocked() {
            debug!(address, ?hostname, ?verdict, "Address blocked");
        }

        Evaluation { verdict, errors }
    }

    async fn check_exact(&self, address: &str, errors: &mut Vec<String>) -> CheckOutcome {
        match self.store.count_exact_blocks(address).await {
            Ok(0) => CheckOutcome::Allowed,
            Ok(_) => CheckOutcome::Blocked,
            Err(error) => {
                errors.push(format!("exact block check failed: {error}"));
                CheckOutcome::Unknown
            }
        }
    }

    async fn check_auto(&self, address: &str, errors: &mut Vec<String>) -> CheckOutcome {
        let today = Utc::now().date_naive();
        match self.store.automatic_block_for(address, today).await {
            // An explicit code of 1 means the classifier cleared the
            // address; any other code, or no code at all, means block.
            Ok(Some(record)) => match record.drop_block {
                Some(1) => CheckOutcome::Allowed,
                _ => CheckOutcome::Blocked,
            },
            Ok(None) => CheckOutcome::Allowed,
            Err(error) => {
                errors.push(format!("automatic block check failed: {error}"));
                CheckOutcome::Unknown
            }
        }
    }

    async fn check_period(&self, address: &str, errors: &mut Vec<String>) -> CheckOutcome {
        // Range rules are IPv4-only; anything else must fail safe as a
        // non-match, never a block.
        let Some(numeric) = ipv4_to_u32(address) else {
            return CheckOutcome::Unknown;
        };

        match self.store.count_period_blocks(numeric).await {
            Ok(0) => CheckOutcome::Allowed,
            Ok(_) => CheckOutcome::Blocked,
            Err(error) => {
                errors.push(format!("period block check failed: {error}"));
                CheckOutcome::Unknown
            }
        }
    }

    async fn check_host(
        &self,
        address: &str,
        hostname: Option<&str>,
        errors: &mut Vec<String>,
    ) -> CheckOutcome {
        let Some(hostname) = hostname else {
            return CheckOutcome::Allowed;
        };

        match self.store.hostname_block_patterns().await {
            Ok(patterns) => {
                let haystack = hostname.to_ascii_lowercase();
                for pattern in patterns {
                    if haystack.contains(&pattern.to_ascii_lowercase()) || address == pattern {
                        return CheckOutcome::Blocked;
                    }
                }
                CheckOutcome::Allowed
            }
            Err(error) => {
                errors.push(format!("hostname block check failed: {error}"));
                CheckOutcome::Unknown
            }
        }
    }
}

/// The address-based chain blocks if any check blocked; otherwise an
/// undecidable check leaves the whole chain undecided.
fn combine_chain(checks: [CheckOutcome; 3]) -> CheckOutcome {
    if checks.iter().any(|check| check.is_blocked()) {
        CheckOutcome::Blocked
    } else if checks.contains(&CheckOutcome::Unknown) {
        CheckOutcome::Unknown
    } else {
        CheckOutcome::Allowed
    }
}
