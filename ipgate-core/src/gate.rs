use std::net::IpAddr;

use chrono::Utc;
use ipgate_common::{GateResponse, RequestContext, Verdict};
use tracing::{debug, info, warn};

use crate::address::AddressResolver;
use crate::dns::HostnameResolver;
use crate::engine::BlockDecisionEngine;
use crate::recorder::VisitRecorder;

/// Orchestrates one gate check: resolve the caller's address and hostname,
/// run the decision chain, record the visit and statistics, and assemble the
/// fixed-shape response. Nothing here is fatal to the request; every failure
/// along the way degrades into an entry in the response's error list.
pub struct GateController {
    resolver: AddressResolver,
    engine: BlockDecisionEngine,
    recorder: VisitRecorder,
    hostnames: Box<dyn HostnameResolver>,
}

impl GateController {
    pub fn new(
        resolver: AddressResolver,
        engine: BlockDecisionEngine,
        recorder: VisitRecorder,
        hostnames: Box<dyn HostnameResolver>,
    ) -> Self {
        Self {
            resolver,
            engine,
            recorder,
            hostnames,
        }
    }

    pub async fn check(&self, ctx: &RequestContext) -> GateResponse {
        let mut response = GateResponse::default();
        let mut errors = Vec::new();

        let address = self.resolver.resolve(ctx);
        response.ip = address.clone();

        let hostname = match address.as_deref().and_then(|a| a.parse::<IpAddr>().ok()) {
            Some(ip) => self.hostnames.reverse(ip).await,
            None => None,
        };

        let verdict = match address.as_deref() {
            Some(addr) => {
                let evaluation = self.engine.evaluate(addr, hostname.as_deref()).await;
                errors.extend(evaluation.errors);
                evaluation.verdict
            }
            None => {
                errors.push("could not resolve client address".to_owned());
                Verdict::default()
            }
        };
        response.apply_verdict(&verdict);

        let blocked = verdict.is_blocked();
        if let Err(error) = self.recorder.record_visit(address.as_deref(), blocked, ctx).await {
            warn!(%error, "Failed to record visit");
            errors.push(format!("visit log failed: {error}"));
        }

        if let Some(addr) = address.as_deref() {
            let today = Utc::now().date_naive();
            match self
                .recorder
                .record_statistic(today, addr, hostname.as_deref(), blocked)
                .await
            {
                Ok(stats) => response.apply_statistics(&stats),
                Err(error) => {
                    warn!(%error, ip = addr, "Failed to update statistics");
                    errors.push(format!("statistics update failed: {error}"));
                }
            }

            if blocked {
                info!(ip = addr, ?hostname, "Blocked visit");
            } else {
                debug!(ip = addr, "Visit recorded");
            }
        }

        response.errors = errors;
        response
    }
}
