mod address;
pub mod db;
mod dns;
mod engine;
mod gate;
mod recorder;
mod services;
mod store;
#[cfg(test)]
mod test_support;

pub use address::AddressResolver;
pub use dns::{DnsHostnameResolver, HostnameResolver, NoHostnameResolver};
pub use engine::{BlockDecisionEngine, Evaluation};
pub use gate::GateController;
pub use recorder::VisitRecorder;
pub use services::Services;
pub use store::{BlockStore, DatabaseBlockStore};
