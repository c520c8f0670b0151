//! Posterlens core library - normalization and aggregation of poster accessibility metrics

// Global invariants enforced in this crate:
// - The snapshot is the single source of truth; summaries are always derived
// - No global mutable state; the session store is passed explicitly
// - No network, randomness, clocks, threads, or async
// - Deterministic ordering must be explicit (ordered maps, stable sorts)
// - Identical input yields byte-for-byte identical output

pub mod adapter;
pub mod aggregates;
pub mod config;
pub mod detail;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod report;
pub mod snapshot;
pub mod store;

pub use aggregates::{summarize_all, summarize_stored, AggregateSummary, Overview};
pub use config::ResolvedConfig;
pub use error::{EngineError, EngineResult};
pub use metrics::{MetricFamily, MetricSummary, SummaryItem};
pub use policy::{Grade, Policies};
pub use report::{render_json, render_text};
pub use snapshot::AnalysisSnapshot;
pub use store::{MemoryStorage, SessionStorage, SessionStore};

/// Adapt a raw service response and summarize it in one step
pub fn evaluate(raw: &str, base_url: &str, policies: &Policies) -> EngineResult<AggregateSummary> {
    let snapshot = adapter::parse_payload(raw, base_url)?;
    Ok(summarize_all(&snapshot, policies))
}
