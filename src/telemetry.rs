//! Telemetry metric name constants.
//!
//! Centralised metric names for casebook operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `casebook_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `artifact` — artifact kind: "case", "audit_case", "options", "mentor", "verdict"
//! - `source` — where a generated artifact came from: "live" or "mock"
//! - `store` — eviction target: "session_slot", "session" or "options"
//! - `reason` — retry cause: "malformed" or "transport"

/// Requests served from a cache slot without calling the generator.
///
/// Labels: `artifact`.
pub const CACHE_HITS_TOTAL: &str = "casebook_cache_hits_total";

/// Requests that fell through to generation (including forced ones).
///
/// Labels: `artifact`.
pub const CACHE_MISSES_TOTAL: &str = "casebook_cache_misses_total";

/// Artifacts produced, live or mock.
///
/// Labels: `artifact`, `source` ("live" | "mock").
pub const GENERATIONS_TOTAL: &str = "casebook_generations_total";

/// Failed generation attempts that were retried.
///
/// Labels: `artifact`, `reason` ("malformed" | "transport").
pub const RETRIES_TOTAL: &str = "casebook_retries_total";

/// Wall time of a live generation, retries included.
///
/// Labels: `artifact`.
pub const GENERATION_DURATION_SECONDS: &str = "casebook_generation_duration_seconds";

/// Full sweeps performed by the eviction sweeper.
pub const SWEEPS_TOTAL: &str = "casebook_sweeps_total";

/// Entries removed by sweeps.
///
/// Labels: `store` ("session_slot" | "session" | "options").
pub const EVICTIONS_TOTAL: &str = "casebook_evictions_total";
