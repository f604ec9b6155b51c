//! Pipeline configuration: search escalation thresholds, candidate caps and
//! the reporting policies for invalidated evidence.
//!
//! Defaults reproduce the screening behaviour authors are used to; every value
//! can be overridden from the environment through `AppConfig`.

use serde::Serialize;

use crate::models::{BroadStrategy, ClosestMatchPolicy};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Result-count thresholds for choosing the narrow or broad query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountThresholds {
    /// Narrow queries below this many hits are considered too sparse.
    pub sparse_below: u64,
    /// Upper bound of the comfortable narrow range (inclusive).
    pub comfortable_max: u64,
    /// Above this the narrow query is kept as-is; broadening cannot help.
    pub oversized_above: u64,
}

impl Default for CountThresholds {
    fn default() -> Self {
        Self {
            sparse_below: 5,
            comfortable_max: 300,
            oversized_above: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscalationConfig {
    pub broad_strategy: BroadStrategy,
    pub thresholds: CountThresholds,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            broad_strategy: BroadStrategy::DropLastBlock,
            thresholds: CountThresholds::default(),
        }
    }
}

/// Caps bounding how many identifiers flow into detail fetch and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateLimits {
    /// Maximum identifiers requested from the primary search.
    pub search_limit: usize,
    /// Seeds handed to citation-network expansion.
    pub expansion_seeds: usize,
    /// Linked identifiers requested per seed.
    pub neighbors_per_seed: usize,
    /// Final cap before detail fetch (bounds the evaluation prompt).
    pub max_candidates: usize,
}

impl Default for CandidateLimits {
    fn default() -> Self {
        Self {
            search_limit: 100,
            expansion_seeds: 5,
            neighbors_per_seed: 10,
            max_candidates: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub escalation: EscalationConfig,
    pub candidates: CandidateLimits,
    pub closest_match: ClosestMatchPolicy,
    /// Run the knowledge-gap / novelty-sharpener call after verification.
    pub narrative_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            escalation: EscalationConfig::default(),
            candidates: CandidateLimits::default(),
            closest_match: ClosestMatchPolicy::DropInvalidated,
            narrative_enabled: true,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Derivation
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Overlay environment overrides on the defaults.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = get("CATTO_CLOSEST_MATCH") {
            match raw.parse() {
                Ok(policy) => config.closest_match = policy,
                Err(e) => tracing::warn!(error = %e, "Ignoring CATTO_CLOSEST_MATCH"),
            }
        }
        if let Some(raw) = get("CATTO_BROAD_STRATEGY") {
            match raw.parse() {
                Ok(strategy) => config.escalation.broad_strategy = strategy,
                Err(e) => tracing::warn!(error = %e, "Ignoring CATTO_BROAD_STRATEGY"),
            }
        }
        if let Some(raw) = get("CATTO_NARRATIVE") {
            match parse_flag(&raw) {
                Some(flag) => config.narrative_enabled = flag,
                None => tracing::warn!(value = %raw, "Ignoring CATTO_NARRATIVE"),
            }
        }
        if let Some(cap) = get("CATTO_MAX_CANDIDATES").and_then(|v| v.parse().ok()) {
            config.candidates.max_candidates = cap;
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
