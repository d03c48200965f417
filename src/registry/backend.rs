use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::RegistryError;
use crate::learning::Outcome;

/// Default number of latency samples kept per backend.
pub const DEFAULT_LATENCY_WINDOW: usize = 100;

/// How well a backend's advertised content types cover a request.
///
/// Variants are ordered from worst to best so the best match across several
/// patterns is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Nothing in common with the requested type
    None,
    /// Same top-level type, but no advertised pattern covers the subtype
    SameFamily,
    /// Matched only by the catch-all `*/*` pattern
    Universal,
    /// Matched by a wildcard such as `video/*`
    Partial,
    /// The exact content type is advertised
    Exact,
}

impl MatchKind {
    /// Whether a backend with this match may receive the content at all.
    pub fn is_compatible(self) -> bool {
        matches!(self, MatchKind::Exact | MatchKind::Partial | MatchKind::Universal)
    }
}

/// Lower-case a MIME type and strip any parameters (`; charset=utf-8`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn normalize_pattern(raw: &str) -> String {
    let pattern = normalize_content_type(raw);
    if pattern == "*" {
        "*/*".to_string()
    } else {
        pattern
    }
}

fn pattern_kind(pattern: &str) -> MatchKind {
    if pattern == "*/*" {
        MatchKind::Universal
    } else if pattern.contains(['*', '?', '[', '{']) {
        MatchKind::Partial
    } else {
        MatchKind::Exact
    }
}

/// Static capability metadata of a backend.
///
/// Content type patterns are compiled once into a [`GlobSet`] at
/// construction; `/` is treated as a literal separator so `*/*` only matches
/// well-formed `type/subtype` values.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{Capabilities, MatchKind};
///
/// let caps = Capabilities::new(vec!["video/*".to_string()], 1).unwrap();
/// assert_eq!(caps.match_kind("video/mp4"), MatchKind::Partial);
/// assert_eq!(caps.match_kind("image/png"), MatchKind::None);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    /// Advertised MIME patterns, as configured
    pub content_types: Vec<String>,
    /// Static cost tier (lower is cheaper)
    pub cost_tier: u32,
    #[serde(skip)]
    matcher: GlobSet,
    #[serde(skip)]
    pattern_kinds: Vec<MatchKind>,
    #[serde(skip)]
    families: Vec<String>,
}

impl Capabilities {
    /// Compile the advertised content type patterns.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidPattern` if a pattern is not a valid glob.
    pub fn new(content_types: Vec<String>, cost_tier: u32) -> Result<Self, RegistryError> {
        let mut builder = GlobSetBuilder::new();
        let mut pattern_kinds = Vec::with_capacity(content_types.len());
        let mut families = Vec::new();

        for raw in &content_types {
            let pattern = normalize_pattern(raw);
            let glob = GlobBuilder::new(&pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| RegistryError::InvalidPattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
            pattern_kinds.push(pattern_kind(&pattern));

            if let Some((family, _)) = pattern.split_once('/') {
                if !family.contains('*') && !families.iter().any(|f| f == family) {
                    families.push(family.to_string());
                }
            }
        }

        let matcher = builder
            .build()
            .map_err(|e| RegistryError::InvalidPattern {
                pattern: content_types.join(","),
                message: e.to_string(),
            })?;

        Ok(Self {
            content_types,
            cost_tier,
            matcher,
            pattern_kinds,
            families,
        })
    }

    /// Classify how well these capabilities cover `content_type`.
    pub fn match_kind(&self, content_type: &str) -> MatchKind {
        let normalized = normalize_content_type(content_type);
        if normalized.is_empty() {
            return MatchKind::None;
        }

        let best = self
            .matcher
            .matches(&normalized)
            .into_iter()
            .filter_map(|idx| self.pattern_kinds.get(idx).copied())
            .max();
        if let Some(kind) = best {
            return kind;
        }

        let family = normalized.split('/').next().unwrap_or_default();
        if self.families.iter().any(|f| f == family) {
            MatchKind::SameFamily
        } else {
            MatchKind::None
        }
    }

    /// Whether content of this type may be routed to the backend.
    pub fn supports(&self, content_type: &str) -> bool {
        self.match_kind(content_type).is_compatible()
    }
}

/// Bounded ring buffer of successful-operation latencies.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl LatencyWindow {
    /// Create an empty window holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, sample_ms: u64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Arithmetic mean of the retained samples.
    ///
    /// Summed in `u128` so a full window of `u64::MAX` samples cannot overflow.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u128 = self.samples.iter().map(|&s| u128::from(s)).sum();
        Some(sum as f64 / self.samples.len() as f64)
    }

    /// Nearest-rank percentile (`pct` in 0..=100) of the retained samples.
    pub fn percentile(&self, pct: f64) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();
        let rank = (pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64).round() as usize;
        sorted.get(rank).copied()
    }
}

/// Live statistics of one backend, mutated only through
/// [`Registry::record_outcome`](super::Registry::record_outcome).
#[derive(Debug, Clone)]
pub struct BackendStats {
    pub success_count: u64,
    pub failure_count: u64,
    pub latency: LatencyWindow,
    pub last_updated: Option<DateTime<Utc>>,
}

impl BackendStats {
    pub fn new(latency_window: usize) -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            latency: LatencyWindow::new(latency_window),
            last_updated: None,
        }
    }

    /// Fold one outcome into the aggregate.
    ///
    /// Failed operations only bump the failure counter; their latency is not
    /// comparable to successful ones and stays out of the window.
    pub fn apply(&mut self, success: bool, duration_ms: u64, now: DateTime<Utc>) {
        if success {
            self.success_count += 1;
            self.latency.push(duration_ms);
        } else {
            self.failure_count += 1;
        }
        // Never move backwards, even if the wall clock does.
        self.last_updated = Some(match self.last_updated {
            Some(prev) if prev > now => prev,
            _ => now,
        });
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            success_count: self.success_count,
            failure_count: self.failure_count,
            avg_latency_ms: self.latency.mean(),
            p95_latency_ms: self.latency.percentile(95.0),
            latency_samples: self.latency.len(),
            last_updated: self.last_updated,
        }
    }
}

/// Consistent copy of a backend's statistics taken under its lock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub success_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<u64>,
    pub latency_samples: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StatsSnapshot {
    /// Number of accepted outcomes.
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Observed success rate, `None` before the first outcome.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.success_count as f64 / total as f64),
        }
    }
}

/// A candidate destination for content.
///
/// Backends are never removed from the registry; they can only be disabled,
/// so outcome attribution keeps working for the process lifetime.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{Backend, Capabilities};
///
/// let caps = Capabilities::new(vec!["*/*".to_string()], 3).unwrap();
/// let backend = Backend::new("archive", caps);
/// assert_eq!(backend.id, "archive");
/// assert!(!backend.is_disabled());
/// assert_eq!(backend.stats().total(), 0);
/// ```
#[derive(Debug)]
pub struct Backend {
    /// Unique identifier
    pub id: String,
    /// Static capabilities (content types, cost tier)
    pub capabilities: Arc<Capabilities>,
    /// When the backend was registered
    pub registered_at: DateTime<Utc>,
    disabled: AtomicBool,
    stats: Mutex<BackendStats>,
}

impl Backend {
    /// Create an enabled backend with empty statistics.
    pub fn new(id: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            id: id.into(),
            capabilities: Arc::new(capabilities),
            registered_at: Utc::now(),
            disabled: AtomicBool::new(false),
            stats: Mutex::new(BackendStats::new(DEFAULT_LATENCY_WINDOW)),
        }
    }

    /// Use a latency ring buffer of the given capacity.
    pub fn with_latency_window(self, capacity: usize) -> Self {
        Self {
            stats: Mutex::new(BackendStats::new(capacity)),
            ..self
        }
    }

    /// Start the backend in the given disabled state.
    pub fn with_disabled(self, disabled: bool) -> Self {
        self.disabled.store(disabled, Ordering::SeqCst);
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Returns the previous state.
    pub(crate) fn set_disabled(&self, disabled: bool) -> bool {
        self.disabled.swap(disabled, Ordering::SeqCst)
    }

    fn lock_stats(&self) -> MutexGuard<'_, BackendStats> {
        match self.stats.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(backend_id = %self.id, "Stats mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Copy the statistics out under the backend lock.
    pub fn stats(&self) -> StatsSnapshot {
        self.lock_stats().snapshot()
    }

    /// Apply an outcome atomically and return the resulting statistics.
    pub(crate) fn apply_outcome(&self, outcome: &Outcome) -> StatsSnapshot {
        let mut stats = self.lock_stats();
        stats.apply(outcome.success, outcome.duration_ms, Utc::now());
        stats.snapshot()
    }

    /// Point-in-time view safe to use without holding any lock.
    pub fn snapshot(&self) -> BackendSnapshot {
        BackendSnapshot {
            id: self.id.clone(),
            capabilities: Arc::clone(&self.capabilities),
            disabled: self.is_disabled(),
            registered_at: self.registered_at,
            stats: self.stats(),
        }
    }
}

/// Serializable, lock-free view of a [`Backend`].
#[derive(Debug, Clone, Serialize)]
pub struct BackendSnapshot {
    pub id: String,
    pub capabilities: Arc<Capabilities>,
    pub disabled: bool,
    pub registered_at: DateTime<Utc>,
    pub stats: StatsSnapshot,
}

impl BackendSnapshot {
    /// Whether this backend may be selected for `content_type`.
    pub fn is_eligible_for(&self, content_type: &str) -> bool {
        !self.disabled && self.capabilities.supports(content_type)
    }
}
