//! Path-change timeline and query-time resolution.

use tracing::debug;

/// A node on a path: satellite ids below the constellation size, ground
/// station ids at or above it.
pub type NodeId = u32;

/// "This path became active at `change_time_ns` and stays active until the
/// next event's time." Events arrive in file order, already sorted.
#[derive(Debug, Clone)]
pub struct PathEvent {
    pub change_time_ns: u64,
    pub path: Vec<NodeId>,
}

/// The path active at a query instant, with the millisecond time at which it
/// became active. Computed fresh per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub active_since_ms: u64,
    pub nodes: Vec<NodeId>,
}

/// Upper bound used for the last event's validity interval.
const FAR_FUTURE_MS: u64 = 99_999_999_999;

/// Converts a nanosecond timestamp to milliseconds, rounding half up.
///
/// Ties (an exact half millisecond) round up, not half-to-even; the logs
/// carry whole-millisecond timestamps, so the tie case does not occur in
/// practice.
pub fn ns_to_ms(ns: u64) -> u64 {
    (ns + 500_000) / 1_000_000
}

/// Ordered sequence of path-change events for one src/dst pair.
#[derive(Debug)]
pub struct PathTimeline {
    events: Vec<PathEvent>,
}

impl PathTimeline {
    /// Stores events in the order given and appends a duplicate of the
    /// last-read path under a zero timestamp.
    ///
    /// The trailing time-0 entry reproduces the upstream trace format's
    /// closing record. Because [`resolve`](Self::resolve) scans first-match,
    /// its interval `[0, +inf)` catches any query that no earlier interval
    /// claimed, so a non-empty timeline always resolves to some path and the
    /// empty fallback is reachable only when `events` is empty.
    pub fn build(events: Vec<PathEvent>) -> Self {
        let mut events = events;
        if let Some(last) = events.last() {
            let sentinel = PathEvent {
                change_time_ns: 0,
                path: last.path.clone(),
            };
            events.push(sentinel);
        }

        debug!(events = events.len(), "Path timeline built");
        Self { events }
    }

    /// Number of stored events, including the trailing sentinel.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Selects the first event whose half-open validity interval contains
    /// `query_time_ms`. The upper bound of event `i` is event `i + 1`'s
    /// start, or far-future for the last event. If nothing matches (only
    /// possible for an empty timeline), returns the empty path at time 0.
    pub fn resolve(&self, query_time_ms: u64) -> ResolvedPath {
        for (i, event) in self.events.iter().enumerate() {
            let start_ms = ns_to_ms(event.change_time_ns);
            let next_start_ms = self
                .events
                .get(i + 1)
                .map(|next| ns_to_ms(next.change_time_ns))
                .unwrap_or(FAR_FUTURE_MS);

            if query_time_ms >= start_ms && query_time_ms < next_start_ms {
                return ResolvedPath {
                    active_since_ms: start_ms,
                    nodes: event.path.clone(),
                };
            }
        }

        ResolvedPath {
            active_since_ms: 0,
            nodes: Vec::new(),
        }
    }
}
