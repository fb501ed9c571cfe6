//! Composite priority/time ordering.

/// Index score for a submission: unix milliseconds multiplied by the class
/// weight. Lower scores dequeue first, so jobs within one weight class come
/// out FIFO.
///
/// Cross-class ordering is approximate: it holds only while the ratio of
/// weights dominates the time skew between submissions, and can invert under
/// large skew. Exact lexicographic (priority, time) ordering would change
/// dispatch order and is intentionally not used.
pub fn score(weight: u32, now_ms: i64) -> i64 {
    now_ms * weight as i64
}
