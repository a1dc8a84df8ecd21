//! Overlap detection between occurrence lists.
//!
//! Used by the orchestrator to vet a chosen slot against already-expanded
//! occurrences before creating an event. Adjacent occurrences, where one ends
//! exactly when another starts, are NOT conflicts.

use crate::types::Occurrence;

/// A detected overlap between two occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub occurrence_a: Occurrence,
    pub occurrence_b: Occurrence,
    pub overlap_minutes: i64,
}

/// Find all pairwise overlaps between two occurrence lists.
///
/// Two occurrences overlap when `a.start < b.end && b.start < a.end`; the
/// overlap spans `max(a.start, b.start)` to `min(a.end, b.end)`.
pub fn find_conflicts(occurrences_a: &[Occurrence], occurrences_b: &[Occurrence]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for a in occurrences_a {
        for b in occurrences_b {
            if a.start < b.end && b.start < a.end {
                let overlap_start = a.start.max(b.start);
                let overlap_end = a.end.min(b.end);
                conflicts.push(Conflict {
                    occurrence_a: a.clone(),
                    occurrence_b: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}
