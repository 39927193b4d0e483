//! Mode arbiter — pure reduction of a tick's candidate list.
//!
//! No hidden state: re-arbitrating an unchanged candidate set yields the
//! same winner. Ties go to the earlier-registered candidate, which is why
//! the engine registers manual, then triggers, then calendar, then the
//! baseline fallback.

use breeze_domain::candidate::Candidate;

/// Select the winning candidate: numerically highest priority, earliest
/// registration on ties. Returns `None` only for an empty set; the engine
/// always registers the baseline fallback, so in practice exactly one
/// candidate wins every tick.
#[must_use]
pub fn arbitrate(candidates: &[Candidate]) -> Option<Candidate> {
    let mut winner: Option<Candidate> = None;
    for candidate in candidates {
        match winner {
            Some(current) if candidate.priority <= current.priority => {}
            _ => winner = Some(*candidate),
        }
    }
    winner
}
