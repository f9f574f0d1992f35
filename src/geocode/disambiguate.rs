//! Candidate disambiguation: pick one place out of several provider matches.
//!
//! Order of precedence:
//! 1. a candidate whose name equals the query byte for byte (first one wins);
//! 2. the single candidate with the best name similarity;
//! 3. the first of a best-score group whose members all share one name;
//! 4. otherwise nothing, the tie is left for a human to settle.

use super::similarity::{similarity, Similarity};
use super::types::Candidate;

/// Select the best match for `place_name`, or `None` when no confident choice exists.
///
/// The returned reference always points into `candidates`.
pub fn pick_candidate<'a>(place_name: &str, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
    if let Some(exact) = candidates.iter().find(|c| c.name == place_name) {
        tracing::debug!(query = place_name, "exact name match");
        return Some(exact);
    }

    let (best, group) = best_scoring_group(place_name, candidates)?;
    let first = group[0];

    if group.len() == 1 {
        tracing::debug!(query = place_name, chosen = %first.name, ratio = best.ratio(), "closest name");
        return Some(first);
    }

    if group.iter().all(|c| c.name == first.name) {
        tracing::debug!(
            query = place_name,
            chosen = %first.name,
            tied = group.len(),
            "tie between identically named candidates, taking the first"
        );
        return Some(first);
    }

    tracing::info!(
        query = place_name,
        tied = group.len(),
        ratio = best.ratio(),
        "cannot break tie between differently named candidates"
    );
    None
}

/// Candidates sharing the maximum similarity score, in input order.
fn best_scoring_group<'a>(
    place_name: &str,
    candidates: &'a [Candidate],
) -> Option<(Similarity, Vec<&'a Candidate>)> {
    let mut best: Option<(Similarity, Vec<&'a Candidate>)> = None;
    for candidate in candidates {
        let score = similarity(place_name, &candidate.name);
        let replace = match &mut best {
            Some((top, group)) if score == *top => {
                group.push(candidate);
                false
            }
            Some((top, _)) => score > *top,
            None => true,
        };
        if replace {
            best = Some((score, vec![candidate]));
        }
    }
    best
}
