//! Name similarity used to rank geocoding candidates.
//!
//! Ratcliff/Obershelp matching: take the longest common run of characters,
//! then recurse on the unmatched pieces left and right of it. The score is
//! `2 * matched / (len(a) + len(b))`. No junk heuristic is applied and the
//! comparison is case-sensitive over Unicode scalar values.
//!
//! Tie-breaking inside the matcher depends on which string is scanned first,
//! so `matched` can differ with argument order (`"tide"`/`"diet"` gives 1 one
//! way and 2 the other). Both orders are run and the larger count is kept,
//! which makes the score symmetric.

use std::cmp::Ordering;
use std::collections::HashMap;

/// An exact similarity score kept as a fraction so ties compare exactly.
#[derive(Debug, Clone, Copy)]
pub struct Similarity {
    /// Characters covered by the matching blocks (counted once per string).
    pub matches: usize,
    /// Combined length of both strings.
    pub total: usize,
}

impl Similarity {
    /// Score in `[0.0, 1.0]`; two empty strings score 1.0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            2.0 * self.matches as f64 / self.total as f64
        }
    }

    /// Numerator/denominator of the ratio, with empty-vs-empty mapped to 1/1.
    fn fraction(&self) -> (u128, u128) {
        if self.total == 0 {
            (1, 1)
        } else {
            (2 * self.matches as u128, self.total as u128)
        }
    }
}

impl PartialEq for Similarity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Similarity {}

impl PartialOrd for Similarity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Similarity {
    fn cmp(&self, other: &Self) -> Ordering {
        let (an, ad) = self.fraction();
        let (bn, bd) = other.fraction();
        (an * bd).cmp(&(bn * ad))
    }
}

/// Compare two strings. `similarity(a, b) == similarity(b, a)`.
pub fn similarity(a: &str, b: &str) -> Similarity {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    Similarity {
        matches: matching_characters(&a, &b).max(matching_characters(&b, &a)),
        total: a.len() + b.len(),
    }
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common run inside `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, len)`. On ties the run starting earliest in `a` wins,
/// then the one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        j2len = next;
    }

    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical() {
        let s = similarity("Rotterdam", "Rotterdam");
        assert_eq!(s.matches, 9);
        assert_relative_eq!(s.ratio(), 1.0);
    }

    #[test]
    fn test_disjoint() {
        assert_relative_eq!(similarity("abc", "xyz").ratio(), 0.0);
    }

    #[test]
    fn test_empty() {
        assert_relative_eq!(similarity("", "").ratio(), 1.0);
        assert_relative_eq!(similarity("abc", "").ratio(), 0.0);
        assert_eq!(similarity("", ""), similarity("a", "a"));
    }

    #[test]
    fn test_known_ratios() {
        // Reference values for Ratcliff/Obershelp without junk handling.
        assert_relative_eq!(similarity("abcd", "bcde").ratio(), 0.75);
        assert_relative_eq!(similarity("Rotterdam Port", "Rotterdam").ratio(), 18.0 / 23.0);
        assert_relative_eq!(similarity("Rotterdam Port", "Amsterdam").ratio(), 12.0 / 23.0);
        assert_relative_eq!(similarity("Santos", "Santo").ratio(), 10.0 / 11.0);
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // "ab" wins the tie with "de", which is then found in the right-hand remainder.
        let s = similarity("abXde", "abYde");
        assert_eq!(s.matches, 4);
    }

    #[test]
    fn test_symmetric_ratio() {
        let pairs = [
            ("Springfield", "Springfeld"),
            ("Port Said", "Said Port"),
            ("Le Havre", "Havre"),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(similarity(a, b).ratio(), similarity(b, a).ratio());
        }
    }

    #[test]
    fn test_order_dependent_matcher_is_symmetrised() {
        // One-directional matching finds 1 character for ("tide", "diet")
        // and 2 for ("diet", "tide"); the score keeps the larger.
        assert_eq!(matching_characters(&chars("tide"), &chars("diet")), 1);
        assert_eq!(matching_characters(&chars("diet"), &chars("tide")), 2);

        let forward = similarity("tide", "diet");
        let backward = similarity("diet", "tide");
        assert_eq!(forward.matches, 2);
        assert_eq!(forward, backward);
        assert_relative_eq!(forward.ratio(), 0.5);
        assert_relative_eq!(backward.ratio(), 0.5);
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_case_sensitive() {
        assert!(similarity("santos", "santos") > similarity("santos", "SANTOS"));
    }

    #[test]
    fn test_exact_fraction_ordering() {
        // 2*3/12 and 2*4/16 are the same score.
        let a = Similarity { matches: 3, total: 12 };
        let b = Similarity { matches: 4, total: 16 };
        assert_eq!(a, b);
        assert!(Similarity { matches: 5, total: 16 } > b);
    }

    #[test]
    fn test_unicode_chars() {
        // ø counts as a single character.
        let s = similarity("Tromsø", "Tromso");
        assert_eq!(s.total, 12);
        assert_eq!(s.matches, 5);
    }
}
