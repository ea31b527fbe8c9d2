//! Title normalization and cross-venue market matching
//!
//! Venue titles for the same event rarely agree ("Will it rain tomorrow?"
//! vs "It rain tomorrow"), so matching runs on canonicalized titles with a
//! token-set similarity that ignores word order and duplicate tokens.

use crate::types::{EventGroup, NormalizedMarket, Platform};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Substring replacements applied to a lower-cased title, in order.
///
/// Deliberately not word-boundary-aware: "breathe in" becomes "breain".
/// Matched-title sets were built against this exact behavior, so keep it.
const TITLE_REPLACEMENTS: [(&str, &str); 7] = [
    ("will ", ""),
    ("does ", ""),
    ("do ", ""),
    ("the ", ""),
    ("?", ""),
    ("%", " percent"),
    ("  ", " "),
];

/// Canonicalize a raw market title into a comparable form.
///
/// Pure and idempotent. Lower-cases, strips interrogative filler, removes
/// question marks, expands "%" and collapses whitespace. Always returns a
/// string, possibly empty.
pub fn normalize_title(raw: &str) -> String {
    let mut title = raw.trim().to_lowercase();
    for (from, to) in TITLE_REPLACEMENTS {
        title = title.replace(from, to);
    }
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized indel similarity of two strings in [0,1].
///
/// Levenshtein with substitutions disallowed, which reduces to
/// `2 * LCS / (len_a + len_b)`.
fn indel_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // LCS length, single rolling row.
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let lcs = prev[b.len()];
    2.0 * lcs as f64 / (a.len() + b.len()) as f64
}

/// Token-set fuzzy similarity between two titles, scored in [0,100].
///
/// Splits each title into a sorted set of whitespace tokens, then scores
/// the best pairwise indel ratio over {intersection, intersection + left
/// difference, intersection + right difference}. Word order and duplicate
/// tokens do not affect the score, and a title whose tokens are a subset
/// of the other's scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect = tokens_a
        .intersection(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let diff_ab = tokens_a
        .difference(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let diff_ba = tokens_b
        .difference(&tokens_a)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let combine = |diff: &str| -> String {
        if diff.is_empty() {
            sect.clone()
        } else if sect.is_empty() {
            diff.to_string()
        } else {
            format!("{sect} {diff}")
        }
    };
    let combined_ab = combine(&diff_ab);
    let combined_ba = combine(&diff_ba);

    let best = indel_ratio(&sect, &combined_ab)
        .max(indel_ratio(&sect, &combined_ba))
        .max(indel_ratio(&combined_ab, &combined_ba));
    best * 100.0
}

/// Drop markets whose normalized title contains any excluded keyword.
///
/// Keywords are matched as plain lowercase substrings. An empty keyword
/// list leaves every venue untouched.
pub fn filter_excluded(
    markets_by_venue: &mut BTreeMap<Platform, Vec<NormalizedMarket>>,
    exclude_keywords: &[String],
) {
    if exclude_keywords.is_empty() {
        return;
    }
    for markets in markets_by_venue.values_mut() {
        markets.retain(|m| !exclude_keywords.iter().any(|k| m.title.contains(k.as_str())));
    }
}

/// Group markets across venues that likely describe the same binary event.
///
/// Records are flattened in `BTreeMap` key order (venue declaration order),
/// keeping each venue's fetch order, then scanned greedily: every
/// unconsumed record anchors a group and absorbs later unconsumed records
/// whose venue is not yet represented in the group and whose title scores
/// at least `threshold` against the anchor's. Singleton groups are dropped
/// silently. O(n²) comparisons; cycle inputs are small.
///
/// Greedy single-pass grouping is order-dependent: a record matching two
/// later records that do not match each other ends up grouped with
/// whichever is scanned first. Acceptable for reproducible cycles.
pub fn match_markets(
    markets_by_venue: &BTreeMap<Platform, Vec<NormalizedMarket>>,
    threshold: u8,
) -> Vec<EventGroup> {
    let all: Vec<&NormalizedMarket> = markets_by_venue.values().flatten().collect();
    let threshold = f64::from(threshold.min(100));

    let mut used = vec![false; all.len()];
    let mut groups = Vec::new();

    for i in 0..all.len() {
        if used[i] {
            continue;
        }
        let anchor = all[i];
        let mut members = vec![anchor.clone()];
        used[i] = true;

        for j in (i + 1)..all.len() {
            if used[j] {
                continue;
            }
            let candidate = all[j];
            // One record per venue per group.
            if members.iter().any(|m| m.platform == candidate.platform) {
                continue;
            }
            if token_set_ratio(&anchor.title, &candidate.title) >= threshold {
                members.push(candidate.clone());
                used[j] = true;
            }
        }

        if members.len() >= 2 {
            groups.push(EventGroup { markets: members });
        }
    }

    debug!(
        "matched {} group(s) from {} market(s)",
        groups.len(),
        all.len()
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(platform: Platform, event_id: &str, title: &str) -> NormalizedMarket {
        NormalizedMarket {
            platform,
            event_id: event_id.to_string(),
            title: normalize_title(title),
            yes_price: Some(0.5),
            no_price: Some(0.5),
            liquidity_usd: None,
            url: None,
        }
    }

    #[test]
    fn test_normalize_strips_filler_and_punctuation() {
        assert_eq!(
            normalize_title("Will it rain tomorrow?"),
            "it rain tomorrow"
        );
        assert_eq!(normalize_title("Does the Fed cut rates?"), "fed cut rates");
    }

    #[test]
    fn test_normalize_expands_percent() {
        assert_eq!(
            normalize_title("Will BTC drop 20%?"),
            "btc drop 20 percent"
        );
    }

    #[test]
    fn test_normalize_is_not_word_boundary_aware() {
        // "the " inside "breathe in" gets stripped too. Known imprecision,
        // preserved for compatibility.
        assert_eq!(normalize_title("breathe in"), "breain");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_title("  a   b\t c  "), "a b c");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in [
            "Will it rain tomorrow?",
            "Does the Fed cut rates in March?",
            "BTC above $100k? 50% odds",
            "breathe in",
            "",
            "   ",
            "the the the",
        ] {
            let once = normalize_title(raw);
            assert_eq!(normalize_title(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_token_set_identical() {
        assert_eq!(token_set_ratio("it rain tomorrow", "it rain tomorrow"), 100.0);
    }

    #[test]
    fn test_token_set_ignores_word_order() {
        assert_eq!(token_set_ratio("rain tomorrow it", "it rain tomorrow"), 100.0);
    }

    #[test]
    fn test_token_set_ignores_duplicates() {
        assert_eq!(token_set_ratio("rain rain tomorrow", "rain tomorrow"), 100.0);
    }

    #[test]
    fn test_token_set_subset_scores_full() {
        // One side's tokens contained in the other's.
        assert_eq!(
            token_set_ratio("it rain tomorrow", "it rain tomorrow in london"),
            100.0
        );
    }

    #[test]
    fn test_token_set_disjoint_scores_low() {
        assert!(token_set_ratio("fed cut rates", "btc hits 100k") < 50.0);
    }

    #[test]
    fn test_token_set_empty_input() {
        assert_eq!(token_set_ratio("", "anything"), 0.0);
        assert_eq!(token_set_ratio("", ""), 0.0);
    }

    #[test]
    fn test_indel_ratio_partial() {
        // "abcd" vs "abed": LCS = 3 → 2*3/8 = 0.75
        assert!((indel_ratio("abcd", "abed") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_match_groups_across_venues() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![market(Platform::Polymarket, "p1", "Will it rain tomorrow?")],
        );
        by_venue.insert(
            Platform::Kalshi,
            vec![market(Platform::Kalshi, "k1", "It rain tomorrow")],
        );

        let groups = match_markets(&by_venue, 88);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_match_never_groups_same_venue() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![
                market(Platform::Polymarket, "p1", "fed cut rates in march"),
                market(Platform::Polymarket, "p2", "fed cut rates in march"),
            ],
        );
        by_venue.insert(
            Platform::Kalshi,
            vec![
                market(Platform::Kalshi, "k1", "fed cut rates in march"),
                market(Platform::Kalshi, "k2", "fed cut rates in march"),
            ],
        );

        let groups = match_markets(&by_venue, 88);
        for group in &groups {
            let mut venues: Vec<Platform> = group.markets.iter().map(|m| m.platform).collect();
            venues.sort();
            venues.dedup();
            assert_eq!(venues.len(), group.len(), "same-venue records in one group");
        }
    }

    #[test]
    fn test_match_drops_singletons() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![market(Platform::Polymarket, "p1", "a completely unique event")],
        );
        by_venue.insert(
            Platform::Kalshi,
            vec![market(Platform::Kalshi, "k1", "something else entirely now")],
        );

        assert!(match_markets(&by_venue, 88).is_empty());
    }

    #[test]
    fn test_match_is_deterministic() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![
                market(Platform::Polymarket, "p1", "fed cut rates in march"),
                market(Platform::Polymarket, "p2", "btc above 100k this year"),
            ],
        );
        by_venue.insert(
            Platform::Kalshi,
            vec![
                market(Platform::Kalshi, "k1", "btc above 100k this year"),
                market(Platform::Kalshi, "k2", "fed cut rates in march"),
            ],
        );

        let first = match_markets(&by_venue, 88);
        for _ in 0..5 {
            let again = match_markets(&by_venue, 88);
            assert_eq!(again.len(), first.len());
            for (a, b) in first.iter().zip(again.iter()) {
                let ids_a: Vec<&str> = a.markets.iter().map(|m| m.event_id.as_str()).collect();
                let ids_b: Vec<&str> = b.markets.iter().map(|m| m.event_id.as_str()).collect();
                assert_eq!(ids_a, ids_b);
            }
        }
    }

    #[test]
    fn test_filter_excluded_drops_matching_titles() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![
                market(Platform::Polymarket, "p1", "lakers win the nba finals"),
                market(Platform::Polymarket, "p2", "fed cut rates in march"),
            ],
        );
        by_venue.insert(
            Platform::Kalshi,
            vec![market(Platform::Kalshi, "k1", "nba mvp decided by june")],
        );

        filter_excluded(&mut by_venue, &["nba".to_string()]);
        let ids: Vec<&str> = by_venue
            .values()
            .flatten()
            .map(|m| m.event_id.as_str())
            .collect();
        assert_eq!(ids, vec!["p2"]);
    }

    #[test]
    fn test_filter_excluded_no_keywords_keeps_everything() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![market(Platform::Polymarket, "p1", "anything at all")],
        );
        filter_excluded(&mut by_venue, &[]);
        assert_eq!(by_venue[&Platform::Polymarket].len(), 1);
    }

    #[test]
    fn test_match_threshold_zero_groups_everything_cross_venue() {
        let mut by_venue = BTreeMap::new();
        by_venue.insert(
            Platform::Polymarket,
            vec![market(Platform::Polymarket, "p1", "alpha")],
        );
        by_venue.insert(Platform::Kalshi, vec![market(Platform::Kalshi, "k1", "beta")]);

        let groups = match_markets(&by_venue, 0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }
}
