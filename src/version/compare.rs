//! Qualifier-aware version comparison
//!
//! Repository version strings are not reliably semver (`1.0-beta2`,
//! `2.0.M1`, `1_0_3`, `v4.2`), so ordering is segment-wise with an
//! explicit qualifier priority table instead of a strict semver parse.

use std::cmp::Ordering;

/// Known qualifiers from oldest to newest. Matched by case-insensitive
/// prefix, so `rc1`/`RC2` rank as `rc`. Unrecognized qualifiers rank
/// after all of these, lexically among themselves.
const QUALIFIER_ORDER: &[&str] = &["alpha", "beta", "milestone", "rc", "release", "final", "ga"];

/// Orders two version strings.
///
/// One leading `v` is stripped, then both strings are split on `.`, `-`
/// and `_` and compared segment by segment: numeric segments compare as
/// integers and rank newer than any qualifier; recognized qualifiers
/// rank by the priority table; unrecognized qualifiers rank after every
/// recognized one and compare case-insensitively lexically among
/// themselves. When one sequence is a strict prefix of the other, a
/// trailing numeric segment extends the release (`1.2.1 > 1.2`) while a
/// trailing qualifier marks a pre-release of it (`1.0-beta < 1.0`).
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = a.strip_prefix('v').unwrap_or(a);
    let b = b.strip_prefix('v').unwrap_or(b);

    let segments_a: Vec<&str> = split_segments(a);
    let segments_b: Vec<&str> = split_segments(b);

    for (seg_a, seg_b) in segments_a.iter().zip(segments_b.iter()) {
        let ord = compare_segment(seg_a, seg_b);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match segments_a.len().cmp(&segments_b.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => extra_segment_rank(segments_a[segments_b.len()]),
        Ordering::Less => extra_segment_rank(segments_b[segments_a.len()]).reverse(),
    }
}

/// Rank of the longer sequence's first extra segment against the bare
/// shorter version.
fn extra_segment_rank(segment: &str) -> Ordering {
    if parse_numeric(segment).is_some() {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

fn split_segments(version: &str) -> Vec<&str> {
    version.split(['.', '-', '_']).collect()
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (parse_numeric(a), parse_numeric(b)) {
        (Some(num_a), Some(num_b)) => num_a.cmp(&num_b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => compare_qualifiers(a, b),
    }
}

fn parse_numeric(segment: &str) -> Option<u128> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let rank = |qualifier: &str| {
        let lowered = qualifier.to_lowercase();
        QUALIFIER_ORDER
            .iter()
            .position(|known| lowered.starts_with(known))
    };

    // Stratified so the order stays transitive: recognized qualifiers
    // sort by the table and always before unrecognized ones; lexical
    // comparison only applies within the unrecognized class.
    match (rank(a), rank(b)) {
        (Some(rank_a), Some(rank_b)) => rank_a.cmp(&rank_b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// True when the version is not tagged as a snapshot or pre-release.
pub fn is_stable(version: &str) -> bool {
    !version.contains("SNAPSHOT") && !version.contains("beta") && !version.contains("alpha")
}

/// Picks the highest-ranked candidate.
///
/// With `prefer_stable`, snapshot/pre-release candidates are filtered out
/// first; when nothing stable remains, the overall maximum is returned
/// rather than nothing.
pub fn pick_latest(versions: &[String], prefer_stable: bool) -> Option<String> {
    if prefer_stable {
        let best_stable = versions
            .iter()
            .filter(|v| is_stable(v))
            .max_by(|a, b| compare(a, b));
        if let Some(best) = best_stable {
            return Some(best.clone());
        }
    }
    versions.iter().max_by(|a, b| compare(a, b)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.0", "1.2", Ordering::Greater)] // longer sequence wins a tie
    #[case("1.2", "1.2.1", Ordering::Less)]
    #[case("1.0-beta", "1.0", Ordering::Less)] // trailing qualifier is a pre-release
    #[case("1.0", "1.0-rc1", Ordering::Greater)]
    #[case("2.0-rc1", "2.0", Ordering::Less)]
    #[case("2.0-rc", "2.0-beta", Ordering::Greater)]
    #[case("2.0-alpha", "2.0-beta", Ordering::Less)]
    #[case("1.0-milestone", "1.0-rc", Ordering::Less)]
    #[case("1.0-final", "1.0-ga", Ordering::Less)]
    #[case("1.0-RC1", "1.0-rc2", Ordering::Equal)] // prefix table match ignores the tail
    #[case("10.0.0", "9.0.0", Ordering::Greater)] // integer, not lexical
    #[case("v1.2.3", "1.2.3", Ordering::Equal)] // leading v stripped
    #[case("1_2_3", "1.2.3", Ordering::Equal)] // underscores split like dots
    #[case("1-2-3", "1.2.3", Ordering::Equal)]
    #[case("1.0.0", "1.0.0", Ordering::Equal)]
    #[case("1.0-customtag", "1.0-othertag", Ordering::Less)] // lexical within the unrecognized class
    #[case("1.0-ga", "1.0-customtag", Ordering::Less)] // recognized sorts before unrecognized
    fn compare_orders_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(a, b), expected);
    }

    #[test]
    fn compare_qualifier_classes_do_not_cycle() {
        // milestone < final by the table, final < foo by class, so
        // milestone < foo must hold too.
        assert_eq!(compare("1.0-milestone", "1.0-final"), Ordering::Less);
        assert_eq!(compare("1.0-final", "1.0-foo"), Ordering::Less);
        assert_eq!(compare("1.0-milestone", "1.0-foo"), Ordering::Less);
    }

    #[test]
    fn pick_latest_prefers_release_over_release_candidate() {
        let versions: Vec<String> = ["2.0-rc1", "2.0", "1.9"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_latest(&versions, true), Some("2.0".to_string()));
    }

    #[rstest]
    #[case("1.2.3", "1.2.4")]
    #[case("1.0-beta", "1.0")]
    #[case("2.0-rc", "2.0-beta")]
    #[case("1.0-customtag", "1.0-rc")]
    #[case("v2", "1.9.9")]
    fn compare_is_antisymmetric(#[case] a: &str, #[case] b: &str) {
        assert_eq!(compare(a, b), compare(b, a).reverse());
    }

    #[rstest]
    #[case("1.2.3")]
    #[case("1.0-beta")]
    #[case("v1.0.0")]
    #[case("weird_version-tag")]
    #[case("")]
    fn compare_is_reflexive(#[case] version: &str) {
        assert_eq!(compare(version, version), Ordering::Equal);
    }

    #[rstest]
    #[case("1.0.0", true)]
    #[case("1.0.0-SNAPSHOT", false)]
    #[case("1.0.0-beta2", false)]
    #[case("2.0-alpha", false)]
    #[case("1.0-rc1", true)] // rc is not filtered, only snapshot/beta/alpha
    fn is_stable_rejects_prerelease_markers(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_stable(version), expected);
    }

    #[test]
    fn pick_latest_prefers_highest_stable() {
        let versions: Vec<String> = ["1.0.0", "1.2.0", "1.1.0-beta", "1.3.0-SNAPSHOT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_latest(&versions, true), Some("1.2.0".to_string()));
    }

    #[test]
    fn pick_latest_falls_back_to_overall_max_when_nothing_stable() {
        let versions: Vec<String> = ["1.0.0-beta", "1.1.0-alpha"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_latest(&versions, true), Some("1.1.0-alpha".to_string()));
    }

    #[test]
    fn pick_latest_without_preference_takes_overall_max() {
        let versions: Vec<String> = ["1.0.0", "1.3.0-SNAPSHOT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_latest(&versions, false), Some("1.3.0-SNAPSHOT".to_string()));
    }

    #[test]
    fn pick_latest_returns_none_for_empty_input() {
        assert_eq!(pick_latest(&[], true), None);
    }
}
