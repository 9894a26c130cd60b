//! Name resolution with fuzzy suggestions.
//!
//! Candidates are `(id, name)` pairs. A player may name a thing by its id or
//! by its display name in any case; near misses only ever produce a
//! suggestion, never a match.

use strsim::jaro_winkler;

/// Minimum similarity score for a suggestion (0.0-1.0).
const FUZZY_THRESHOLD: f64 = 0.8;

/// Resolve input to a candidate id: exact id first, then display name
/// compared case-insensitively.
pub fn resolve<'a>(candidates: &[(&'a str, &'a str)], input: &str) -> Option<&'a str> {
    let input = input.trim();
    if let Some((id, _)) = candidates.iter().find(|(id, _)| *id == input) {
        return Some(*id);
    }
    let input_lower = input.to_lowercase();
    candidates
        .iter()
        .find(|(_, name)| name.to_lowercase() == input_lower)
        .map(|(id, _)| *id)
}

/// Candidate names similar to the input, best first.
pub fn fuzzy_match<'a>(
    candidates: &[(&'a str, &'a str)],
    input: &str,
    threshold: f64,
) -> Vec<(&'a str, f64)> {
    let input_lower = input.trim().to_lowercase();
    let mut matches: Vec<(&'a str, f64)> = candidates
        .iter()
        .filter_map(|(_, name)| {
            let score = jaro_winkler(&input_lower, &name.to_lowercase());
            (score >= threshold).then_some((*name, score))
        })
        .collect();

    matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

/// The closest candidate name, if any is close enough.
pub fn suggest<'a>(candidates: &[(&'a str, &'a str)], input: &str) -> Option<&'a str> {
    fuzzy_match(candidates, input, FUZZY_THRESHOLD)
        .first()
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: [(&str, &str); 3] = [
        ("šálek-čaje", "Šálek čaje"),
        ("babička", "Babička"),
        ("stůl", "Stůl"),
    ];

    #[test]
    fn resolves_by_id() {
        assert_eq!(resolve(&CANDIDATES, "šálek-čaje"), Some("šálek-čaje"));
    }

    #[test]
    fn resolves_by_name_case_insensitive() {
        assert_eq!(resolve(&CANDIDATES, "ŠÁLEK ČAJE"), Some("šálek-čaje"));
        assert_eq!(resolve(&CANDIDATES, " babička "), Some("babička"));
    }

    #[test]
    fn near_miss_is_not_a_match() {
        assert_eq!(resolve(&CANDIDATES, "Babicka"), None);
        assert_eq!(suggest(&CANDIDATES, "Babicka"), Some("Babička"));
    }

    #[test]
    fn nothing_close() {
        assert_eq!(resolve(&CANDIDATES, "deštník"), None);
        assert_eq!(suggest(&CANDIDATES, "deštník"), None);
    }

    #[test]
    fn matches_sorted_by_score() {
        let matches = fuzzy_match(&CANDIDATES, "Stul", 0.0);
        assert_eq!(matches[0].0, "Stůl");
        assert!(matches.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
