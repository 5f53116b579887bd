//! Fuzzy comparison between a guessed team name and the canonical one.

/// Case-insensitive similarity score in `0..=100`.
///
/// The score is the normalized indel similarity: twice the length of the
/// longest common subsequence over the combined length, rounded to the
/// nearest integer. Two empty strings are identical.
pub fn ratio(guess: &str, actual: &str) -> u8 {
    let a: Vec<char> = guess.to_lowercase().chars().collect();
    let b: Vec<char> = actual.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = lcs_len(&a, &b);
    let score = (200 * lcs + total / 2) / total;
    // lcs <= min(len) so score <= 100.
    score.min(100) as u8
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut row = vec![0usize; short.len() + 1];
    for &x in long {
        for (j, &y) in short.iter().enumerate() {
            row[j + 1] = if x == y {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_names_score_100() {
        assert_eq!(ratio("Robowranglers", "robowranglers"), 100);
        assert_eq!(ratio("", ""), 100);
    }

    #[test]
    fn disjoint_names_score_0() {
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", "Orbit"), 0);
    }

    #[test]
    fn partial_matches() {
        // lcs("cheesy", "the cheesy poofs") = 6, total 22 -> 54.55 -> 55
        assert_eq!(ratio("cheesy", "The Cheesy Poofs"), 55);
        // lcs = 3, total 8
        assert_eq!(ratio("abcd", "abdc"), 75);
        assert!(ratio("robowrangler", "Robowranglers") > 60);
    }

    proptest! {
        #[test]
        fn symmetric_and_bounded(a in "[a-zA-Z ]{0,20}", b in "[a-zA-Z ]{0,20}") {
            let forward = ratio(&a, &b);
            prop_assert_eq!(forward, ratio(&b, &a));
            prop_assert!(forward <= 100);
            prop_assert_eq!(ratio(&a, &a.to_uppercase()), 100);
        }
    }
}
