// Character-level fuzzy string ratios.
//
// `ratio` is the normalized indel similarity: 2 * LCS / (len_a + len_b).
// It is what username comparison uses. `partial_ratio` slides the shorter
// string across the longer one and keeps the best `ratio`, so a bio that is
// contained in another bio still scores 1.0. Bio comparison falls back to it
// when embeddings are unavailable.

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Single rolling row over `b`
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Normalized indel similarity between two strings, 0.0 to 1.0.
///
/// Two empty strings are identical (1.0). Callers that treat empty input as
/// "no signal" must check for it first.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best `ratio` of the shorter string against any equally long window of the
/// longer one, including windows that hang off either edge.
///
/// Returns 0.0 if either string is empty.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0.0;
    }

    let n = short.len();
    let mut best = 0.0_f64;

    // Full-width windows
    for start in 0..=(long.len() - n) {
        best = best.max(ratio_chars(&short, &long[start..start + n]));
        if best >= 1.0 {
            return 1.0;
        }
    }

    // Windows clipped at the left and right edges
    for k in 1..n.min(long.len() + 1) {
        best = best.max(ratio_chars(&short, &long[..k]));
        best = best.max(ratio_chars(&short, &long[long.len() - k..]));
    }

    best.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_identical() {
        assert!((ratio("alice", "alice") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_one_insertion() {
        // LCS 5, total length 11
        let r = ratio("alice", "alice1");
        assert!((r - 10.0 / 11.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn test_ratio_disjoint() {
        assert!(ratio("abc", "xyz").abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_is_symmetric() {
        let ab = ratio("tanmaybodas", "tanmay_bodas");
        let ba = ratio("tanmay_bodas", "tanmaybodas");
        assert!((ab - ba).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_counts_chars_not_bytes() {
        // Each accented letter is one char
        let r = ratio("café", "cafe");
        assert!((r - 0.75).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn test_partial_ratio_substring() {
        let r = partial_ratio("love cats", "I love cats and dogs");
        assert!((r - 1.0).abs() < f64::EPSILON, "got {r}");
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "anything"), 0.0);
        assert_eq!(partial_ratio("anything", ""), 0.0);
    }

    #[test]
    fn test_partial_ratio_beats_ratio_on_contained_text() {
        let a = "photographer";
        let b = "photographer based in Lisbon";
        assert!((partial_ratio(a, b) - 1.0).abs() < f64::EPSILON);
        assert!(ratio(a, b) < 0.7);
    }

    #[test]
    fn test_partial_ratio_is_symmetric() {
        let ab = partial_ratio("rust dev", "rust developer in berlin");
        let ba = partial_ratio("rust developer in berlin", "rust dev");
        assert!((ab - ba).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_ratio_case_sensitive() {
        assert!(partial_ratio("CATS", "cats") < 1.0);
    }
}
