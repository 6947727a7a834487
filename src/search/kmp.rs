//! Knuth-Morris-Pratt exact-line search. Computes the pattern's LPS
//! (longest proper prefix that is also a suffix) table once, then tests
//! it against each same-length line; a full KMP scan over a line is
//! equivalent to a single exact-match probe once lengths are pre-filtered,
//! but the LPS machinery is kept explicit to mirror
//! `fsearch/utils.py::compute_lps` / `fsearch/algorithms.py::kmp_search`.

fn compute_lps(pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let mut lps = vec![0usize; m];
    let mut length = 0usize;
    let mut i = 1usize;
    while i < m {
        if pattern[i] == pattern[length] {
            length += 1;
            lps[i] = length;
            i += 1;
        } else if length != 0 {
            length = lps[length - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

fn kmp_matches_whole(text: &[u8], pattern: &[u8], lps: &[usize]) -> bool {
    if pattern.is_empty() {
        return text.is_empty();
    }
    let (n, m) = (text.len(), pattern.len());
    let mut i = 0usize;
    let mut j = 0usize;
    while i < n {
        if pattern[j] == text[i] {
            i += 1;
            j += 1;
        }
        if j == m {
            return i == m && n == m; // whole-line match requires equal length
        } else if i < n && pattern[j] != text[i] {
            if j != 0 {
                j = lps[j - 1];
            } else {
                i += 1;
            }
        }
    }
    false
}

pub fn exists(lines: &[String], query: &str) -> bool {
    let pattern = query.as_bytes();
    let lps = compute_lps(pattern);

    lines.iter().any(|line| {
        let text = line.as_bytes();
        text.len() == pattern.len() && kmp_matches_whole(text, pattern, &lps)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_line_only() {
        let lines = vec!["alpha".to_string(), "beta".to_string()];
        assert!(exists(&lines, "beta"));
        assert!(!exists(&lines, "bet"));
    }

    #[test]
    fn empty_query_matches_empty_line() {
        let lines = vec!["".to_string()];
        assert!(exists(&lines, ""));
        assert!(!exists(&Vec::<String>::new(), ""));
    }

    #[test]
    fn repeating_pattern_lps_handled_correctly() {
        let lines = vec!["ababab".to_string()];
        assert!(exists(&lines, "ababab"));
        assert!(!exists(&lines, "ababa"));
    }
}
