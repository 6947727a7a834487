//! Naive exact-line search: split the corpus on lines, compare each one
//! byte-for-byte. Asymptotically the cheapest member of the family (spec
//! §9, "Open question — regex as default"), kept as the baseline the other
//! four algorithms are checked against.

pub fn exists(lines: &[String], query: &str) -> bool {
    lines.iter().any(|line| line == query)
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
}
