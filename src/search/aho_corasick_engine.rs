//! Aho-Corasick exact-line search. Builds a single-pattern automaton from
//! the query and runs it against each same-length line, accepting only a
//! match that starts at offset 0 and spans the whole line — mirroring
//! `fsearch/algorithms.py::AhoCorasick.search`'s whole-line check, but
//! built on the `aho-corasick` crate rather than a hand-rolled trie.

use aho_corasick::AhoCorasick;

pub fn exists(lines: &[String], query: &str) -> bool {
    if query.is_empty() {
        return lines.iter().any(|l| l.is_empty());
    }

    let ac = match AhoCorasick::new([query]) {
        Ok(ac) => ac,
        Err(_) => return false,
    };

    lines.iter().any(|line| {
        if line.len() != query.len() {
            return false;
        }
        ac.find(line.as_str())
            .map(|m| m.start() == 0 && m.end() == line.len())
            .unwrap_or(false)
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
    fn same_length_different_content_does_not_match() {
        let lines = vec!["abcde".to_string()];
        assert!(!exists(&lines, "xyzzy"));
    }
}
