//! Regex-based exact-line search: anchor the escaped query between `^` and
//! `$` under multiline mode, mirroring `fsearch/algorithms.py::regex_search`
//! (`re.compile(f"^{re.escape(pattern)}$", re.MULTILINE)`). This is the
//! shipped default (spec §9) despite being the most expensive member of the
//! family: parity with the source's runtime behavior wins over raw
//! throughput.

use regex::RegexBuilder;

pub fn exists(lines: &[String], query: &str) -> bool {
    // A corpus of zero lines has no line to match, but `lines.join("\n")`
    // collapses both "no lines" and "one empty line" to the same "" text;
    // disambiguate before reconstructing the joined text.
    if lines.is_empty() {
        return false;
    }
    // A query can never equal a line if it embeds a newline itself: no
    // single line (split on '\n') can itself contain one. The joined-text
    // reconstruction below would otherwise let a literal '\n' in the
    // pattern straddle two real lines and falsely match.
    if query.contains('\n') {
        return false;
    }

    let text = lines.join("\n");
    let pattern = format!("^{}$", regex::escape(query));
    let re = match RegexBuilder::new(&pattern).multi_line(true).build() {
        Ok(re) => re,
        Err(_) => return false,
    };
    re.is_match(&text)
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
    fn metacharacters_are_escaped() {
        let lines = vec!["a.b*c".to_string()];
        assert!(exists(&lines, "a.b*c"));
        assert!(!exists(&lines, "axbyc"));
    }

    #[test]
    fn empty_query_matches_empty_line() {
        let lines = vec!["".to_string()];
        assert!(exists(&lines, ""));
        assert!(!exists(&Vec::<String>::new(), ""));
    }

    #[test]
    fn embedded_newline_in_query_cannot_match() {
        let lines = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        assert!(!exists(&lines, "alpha\nbeta"));
    }
}
