//! Rabin-Karp exact-line search: hash the query once, then compare it
//! against each same-length line's polynomial hash, confirming a hash hit
//! with a byte comparison. Mirrors `fsearch/algorithms.py::rabin_karp`
//! (base 256, prime 101) but operates per-line rather than sliding a
//! window across the whole file, since a line-terminated match is all
//! the exact-line contract ever needs.

const BASE: u64 = 256;
const PRIME: u64 = 101;

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut h = 0u64;
    for &b in bytes {
        h = (BASE * h + b as u64) % PRIME;
    }
    h
}

pub fn exists(lines: &[String], query: &str) -> bool {
    let q = query.as_bytes();
    let qh = hash_bytes(q);

    lines.iter().any(|line| {
        let l = line.as_bytes();
        l.len() == q.len() && hash_bytes(l) == qh && l == q
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
    fn hash_collision_still_confirmed_by_byte_compare() {
        // same length, different bytes: relies on the confirmation step,
        // not the hash alone, to avoid a false positive.
        let lines = vec!["ab".to_string()];
        assert!(!exists(&lines, "ba"));
    }

    #[test]
    fn empty_query_matches_empty_line() {
        let lines = vec!["".to_string()];
        assert!(exists(&lines, ""));
        assert!(!exists(&Vec::<String>::new(), ""));
    }
}
