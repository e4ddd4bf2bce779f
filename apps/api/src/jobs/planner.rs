//! Query planner: turns résumé keyword phrases into job-board queries.
//!
//! Phrases are split into single search terms (phrase boundaries are dropped),
//! then every combination of terms is emitted from the largest allowed size
//! down to single terms. Specific queries come first so that, at dedup time,
//! their postings are preferred when they arrive early.

use std::collections::HashSet;

/// Terms of this many characters or fewer are dropped ("go", "sql", "aws").
/// Short tokens return too many unrelated postings.
pub const MIN_TERM_CHARS: usize = 3;

/// Splits phrases on whitespace, lower-cases, keeps tokens longer than
/// [`MIN_TERM_CHARS`]. Duplicates collapse; first-seen order is kept.
pub fn search_terms<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for phrase in keywords {
        for token in phrase.as_ref().split_whitespace() {
            let token = token.to_lowercase();
            if token.chars().count() > MIN_TERM_CHARS && seen.insert(token.clone()) {
                terms.push(token);
            }
        }
    }
    terms
}

/// Plans the ordered query list for a keyword set.
///
/// Empty when no usable term survives filtering; the caller must then report
/// "no jobs" without contacting the provider.
pub fn plan_queries<S: AsRef<str>>(keywords: &[S], max_combo_size: usize) -> Vec<String> {
    let terms = search_terms(keywords);
    if terms.is_empty() || max_combo_size == 0 {
        return Vec::new();
    }

    let largest = max_combo_size.min(terms.len());
    let mut queries = Vec::new();
    for size in (1..=largest).rev() {
        for combo in combinations(terms.len(), size) {
            let query = combo
                .iter()
                .map(|&i| terms[i].as_str())
                .collect::<Vec<_>>()
                .join(" ");
            queries.push(query);
        }
    }
    queries
}

/// All `k`-subsets of `0..n` as ascending index lists, in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.clone());

        // Rightmost index that can still move forward.
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if indices[i] < n - k + i {
                break;
            }
        }
        indices[i] += 1;
        for j in (i + 1)..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
