//! Multi-command split
//!
//! An utterance is cut on the conjunction marker ("aur", "और", "and") at
//! word boundaries, so "chandan" or "Anand" stay whole.

use unicode_segmentation::UnicodeSegmentation;

const CONJUNCTIONS: &[&str] = &["aur", "और", "and"];

/// Independent clauses in spoken order, trimmed, empty ones dropped
pub fn split_clauses(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut start = 0;

    for (offset, word) in text.split_word_bound_indices() {
        if is_conjunction(word) {
            push_clause(&mut clauses, &text[start..offset]);
            start = offset + word.len();
        }
    }
    push_clause(&mut clauses, &text[start..]);

    clauses
}

fn is_conjunction(word: &str) -> bool {
    CONJUNCTIONS.iter().any(|c| c.eq_ignore_ascii_case(word))
}

fn push_clause(clauses: &mut Vec<String>, clause: &str) {
    let clause = clause.trim().trim_matches(|c: char| c == ',' || c == '.');
    let clause = clause.trim();
    if !clause.is_empty() {
        clauses.push(clause.to_string());
    }
}
