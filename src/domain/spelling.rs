//! Spelling correction against the live listings corpus.
//!
//! A token is only corrected when nothing in the corpus validates it: exact
//! membership, substring overlap in either direction, and known sub-words all
//! short-circuit to "leave it alone". Correction proper is nearest-neighbor
//! matching on a string-similarity ratio, whole-token first, then per-word
//! for multi-word tokens.

use strsim::normalized_levenshtein;

/// Default similarity cutoff for accepting a correction candidate.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Maximum number of whole-token candidates kept as suggestions.
const MAX_CANDIDATES: usize = 3;

/// Minimum sub-word length considered for validation or correction.
const MIN_WORD_LEN: usize = 3;

/// Seed terms pulled from the listings store to build a [`SearchCorpus`].
#[derive(Debug, Clone, Default)]
pub struct CorpusSeed {
    pub categories: Vec<String>,
    pub cities: Vec<String>,
    pub names: Vec<String>,
}

/// The set of lowercase terms a query token is checked against: category
/// names, city names, and business names plus each name's first word when
/// longer than 2 characters.
///
/// Derived from current store contents; correctness depends only on what the
/// store holds right now, not on any mutation feed.
#[derive(Debug, Clone, Default)]
pub struct SearchCorpus {
    terms: Vec<String>,
}

impl SearchCorpus {
    /// Builds the corpus from store seed terms.
    pub fn from_seed(seed: &CorpusSeed) -> Self {
        let mut terms: Vec<String> = Vec::new();

        for category in &seed.categories {
            push_term(&mut terms, category);
        }
        for city in &seed.cities {
            push_term(&mut terms, city);
        }
        for name in &seed.names {
            let name_lower = name.trim().to_lowercase();
            if name_lower.is_empty() {
                continue;
            }
            push_term(&mut terms, &name_lower);
            if let Some(first_word) = name_lower.split_whitespace().next() {
                if first_word.len() > 2 {
                    push_term(&mut terms, first_word);
                }
            }
        }

        terms.sort();
        terms.dedup();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).is_ok()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

fn push_term(terms: &mut Vec<String>, raw: &str) {
    let t = raw.trim().to_lowercase();
    if !t.is_empty() {
        terms.push(t);
    }
}

/// Outcome of a correction attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    /// The token to search with (original or corrected).
    pub result: String,
    /// True iff a correction was applied.
    pub was_corrected: bool,
    /// Close-match candidates, best first; empty when nothing was corrected.
    pub suggestions: Vec<String>,
}

impl Correction {
    fn unchanged(token: &str) -> Self {
        Self {
            result: token.to_string(),
            was_corrected: false,
            suggestions: Vec::new(),
        }
    }
}

/// Corrects a keyword or location token against the corpus.
///
/// Precedence, first hit wins:
/// 1. exact corpus member - unchanged
/// 2. substring of a term, or a term is a substring of it - unchanged
/// 3. any sub-word (len >= 3) is a corpus member - unchanged
/// 4. whole-token nearest neighbors at or above `threshold` - best candidate
/// 5. per-word nearest neighbor for multi-word tokens - recombined
/// 6. otherwise unchanged
pub fn correct(token: &str, corpus: &SearchCorpus, threshold: f64) -> Correction {
    let token_lower = token.to_lowercase();
    let token_lower = token_lower.trim();

    if corpus.is_empty() {
        return Correction::unchanged(token);
    }

    if corpus.contains(token_lower) {
        return Correction::unchanged(token);
    }

    // A partial match in either direction means the token is already a valid
    // search term, not a misspelling.
    if corpus
        .terms()
        .iter()
        .any(|term| term.contains(token_lower) || token_lower.contains(term.as_str()))
    {
        return Correction::unchanged(token);
    }

    // One known word is enough to trust the whole token.
    if token_lower
        .split_whitespace()
        .any(|word| word.len() >= MIN_WORD_LEN && corpus.contains(word))
    {
        return Correction::unchanged(token);
    }

    // Whole-token nearest neighbors.
    let candidates = close_matches(token_lower, corpus, MAX_CANDIDATES, threshold);
    if let Some(best) = candidates.first() {
        return Correction {
            result: match_case(token, best),
            was_corrected: true,
            suggestions: candidates.clone(),
        };
    }

    // Per-word fallback for multi-word tokens.
    let words: Vec<&str> = token_lower.split_whitespace().collect();
    if words.len() > 1 {
        let mut corrected_words: Vec<String> = Vec::with_capacity(words.len());
        let mut any_corrected = false;

        for word in &words {
            if word.len() < MIN_WORD_LEN {
                corrected_words.push((*word).to_string());
                continue;
            }
            if corpus.terms().iter().any(|term| term.contains(*word)) {
                corrected_words.push((*word).to_string());
                continue;
            }
            match close_matches(word, corpus, 1, threshold).into_iter().next() {
                Some(replacement) => {
                    corrected_words.push(replacement);
                    any_corrected = true;
                }
                None => corrected_words.push((*word).to_string()),
            }
        }

        if any_corrected {
            let recombined = match_case(token, &corrected_words.join(" "));
            return Correction {
                result: recombined.clone(),
                was_corrected: true,
                suggestions: vec![recombined],
            };
        }
    }

    Correction::unchanged(token)
}

/// Corpus terms within `threshold` similarity of `target`, best first,
/// at most `limit` of them.
fn close_matches(target: &str, corpus: &SearchCorpus, limit: usize, threshold: f64) -> Vec<String> {
    let mut scored: Vec<(f64, &String)> = corpus
        .terms()
        .iter()
        .map(|term| (normalized_levenshtein(target, term), term))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    // Stable by corpus order for equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, t)| t.clone()).collect()
}

/// Title-cases the candidate when the original token began uppercase.
fn match_case(original: &str, candidate: &str) -> String {
    let starts_upper = original.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    if !starts_upper {
        return candidate.to_string();
    }
    candidate
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
