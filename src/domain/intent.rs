//! Intent classification.
//!
//! Maps a raw utterance to a coarse intent with an ordered substring rule
//! cascade. Phrase sets overlap (the word "business" appears in several of
//! them), so the priority order of the table is load-bearing: an utterance
//! matching both a search phrase and an update phrase resolves to search.

use once_cell::sync::Lazy;

/// Coarse category assigned to a free-text utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Search,
    Show,
    Update,
    Add,
    General,
}

/// Ordered rule table, evaluated first-match-wins.
static RULES: Lazy<Vec<(Intent, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Intent::Greeting,
            vec![
                "hi",
                "hello",
                "hey",
                "good morning",
                "good afternoon",
                "good evening",
                "howdy",
                "hola",
                "greetings",
                "sup",
                "what's up",
                "yo",
                "namaste",
            ],
        ),
        (
            Intent::Search,
            vec![
                "search for",
                "find a",
                "looking for",
                "need a",
                "want a",
                "search",
                "find",
                "looking",
                "recommend",
                "suggest",
                "near me",
                "best",
                "top",
                "where can i find",
            ],
        ),
        (
            Intent::Show,
            vec![
                "show my business",
                "view my business",
                "display business",
                "get my business",
                "my business details",
                "business info",
            ],
        ),
        (
            Intent::Update,
            vec![
                "update my business",
                "edit details",
                "change my business",
                "modify business",
                "update business",
                "edit business",
                "change details",
                "update details",
                "edit my business",
                "modify my business",
                "fix my business",
                "correct details",
            ],
        ),
        (
            Intent::Add,
            vec![
                "add business",
                "register my business",
                "create business",
                "new business",
                "add my business",
                "register business",
                "list my business",
                "add a business",
                "register a business",
                "add new business",
                "create new business",
            ],
        ),
    ]
});

/// Phrases stripped from a search-intent utterance to recover the query,
/// applied in this order as substring removal.
static SEARCH_PHRASE_STRIP: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "search for",
        "find a",
        "looking for",
        "need a",
        "want a",
        "search",
        "find",
        "looking",
        "recommend",
        "suggest",
        "where can i find",
        "best",
        "top",
        "near me",
    ]
});

/// Classifies an utterance into an [`Intent`].
pub fn classify(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    let lowered = lowered.trim();

    for (intent, phrases) in RULES.iter() {
        if phrases.iter().any(|p| lowered.contains(p)) {
            return *intent;
        }
    }

    Intent::General
}

/// Strips search-intent phrasing from an utterance, leaving the query itself.
///
/// "find a restaurant near me" becomes "restaurant". Removal is plain
/// substring deletion over the fixed phrase list, then whitespace collapse;
/// this is distinct from the query parser's token-bounded stop-word removal.
pub fn strip_search_phrases(text: &str) -> String {
    let mut query = text.to_lowercase().trim().to_string();
    for phrase in SEARCH_PHRASE_STRIP.iter() {
        query = query.replace(phrase, "");
    }
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_wins_over_everything() {
        assert_eq!(classify("hello, update my business"), Intent::Greeting);
    }

    #[test]
    fn search_beats_show_on_overlap() {
        // Contains both a search phrase and a show phrase; priority order
        // must resolve it to search.
        assert_eq!(classify("search my business info"), Intent::Search);
    }

    #[test]
    fn search_beats_update_on_overlap() {
        assert_eq!(classify("find and update my business"), Intent::Search);
    }

    #[test]
    fn show_intent_detected() {
        assert_eq!(classify("please show my business"), Intent::Show);
    }

    #[test]
    fn update_intent_detected() {
        assert_eq!(classify("I want to edit my business"), Intent::Update);
    }

    #[test]
    fn add_intent_detected() {
        assert_eq!(classify("register a business"), Intent::Add);
    }

    #[test]
    fn unmatched_text_is_general() {
        assert_eq!(classify("pizza mumbai"), Intent::General);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("SHOW MY BUSINESS"), Intent::Show);
    }

    #[test]
    fn strip_search_phrases_leaves_query() {
        assert_eq!(strip_search_phrases("find a restaurant near me"), "restaurant");
        assert_eq!(strip_search_phrases("search for salons"), "salons");
    }

    #[test]
    fn strip_search_phrases_can_leave_nothing() {
        assert_eq!(strip_search_phrases("search"), "");
    }
}
