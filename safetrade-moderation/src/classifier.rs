/// Keyword classifier for listing text.
///
/// Two independent word lists are checked: a banned-goods list and a
/// profanity list. Either one matching flags the listing. Both are plain
/// case-folded substring checks; the lists are fixed at construction and
/// injected wherever a verdict is needed.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    banned_words: Vec<String>,
    profanity: Vec<String>,
}

impl ContentClassifier {
    pub fn new(banned_words: Vec<String>, profanity: Vec<String>) -> Self {
        Self {
            banned_words: normalize(banned_words),
            profanity: normalize(profanity),
        }
    }

    /// Verdict for a listing: true means dangerous.
    pub fn is_dangerous(&self, name: &str, description: &str) -> bool {
        let haystack = format!("{name} {description}").to_lowercase();
        self.matches_banned_word(&haystack) || self.matches_profanity(&haystack)
    }

    fn matches_banned_word(&self, haystack: &str) -> bool {
        self.banned_words.iter().any(|w| haystack.contains(w.as_str()))
    }

    fn matches_profanity(&self, haystack: &str) -> bool {
        self.profanity.iter().any(|w| haystack.contains(w.as_str()))
    }
}

fn normalize(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ContentClassifier {
        ContentClassifier::new(
            vec!["drug".into(), "weapon".into(), "stolen".into()],
            vec!["damn".into()],
        )
    }

    #[test]
    fn banned_word_in_name_flags_listing() {
        assert!(classifier().is_dangerous("drug paraphernalia", "glass pipes and grinders"));
    }

    #[test]
    fn banned_word_in_description_flags_listing() {
        assert!(classifier().is_dangerous("mystery box", "contains a stolen phone"));
    }

    #[test]
    fn match_is_case_insensitive() {
        assert!(classifier().is_dangerous("WEAPON replica", ""));
        let upper = ContentClassifier::new(vec!["DRUG".into()], vec![]);
        assert!(upper.is_dangerous("drug test kit", ""));
    }

    #[test]
    fn profanity_alone_flags_listing() {
        assert!(classifier().is_dangerous("old bike", "damn good condition"));
    }

    #[test]
    fn clean_listing_passes() {
        assert!(!classifier().is_dangerous("wooden chair", "hand-carved oak, barely used"));
    }

    #[test]
    fn empty_lists_flag_nothing() {
        let open = ContentClassifier::new(vec![], vec![]);
        assert!(!open.is_dangerous("drug paraphernalia", "damn"));
    }

    #[test]
    fn whitespace_entries_are_dropped() {
        let sloppy = ContentClassifier::new(vec!["  ".into(), " drug ".into()], vec![String::new()]);
        assert!(sloppy.is_dangerous("drugstore find", ""));
        assert!(!sloppy.is_dangerous("everything else", "totally fine"));
    }
}
