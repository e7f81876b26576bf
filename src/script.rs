//! The reference script a speaker reads from.

/// An ordered, immutable sequence of script words.
///
/// Built once per session by whitespace-splitting the input text. An empty
/// input yields an empty script, which is a valid degenerate case (the
/// tracker treats it as already complete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    words: Vec<String>,
}

impl Script {
    /// Builds a script from raw text, splitting on whitespace.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Number of words in the script.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true for the empty degenerate script.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The word at `index`, if in range.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// All words in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Builds the JSGF grammar hint handed to the recognition engine.
    ///
    /// A single-category grammar listing the script's vocabulary. Purely an
    /// optimization hint for the recognizer's language model; platform
    /// support is inconsistent and the tracker must still tolerate words
    /// outside it.
    pub fn grammar_hint(&self) -> Option<String> {
        if self.words.is_empty() {
            return None;
        }
        Some(format!(
            "#JSGF V1.0; grammar words; public <word> = {};",
            self.words.join(" | ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_on_whitespace() {
        let script = Script::from_text("the quick\tbrown\n fox");
        assert_eq!(script.len(), 4);
        assert_eq!(script.word(0), Some("the"));
        assert_eq!(script.word(3), Some("fox"));
        assert_eq!(script.word(4), None);
    }

    #[test]
    fn test_empty_text_is_empty_script() {
        assert!(Script::from_text("").is_empty());
        assert!(Script::from_text("   \n\t ").is_empty());
    }

    #[test]
    fn test_preserves_original_casing() {
        // Lowercasing happens at comparison time, not in the script itself,
        // so highlight indices still line up with the displayed text.
        let script = Script::from_text("Hello World");
        assert_eq!(script.word(0), Some("Hello"));
    }

    #[test]
    fn test_grammar_hint_format() {
        let script = Script::from_text("the quick brown fox");
        assert_eq!(
            script.grammar_hint().as_deref(),
            Some("#JSGF V1.0; grammar words; public <word> = the | quick | brown | fox;")
        );
    }

    #[test]
    fn test_grammar_hint_empty_script() {
        assert_eq!(Script::from_text("").grammar_hint(), None);
    }
}
