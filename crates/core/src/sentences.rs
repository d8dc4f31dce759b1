use regex::Regex;

use crate::chunking::normalize_whitespace;

pub trait SentenceTokenizer {
    /// Ordered, trimmed, non-empty sentences of `text`.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Words whose trailing period does not end a sentence.
const ABBREVIATIONS: [&str; 15] = [
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "approx",
    "inc",
];

const BOUNDARY_PATTERN: &str = r#"[.!?]+["')\]]*\s+"#;

/// Splits on terminal punctuation followed by whitespace, skipping common
/// abbreviations and single-letter initials.
#[derive(Debug, Clone)]
pub struct PunctuationSentenceTokenizer {
    boundary: Regex,
}

impl PunctuationSentenceTokenizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            boundary: Regex::new(BOUNDARY_PATTERN)?,
        })
    }
}

impl SentenceTokenizer for PunctuationSentenceTokenizer {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in self.boundary.find_iter(text) {
            let candidate = &text[start..boundary.end()];
            if ends_with_abbreviation(&text[start..boundary.start()], boundary.as_str()) {
                continue;
            }
            push_sentence(&mut sentences, candidate);
            start = boundary.end();
        }

        push_sentence(&mut sentences, &text[start..]);
        sentences
    }
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = normalize_whitespace(raw);
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

fn ends_with_abbreviation(before: &str, punctuation: &str) -> bool {
    if !punctuation.starts_with('.') || punctuation.trim_end().len() > 1 {
        return false;
    }

    let last_word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    if last_word.chars().count() == 1 && last_word.chars().all(char::is_uppercase) {
        return true;
    }

    let lowered = last_word.to_lowercase();
    ABBREVIATIONS.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::{PunctuationSentenceTokenizer, SentenceTokenizer};

    fn tokenizer() -> PunctuationSentenceTokenizer {
        PunctuationSentenceTokenizer::new().expect("boundary pattern compiles")
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences =
            tokenizer().split("First sentence. Second one! Third? Fourth.");
        assert_eq!(
            sentences,
            vec!["First sentence.", "Second one!", "Third?", "Fourth."]
        );
    }

    #[test]
    fn abbreviations_and_initials_do_not_split() {
        let sentences = tokenizer()
            .split("Dr. Smith met J. Doe at noon. They talked e.g. about food.");
        assert_eq!(
            sentences,
            vec!["Dr. Smith met J. Doe at noon.", "They talked e.g. about food."]
        );
    }

    #[test]
    fn line_breaks_inside_sentences_are_collapsed() {
        let sentences =
            tokenizer().split("A sentence that\nwraps lines.\n\nNext  one");
        assert_eq!(sentences, vec!["A sentence that wraps lines.", "Next one"]);
    }

    #[test]
    fn blank_text_has_no_sentences() {
        assert!(tokenizer().split(" \n\t ").is_empty());
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let sentences = tokenizer().split("He said \"stop.\" Then left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then left."]);
    }
}
