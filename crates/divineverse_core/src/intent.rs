//! crates/divineverse_core/src/intent.rs
//!
//! Classifies an incoming question into the intent bucket used to select a
//! prompt template. Classification is ephemeral, per-request state and is
//! never persisted.

use regex::Regex;

/// Concept keywords checked after the verse-reference pattern.
const CONCEPT_KEYWORDS: [&str; 9] = [
    "karma",
    "dharma",
    "moksha",
    "yoga",
    "atman",
    "bhakti",
    "detachment",
    "maya",
    "truth",
];

/// Emotional keywords checked after the concept keywords.
const EMOTION_KEYWORDS: [&str; 9] = [
    "sad",
    "confused",
    "stress",
    "fear",
    "lost",
    "angry",
    "failure",
    "purpose",
    "meaning",
];

/// Greeting keywords checked last before falling back to `General`.
const GREETING_KEYWORDS: [&str; 5] = ["hello", "hi", "namaste", "pranam", "who are you"];

/// The intent bucket a question falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The question names a specific chapter and verse.
    VerseReference { chapter: u32, verse: u32 },
    Concept,
    Emotional,
    Greeting,
    General,
}

/// Classifies a question into an [`Intent`], case-insensitively.
///
/// The buckets are tried in priority order: a verse-reference pattern match
/// wins over everything else, then concept keywords, then emotional keywords,
/// then greetings. Only the first matching bucket is used.
pub fn classify(question: &str) -> Intent {
    let verse_re =
        Regex::new(r"(?i)(?:chapter\s*)?(\d+)[\s.:,-]*(?:verse|shloka)?[\s.:,-]*(\d+)").unwrap();
    if let Some(caps) = verse_re.captures(question) {
        if let (Ok(chapter), Ok(verse)) = (caps[1].parse(), caps[2].parse()) {
            return Intent::VerseReference { chapter, verse };
        }
    }

    let lower = question.to_lowercase();
    if CONCEPT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Intent::Concept;
    }
    if EMOTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Intent::Emotional;
    }
    if GREETING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Intent::Greeting;
    }
    Intent::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_reference_is_detected() {
        assert_eq!(
            classify("Explain chapter 2 verse 47"),
            Intent::VerseReference {
                chapter: 2,
                verse: 47
            }
        );
    }

    #[test]
    fn verse_reference_is_case_insensitive_and_accepts_shloka() {
        assert_eq!(
            classify("CHAPTER 12 SHLOKA 4"),
            Intent::VerseReference {
                chapter: 12,
                verse: 4
            }
        );
    }

    #[test]
    fn verse_reference_preempts_concept_keywords() {
        // "karma" alone would classify as Concept, but the verse pattern wins.
        assert_eq!(
            classify("Explain karma in chapter 2 verse 47"),
            Intent::VerseReference {
                chapter: 2,
                verse: 47
            }
        );
    }

    #[test]
    fn concept_keyword_matches() {
        assert_eq!(classify("What does the Gita say about KARMA?"), Intent::Concept);
    }

    #[test]
    fn emotional_keyword_matches() {
        assert_eq!(classify("I feel so lost and afraid"), Intent::Emotional);
    }

    #[test]
    fn greeting_matches() {
        assert_eq!(classify("hello"), Intent::Greeting);
    }

    #[test]
    fn concept_preempts_emotion() {
        // "dharma" (concept) and "confused" (emotion) both appear; concept
        // is checked first.
        assert_eq!(classify("I am confused about dharma"), Intent::Concept);
    }

    #[test]
    fn everything_else_is_general() {
        assert_eq!(classify("Tell me about the Gita"), Intent::General);
    }
}
