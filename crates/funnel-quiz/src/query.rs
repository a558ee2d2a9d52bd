//! Semantic parsing of question-generation requests.
//!
//! Extracts four things from a request like *"Generate two Evaluate-level
//! questions about AI in Education"*: the Bloom's-taxonomy level, the topic,
//! the question type, and the quantity — each by keyword table or regex —
//! plus a confidence score over how much was recognized. The parsed query
//! then drives both retrieval (via [`QueryParser::retrieval_query`]) and
//! prompt construction.

use std::sync::OnceLock;

use regex::Regex;

/// Bloom's-taxonomy levels with their trigger keywords, in match-priority
/// order. The level name itself always matches.
const BLOOM_LEVELS: [(&str, &[&str]); 6] = [
    (
        "Remember",
        &["remember", "recall", "identify", "list", "name", "define"],
    ),
    (
        "Understand",
        &["understand", "explain", "describe", "summarize", "interpret"],
    ),
    (
        "Apply",
        &["apply", "use", "implement", "execute", "demonstrate"],
    ),
    (
        "Analyze",
        &["analyze", "compare", "contrast", "examine", "investigate"],
    ),
    (
        "Evaluate",
        &["evaluate", "assess", "judge", "critique", "appraise"],
    ),
    (
        "Create",
        &["create", "design", "develop", "construct", "produce"],
    ),
];

/// Known education topics, matched when no "about …" phrase is present.
const EDUCATION_TOPICS: [&str; 12] = [
    "ai in education",
    "artificial intelligence",
    "machine learning",
    "critical thinking",
    "reading comprehension",
    "mathematics",
    "science education",
    "language learning",
    "assessment",
    "personalized learning",
    "digital literacy",
    "problem solving",
];

/// Recognized question types, in match-priority order.
const QUESTION_TYPES: [&str; 4] = ["question", "problem", "task", "exercise"];

/// English number words for quantity extraction.
const TEXT_NUMBERS: [(&str, usize); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

fn about_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"about\s+([^,\.]+)").expect("about pattern"))
}

fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\s+(question|problem|task|exercise)").expect("quantity pattern")
    })
}

/// Structured view of a question-generation request.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub original: String,
    pub bloom_level: Option<String>,
    pub topic: Option<String>,
    pub question_type: Option<String>,
    pub quantity: Option<usize>,
    /// How much of the request was recognized, in [0, 1].
    pub confidence: f32,
}

/// Keyword/regex parser for question-generation requests.
#[derive(Debug, Default)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a request completely.
    pub fn parse(&self, query: &str) -> ParsedQuery {
        let bloom_level = self.extract_bloom_level(query);
        let topic = self.extract_topic(query);
        let question_type = self.extract_question_type(query);
        let quantity = self.extract_quantity(query);

        let mut confidence = 0.0;
        if bloom_level.is_some() {
            confidence += 0.3;
        }
        if topic.is_some() {
            confidence += 0.3;
        }
        if question_type.is_some() {
            confidence += 0.2;
        }
        if quantity.is_some() {
            confidence += 0.2;
        }

        ParsedQuery {
            original: query.to_string(),
            bloom_level,
            topic,
            question_type,
            quantity,
            confidence,
        }
    }

    /// Extract the Bloom's-taxonomy level.
    pub fn extract_bloom_level(&self, query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        for (level, keywords) in BLOOM_LEVELS {
            if lower.contains(&level.to_lowercase()) {
                return Some(level.to_string());
            }
            for keyword in keywords {
                if lower.contains(keyword) {
                    return Some(level.to_string());
                }
            }
        }
        None
    }

    /// Extract the topic: an "about …" phrase first, then the known-topics
    /// table.
    pub fn extract_topic(&self, query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        if let Some(caps) = about_re().captures(&lower) {
            return Some(title_case(caps[1].trim()));
        }
        for topic in EDUCATION_TOPICS {
            if lower.contains(topic) {
                return Some(title_case(topic));
            }
        }
        None
    }

    /// Extract the question type.
    pub fn extract_question_type(&self, query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        QUESTION_TYPES
            .iter()
            .find(|t| lower.contains(*t))
            .map(|t| t.to_string())
    }

    /// Extract the requested quantity: a digit form first, then English
    /// number words.
    pub fn extract_quantity(&self, query: &str) -> Option<usize> {
        let lower = query.to_lowercase();
        if let Some(caps) = quantity_re().captures(&lower) {
            if let Ok(n) = caps[1].parse() {
                return Some(n);
            }
        }
        TEXT_NUMBERS
            .iter()
            .find(|(word, _)| lower.contains(word))
            .map(|(_, n)| *n)
    }

    /// Build the retrieval query for the vector index.
    pub fn retrieval_query(&self, parsed: &ParsedQuery) -> String {
        let mut parts = Vec::new();
        if let Some(topic) = &parsed.topic {
            parts.push(topic.clone());
        }
        if let Some(level) = &parsed.bloom_level {
            parts.push(format!("Bloom's Taxonomy {level} level"));
        }
        if let Some(qtype) = &parsed.question_type {
            parts.push(format!("{qtype} examples"));
        }
        parts.push("education".to_string());
        parts.push("learning".to_string());
        parts.push("assessment".to_string());
        parts.join(" AND ")
    }
}

/// Capitalize the first letter of each whitespace-separated word.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_level_query_parses_fully() {
        let parser = QueryParser::new();
        let parsed = parser
            .parse("Generate two Evaluate-level questions about AI in Education based on Bloom's Taxonomy.");
        assert_eq!(parsed.bloom_level.as_deref(), Some("Evaluate"));
        assert_eq!(parsed.quantity, Some(2));
        assert_eq!(parsed.question_type.as_deref(), Some("question"));
        assert!(parsed.topic.as_deref().unwrap().starts_with("Ai In Education"));
        assert!((parsed.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn analyze_wins_over_create_by_table_order() {
        let parser = QueryParser::new();
        let parsed = parser.parse("Create three Analyze questions for critical thinking in mathematics.");
        assert_eq!(parsed.bloom_level.as_deref(), Some("Analyze"));
        assert_eq!(parsed.quantity, Some(3));
    }

    #[test]
    fn remember_query_with_word_number() {
        let parser = QueryParser::new();
        let parsed = parser.parse("Make one Remember question about reading comprehension.");
        assert_eq!(parsed.bloom_level.as_deref(), Some("Remember"));
        assert_eq!(parsed.quantity, Some(1));
        assert_eq!(parsed.topic.as_deref(), Some("Reading Comprehension"));
    }

    #[test]
    fn apply_problems_query() {
        let parser = QueryParser::new();
        let parsed = parser.parse("Design four Apply problems for science education.");
        assert_eq!(parsed.bloom_level.as_deref(), Some("Apply"));
        assert_eq!(parsed.question_type.as_deref(), Some("problem"));
        assert_eq!(parsed.quantity, Some(4));
        // No "about" phrase; falls back to the topic table.
        assert_eq!(parsed.topic.as_deref(), Some("Science Education"));
    }

    #[test]
    fn digit_quantity_beats_word_quantity() {
        let parser = QueryParser::new();
        assert_eq!(parser.extract_quantity("give me 7 questions, not one"), Some(7));
    }

    #[test]
    fn unrecognized_query_scores_zero_confidence() {
        let parser = QueryParser::new();
        let parsed = parser.parse("what is the weather like");
        assert!(parsed.bloom_level.is_none());
        assert!(parsed.quantity.is_none());
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn retrieval_query_joins_recognized_parts() {
        let parser = QueryParser::new();
        let parsed = parser.parse("Create two Evaluate questions about machine learning.");
        let retrieval = parser.retrieval_query(&parsed);
        assert!(retrieval.contains("Machine Learning"));
        assert!(retrieval.contains("Bloom's Taxonomy Evaluate level"));
        assert!(retrieval.contains("question examples"));
        assert!(retrieval.ends_with("education AND learning AND assessment"));
    }

    #[test]
    fn partial_query_gets_partial_confidence() {
        let parser = QueryParser::new();
        let parsed = parser.parse("questions about digital literacy");
        // question type (0.2) + topic (0.3); no level, no quantity.
        assert!((parsed.confidence - 0.5).abs() < f32::EPSILON);
    }
}
