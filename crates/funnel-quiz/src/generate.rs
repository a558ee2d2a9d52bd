//! Question generation from retrieved context.
//!
//! Builds the generation prompt from the parsed query and the retrieved
//! context, calls the chat model with the Bloom's-taxonomy system prompt,
//! and formats the reply into a clean list of questions.

use funnel_rs::{ChatClient, ChatRequest, Message};
use tracing::info;

use crate::query::ParsedQuery;

/// System prompt describing the generation task and the six Bloom levels.
pub const QUESTION_SYSTEM_PROMPT: &str = "\
You are an expert educational content creator specializing in creating \
high-quality questions based on Bloom's Taxonomy. You create questions that \
promote critical thinking and deep understanding.

Your role is to:
1. Analyze the provided context and user requirements
2. Generate appropriate questions based on the specified Bloom's Taxonomy level
3. Ensure questions are clear, relevant, and educational
4. Follow the exact format requested by the user

Guidelines for Bloom's Taxonomy levels:
- Remember: Recall facts, terms, basic concepts
- Understand: Explain ideas, interpret information
- Apply: Use information in new situations
- Analyze: Break down information, compare and contrast
- Evaluate: Make judgments, critique, assess
- Create: Design, construct, develop new ideas";

/// Build the user prompt for question generation. Unrecognized query parts
/// fall back to broad defaults.
pub fn build_question_prompt(context: &str, parsed: &ParsedQuery) -> String {
    let bloom_level = parsed.bloom_level.as_deref().unwrap_or("Evaluate");
    let topic = parsed.topic.as_deref().unwrap_or("general education");
    let quantity = parsed.quantity.unwrap_or(2);
    let question_type = parsed.question_type.as_deref().unwrap_or("question");

    format!(
        "Context Information:\n{context}\n\n\
         User Request:\n\
         - Bloom's Taxonomy Level: {bloom_level}\n\
         - Topic: {topic}\n\
         - Number of {question_type}s: {quantity}\n\
         - Original Query: {original}\n\n\
         Please generate {quantity} {bloom_level}-level {question_type}s about \
         {topic} based on the provided context.\n\n\
         Requirements:\n\
         1. Each {question_type} should clearly demonstrate {bloom_level} level thinking\n\
         2. {question_type}s should be relevant to the context provided\n\
         3. {question_type}s should be appropriate for educational use\n\
         4. Format each {question_type} clearly and concisely\n\
         5. Do not include explanations or additional text, just the {question_type}s\n\n\
         Generate the {question_type}s now:",
        original = parsed.original,
    )
}

/// Generate questions for the parsed query against the given context.
pub async fn generate_questions(
    client: &ChatClient,
    context: &str,
    parsed: &ParsedQuery,
) -> Result<Vec<String>, String> {
    let request = ChatRequest {
        model: None,
        messages: vec![
            Message::system(QUESTION_SYSTEM_PROMPT),
            Message::user(build_question_prompt(context, parsed)),
        ],
        max_tokens: 1000,
        temperature: 0.7,
    };

    let reply = client
        .chat(&request)
        .await
        .map_err(|e| format!("question generation failed: {e}"))?;

    let questions = format_questions(&reply);
    info!("Generated {} questions", questions.len());
    Ok(questions)
}

/// Split raw reply text into individual questions, stripping list markers.
pub fn format_questions(raw: &str) -> Vec<String> {
    raw.trim()
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let stripped = strip_list_marker(line);
            if stripped.is_empty() {
                None
            } else {
                Some(stripped.to_string())
            }
        })
        .collect()
}

/// Remove a leading `1. ` / `2) ` / `- ` / `* ` list marker, if present.
fn strip_list_marker(line: &str) -> &str {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return rest.trim();
    }
    line
}

/// Check generated questions against the request: non-empty, long enough to
/// be meaningful, phrased as questions. Returns the list of issues found.
pub fn validate_questions(questions: &[String]) -> Vec<String> {
    let mut issues = Vec::new();
    if questions.is_empty() {
        issues.push("No questions generated".to_string());
    }
    for (i, question) in questions.iter().enumerate() {
        if question.trim().len() < 10 {
            issues.push(format!("Question {} is too short", i + 1));
        }
        if !question.trim_end().ends_with('?') {
            issues.push(format!("Question {} doesn't end with '?'", i + 1));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;

    #[test]
    fn prompt_carries_parsed_fields() {
        let parsed = QueryParser::new()
            .parse("Generate two Evaluate-level questions about machine learning.");
        let prompt = build_question_prompt("some context", &parsed);
        assert!(prompt.starts_with("Context Information:\nsome context"));
        assert!(prompt.contains("Bloom's Taxonomy Level: Evaluate"));
        assert!(prompt.contains("Number of questions: 2"));
        assert!(prompt.contains("generate 2 Evaluate-level questions about Machine Learning"));
    }

    #[test]
    fn prompt_falls_back_to_defaults() {
        let parsed = QueryParser::new().parse("hello there");
        let prompt = build_question_prompt("ctx", &parsed);
        assert!(prompt.contains("Bloom's Taxonomy Level: Evaluate"));
        assert!(prompt.contains("Topic: general education"));
        assert!(prompt.contains("Number of questions: 2"));
    }

    #[test]
    fn numbered_replies_are_unwrapped() {
        let raw = "1. What drives learning?\n2. How would you assess it?\n";
        assert_eq!(
            format_questions(raw),
            vec!["What drives learning?", "How would you assess it?"]
        );
    }

    #[test]
    fn bullets_and_blank_lines_are_handled() {
        let raw = "- First question?\n\n* Second question?\n3) Third question?";
        assert_eq!(
            format_questions(raw),
            vec!["First question?", "Second question?", "Third question?"]
        );
    }

    #[test]
    fn unmarked_lines_pass_through() {
        assert_eq!(
            format_questions("Why does this work?"),
            vec!["Why does this work?"]
        );
    }

    #[test]
    fn validation_flags_short_and_non_questions() {
        let questions = vec![
            "Why is assessment central to learning design?".to_string(),
            "so what?".to_string(),
            "This is a statement, not a question.".to_string(),
        ];
        let issues = validate_questions(&questions);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("Question 2"));
        assert!(issues[1].contains("Question 3"));
    }

    #[test]
    fn validation_flags_empty_output() {
        let issues = validate_questions(&[]);
        assert_eq!(issues, vec!["No questions generated"]);
    }
}
