//! Question lists parsed from free-form multi-line text.

use serde::{Deserialize, Serialize};

/// Questions pre-filled when the user asks for sample input.
pub const SAMPLE_QUESTIONS: &str = "What is the main purpose of this document?
What are the key terms and conditions?
How does the process work?
What are the important clauses?";

/// Ordered, non-empty, trimmed questions; one per input line.
///
/// Serialises as a plain JSON array of strings, which is exactly the value
/// of the `questions` multipart field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionList(Vec<String>);

impl QuestionList {
    /// Split on line breaks, trim each line, and drop the empty ones.
    ///
    /// Order is preserved and duplicates are kept. `\r\n` endings are handled
    /// because the trailing `\r` is trimmed as whitespace.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('\n')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The JSON array text sent as the `questions` field.
    pub fn to_json(&self) -> String {
        // Serialising a Vec<String> cannot fail.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

impl From<Vec<String>> for QuestionList {
    fn from(questions: Vec<String>) -> Self {
        Self(questions)
    }
}
