//! Rendering of answers and errors for display.
//!
//! All functions here are pure. The HTML variants produce fragments using the
//! class hooks the results page styles (`answer-item`, `answer-count`); every
//! piece of server-supplied text goes through [`escape_html`] before it is
//! inserted, so an answer can never inject markup.

use crate::client::{AnswerItem, AnswersResponse};
use serde::Serialize;

const NO_ANSWER: &str = "No answer provided";

/// Answers rendered as HTML blocks, in response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedAnswers {
    /// Number of answer blocks.
    pub count: usize,
    /// Inner HTML of the results heading, including the count badge.
    pub heading_html: String,
    /// One `<div class="answer-item">` block per answer.
    pub items_html: Vec<String>,
}

impl RenderedAnswers {
    /// The whole results panel: heading followed by every block.
    pub fn to_html(&self) -> String {
        let mut html = format!("<h2>{}</h2>\n", self.heading_html);
        for item in &self.items_html {
            html.push_str(item);
            html.push('\n');
        }
        html
    }
}

/// Escape the five HTML-special characters.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape `text` and turn its line breaks into `<br>`.
fn escape_multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Question heading for the item at `index` (0-based), with the placeholder
/// used when the server left it out.
pub fn question_text(item: &AnswerItem, index: usize) -> String {
    match item.question.as_deref() {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => format!("Question {}", index + 1),
    }
}

/// Answer body, or the placeholder used when the server left it out.
pub fn answer_text(item: &AnswerItem) -> &str {
    match item.answer.as_deref() {
        Some(a) if !a.is_empty() => a,
        _ => NO_ANSWER,
    }
}

/// Render every answer as an HTML block.
///
/// Order is the response order; nothing is merged or dropped. An empty
/// response yields zero blocks; deciding that this is an error is the
/// caller's job.
pub fn render_answers(response: &AnswersResponse) -> RenderedAnswers {
    let items_html: Vec<String> = response
        .answers
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "<div class=\"answer-item\">\n<h3>{}</h3>\n<p>{}</p>\n</div>",
                escape_html(&question_text(item, i)),
                escape_multiline(answer_text(item)),
            )
        })
        .collect();

    let count = items_html.len();
    RenderedAnswers {
        count,
        heading_html: format!(
            "📋 Answers <span class=\"answer-count\">{} results</span>",
            count
        ),
        items_html,
    }
}

/// Render an error message for the error panel.
pub fn render_error(message: &str) -> String {
    escape_multiline(message)
}

/// Render answers as terminal text: a count line, then numbered
/// question/answer pairs separated by blank lines.
pub fn render_plain(response: &AnswersResponse) -> String {
    let mut out = format!("Answers ({})\n", response.answers.len());
    for (i, item) in response.answers.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, question_text(item, i)));
        for line in answer_text(item).lines() {
            out.push_str("   ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
