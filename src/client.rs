//! The one outbound request: upload a PDF with its questions, get answers.
//!
//! ## Wire contract
//!
//! ```text
//! POST {base_url}/api/v1/hackrx/upload
//! Content-Type: multipart/form-data
//!   file      = <PDF bytes>            (filename + application/pdf)
//!   questions = ["q1", "q2", ...]      (one JSON-array text part)
//!
//! 2xx  → {"answers": [{"question"?: "...", "answer"?: "..."}, ...]}
//!        {"error": "..."}              (truthy error wins over answers)
//! else → raw text body, reported with the status code
//! ```
//!
//! The controller only sees the [`QaBackend`] trait, so tests and other
//! transports can replace [`RemoteQaClient`].

use crate::config::ClientConfig;
use crate::error::DocQaError;
use crate::file::FileCandidate;
use crate::questions::QuestionList;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One answered question as sent by the server. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerItem {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Successful response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswersResponse {
    /// Missing and `null` both decode to an empty list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answers: Vec<AnswerItem>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AnswerItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<AnswerItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Something that can answer questions about a document.
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Send `file` and `questions` in a single request.
    async fn ask(
        &self,
        file: &FileCandidate,
        questions: &QuestionList,
    ) -> Result<AnswersResponse, DocQaError>;
}

/// HTTP client for the document-QA service.
#[derive(Debug, Clone)]
pub struct RemoteQaClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RemoteQaClient {
    /// Build the underlying HTTP client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, DocQaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DocQaError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_form(
        file: &FileCandidate,
        bytes: Vec<u8>,
        questions: &QuestionList,
    ) -> Result<Form, DocQaError> {
        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            .map_err(|e| DocQaError::Internal(format!("Invalid media type: {}", e)))?;
        Ok(Form::new()
            .part("file", part)
            .text("questions", questions.to_json()))
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> DocQaError {
        if e.is_timeout() {
            DocQaError::Timeout {
                url: url.to_string(),
                secs: self.config.request_timeout_secs,
            }
        } else {
            DocQaError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl QaBackend for RemoteQaClient {
    async fn ask(
        &self,
        file: &FileCandidate,
        questions: &QuestionList,
    ) -> Result<AnswersResponse, DocQaError> {
        let url = self.config.upload_url();
        let bytes = file.read_bytes().await?;
        info!(
            "Uploading '{}' ({} bytes) with {} question(s) to {}",
            file.name(),
            bytes.len(),
            questions.len(),
            url
        );

        let form = Self::build_form(file, bytes, questions)?;
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;
        debug!("Response {} ({} bytes)", status, body.len());

        if !status.is_success() {
            warn!("Server returned {}", status);
            return Err(DocQaError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_answers(&body)
    }
}

/// Interpret a 2xx body.
///
/// A truthy `error` field is reported before `answers` is looked at.
pub fn parse_answers(body: &str) -> Result<AnswersResponse, DocQaError> {
    let value: Value = serde_json::from_str(body).map_err(|e| DocQaError::InvalidResponse {
        reason: e.to_string(),
    })?;

    if let Some(err) = value.get("error").filter(|v| is_truthy(v)) {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(DocQaError::Application { message });
    }

    serde_json::from_value(value).map_err(|e| DocQaError::InvalidResponse {
        reason: e.to_string(),
    })
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_answers_in_order() {
        let r = parse_answers(
            r#"{"answers":[{"question":"Q1","answer":"A1"},{"answer":"A2"}]}"#,
        )
        .unwrap();
        assert_eq!(r.answers.len(), 2);
        assert_eq!(r.answers[0].question.as_deref(), Some("Q1"));
        assert_eq!(r.answers[1].question, None);
        assert_eq!(r.answers[1].answer.as_deref(), Some("A2"));
    }

    #[test]
    fn missing_or_null_answers_is_empty() {
        assert!(parse_answers("{}").unwrap().answers.is_empty());
        assert!(parse_answers(r#"{"answers":null}"#).unwrap().answers.is_empty());
    }

    #[test]
    fn error_field_wins_over_answers() {
        let err = parse_answers(r#"{"error":"bad file","answers":[{"answer":"x"}]}"#).unwrap_err();
        assert!(matches!(err, DocQaError::Application { ref message } if message == "bad file"));
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        for body in [
            r#"{"error":"","answers":[]}"#,
            r#"{"error":null,"answers":[]}"#,
            r#"{"error":false,"answers":[]}"#,
            r#"{"error":0,"answers":[]}"#,
        ] {
            assert!(parse_answers(body).is_ok(), "body: {body}");
        }
    }

    #[test]
    fn non_string_error_is_reported_as_json() {
        let err = parse_answers(r#"{"error":{"code":7}}"#).unwrap_err();
        assert_eq!(err.to_string(), r#"{"code":7}"#);
    }

    #[test]
    fn invalid_json_is_invalid_response() {
        let err = parse_answers("<html>oops</html>").unwrap_err();
        assert!(matches!(err, DocQaError::InvalidResponse { .. }));
    }

    #[test]
    fn truthiness_matches_javascript() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1.5)));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Bind then release a port so nothing is listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::builder()
            .base_url(format!("http://127.0.0.1:{port}"))
            .request_timeout_secs(5)
            .build()
            .unwrap();
        let client = RemoteQaClient::new(config).unwrap();
        let file = FileCandidate::from_bytes("a.pdf", "application/pdf", b"%PDF".to_vec());
        let err = client
            .ask(&file, &QuestionList::parse("q"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
    }
}
