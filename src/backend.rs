use crate::error::BackendError;
use crate::events::{AnswerRecord, TIMESTAMP_FORMAT};
use serde::Deserialize;
use tokio::time::Duration;
use tracing::debug;

/// Result of a successful ask call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Answer {
    pub response: String,
    pub question_id: String,
}

/// Wire shape of the history endpoint.
#[derive(Debug, Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    history: Vec<RawRecord>,
}

/// One record as the service sends it. `answer` and `timestamp` are
/// optional on the wire; the internal shape fills them with empty strings.
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    question: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl RawRecord {
    fn into_record(self) -> AnswerRecord {
        AnswerRecord {
            id: self.id,
            question: self.question,
            response: self.answer.unwrap_or_default(),
            timestamp: self.timestamp.map(format_timestamp).unwrap_or_default(),
        }
    }
}

/// RFC 3339 timestamps become local display strings; anything else passes
/// through verbatim (the service owns the format).
fn format_timestamp(raw: String) -> String {
    match chrono::DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed
            .with_timezone(&chrono::Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        Err(_) => raw,
    }
}

/// Client for the question/answer service.
///
/// Two fire-and-forget calls against the service's REST surface. No
/// retries and no caching; failures are returned verbatim to the caller.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch all stored question/answer pairs, mapped into the internal
    /// record shape, in the order the service returns them.
    pub async fn fetch_history(&self) -> Result<Vec<AnswerRecord>, BackendError> {
        let url = format!("{}/history", self.base_url);
        debug!("fetching history from {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let payload: HistoryPayload = response.json().await?;
        debug!("history returned {} records", payload.history.len());

        Ok(payload
            .history
            .into_iter()
            .map(RawRecord::into_record)
            .collect())
    }

    /// Submit a question and return the service's answer and assigned id.
    pub async fn ask_question(&self, question: &str) -> Result<Answer, BackendError> {
        let url = format!("{}/ask", self.base_url);
        debug!("asking question at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}
