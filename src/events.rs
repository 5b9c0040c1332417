/// Display format for record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored question/answer pair as held in memory.
///
/// Records are created when a question is answered or when history is
/// fetched from the service, and never mutated afterwards. The timestamp
/// is a display string, not a parsed datetime; the service owns the
/// canonical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub id: String,
    pub question: String,
    pub response: String,
    pub timestamp: String,
}

/// Completion events delivered from spawned backend calls to the UI loop.
///
/// Each network call sends exactly one of these over the manager's
/// channel; the event loop drains them between draws.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// History fetch succeeded (records in service order, oldest first)
    HistoryLoaded(Vec<AnswerRecord>),

    /// History fetch failed; carries the error text for logging only
    HistoryFailed(String),

    /// Ask call succeeded
    AnswerReceived {
        question: String,
        response: String,
        question_id: String,
    },

    /// Ask call failed
    AskFailed(String),
}

/// Current wall-clock time as a record timestamp.
pub fn display_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
