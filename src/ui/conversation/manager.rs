use crate::backend::BackendClient;
use crate::events::{display_now, AnswerRecord, BackendEvent};
use crate::ui::conversation::composer::ComposerResult;
use crate::ui::conversation::{get_help_text, Composer, HistoryView, ResponsePanel, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Answer shown when the ask call fails.
const APOLOGY: &str = "Sorry, there was an error processing your question.";

/// Inline message for a blank submission.
const EMPTY_PROMPT: &str = "Please enter a question";

/// Actions requested by the conversation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Owns the conversation state and coordinates the UI components.
///
/// All state mutation happens here, on the UI task. Network calls run as
/// spawned tokio tasks that report back with exactly one [`BackendEvent`]
/// over the manager's channel; the event loop drains the channel between
/// draws. At most one ask call is in flight at a time; submits while
/// loading are dropped, which serializes requests.
pub struct ConversationManager {
    backend: BackendClient,
    composer: Composer,
    history: HistoryView,
    last_response: String,
    error_message: Option<String>,
    is_loading: bool,
    events_tx: mpsc::UnboundedSender<BackendEvent>,
    events_rx: mpsc::UnboundedReceiver<BackendEvent>,
}

impl ConversationManager {
    pub fn new(backend: BackendClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            backend,
            composer: Composer::new(),
            history: HistoryView::new(),
            last_response: String::new(),
            error_message: None,
            is_loading: false,
            events_tx,
            events_rx,
        }
    }

    /// Kick off a history fetch. Used at startup and by `/refresh`; the
    /// outcome arrives as a [`BackendEvent`] later. A failure is logged
    /// and otherwise swallowed; the read is best-effort and must never
    /// block the UI.
    pub fn refresh_history(&self) {
        let backend = self.backend.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            match backend.fetch_history().await {
                Ok(records) => {
                    let _ = tx.send(BackendEvent::HistoryLoaded(records));
                }
                Err(error) => {
                    let _ = tx.send(BackendEvent::HistoryFailed(error.to_string()));
                }
            }
        });
    }

    /// Validate and submit a question.
    ///
    /// Blank input sets the inline validation message and performs no
    /// network call. A submit while a request is in flight is ignored.
    pub fn submit(&mut self, input: String) {
        if input.trim().is_empty() {
            self.error_message = Some(EMPTY_PROMPT.to_string());
            return;
        }

        if self.is_loading {
            return;
        }

        self.is_loading = true;
        self.error_message = None;
        self.composer.set_enabled(false);

        let backend = self.backend.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            match backend.ask_question(&input).await {
                Ok(answer) => {
                    let _ = tx.send(BackendEvent::AnswerReceived {
                        question: input,
                        response: answer.response,
                        question_id: answer.question_id,
                    });
                }
                Err(error) => {
                    let _ = tx.send(BackendEvent::AskFailed(error.to_string()));
                }
            }
        });
    }

    /// Drain pending backend events. Called from the event loop each tick.
    pub fn process_backend_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Apply one backend event to the conversation state.
    pub fn apply_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::HistoryLoaded(mut records) => {
                records.reverse(); // most recent first
                self.history.replace_all(records);
            }
            BackendEvent::HistoryFailed(message) => {
                // best-effort read, never surfaced in the UI
                debug!("history fetch failed: {}", message);
            }
            BackendEvent::AnswerReceived {
                question,
                response,
                question_id,
            } => {
                self.last_response = response.clone();
                self.history.push(AnswerRecord {
                    id: question_id,
                    question,
                    response,
                    timestamp: display_now(),
                });
                self.composer.clear();
                self.finish_request();
            }
            BackendEvent::AskFailed(message) => {
                self.error_message = Some(message);
                self.last_response = APOLOGY.to_string();
                self.finish_request();
            }
        }
    }

    fn finish_request(&mut self) {
        self.is_loading = false;
        self.composer.set_enabled(true);
    }

    /// Handle key input.
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        match key.code {
            KeyCode::PageUp => {
                self.history.prev_page();
                ConversationAction::None
            }
            KeyCode::PageDown => {
                self.history.next_page();
                ConversationAction::None
            }
            _ => match self.composer.handle_key(key) {
                ComposerResult::Submitted(input) => {
                    self.submit(input);
                    ConversationAction::None
                }
                ComposerResult::Command(command) => self.handle_slash_command(command),
                ComposerResult::None => ConversationAction::None,
            },
        }
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        match command {
            SlashCommand::Refresh => {
                self.refresh_history();
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.last_response = get_help_text();
                ConversationAction::None
            }
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[allow(dead_code)]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[allow(dead_code)]
    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    #[allow(dead_code)]
    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    #[allow(dead_code)]
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Render the conversation UI: history on top, latest response below,
    /// composer at the bottom.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(7),
                Constraint::Length(3),
            ])
            .split(frame.size());

        frame.render_widget(self.history.clone(), chunks[0]);
        frame.render_widget(
            ResponsePanel::new(
                &self.last_response,
                self.error_message.as_deref(),
                self.is_loading,
            ),
            chunks[1],
        );
        frame.render_widget(self.composer.clone(), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use serde_json::json;
    use tokio::time::{sleep, Duration};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn record(n: usize) -> AnswerRecord {
        AnswerRecord {
            id: format!("q{n}"),
            question: format!("question {n}"),
            response: format!("answer {n}"),
            timestamp: String::new(),
        }
    }

    async fn drain_until_idle(manager: &mut ConversationManager) {
        for _ in 0..200 {
            manager.process_backend_events();
            if !manager.is_loading() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("request never completed");
    }

    #[tokio::test]
    async fn blank_submit_sets_validation_error_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));
        manager.submit("   \t ".to_string());

        assert_eq!(manager.error_message(), Some(EMPTY_PROMPT));
        assert!(!manager.is_loading());
        // MockServer verifies the expect(0) on drop
    }

    #[tokio::test]
    async fn successful_submit_appends_record_and_clears_composer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "4",
                "question_id": "q1"
            })))
            .mount(&server)
            .await;

        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));
        manager.submit("2+2?".to_string());
        assert!(manager.is_loading());
        assert!(!manager.composer().is_enabled());

        drain_until_idle(&mut manager).await;

        assert_eq!(manager.last_response(), "4");
        assert_eq!(manager.error_message(), None);
        assert_eq!(manager.history().len(), 1);

        let entry = &manager.history().records()[0];
        assert_eq!(entry.id, "q1");
        assert_eq!(entry.question, "2+2?");
        assert_eq!(entry.response, "4");
        assert!(!entry.timestamp.is_empty());

        assert_eq!(manager.composer().content(), "");
        assert!(manager.composer().is_enabled());
    }

    #[tokio::test]
    async fn failed_submit_sets_error_and_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));
        manager.submit("2+2?".to_string());
        drain_until_idle(&mut manager).await;

        assert_eq!(manager.last_response(), APOLOGY);
        let error = manager.error_message().expect("error message set");
        assert!(error.contains("500"));
        assert!(manager.history().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "slow", "question_id": "q1" }))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));
        manager.submit("first".to_string());
        assert!(manager.is_loading());
        manager.submit("second".to_string());

        drain_until_idle(&mut manager).await;

        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.history().records()[0].question, "first");
        // MockServer verifies the expect(1) on drop
    }

    #[tokio::test]
    async fn history_load_reverses_and_resets_page() {
        let server = MockServer::start().await;
        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));

        manager.apply_event(BackendEvent::HistoryLoaded((0..7).map(record).collect()));

        // service order is oldest first; the view holds most recent first
        assert_eq!(manager.history().records()[0].id, "q6");
        assert_eq!(manager.history().current_page(), 0);
        assert_eq!(manager.history().page_count(), 2);
    }

    #[tokio::test]
    async fn history_fetch_failure_is_swallowed() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let mut manager = ConversationManager::new(BackendClient::new(&uri));
        manager.refresh_history();

        // give the spawned task time to fail and report back
        sleep(Duration::from_millis(200)).await;
        manager.process_backend_events();

        assert!(manager.history().is_empty());
        assert_eq!(manager.error_message(), None);
    }

    #[tokio::test]
    async fn page_keys_move_the_history_view() {
        let server = MockServer::start().await;
        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));
        manager.apply_event(BackendEvent::HistoryLoaded((0..7).map(record).collect()));

        manager.handle_key(press(KeyCode::PageDown));
        assert_eq!(manager.history().current_page(), 1);

        manager.handle_key(press(KeyCode::PageUp));
        assert_eq!(manager.history().current_page(), 0);
    }

    #[tokio::test]
    async fn quit_command_requests_exit() {
        let server = MockServer::start().await;
        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));

        for c in "/quit".chars() {
            manager.handle_key(press(KeyCode::Char(c)));
        }
        manager.handle_key(press(KeyCode::Esc));
        let action = manager.handle_key(press(KeyCode::Enter));

        assert_eq!(action, ConversationAction::Exit);
    }

    #[tokio::test]
    async fn help_command_fills_the_response_panel() {
        let server = MockServer::start().await;
        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));

        let action = manager.handle_slash_command(SlashCommand::Help);
        assert_eq!(action, ConversationAction::None);
        assert!(manager.last_response().contains("/refresh"));
    }

    #[tokio::test]
    async fn enter_with_blank_input_reports_validation_error() {
        let server = MockServer::start().await;
        let mut manager = ConversationManager::new(BackendClient::new(&server.uri()));

        manager.handle_key(press(KeyCode::Enter));
        assert_eq!(manager.error_message(), Some(EMPTY_PROMPT));
        assert!(!manager.is_loading());
    }
}
