//! Conversation state machine.
//!
//! A send goes through [`ConversationController::begin_send`], which appends
//! the user message and a streaming placeholder and hands back the
//! parameters for one reply stream. Whoever drives the stream reports back
//! through `apply_fragment`, `complete_stream`, or `fail_stream`, always with
//! the stream id it was given. Reports for a stream that is no longer current
//! are dropped, so a reply cannot leak into a chat the user has left.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::core::chat_stream::{StreamError, StreamParams, StreamingClient};
use crate::core::message::{Message, ERROR_REPLY};
use crate::core::model::ModelType;
use crate::core::profile::{ProfileHolder, ProfileStore, UserProfile};
use crate::core::session::{demo_transcript, SessionStore};

/// Result of asking the controller to send a prompt.
pub enum SendOutcome {
    /// Nobody is logged in; nothing happened.
    Ignored,
    /// The model needs credits the user does not have; the pricing prompt
    /// was opened instead.
    NeedsCredits,
    /// Another reply is still streaming.
    Busy,
    /// Messages were appended; the reply should be streamed with these
    /// parameters.
    Started(StreamParams),
    /// The reply stream failed and the reply now holds the error text. Only
    /// the inline send reports this; [`ConversationController::begin_send`]
    /// never does.
    Failed(StreamError),
}

impl SendOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, SendOutcome::Started(_))
    }
}

impl std::fmt::Debug for SendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendOutcome::Ignored => f.write_str("Ignored"),
            SendOutcome::NeedsCredits => f.write_str("NeedsCredits"),
            SendOutcome::Busy => f.write_str("Busy"),
            SendOutcome::Started(params) => f
                .debug_struct("Started")
                .field("stream_id", &params.stream_id)
                .field("model", &params.model)
                .finish(),
            SendOutcome::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

struct ActiveStream {
    stream_id: u64,
    placeholder_id: u64,
    prompt: String,
    accumulated: String,
    cancel_token: CancellationToken,
}

pub struct ConversationController {
    client: Arc<dyn StreamingClient>,
    profile: ProfileHolder,
    sessions: SessionStore,
    messages: Vec<Message>,
    active_session_id: Option<String>,
    selected_model: ModelType,
    show_pricing: bool,
    active_stream: Option<ActiveStream>,
    next_message_id: u64,
    next_stream_id: u64,
}

impl ConversationController {
    pub fn new(client: Arc<dyn StreamingClient>, store: Box<dyn ProfileStore>) -> Self {
        Self::with_sessions(client, store, SessionStore::with_demo_sessions())
    }

    pub fn with_sessions(
        client: Arc<dyn StreamingClient>,
        store: Box<dyn ProfileStore>,
        sessions: SessionStore,
    ) -> Self {
        let selected_model = ModelType::default();
        client.init_chat(selected_model);
        Self {
            client,
            profile: ProfileHolder::load(store),
            sessions,
            messages: Vec::new(),
            active_session_id: None,
            selected_model,
            show_pricing: false,
            active_stream: None,
            next_message_id: 1,
            next_stream_id: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.profile.current()
    }

    pub fn selected_model(&self) -> ModelType {
        self.selected_model
    }

    pub fn is_loading(&self) -> bool {
        self.active_stream.is_some()
    }

    pub fn show_pricing(&self) -> bool {
        self.show_pricing
    }

    pub fn current_stream_id(&self) -> Option<u64> {
        self.active_stream.as_ref().map(|s| s.stream_id)
    }

    fn allocate_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    /// Validate a send and, when allowed, append the user message and the
    /// reply placeholder.
    pub fn begin_send(&mut self, text: &str, model: ModelType) -> SendOutcome {
        let Some(credits) = self.profile.credits() else {
            return SendOutcome::Ignored;
        };

        if model.requires_credits() && credits <= 0 {
            info!(model = model.api_id(), "not enough credits; opening pricing");
            self.show_pricing = true;
            return SendOutcome::NeedsCredits;
        }

        if self.active_stream.is_some() {
            debug!("send rejected while a reply is streaming");
            return SendOutcome::Busy;
        }

        let user_id = self.allocate_message_id();
        self.messages.push(Message::user(user_id, text));
        let placeholder_id = self.allocate_message_id();
        self.messages.push(Message::placeholder(placeholder_id));

        self.next_stream_id += 1;
        let stream_id = self.next_stream_id;
        let cancel_token = CancellationToken::new();
        self.active_stream = Some(ActiveStream {
            stream_id,
            placeholder_id,
            prompt: text.to_string(),
            accumulated: String::new(),
            cancel_token: cancel_token.clone(),
        });

        debug!(stream_id, model = model.api_id(), "reply stream started");
        SendOutcome::Started(StreamParams {
            client: Arc::clone(&self.client),
            prompt: text.to_string(),
            model,
            cancel_token,
            stream_id,
        })
    }

    fn placeholder_mut(&mut self, placeholder_id: u64) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == placeholder_id)
    }

    /// Append a fragment to the reply of `stream_id`. Returns false when the
    /// stream is stale and the fragment was dropped.
    pub fn apply_fragment(&mut self, stream_id: u64, fragment: &str) -> bool {
        let Some(active) = self
            .active_stream
            .as_mut()
            .filter(|s| s.stream_id == stream_id)
        else {
            return false;
        };
        active.accumulated.push_str(fragment);
        let text = active.accumulated.clone();
        let placeholder_id = active.placeholder_id;

        if let Some(message) = self.placeholder_mut(placeholder_id) {
            message.text = text;
        }
        true
    }

    /// Finalize the reply of `stream_id` and, for a fresh conversation,
    /// record a session for it.
    pub fn complete_stream(&mut self, stream_id: u64) -> bool {
        let Some(active) = self.take_stream(stream_id) else {
            return false;
        };
        if let Some(message) = self.placeholder_mut(active.placeholder_id) {
            message.is_streaming = false;
        }

        if self.active_session_id.is_none() {
            let session_id = self.sessions.create_from_prompt(&active.prompt);
            debug!(session_id, "session created");
            self.active_session_id = Some(session_id);
        }
        true
    }

    /// Replace the reply of `stream_id` with the fixed error text.
    pub fn fail_stream(&mut self, stream_id: u64, detail: &str) -> bool {
        let Some(active) = self.take_stream(stream_id) else {
            return false;
        };
        error!(stream_id, "reply stream failed: {detail}");
        if let Some(message) = self.placeholder_mut(active.placeholder_id) {
            message.text = ERROR_REPLY.to_string();
            message.is_streaming = false;
        }
        true
    }

    fn take_stream(&mut self, stream_id: u64) -> Option<ActiveStream> {
        if self.current_stream_id() == Some(stream_id) {
            self.active_stream.take()
        } else {
            None
        }
    }

    /// Stop the in-flight reply, keeping whatever text already arrived.
    pub fn cancel_stream(&mut self) -> bool {
        let Some(active) = self.active_stream.take() else {
            return false;
        };
        active.cancel_token.cancel();
        debug!(stream_id = active.stream_id, "reply stream cancelled");
        if let Some(message) = self.placeholder_mut(active.placeholder_id) {
            message.is_streaming = false;
        }
        true
    }

    /// Send a prompt and consume the reply inline, calling `on_fragment` for
    /// each piece of text as it arrives.
    pub async fn send_message_with<F>(
        &mut self,
        text: &str,
        model: ModelType,
        mut on_fragment: F,
    ) -> SendOutcome
    where
        F: FnMut(&str),
    {
        let params = match self.begin_send(text, model) {
            SendOutcome::Started(params) => params,
            outcome => return outcome,
        };
        let stream_id = params.stream_id;

        let mut stream = match params.client.send_message_stream(text, model).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_stream(stream_id, &e.to_string());
                return SendOutcome::Failed(e);
            }
        };

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    on_fragment(&fragment);
                    self.apply_fragment(stream_id, &fragment);
                }
                Err(e) => {
                    self.fail_stream(stream_id, &e.to_string());
                    return SendOutcome::Failed(e);
                }
            }
        }
        self.complete_stream(stream_id);
        SendOutcome::Started(params)
    }

    pub async fn send_message(&mut self, text: &str, model: ModelType) -> SendOutcome {
        self.send_message_with(text, model, |_| {}).await
    }

    pub fn login(&mut self, name: &str) {
        self.profile.login(name);
    }

    pub fn logout(&mut self) {
        self.cancel_stream();
        self.profile.logout();
        self.messages.clear();
        self.active_session_id = None;
    }

    /// Add credits and close the pricing prompt.
    pub fn purchase_credits(&mut self, amount: i64) -> Option<i64> {
        self.show_pricing = false;
        self.profile.purchase_credits(amount)
    }

    pub fn open_pricing(&mut self) {
        self.show_pricing = true;
    }

    pub fn close_pricing(&mut self) {
        self.show_pricing = false;
    }

    pub fn new_chat(&mut self) {
        self.cancel_stream();
        self.messages.clear();
        self.active_session_id = None;
        self.client.init_chat(self.selected_model);
    }

    /// Open a saved session. Unknown ids are ignored.
    pub fn select_session(&mut self, id: &str) -> bool {
        if !self.sessions.contains(id) {
            return false;
        }
        self.cancel_stream();
        self.active_session_id = Some(id.to_string());
        let first_id = self.allocate_message_id();
        self.allocate_message_id();
        self.messages = demo_transcript(first_id);
        true
    }

    pub fn set_model(&mut self, model: ModelType) {
        self.selected_model = model;
        self.client.init_chat(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_stream::test_support::{ScriptedClient, Step};
    use crate::core::profile::{MemoryProfileStore, UserProfile, SIGNUP_CREDITS};

    fn controller_with(client: ScriptedClient) -> (ConversationController, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let controller = ConversationController::new(
            client.clone(),
            Box::new(MemoryProfileStore::new()),
        );
        (controller, client)
    }

    fn logged_in(client: ScriptedClient) -> (ConversationController, Arc<ScriptedClient>) {
        let (mut controller, client) = controller_with(client);
        controller.login("Ana");
        (controller, client)
    }

    #[tokio::test]
    async fn hello_scenario_streams_into_placeholder_and_creates_session() {
        let (mut controller, client) = logged_in(ScriptedClient::replying(&["Hel", "lo"]));
        let sessions_before = controller.sessions().len();

        let mut seen = Vec::new();
        let outcome = controller
            .send_message_with("Hi", ModelType::Fast, |f| seen.push(f.to_string()))
            .await;

        assert!(outcome.is_started());
        assert_eq!(seen, vec!["Hel", "lo"]);
        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
        assert_eq!(messages[0].text, "Hi");
        assert!(messages[1].is_model());
        assert_eq!(messages[1].text, "Hello");
        assert!(!messages[1].is_streaming);
        assert!(!controller.is_loading());

        assert_eq!(controller.sessions().len(), sessions_before + 1);
        let newest = &controller.sessions().list()[0];
        assert_eq!(newest.preview, "Hi");
        assert_eq!(controller.active_session_id(), Some(newest.id.as_str()));
        assert_eq!(client.sent(), vec![("Hi".to_string(), ModelType::Fast)]);
    }

    #[tokio::test]
    async fn pro_without_credits_opens_pricing_and_appends_nothing() {
        let client = Arc::new(ScriptedClient::replying(&["never"]));
        let store = MemoryProfileStore::with_profile(UserProfile {
            credits: 0,
            ..UserProfile::new_signup("Ana")
        });
        let mut controller = ConversationController::new(client.clone(), Box::new(store));

        let outcome = controller.send_message("Explain X", ModelType::Pro).await;

        assert!(matches!(outcome, SendOutcome::NeedsCredits));
        assert!(controller.messages().is_empty());
        assert!(controller.show_pricing());
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn pro_with_credits_does_not_spend_them() {
        let (mut controller, _client) = logged_in(ScriptedClient::replying(&["ok"]));

        let outcome = controller.send_message("Explain X", ModelType::Pro).await;

        assert!(outcome.is_started());
        assert_eq!(controller.user().map(|u| u.credits), Some(SIGNUP_CREDITS));
        assert!(!controller.show_pricing());
    }

    #[tokio::test]
    async fn unauthenticated_send_is_silently_ignored() {
        let (mut controller, client) = controller_with(ScriptedClient::replying(&["x"]));

        let outcome = controller.send_message("Hi", ModelType::Fast).await;

        assert!(matches!(outcome, SendOutcome::Ignored));
        assert!(controller.messages().is_empty());
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn mid_stream_failure_replaces_reply_with_error_text() {
        let (mut controller, _client) = logged_in(ScriptedClient::with_script(vec![
            Step::Fragment("Hel"),
            Step::Fail("connection reset"),
        ]));
        let sessions_before = controller.sessions().len();

        let outcome = controller.send_message("Hi", ModelType::Fast).await;

        assert!(matches!(outcome, SendOutcome::Failed(StreamError::Decode(_))));
        let reply = &controller.messages()[1];
        assert_eq!(reply.text, ERROR_REPLY);
        assert!(!reply.is_streaming);
        assert_eq!(controller.messages()[0].text, "Hi");
        assert!(!controller.is_loading());
        assert_eq!(controller.sessions().len(), sessions_before);
    }

    #[tokio::test]
    async fn open_failure_is_handled_like_a_stream_failure() {
        let (mut controller, _client) = logged_in(ScriptedClient::failing_on_open());

        let outcome = controller.send_message("Hi", ModelType::Fast).await;

        assert!(matches!(
            outcome,
            SendOutcome::Failed(StreamError::Api { status: Some(503), .. })
        ));
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].text, ERROR_REPLY);
        assert!(!controller.messages()[1].is_streaming);
    }

    #[test]
    fn placeholder_is_visible_before_any_fragment() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());

        let outcome = controller.begin_send("Hi", ModelType::Fast);

        assert!(outcome.is_started());
        let streaming: Vec<_> = controller
            .messages()
            .iter()
            .filter(|m| m.is_streaming)
            .collect();
        assert_eq!(streaming.len(), 1);
        assert!(streaming[0].is_model());
        assert!(streaming[0].text.is_empty());
        assert!(controller.is_loading());
    }

    #[test]
    fn second_send_while_streaming_is_rejected() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        assert!(controller.begin_send("one", ModelType::Fast).is_started());

        let outcome = controller.begin_send("two", ModelType::Fast);

        assert!(matches!(outcome, SendOutcome::Busy));
        assert_eq!(controller.messages().len(), 2);
    }

    #[test]
    fn each_fragment_overwrites_placeholder_with_running_text() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        let SendOutcome::Started(params) = controller.begin_send("Hi", ModelType::Fast) else {
            panic!("expected stream");
        };

        assert!(controller.apply_fragment(params.stream_id, "Hel"));
        assert_eq!(controller.messages()[1].text, "Hel");
        assert!(controller.apply_fragment(params.stream_id, "lo"));
        assert_eq!(controller.messages()[1].text, "Hello");
        assert!(controller.messages()[1].is_streaming);
    }

    #[test]
    fn new_chat_cancels_stream_and_drops_late_fragments() {
        let (mut controller, client) = logged_in(ScriptedClient::default());
        let SendOutcome::Started(params) = controller.begin_send("Hi", ModelType::Fast) else {
            panic!("expected stream");
        };

        controller.new_chat();

        assert!(params.cancel_token.is_cancelled());
        assert!(!controller.apply_fragment(params.stream_id, "late"));
        assert!(!controller.complete_stream(params.stream_id));
        assert!(!controller.fail_stream(params.stream_id, "late"));
        assert!(controller.messages().is_empty());
        assert!(controller.active_session_id().is_none());
        assert_eq!(client.init_calls(), vec![ModelType::Fast, ModelType::Fast]);
    }

    #[test]
    fn failure_reported_after_cancel_keeps_partial_reply() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        let SendOutcome::Started(params) = controller.begin_send("Hi", ModelType::Fast) else {
            panic!("expected stream");
        };
        assert!(controller.apply_fragment(params.stream_id, "Hel"));

        assert!(controller.cancel_stream());
        assert!(!controller.fail_stream(params.stream_id, "connection reset"));

        let texts: Vec<&str> = controller.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "Hel"]);
        assert!(!controller.messages()[1].is_streaming);
        assert!(!controller.is_loading());
    }

    #[test]
    fn new_chat_on_empty_conversation_is_idempotent() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        assert!(controller.select_session("1"));
        controller.new_chat();
        controller.new_chat();

        assert!(controller.messages().is_empty());
        assert!(controller.active_session_id().is_none());
    }

    #[test]
    fn select_session_restores_demo_transcript() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        let SendOutcome::Started(params) = controller.begin_send("Hi", ModelType::Fast) else {
            panic!("expected stream");
        };

        assert!(controller.select_session("2"));

        assert!(params.cancel_token.is_cancelled());
        assert_eq!(controller.active_session_id(), Some("2"));
        let texts: Vec<&str> = controller.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "This is a restored history for demo.",
                "Indeed, this is a visual demonstration."
            ]
        );
        assert!(!controller.select_session("missing"));
        assert_eq!(controller.active_session_id(), Some("2"));
    }

    #[test]
    fn completing_inside_a_selected_session_keeps_it() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        controller.select_session("1");
        let sessions_before = controller.sessions().len();
        let SendOutcome::Started(params) = controller.begin_send("More", ModelType::Fast) else {
            panic!("expected stream");
        };

        controller.complete_stream(params.stream_id);

        assert_eq!(controller.sessions().len(), sessions_before);
        assert_eq!(controller.active_session_id(), Some("1"));
    }

    #[test]
    fn logout_clears_conversation_and_profile() {
        let store = MemoryProfileStore::new();
        let mut controller = ConversationController::new(
            Arc::new(ScriptedClient::default()),
            Box::new(store.clone()),
        );
        controller.login("Ana");
        let SendOutcome::Started(params) = controller.begin_send("Hi", ModelType::Fast) else {
            panic!("expected stream");
        };

        controller.logout();

        assert!(params.cancel_token.is_cancelled());
        assert!(controller.user().is_none());
        assert!(controller.messages().is_empty());
        assert!(controller.active_session_id().is_none());
        assert!(store.snapshot().is_none());
        assert!(matches!(
            controller.begin_send("Hi", ModelType::Fast),
            SendOutcome::Ignored
        ));
    }

    #[test]
    fn purchase_then_pro_send_succeeds() {
        let store = MemoryProfileStore::with_profile(UserProfile {
            credits: 0,
            ..UserProfile::new_signup("Ana")
        });
        let mut controller = ConversationController::new(
            Arc::new(ScriptedClient::default()),
            Box::new(store.clone()),
        );

        assert!(matches!(
            controller.begin_send("Explain X", ModelType::Pro),
            SendOutcome::NeedsCredits
        ));
        assert!(controller.show_pricing());
        assert_eq!(controller.purchase_credits(10), Some(10));
        assert!(!controller.show_pricing());

        assert!(controller.begin_send("Explain X", ModelType::Pro).is_started());
        assert_eq!(store.snapshot().map(|p| p.credits), Some(10));
    }

    #[test]
    fn set_model_reinitializes_the_client() {
        let (mut controller, client) = logged_in(ScriptedClient::default());
        controller.set_model(ModelType::Pro);
        assert_eq!(controller.selected_model(), ModelType::Pro);
        assert_eq!(client.init_calls(), vec![ModelType::Fast, ModelType::Pro]);
    }

    #[test]
    fn message_ids_are_unique() {
        let (mut controller, _client) = logged_in(ScriptedClient::default());
        let SendOutcome::Started(params) = controller.begin_send("a", ModelType::Fast) else {
            panic!("expected stream");
        };
        controller.complete_stream(params.stream_id);
        controller.begin_send("b", ModelType::Fast);

        let mut ids: Vec<u64> = controller.messages().iter().map(|m| m.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
