//! TUI-less "say" command

use std::error::Error;
use std::fmt;
use std::io::{self, Write};

use crate::core::app::new_conversation;
use crate::core::chat_stream::StreamError;
use crate::core::config::data::Config;
use crate::core::controller::{ConversationController, SendOutcome};
use crate::core::message::ERROR_REPLY;
use crate::core::model::ModelType;

#[derive(Debug)]
pub enum SayError {
    NotLoggedIn,
    NeedsCredits(ModelType),
    Busy,
    ReplyFailed(StreamError),
    Output(io::Error),
}

impl fmt::Display for SayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SayError::NotLoggedIn => {
                write!(f, "Not logged in. Run 'quickgpt login <name>' first.")
            }
            SayError::NeedsCredits(model) => write!(
                f,
                "The {} model needs credits. Run 'quickgpt buy <amount>' to add some.",
                model.display_name()
            ),
            SayError::Busy => write!(f, "A reply is already streaming."),
            SayError::ReplyFailed(e) => write!(f, "{ERROR_REPLY} ({e})"),
            SayError::Output(e) => write!(f, "Failed to write reply: {e}"),
        }
    }
}

impl Error for SayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SayError::ReplyFailed(e) => Some(e),
            SayError::Output(e) => Some(e),
            _ => None,
        }
    }
}

/// Stream the answer to `prompt` into `out` as it arrives. Login and the
/// credit check apply exactly as in the chat screen.
pub async fn stream_answer<W: Write>(
    conversation: &mut ConversationController,
    prompt: &str,
    model: ModelType,
    out: &mut W,
) -> Result<(), SayError> {
    let mut write_error = None;
    let outcome = conversation
        .send_message_with(prompt, model, |fragment| {
            if write_error.is_some() {
                return;
            }
            if let Err(e) = out.write_all(fragment.as_bytes()).and_then(|_| out.flush()) {
                write_error = Some(e);
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(SayError::Output(e));
    }

    match outcome {
        SendOutcome::Ignored => Err(SayError::NotLoggedIn),
        SendOutcome::NeedsCredits => Err(SayError::NeedsCredits(model)),
        SendOutcome::Busy => Err(SayError::Busy),
        SendOutcome::Failed(e) => Err(SayError::ReplyFailed(e)),
        SendOutcome::Started(_) => writeln!(out).map_err(SayError::Output),
    }
}

pub async fn run_say(prompt: Vec<String>, model: Option<ModelType>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: quickgpt say <prompt>");
        std::process::exit(2);
    }

    let config = Config::load()?;
    let mut conversation = new_conversation(&config, model);
    let model = conversation.selected_model();

    let mut stdout = io::stdout();
    if let Err(err) = stream_answer(&mut conversation, prompt.trim(), model, &mut stdout).await {
        eprintln!("\n❌ {err}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_stream::test_support::{ScriptedClient, Step};
    use crate::core::profile::{MemoryProfileStore, UserProfile};
    use std::sync::Arc;

    fn conversation(client: ScriptedClient, credits: Option<i64>) -> ConversationController {
        let store = match credits {
            Some(credits) => MemoryProfileStore::with_profile(UserProfile {
                credits,
                ..UserProfile::new_signup("Ana")
            }),
            None => MemoryProfileStore::new(),
        };
        ConversationController::new(Arc::new(client), Box::new(store))
    }

    #[tokio::test]
    async fn prints_fragments_then_newline() {
        let mut conversation = conversation(ScriptedClient::replying(&["Hel", "lo"]), Some(5));
        let mut out = Vec::new();

        stream_answer(&mut conversation, "Hi", ModelType::Fast, &mut out)
            .await
            .expect("answer");

        assert_eq!(String::from_utf8(out).expect("utf8"), "Hello\n");
    }

    #[tokio::test]
    async fn requires_login() {
        let mut conversation = conversation(ScriptedClient::replying(&["x"]), None);
        let mut out = Vec::new();

        let result = stream_answer(&mut conversation, "Hi", ModelType::Fast, &mut out).await;

        assert!(matches!(result, Err(SayError::NotLoggedIn)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn pro_without_credits_is_refused() {
        let client = ScriptedClient::replying(&["x"]);
        let mut conversation = conversation(client, Some(0));
        let mut out = Vec::new();

        let result = stream_answer(&mut conversation, "Explain X", ModelType::Pro, &mut out).await;

        assert!(matches!(result, Err(SayError::NeedsCredits(ModelType::Pro))));
        assert!(conversation.messages().is_empty());
    }

    #[tokio::test]
    async fn stream_failure_is_reported() {
        let client = ScriptedClient::with_script(vec![Step::Fragment("Hel"), Step::Fail("boom")]);
        let mut conversation = conversation(client, Some(5));
        let mut out = Vec::new();

        let result = stream_answer(&mut conversation, "Hi", ModelType::Fast, &mut out).await;

        assert!(matches!(result, Err(SayError::ReplyFailed(_))));
        assert_eq!(String::from_utf8(out).expect("utf8"), "Hel");
    }

    #[tokio::test]
    async fn reply_matching_error_text_is_still_a_success() {
        let mut conversation = conversation(ScriptedClient::replying(&[ERROR_REPLY]), Some(5));
        let mut out = Vec::new();

        stream_answer(&mut conversation, "Say sorry", ModelType::Fast, &mut out)
            .await
            .expect("answer");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            format!("{ERROR_REPLY}\n")
        );
    }
}
