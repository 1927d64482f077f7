use std::error::Error as StdError;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::model::ModelType;

/// Lazily produced reply fragments. Finite, and not restartable.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

#[derive(Debug)]
pub enum StreamError {
    /// No API key was found in the environment or keyring.
    MissingApiKey,
    /// The request could not be sent or the body could not be read.
    Transport(reqwest::Error),
    /// The service answered with an error payload.
    Api {
        status: Option<u16>,
        message: String,
    },
    /// A stream event could not be understood.
    Decode(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::MissingApiKey => write!(
                f,
                "No API key configured. Set GEMINI_API_KEY or run `quickgpt auth`."
            ),
            StreamError::Transport(source) => write!(f, "Request failed: {source}"),
            StreamError::Api {
                status: Some(status),
                message,
            } => write!(f, "API error ({status}): {message}"),
            StreamError::Api {
                status: None,
                message,
            } => write!(f, "API error: {message}"),
            StreamError::Decode(detail) => write!(f, "Malformed stream event: {detail}"),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Transport(source) => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Transport(err)
    }
}

/// Adapter over a remote model that answers with incremental text.
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Reset conversation state and select `model` for later sends.
    fn init_chat(&self, model: ModelType);

    /// Send `text` and return the reply as a fragment stream. Failures while
    /// the stream is being produced arrive as `Err` items.
    async fn send_message_stream(
        &self,
        text: &str,
        model: ModelType,
    ) -> Result<FragmentStream, StreamError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

pub struct StreamParams {
    pub client: Arc<dyn StreamingClient>,
    pub prompt: String,
    pub model: ModelType,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

/// Runs reply streams on background tasks and forwards what they produce,
/// tagged with the stream id, to the UI loop.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                prompt,
                model,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                _ = forward_stream(client.as_ref(), &prompt, model, &tx, stream_id) => {}
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "stream cancelled");
                }
            }
        })
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn forward_stream(
    client: &dyn StreamingClient,
    prompt: &str,
    model: ModelType,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) {
    let mut stream = match client.send_message_stream(prompt, model).await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.send((StreamMessage::Error(e.to_string()), stream_id));
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                if tx.send((StreamMessage::Chunk(fragment), stream_id)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send((StreamMessage::Error(e.to_string()), stream_id));
                return;
            }
        }
    }

    let _ = tx.send((StreamMessage::End, stream_id));
}
