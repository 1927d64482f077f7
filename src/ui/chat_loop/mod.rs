//! The interactive chat: terminal setup, the event loop, and the glue that
//! turns key presses and stream output into [`AppAction`]s.

mod keybindings;
mod lifecycle;

use std::error::Error;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::app::{
    apply_actions, new_conversation, App, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand, UiState,
};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::config::data::Config;
use crate::core::model::ModelType;
use crate::ui::renderer::ui;
use crate::ui::theme::{Theme, ThemeKind};

pub use keybindings::{handle_key, handle_paste};
use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

pub enum UiEvent {
    Crossterm(Event),
}

fn bootstrap_app(model: Option<ModelType>) -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    let conversation = new_conversation(&config, model);

    let theme = if config.prefers_dark() {
        Theme::dark_default()
    } else {
        Theme::light()
    };
    Ok(App::new(conversation, UiState::new(theme)))
}

fn persist_theme(kind: ThemeKind) {
    let result = Config::mutate(|config| {
        config.theme = Some(kind.as_str().to_string());
        Ok(())
    });
    if let Err(e) = result {
        warn!(error = %e, "failed to save theme");
    }
}

fn process_ui_events(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    ctx: AppActionContext,
) -> bool {
    let mut processed = false;
    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        processed = true;
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let actions = handle_key(app, key, ctx);
                dispatcher.dispatch_many(actions, ctx);
            }
            Event::Paste(text) => handle_paste(app, &text),
            _ => {}
        }
    }
    processed
}

/// Forward stream output for the active stream as actions. Output from
/// streams that were cancelled or replaced is dropped here.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    ctx: AppActionContext,
    current_stream_id: Option<u64>,
) -> bool {
    let mut received_any = false;
    let mut actions = Vec::new();

    while let Ok((message, stream_id)) = rx.try_recv() {
        received_any = true;
        if Some(stream_id) != current_stream_id {
            debug!(stream_id, "dropping output from stale stream");
            continue;
        }
        actions.push(match message {
            StreamMessage::Chunk(content) => AppAction::AppendResponseChunk { content, stream_id },
            StreamMessage::Error(message) => AppAction::StreamErrored { message, stream_id },
            StreamMessage::End => AppAction::StreamCompleted { stream_id },
        });
    }

    if !actions.is_empty() {
        dispatcher.dispatch_many(actions, ctx);
    }
    received_any
}

fn drain_action_queue(
    app: &mut App,
    stream_service: &ChatStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    for cmd in apply_actions(app, pending) {
        match cmd {
            AppCommand::SpawnStream(params) => {
                debug!(stream_id = params.stream_id, model = %params.model, "spawning stream");
                stream_service.spawn_stream(params);
            }
            AppCommand::PersistTheme(kind) => persist_theme(kind),
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn current_context(terminal: &ChatTerminal) -> AppActionContext {
    let size = terminal.size().unwrap_or_default();
    AppActionContext {
        term_width: size.width,
        term_height: size.height,
    }
}

async fn event_loop(app: &mut App, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let (stream_service, mut stream_rx) = ChatStreamService::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = loop {
        if app.ui.exit_requested {
            break Ok(());
        }

        if request_redraw && last_draw.elapsed() >= frame_duration {
            if let Err(e) = terminal.draw(|f| ui(f, app)) {
                break Err(e.into());
            }
            last_draw = Instant::now();
            request_redraw = false;
        }

        let ctx = current_context(terminal);
        let events_processed = process_ui_events(app, &mut event_rx, &dispatcher, ctx);
        let received_any = process_stream_updates(
            &dispatcher,
            &mut stream_rx,
            ctx,
            app.conversation.current_stream_id(),
        );
        let actions_applied = drain_action_queue(app, &stream_service, &mut action_rx);
        let status_expired = app.ui.expire_status(Instant::now());

        if events_processed || received_any || actions_applied || status_expired {
            request_redraw = true;
        }

        if !request_redraw {
            tokio::time::sleep(Duration::from_millis(16)).await;
        } else {
            tokio::task::yield_now().await;
        }
    };

    event_reader_handle.abort();
    app.conversation.cancel_stream();
    result
}

/// Run the interactive chat until the user quits.
pub async fn run_chat(model: Option<ModelType>) -> Result<(), Box<dyn Error>> {
    let mut app = bootstrap_app(model)?;
    info!(model = %app.conversation.selected_model(), "starting chat");

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut app, &mut terminal).await;
    restore_terminal(&mut terminal)?;

    result
}
