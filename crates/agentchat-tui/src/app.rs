use agentchat_core::{ChatClient, ChatError, ChatResponse, ChatRole, Session, StreamDelta, StreamStats};
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

/// Shown in place of a reply when a query is rejected
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// A message as rendered in the chat pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub role: ChatRole,
    pub content: String,
    /// Still receiving deltas
    pub streaming: bool,
}

/// Progress of the in-flight query, sent from its background task
#[derive(Debug)]
pub enum QueryUpdate {
    Delta(StreamDelta),
    Finished {
        session: Session,
        result: Result<ChatResponse, ChatError>,
    },
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input box
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars

    // Chat pane
    pub messages: Vec<DisplayMessage>,
    pub query_loading: bool,
    pub query_scroll: u16,
    pub chat_height: u16, // inner size of the chat pane, updated on render
    pub chat_width: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub client: ChatClient,
    pub endpoint: String,
    /// Moved into the query task while a call is in flight
    pub session: Option<Session>,
    pub last_stats: Option<StreamStats>,
}

impl App {
    pub fn new(client: ChatClient, endpoint: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            query_input: String::new(),
            query_cursor: 0,
            messages: Vec::new(),
            query_loading: false,
            query_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            client,
            endpoint: endpoint.into(),
            session: Some(Session::new()),
            last_stats: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.get())
    }

    /// Send the input box contents to the backend on a background task
    pub fn submit_query(&mut self, tx: &UnboundedSender<AppEvent>) {
        let query = self.query_input.trim().to_string();
        if query.is_empty() || self.query_loading {
            return;
        }
        let Some(mut session) = self.session.take() else {
            return;
        };

        self.messages.push(DisplayMessage {
            role: ChatRole::User,
            content: query.clone(),
            streaming: false,
        });
        self.query_input.clear();
        self.query_cursor = 0;
        self.query_loading = true;
        self.scroll_to_bottom();

        tracing::info!(query_len = query.len(), "submitting query");

        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let delta_tx = tx.clone();
            let result = client
                .submit_query(&mut session, &query, move |delta| {
                    let _ = delta_tx.send(AppEvent::Query(QueryUpdate::Delta(delta)));
                })
                .await;
            let _ = tx.send(AppEvent::Query(QueryUpdate::Finished { session, result }));
        });
    }

    pub fn apply_update(&mut self, update: QueryUpdate) {
        match update {
            QueryUpdate::Delta(delta) => self.apply_delta(delta),
            QueryUpdate::Finished { session, result } => self.finish_query(session, result),
        }
    }

    /// Grow the trailing streaming reply, or start one
    pub fn apply_delta(&mut self, delta: StreamDelta) {
        if delta.delta.is_empty() {
            return;
        }
        match self.messages.last_mut() {
            Some(last) if last.role == ChatRole::Assistant && last.streaming => {
                last.content.push_str(&delta.delta);
            }
            _ => self.messages.push(DisplayMessage {
                role: delta.role,
                content: delta.delta,
                streaming: true,
            }),
        }
        self.scroll_to_bottom();
    }

    pub fn finish_query(&mut self, session: Session, result: Result<ChatResponse, ChatError>) {
        self.session = Some(session);
        self.query_loading = false;

        let streamed = match self.messages.last_mut() {
            Some(last) if last.role == ChatRole::Assistant && last.streaming => {
                last.streaming = false;
                true
            }
            _ => false,
        };

        match result {
            Ok(response) => {
                if !streamed && !response.response.is_empty() {
                    self.messages.push(DisplayMessage {
                        role: ChatRole::Assistant,
                        content: response.response,
                        streaming: false,
                    });
                }
                self.last_stats = Some(response.stats);
            }
            Err(err) => {
                tracing::error!(error = %err, "query failed");
                self.messages.push(DisplayMessage {
                    role: ChatRole::Assistant,
                    content: APOLOGY.to_string(),
                    streaming: false,
                });
            }
        }
        self.scroll_to_bottom();
    }

    /// Forget the session and clear the screen; ignored while a query is running
    pub fn new_conversation(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear();
            self.messages.clear();
            self.query_scroll = 0;
            self.last_stats = None;
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.query_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.query_scroll = self.query_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.query_scroll = self.query_scroll.saturating_add(lines).min(self.total_lines());
    }

    /// Wrapped line count of the chat pane, including the thinking indicator
    fn total_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: usize = 0;
        for msg in &self.messages {
            total += 1; // "You:" / "AI:"
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                total += char_count / wrap_width + 1;
            }
            total += 1; // blank separator
        }
        if self.query_loading {
            total += 2;
        }
        total.min(u16::MAX as usize) as u16
    }

    pub fn scroll_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.query_scroll = self.total_lines().saturating_sub(visible_height);
    }
}
