use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.scroll_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Query(update) => app.apply_update(update),
    }
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_conversation();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key, tx),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown | KeyCode::Char('d') => app.scroll_down(app.chat_height.max(2) / 2),
        KeyCode::PageUp | KeyCode::Char('u') => app.scroll_up(app.chat_height.max(2) / 2),
        KeyCode::Char('g') => app.query_scroll = 0,
        KeyCode::Char('G') => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_query(tx),
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if app.query_cursor < app.query_input.chars().count() {
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.query_input.chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => app.query_cursor = 0,
        KeyCode::End => app.query_cursor = app.query_input.chars().count(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
            app.query_input.insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_core::{ChatClient, Session, StreamDelta};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:9/agent"), "http://127.0.0.1:9/agent")
    }

    #[test]
    fn char_index_maps_to_utf8_bytes() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn editing_inserts_and_deletes_around_multibyte_chars() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app();

        for c in ['¿', 'q', 'u', 'é'] {
            handle_event(&mut app, key(KeyCode::Char(c)), &tx);
        }
        assert_eq!(app.query_input, "¿qué");

        handle_event(&mut app, key(KeyCode::Left), &tx);
        handle_event(&mut app, key(KeyCode::Backspace), &tx);
        assert_eq!(app.query_input, "¿qé");
        assert_eq!(app.query_cursor, 2);

        handle_event(&mut app, key(KeyCode::Home), &tx);
        handle_event(&mut app, key(KeyCode::Delete), &tx);
        assert_eq!(app.query_input, "qé");
    }

    #[test]
    fn escape_then_q_quits() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app();

        handle_event(&mut app, key(KeyCode::Char('q')), &tx);
        assert!(!app.should_quit, "q types into the input while editing");

        handle_event(&mut app, key(KeyCode::Esc), &tx);
        handle_event(&mut app, key(KeyCode::Char('q')), &tx);
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_n_starts_new_conversation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app();
        let mut session = Session::new();
        session.set("abc123");
        app.session = Some(session);
        app.apply_delta(StreamDelta::assistant("hello"));

        handle_event(&mut app, ctrl('n'), &tx);

        assert_eq!(app.session_id(), None);
        assert!(app.messages.is_empty());
    }

    #[test]
    fn query_updates_are_applied() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app();

        handle_event(
            &mut app,
            AppEvent::Query(crate::app::QueryUpdate::Delta(StreamDelta::assistant("Hi"))),
            &tx,
        );
        assert_eq!(app.messages[0].content, "Hi");
    }
}
