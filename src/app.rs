use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

use crate::dom::NodeId;
use crate::render::{Action, Click, PendingEdit, Renderer};
use crate::storage::KeyValueStore;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    EditPrompt,
    Help,
}

/// Characters a `number` input accepts
fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

pub struct App<S> {
    pub renderer: Renderer<S>,
    pub theme: Theme,
    pub popup: Popup,

    // Index into the renderer's focusable elements
    pub focus: usize,

    // Edit prompt
    pub pending_edit: Option<PendingEdit>,
    pub prompt_buffer: String,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    pub status_timeout: Duration,

    // Shown whenever no status message is up, e.g. when nothing is being saved
    pub notice: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(renderer: Renderer<S>, theme: Theme, status_timeout: Duration) -> Self {
        Self {
            renderer,
            theme,
            popup: Popup::None,
            focus: 0,
            pending_edit: None,
            prompt_buffer: String::new(),
            status_message: None,
            status_message_time: None,
            status_timeout,
            notice: None,
        }
    }

    /// Set a status message (auto-clears after the configured timeout)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn focused_node(&self) -> Option<NodeId> {
        self.renderer.focusable().get(self.focus).copied()
    }

    /// Whether the focused element is a `number` input
    fn focused_number_input(&self) -> Option<NodeId> {
        let node = self.focused_node()?;
        let el = self.renderer.document().get(node)?;
        (el.tag == "input" && el.input_type.as_deref() == Some("number")).then_some(node)
    }

    fn clamp_focus(&mut self) {
        let count = self.renderer.focusable().len();
        if count == 0 {
            self.focus = 0;
        } else if self.focus >= count {
            self.focus = count - 1;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.renderer.focusable().len();

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if count > 0 {
                    self.focus = (self.focus + 1) % count;
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if count > 0 {
                    self.focus = self.focus.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Backspace => {
                if self.focused_number_input().is_some() {
                    let mut value = self.renderer.input_value()?;
                    value.pop();
                    self.renderer.set_input_value(Some(&value))?;
                }
            }
            KeyCode::Char(c) if is_number_char(c) && self.focused_number_input().is_some() => {
                let mut value = self.renderer.input_value()?;
                value.push(c);
                self.renderer.set_input_value(Some(&value))?;
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate()?,
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::EditPrompt => self.handle_prompt_key(key),
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            Popup::None => Ok(()),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.close_prompt(false),
            KeyCode::Enter => self.close_prompt(true),
            KeyCode::Backspace => {
                self.prompt_buffer.pop();
                Ok(())
            }
            KeyCode::Char(c) => {
                self.prompt_buffer.push(c);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn close_prompt(&mut self, submit: bool) -> Result<()> {
        self.popup = Popup::None;
        let answer = std::mem::take(&mut self.prompt_buffer);
        if let Some(pending) = self.pending_edit.take() {
            let answer = submit.then_some(answer);
            self.renderer.finish_edit(pending, answer)?;
            self.clamp_focus();
        }
        Ok(())
    }

    /// Press the focused element
    fn activate(&mut self) -> Result<()> {
        let node = match self.focused_node() {
            Some(node) => node,
            None => return Ok(()),
        };
        let action = self.renderer.document().get(node).and_then(|el| el.on_click);
        let before = self.renderer.tracker().len();

        let click = self.renderer.click(node);
        self.clamp_focus();
        match click? {
            Click::Prompt(pending) => {
                self.prompt_buffer = pending.seed.clone();
                self.pending_edit = Some(pending);
                self.popup = Popup::EditPrompt;
            }
            Click::Handled => {
                let after = self.renderer.tracker().len();
                match action {
                    Some(Action::Add(kind)) if after > before => {
                        if let Some(record) = self.renderer.tracker().get(0) {
                            self.set_status(format!("Added {} ({})", record.label(), kind));
                        }
                    }
                    Some(Action::Delete(_)) if after < before => self.set_status("Record deleted"),
                    _ => {}
                }
            }
            Click::Ignored => {}
        }
        Ok(())
    }

    pub fn tick(&mut self) {
        // Clear status message after the timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= self.status_timeout {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::render::{EMPTY_TEXT, INVALID_AMOUNT_MESSAGE, MOUNT_POINT_ID};
    use crate::storage::MemoryStore;
    use crate::tracker::CalorieTracker;
    use crossterm::event::KeyModifiers;

    fn app() -> App<MemoryStore> {
        let doc = Document::with_mount_point(MOUNT_POINT_ID);
        let mut renderer = Renderer::mount(doc, CalorieTracker::load(MemoryStore::new())).unwrap();
        renderer.init().unwrap();
        App::new(renderer, Theme::default(), Duration::from_secs(3))
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_only_accepts_number_chars() {
        let mut app = app();
        type_text(&mut app, "5x0a0");
        assert_eq!(app.renderer.input_value().unwrap(), "500");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.renderer.input_value().unwrap(), "50");
    }

    #[test]
    fn test_add_then_edit_through_prompt() {
        let mut app = app();
        type_text(&mut app, "500");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.renderer.list_texts().unwrap(), vec!["+500 calories"]);
        assert!(app.status_message.as_deref().unwrap().starts_with("Added +500 calories"));

        // input, gained, burned, edit, delete
        assert_eq!(app.renderer.focusable().len(), 5);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup, Popup::EditPrompt);
        assert_eq!(app.prompt_buffer, "500");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "750");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.renderer.list_texts().unwrap(), vec!["+750 calories"]);
    }

    #[test]
    fn test_prompt_escape_cancels() {
        let mut app = app();
        type_text(&mut app, "200");
        // Focus wraps backwards from the input to the burned button
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.renderer.list_texts().unwrap(), vec!["-200 calories"]);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup, Popup::EditPrompt);
        type_text(&mut app, "9");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.popup, Popup::None);
        assert!(app.pending_edit.is_none());
        assert_eq!(app.renderer.list_texts().unwrap(), vec!["-200 calories"]);
    }

    #[test]
    fn test_invalid_add_shows_message() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.renderer.error_message().unwrap(), INVALID_AMOUNT_MESSAGE);
        assert_eq!(app.renderer.details_text().unwrap(), EMPTY_TEXT);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_delete_clamps_focus() {
        let mut app = app();
        type_text(&mut app, "100");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        app.focus = 4;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.renderer.details_text().unwrap(), EMPTY_TEXT);
        assert_eq!(app.focus, 2);
        assert_eq!(app.status_message.as_deref(), Some("Record deleted"));
    }

    #[test]
    fn test_help_popup_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.popup, Popup::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_status_clears_after_timeout() {
        let mut app = app();
        app.status_timeout = Duration::ZERO;
        app.set_status("Record deleted");
        app.tick();
        assert!(app.status_message.is_none());
    }
}
