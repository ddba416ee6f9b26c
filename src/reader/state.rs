//! Reader UI state and input handling.
//!
//! All of the reader's mutable state lives in [`ReaderState`]. Key and mouse
//! events are applied here without touching the terminal, so the whole
//! interaction model is testable.

use super::detail::{DetailView, contains, dialog_area};
use super::feed::arrange;
use super::loader::LoadError;
use super::render::{card_at, detail_max_scroll};
use crate::models::{CategoryFilter, NewsArticle, NewsSnapshot};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(NewsSnapshot),
    Failed(String),
}

/// What the event loop should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    None,
    Quit,
    Reload,
}

#[derive(Debug, Clone, Default)]
pub struct ReaderState {
    pub load: LoadState,
    pub filter: CategoryFilter,
    /// Index into the arranged list.
    pub cursor: usize,
    pub detail: DetailView,
    /// Bumped on every reload so late results from an older load are dropped.
    pub generation: u64,
    pub spinner_frame: u8,
    /// Terminal size as of the last draw; used for hit-testing and scroll limits.
    pub viewport: Rect,
}

impl ReaderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything for a full reload and return the new generation.
    pub fn reload(&mut self) -> u64 {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            viewport: self.viewport,
            ..Self::default()
        };
        generation
    }

    /// Apply a finished load. Results from a superseded generation are ignored.
    pub fn finish_load(&mut self, generation: u64, result: Result<NewsSnapshot, LoadError>) {
        if generation != self.generation {
            return;
        }
        self.load = match result {
            Ok(snapshot) => LoadState::Loaded(snapshot),
            Err(e) => LoadState::Failed(e.to_string()),
        };
    }

    pub fn articles(&self) -> &[NewsArticle] {
        match &self.load {
            LoadState::Loaded(snapshot) => &snapshot.news,
            _ => &[],
        }
    }

    /// The list as currently displayed.
    pub fn visible(&self) -> Vec<&NewsArticle> {
        arrange(self.articles(), self.filter)
    }

    /// The article shown in the detail dialog, if open.
    pub fn open_article(&self) -> Option<&NewsArticle> {
        let id = self.detail.article_id()?;
        self.articles().iter().find(|a| a.id == id)
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if self.detail.is_open() || self.filter == filter {
            return;
        }
        self.filter = filter;
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.detail.is_open() {
            return;
        }
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Open the focused card.
    pub fn select(&mut self) {
        let cursor = self.cursor;
        let Some(id) = self.visible().get(cursor).map(|a| a.id.clone()) else {
            return;
        };
        self.detail.open(&id, cursor);
    }

    /// Close the dialog and refocus the card it was opened from.
    pub fn close_detail(&mut self) {
        if let Some(focus) = self.detail.close() {
            let len = self.visible().len();
            self.cursor = focus.min(len.saturating_sub(1));
        }
    }

    /// Record the terminal size, pulling the dialog scroll back within range.
    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.scroll_detail(0);
    }

    fn scroll_detail(&mut self, delta: i32) {
        let max = self
            .open_article()
            .map_or(0, |a| detail_max_scroll(a, self.viewport));
        self.detail.scroll_by(delta, max);
    }

    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ReaderAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ReaderAction::Quit;
        }

        if self.detail.is_open() {
            // The dialog holds focus: nothing reaches the list until it closes.
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') | KeyCode::Backspace => {
                    self.close_detail()
                }
                KeyCode::Down | KeyCode::Char('j') => self.scroll_detail(1),
                KeyCode::Up | KeyCode::Char('k') => self.scroll_detail(-1),
                _ => {}
            }
            return ReaderAction::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return ReaderAction::Quit,
            KeyCode::Char('r') if self.load != LoadState::Loading => return ReaderAction::Reload,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.set_filter(self.filter.next()),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.set_filter(self.filter.prev())
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.set_filter(CategoryFilter::TABS[index]);
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::PageDown => self.move_cursor(5),
            KeyCode::PageUp => self.move_cursor(-5),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.move_cursor(isize::MAX),
            KeyCode::Enter | KeyCode::Char(' ') => self.select(),
            _ => {}
        }
        ReaderAction::None
    }

    /// Left clicks: outside the open dialog closes it; on a card opens it.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.detail.is_open() {
            if !contains(dialog_area(self.viewport), mouse.column, mouse.row) {
                self.close_detail();
            }
            return;
        }
        let len = self.visible().len();
        if let Some(index) = card_at(self.viewport, mouse.column, mouse.row, self.cursor, len) {
            self.cursor = index;
            self.select();
        }
    }
}
