//! The article detail dialog.
//!
//! Two states: [`DetailView::Closed`] and [`DetailView::Open`]. While open
//! the dialog owns all keyboard input and the list behind it does not
//! scroll; closing hands back the list position that was focused when the
//! dialog opened.

use ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailView {
    #[default]
    Closed,
    Open {
        article_id: String,
        /// List cursor to restore on close.
        return_focus: usize,
        /// Vertical scroll of the dialog body.
        scroll: u16,
    },
}

impl DetailView {
    /// Open `article_id`, remembering the focused list position.
    ///
    /// Returns `false` and changes nothing if a dialog is already open.
    pub fn open(&mut self, article_id: &str, focused: usize) -> bool {
        if self.is_open() {
            return false;
        }
        *self = DetailView::Open {
            article_id: article_id.to_string(),
            return_focus: focused,
            scroll: 0,
        };
        true
    }

    /// Close the dialog, returning the list position to refocus.
    pub fn close(&mut self) -> Option<usize> {
        match std::mem::take(self) {
            DetailView::Open { return_focus, .. } => Some(return_focus),
            DetailView::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DetailView::Open { .. })
    }

    pub fn article_id(&self) -> Option<&str> {
        match self {
            DetailView::Open { article_id, .. } => Some(article_id),
            DetailView::Closed => None,
        }
    }

    pub fn scroll(&self) -> u16 {
        match self {
            DetailView::Open { scroll, .. } => *scroll,
            DetailView::Closed => 0,
        }
    }

    /// Scroll the body by `delta` lines, staying within `0..=max`.
    pub fn scroll_by(&mut self, delta: i32, max: u16) {
        if let DetailView::Open { scroll, .. } = self {
            *scroll = (*scroll as i32 + delta).clamp(0, max as i32) as u16;
        }
    }
}

/// Where the dialog sits on a screen of size `screen`.
///
/// Centered, at most 90 columns wide and 80% of the height. Clicks outside
/// this rectangle land on the backdrop.
pub fn dialog_area(screen: Rect) -> Rect {
    let width = (screen.width.saturating_sub(4)).min(90);
    let height = (screen.height * 4 / 5).max(8).min(screen.height);
    Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    }
}

/// Whether `(column, row)` falls inside `area`.
pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_round_trip() {
        let mut view = DetailView::default();
        assert!(view.open("20240101-001", 3));
        assert_eq!(view.article_id(), Some("20240101-001"));

        assert_eq!(view.close(), Some(3));
        assert_eq!(view, DetailView::Closed);
        assert_eq!(view, DetailView::default());
    }

    #[test]
    fn test_only_one_open() {
        let mut view = DetailView::default();
        assert!(view.open("a", 0));
        assert!(!view.open("b", 1));
        assert_eq!(view.article_id(), Some("a"));
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut view = DetailView::default();
        assert_eq!(view.close(), None);
        assert!(!view.is_open());
    }

    #[test]
    fn test_scroll_clamps_at_zero_and_resets() {
        let mut view = DetailView::default();
        view.scroll_by(5, 10);
        assert_eq!(view.scroll(), 0);

        view.open("a", 0);
        view.scroll_by(2, 10);
        view.scroll_by(-5, 10);
        assert_eq!(view.scroll(), 0);
        view.scroll_by(4, 10);
        assert_eq!(view.scroll(), 4);

        view.close();
        view.open("b", 0);
        assert_eq!(view.scroll(), 0);
    }

    #[test]
    fn test_scroll_stops_at_max() {
        let mut view = DetailView::default();
        view.open("a", 0);
        for _ in 0..20 {
            view.scroll_by(1, 3);
        }
        assert_eq!(view.scroll(), 3);

        // A smaller limit (e.g. after a resize) pulls the offset back.
        view.scroll_by(0, 1);
        assert_eq!(view.scroll(), 1);
    }

    #[test]
    fn test_dialog_area_is_centered_and_inside() {
        let screen = Rect::new(0, 0, 120, 40);
        let area = dialog_area(screen);
        assert_eq!(area.width, 90);
        assert_eq!(area.height, 32);
        assert_eq!(area.x, 15);
        assert_eq!(area.y, 4);
        assert!(contains(area, 15, 4));
        assert!(!contains(area, 0, 0));
        assert!(!contains(area, 105, 4));
    }

    #[test]
    fn test_dialog_area_small_screen() {
        let screen = Rect::new(0, 0, 20, 6);
        let area = dialog_area(screen);
        assert!(area.width <= screen.width);
        assert!(area.height <= screen.height);
    }
}
