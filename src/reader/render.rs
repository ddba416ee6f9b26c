//! Drawing the reader with ratatui.
//!
//! The screen is a header, a body and a one-line footer. The body shows
//! loading, error, empty or feed content; the feed is a stats line, the
//! category tabs and the card list. The detail dialog is drawn last, over
//! everything else.
//!
//! Card list geometry ([`list_area`], [`first_visible`], [`card_at`]) and the
//! dialog's scroll limit ([`detail_max_scroll`]) are public so input
//! handling hit-tests against exactly what is drawn.

use std::borrow::Cow;
use std::rc::Rc;

use super::detail::{contains, dialog_area};
use super::feed::{category_count, high_count};
use super::state::{LoadState, ReaderState};
use crate::format::{DateFormat, format_date};
use crate::models::{Category, CategoryFilter, NewsArticle, NewsSnapshot};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

/// Rows per card, including the blank separator line.
pub const CARD_HEIGHT: u16 = 5;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

fn category_color(category: Category) -> Color {
    match category {
        Category::Model => Color::LightRed,
        Category::Service => Color::Yellow,
        Category::Other => Color::Gray,
    }
}

/// Header, body, footer.
fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area)
}

/// Stats line, tabs, card list.
fn feed_layout(body: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(body)
}

/// Where the card list is drawn on a screen of size `screen`.
pub fn list_area(screen: Rect) -> Rect {
    feed_layout(screen_layout(screen)[1])[2]
}

fn cards_per_page(height: u16) -> usize {
    (height / CARD_HEIGHT).max(1) as usize
}

/// Index of the first card shown when `cursor` is focused in a list
/// `height` rows tall. The list scrolls just enough to keep the cursor on
/// screen.
pub fn first_visible(cursor: usize, height: u16) -> usize {
    (cursor + 1).saturating_sub(cards_per_page(height))
}

/// The card under `(column, row)`, if any, for a list of `len` cards.
pub fn card_at(screen: Rect, column: u16, row: u16, cursor: usize, len: usize) -> Option<usize> {
    let area = list_area(screen);
    if !contains(area, column, row) {
        return None;
    }
    let slot = ((row - area.y) / CARD_HEIGHT) as usize;
    if slot >= cards_per_page(area.height) {
        return None;
    }
    let index = first_visible(cursor, area.height) + slot;
    (index < len).then_some(index)
}

/// Furthest the detail dialog can scroll for `article` on `screen`: the
/// wrapped body height minus the rows inside the border.
pub fn detail_max_scroll(article: &NewsArticle, screen: Rect) -> u16 {
    let area = dialog_area(screen);
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;
    if inner_width == 0 {
        return 0;
    }
    let lines = Paragraph::new(detail_lines(article))
        .wrap(Wrap { trim: false })
        .line_count(inner_width);
    lines.saturating_sub(inner_height).min(u16::MAX as usize) as u16
}

pub fn draw(f: &mut Frame, state: &ReaderState) {
    let chunks = screen_layout(f.area());

    draw_header(f, state, chunks[0]);
    match &state.load {
        LoadState::Loading => draw_loading(f, state, chunks[1]),
        LoadState::Failed(message) => draw_error(f, message, chunks[1]),
        LoadState::Loaded(snapshot) if snapshot.news.is_empty() => draw_empty(f, chunks[1]),
        LoadState::Loaded(snapshot) => draw_feed(f, state, snapshot, chunks[1]),
    }
    draw_footer(f, state, chunks[2]);

    if let Some(article) = state.open_article() {
        draw_detail(f, article, state.detail.scroll());
    }
}

fn draw_header(f: &mut Frame, state: &ReaderState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " AI PULSE ",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" AI Industry News Tracker", Style::default().fg(Color::DarkGray)),
    ];
    if let LoadState::Loaded(snapshot) = &state.load {
        if !snapshot.last_updated.is_empty() {
            spans.push(Span::styled(
                format!("  |  Last updated: {}", format_date(&snapshot.last_updated, DateFormat::Full)),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let para = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(para, area);
}

fn draw_loading(f: &mut Frame, state: &ReaderState, area: Rect) {
    let ch = SPINNER_FRAMES[(state.spinner_frame as usize) % SPINNER_FRAMES.len()];
    let para = Paragraph::new(vec![
        Line::raw(""),
        Line::from(Span::styled(format!("{ch} Loading..."), Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(para, area);
}

fn draw_error(f: &mut Frame, message: &str, area: Rect) {
    let para = Paragraph::new(vec![
        Line::raw(""),
        Line::from(Span::styled(
            "Failed to load",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw(" Reload"),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_empty(f: &mut Frame, area: Rect) {
    let para = Paragraph::new(vec![
        Line::raw(""),
        Line::from(Span::styled("No news yet", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "New articles will appear after the next collection run",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(para, area);
}

fn draw_feed(f: &mut Frame, state: &ReaderState, snapshot: &NewsSnapshot, area: Rect) {
    let chunks = feed_layout(area);

    let high = high_count(&snapshot.news);
    let stats = Line::from(vec![
        Span::styled(
            format!(" {}", snapshot.news.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(" articles   ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            high.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if high == 1 { " key story" } else { " key stories" },
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(stats), chunks[0]);

    draw_tabs(f, state, &snapshot.news, chunks[1]);

    let visible = state.visible();
    if visible.is_empty() {
        let para = Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::styled(
                "No articles in this category",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(para, chunks[2]);
        return;
    }

    let width = chunks[2].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible.iter().map(|a| card(a, width)).collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 46)))
        .highlight_symbol("▌ ");

    let mut list_state = ListState::default()
        .with_offset(first_visible(state.cursor, chunks[2].height))
        .with_selected(Some(state.cursor));
    f.render_stateful_widget(list, chunks[2], &mut list_state);
}

fn draw_tabs(f: &mut Frame, state: &ReaderState, news: &[NewsArticle], area: Rect) {
    let titles: Vec<Line> = CategoryFilter::TABS
        .iter()
        .enumerate()
        .map(|(i, filter)| {
            if *filter == state.filter {
                Line::from(format!("{} {} ({})", i + 1, filter.label(), category_count(news, *filter)))
            } else {
                Line::from(format!("{} {}", i + 1, filter.label()))
            }
        })
        .collect();
    let selected = CategoryFilter::TABS
        .iter()
        .position(|f| *f == state.filter)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(tabs, area);
}

fn card(article: &NewsArticle, width: usize) -> ListItem<'static> {
    let color = category_color(article.category);
    let mut meta = vec![Span::styled(
        format!("[{}]", article.category.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if article.is_high() {
        meta.push(Span::styled(
            " ★ KEY",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    meta.push(Span::styled(
        format!("  {}", format_date(&article.published_at, DateFormat::Short)),
        Style::default().fg(Color::DarkGray),
    ));

    let title_style = if article.is_high() {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    ListItem::new(vec![
        Line::from(meta),
        Line::from(Span::styled(truncate_with_ellipsis(&article.title, width).into_owned(), title_style)),
        Line::from(Span::styled(
            truncate_with_ellipsis(&article.summary, width).into_owned(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(article.source_name.clone(), Style::default().fg(Color::DarkGray))),
        Line::raw(""),
    ])
}

fn detail_lines(article: &NewsArticle) -> Vec<Line<'static>> {
    let color = category_color(article.category);
    let mut meta = vec![Span::styled(
        format!("[{}]", article.category.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if article.is_high() {
        meta.push(Span::styled(
            "  ★ Key story",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    meta.push(Span::styled(
        format!("  {}", format_date(&article.published_at, DateFormat::Long)),
        Style::default().fg(Color::DarkGray),
    ));

    vec![
        Line::from(meta),
        Line::raw(""),
        Line::from(Span::styled(
            article.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(article.summary.clone()),
        Line::raw(""),
        Line::from(Span::styled("SOURCE", Style::default().fg(Color::DarkGray))),
        Line::raw(article.source_name.clone()),
        Line::from(Span::styled(
            article.url.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        )),
    ]
}

fn draw_detail(f: &mut Frame, article: &NewsArticle, scroll: u16) {
    let area = dialog_area(f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Article ")
        .title_bottom(Line::from(" [Esc] close  [j/k] scroll ").right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(category_color(article.category)));
    let para = Paragraph::new(detail_lines(article))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(para, area);
}

fn draw_footer(f: &mut Frame, state: &ReaderState, area: Rect) {
    let line = if state.detail.is_open() {
        Line::from(vec![
            Span::styled("  [Esc]", Style::default().fg(Color::Yellow)),
            Span::raw(" close  "),
            Span::styled("[j/k]", Style::default().fg(Color::Yellow)),
            Span::raw(" scroll  "),
        ])
    } else {
        Line::from(vec![
            Span::styled("  [q]", Style::default().fg(Color::Yellow)),
            Span::raw("uit  "),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw("eload  "),
            Span::styled("[Tab/1-4]", Style::default().fg(Color::Yellow)),
            Span::raw(" filter  "),
            Span::styled("[j/k]", Style::default().fg(Color::Yellow)),
            Span::raw(" move  "),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::raw(" open  "),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::loader::LoadError;
    use crate::reader::state::tests::{key, loaded};
    use crossterm::event::KeyCode;
    use ratatui::{Terminal, backend::TestBackend};
    use reqwest::StatusCode;

    fn render(state: &ReaderState) -> String {
        render_sized(state, 100, 30)
    }

    fn render_sized(state: &ReaderState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer[(x, y)].symbol());
            }
            screen.push('\n');
        }
        screen
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte_chars() {
        assert_eq!(truncate_with_ellipsis("新モデル発表のお知らせ", 6), "新モデ...");
    }

    #[test]
    fn test_loading_screen() {
        let screen = render(&ReaderState::new());
        assert!(screen.contains("Loading..."));
    }

    #[test]
    fn test_high_importance_rendered_first() {
        let screen = render(&loaded());
        let high = screen.find("Title 20240101-001").expect("high article shown");
        let normal = screen.find("Title 20240101-002").expect("normal article shown");
        assert!(high < normal);
        assert!(screen.contains("3 articles"));
        assert!(screen.contains("1 key story "));
        assert!(screen.contains("All (3)"));
    }

    #[test]
    fn test_scrolled_list_matches_hit_test_offset() {
        use crate::models::Importance;
        use crate::models::fixtures::article;

        let mut state = ReaderState::new();
        let news = (1..=9)
            .map(|i| {
                let id = format!("202401{i:02}-001");
                article(&id, Category::Other, Importance::Normal, &format!("2024-01-{i:02}T00:00:00Z"))
            })
            .collect();
        state.finish_load(0, Ok(NewsSnapshot { last_updated: String::new(), news }));
        state.handle_key(key(KeyCode::End));

        let screen = Rect::new(0, 0, 80, 21);
        assert_eq!(first_visible(state.cursor, list_area(screen).height), 7);

        // Display order is newest first, so index 7 is Jan 2 and index 8 is Jan 1.
        let out = render_sized(&state, 80, 21);
        assert!(out.contains("Title 20240102-001"));
        assert!(out.contains("Title 20240101-001"));
        assert!(!out.contains("Title 20240103-001"));
        assert!(out.contains("0 key stories"));
    }

    #[test]
    fn test_card_at_maps_rows_to_cards() {
        let screen = Rect::new(0, 0, 100, 30);
        let list = list_area(screen);
        assert_eq!(card_at(screen, list.x, list.y, 0, 3), Some(0));
        assert_eq!(card_at(screen, list.x, list.y + CARD_HEIGHT - 1, 0, 3), Some(0));
        assert_eq!(card_at(screen, list.x, list.y + 2 * CARD_HEIGHT, 0, 3), Some(2));
        assert_eq!(card_at(screen, list.x, list.y + 3 * CARD_HEIGHT, 0, 3), None);
        assert_eq!(card_at(screen, 0, 0, 0, 3), None);
    }

    #[test]
    fn test_error_screen_shows_status_and_reload() {
        let mut state = ReaderState::new();
        state.finish_load(0, Err(LoadError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        let screen = render(&state);
        assert!(screen.contains("Failed to load"));
        assert!(screen.contains("500"));
        assert!(screen.contains("[r] Reload"));
    }

    #[test]
    fn test_empty_snapshot_shows_empty_state() {
        let mut state = ReaderState::new();
        state.finish_load(
            0,
            Ok(NewsSnapshot {
                last_updated: "2024-01-01T00:00:00Z".to_string(),
                news: vec![],
            }),
        );
        let screen = render(&state);
        assert!(screen.contains("No news yet"));
        assert!(!screen.contains("All ("));
        assert!(!screen.contains("Failed to load"));
    }

    #[test]
    fn test_empty_category_is_distinct_from_empty_snapshot() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char('4')));
        let screen = render(&state);
        assert!(screen.contains("No articles in this category"));
        assert!(screen.contains("Other (0)"));
        assert!(!screen.contains("No news yet"));
    }

    #[test]
    fn test_detail_open_then_closed_matches_initial_screen() {
        let mut state = loaded();
        let before = render(&state);

        state.handle_key(key(KeyCode::Enter));
        let open = render(&state);
        assert!(open.contains(" Article "));
        assert!(open.contains("https://example.com/20240101-001"));

        state.handle_key(key(KeyCode::Esc));
        assert_eq!(render(&state), before);
    }
}
