use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::mode::Mode;

/// Draw the whole interface from the navigation state. The listing window
/// starts at `app.anchor`; the event loop keeps the cursor inside it.
pub fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    let header = Paragraph::new(Spans::from(Span::styled(
        app.path.display().to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    f.render_widget(header, chunks[0]);

    draw_listing(f, chunks[1], app);
    draw_footer(f, chunks[2], app);

    if let Mode::Popup { lines, offset, .. } = &app.mode {
        draw_popup(f, lines, *offset);
    }
}

fn draw_listing<B: Backend>(f: &mut Frame<B>, area: Rect, app: &App) {
    let rows = area.height as usize;
    let start = app.anchor.min(app.items.len());
    let end = (start + rows).min(app.items.len());

    let items: Vec<ListItem> = app.items[start..end]
        .iter()
        .map(|item| {
            let style = if item.is_dir {
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(item.name.clone(), style)];
            if app.marked.contains(&item.path) {
                spans.push(Span::styled(
                    " *",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    if !app.items.is_empty() {
        state.select(Some(app.cursor.saturating_sub(start)));
    }

    let list =
        List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_footer<B: Backend>(f: &mut Frame<B>, area: Rect, app: &App) {
    match &app.mode {
        Mode::Prompt { title, line, error, .. } => {
            let text_style = if *error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            let paragraph = Paragraph::new(Spans::from(vec![
                Span::styled(
                    title.clone(),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ),
                Span::styled(line.text(), text_style),
            ]));
            f.render_widget(paragraph, area);

            let x = area.x
                + UnicodeWidthStr::width(title.as_str()) as u16
                + UnicodeWidthStr::width(line.before_cursor().as_str()) as u16;
            f.set_cursor(x.min(area.x + area.width.saturating_sub(1)), area.y);
        }
        Mode::Confirm { message, .. } | Mode::Popup { message, .. } => {
            let paragraph = Paragraph::new(Spans::from(Span::styled(
                format!("{message} (y/n): "),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )));
            f.render_widget(paragraph, area);
        }
        Mode::Browse => {
            if let Some(message) = &app.message {
                let paragraph = Paragraph::new(Spans::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                f.render_widget(paragraph, area);
            }
        }
    }
}

fn draw_popup<B: Backend>(f: &mut Frame<B>, lines: &[String], offset: usize) {
    let popup = centered_rect(60, 60, f.size());
    let block = Block::default().title("Marked items").borders(Borders::ALL);
    let inner_height = popup.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = lines
        .iter()
        .skip(offset)
        .take(inner_height)
        .map(|line| ListItem::new(Spans::from(Span::raw(line.clone()))))
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(Clear, popup);
    f.render_widget(list, popup);
}

/// Helper to create a centered rect using the given percentage width and height of the available rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let middle = vertical_chunks[1];
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(middle);
    horizontal_chunks[1]
}
