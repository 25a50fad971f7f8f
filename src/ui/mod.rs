mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::storage::KeyValueStore;
use components::ElementPainter;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(6),    // Tracker box
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_tracker_box(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::EditPrompt => draw_edit_prompt(f, app),
        Popup::Help => draw_help_popup(f, app),
    }
}

fn draw_info_line<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let theme = &app.theme;
    // Priority: status message > notice > totals
    let line = if let Some(ref status) = app.status_message {
        let color = if status.starts_with("Error") { theme.danger } else { theme.accent };
        Line::from(Span::styled(status.clone(), Style::default().fg(color)))
    } else if let Some(ref notice) = app.notice {
        Line::from(Span::styled(notice.clone(), Style::default().fg(theme.danger)))
    } else if app.renderer.tracker().is_empty() {
        Line::from(Span::styled("Ready", Style::default().fg(theme.text_dim)))
    } else {
        Line::from(Span::styled(app.renderer.summary(), Style::default().fg(theme.text_dim)))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_tracker_box<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let theme = &app.theme;
    let active = app.popup == Popup::None;
    let border_color = if active { theme.accent } else { theme.inactive };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let painter = ElementPainter::new(app.renderer.document(), theme, app.focused_node());
    let lines = painter.lines(app.renderer.container());

    // Keep the focused row visible on short terminals
    let inner_height = area.height.saturating_sub(2) as usize;
    let focus_row = lines
        .iter()
        .position(|l| l.spans.iter().any(|s| s.style.bg == Some(theme.bg_selected) || s.content == "▸ "))
        .unwrap_or(0);
    let scroll = focus_row.saturating_sub(inner_height.saturating_sub(1));

    let content = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));

    f.render_widget(content, area);
}

fn draw_footer<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let theme = &app.theme;
    let hints: Vec<(&str, &str)> = match app.popup {
        Popup::EditPrompt => vec![("Enter", "Save"), ("Esc", "Cancel")],
        Popup::Help => vec![("Esc", "Close")],
        Popup::None => vec![
            ("Tab/↑↓", "Focus"),
            ("Enter", "Press"),
            ("0-9", "Amount"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_edit_prompt<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 80 } else { 50 }, 20, area);
    let popup_area = Rect {
        height: popup_area.height.max(5),
        ..popup_area
    }
    .intersection(area);

    f.render_widget(Clear, popup_area);

    let label = app
        .pending_edit
        .as_ref()
        .map(|p| p.label)
        .unwrap_or_default();

    let input = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{}_", app.prompt_buffer), Style::default().fg(theme.text)),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(format!(" {} ", label), Style::default().fg(theme.accent)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent)),
    )
    .alignment(Alignment::Center);

    f.render_widget(input, popup_area);
}

fn draw_help_popup<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 80 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str| Span::styled(format!("  {:<12}", k), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    let desc = |d: &'static str| Span::styled(d, Style::default().fg(theme.text));

    let help = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![key("Tab / ↓"), desc("Next field or button")]),
        Line::from(vec![key("S-Tab / ↑"), desc("Previous field or button")]),
        Line::from(vec![key("0-9 . - e"), desc("Type an amount in the input")]),
        Line::from(vec![key("Backspace"), desc("Delete last character")]),
        Line::from(vec![key("Enter/Space"), desc("Press the focused button")]),
        Line::from(vec![key("?"), desc("Toggle this help")]),
        Line::from(vec![key("q / Ctrl-C"), desc("Quit")]),
        Line::from(""),
        Line::from(Span::styled(
            "  Records are saved after every change.",
            Style::default().fg(theme.text_dim),
        )),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Help ", Style::default().fg(theme.accent)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent)),
    );

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
