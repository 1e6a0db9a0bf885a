use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::session::StatsSnapshot;

/// Render the whole stats screen
pub fn render_stats(frame: &mut Frame, snapshot: &StatsSnapshot, model_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Active users
            Constraint::Length(4), // Counters
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    render_header(frame, chunks[0], snapshot, model_name);
    render_users_table(frame, chunks[1], snapshot);
    render_counters(frame, chunks[2], snapshot);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("Press "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" to refresh, "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" to quit"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, snapshot: &StatsSnapshot, model_name: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "User statistics",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ model: "),
        Span::styled(model_name.to_string(), Style::default().fg(Color::Green)),
        Span::raw(format!(" │ updated {}", snapshot.taken_at.format("%H:%M:%S"))),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_users_table(frame: &mut Frame, area: Rect, snapshot: &StatsSnapshot) {
    let block = Block::default()
        .title(format!(" Active users ({}) ", snapshot.active_users.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if snapshot.active_users.is_empty() {
        let empty = Paragraph::new("No messages yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = snapshot.active_users.iter().map(|(user, active)| {
        Row::new(vec![
            user.to_string(),
            active.display_name.clone(),
            active.last_seen.format("%H:%M:%S").to_string(),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(16),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Username", "Last seen"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block);

    frame.render_widget(table, area);
}

fn render_counters(frame: &mut Frame, area: Rect, snapshot: &StatsSnapshot) {
    let lines = vec![
        Line::from(vec![
            Span::raw("Messages from users: "),
            Span::styled(
                snapshot.total_sent.to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::raw("Messages from bot: "),
            Span::styled(
                snapshot.total_received.to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];

    let counters = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(counters, area);
}
