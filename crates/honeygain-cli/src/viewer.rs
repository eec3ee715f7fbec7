use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use honeygain_core::{JsonSource, PollReport, Poller};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Terminal;
use tokio::time::Instant;

use crate::state_label;

struct ViewerState {
    latest: Option<PollReport>,
    table: TableState,
}

impl ViewerState {
    fn new() -> Self {
        Self {
            latest: None,
            table: TableState::default(),
        }
    }

    fn update(&mut self, report: PollReport) {
        if self.table.selected().is_none() && !report.sensors.is_empty() {
            self.table.select(Some(0));
        }
        self.latest = Some(report);
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(len) = self.latest.as_ref().map(|r| r.sensors.len()).filter(|len| *len > 0) else {
            return;
        };
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }
}

pub async fn run_viewer<S: JsonSource>(poller: &mut Poller<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewerState::new();
    let mut next_poll = Instant::now();

    let run_result = async {
        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('r') => next_poll = Instant::now(),
                        KeyCode::Down | KeyCode::Char('j') => state.move_selection(1),
                        KeyCode::Up | KeyCode::Char('k') => state.move_selection(-1),
                        _ => {}
                    }
                }
            }

            if Instant::now() >= next_poll {
                let report = poller.tick().await;
                state.update(report);
                next_poll = Instant::now() + poller.interval();
            }

            let remaining = next_poll.saturating_duration_since(Instant::now());
            terminal.draw(|frame| draw_ui(frame.size(), frame, &mut state, remaining))?;
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn draw_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &mut ViewerState, remaining: Duration) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    frame.render_widget(render_header(state, remaining), rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    render_sensor_table(frame, body[0], state);
    frame.render_widget(render_attributes(state), body[1]);
}

fn render_header(state: &ViewerState, remaining: Duration) -> Paragraph<'static> {
    let mut lines = Vec::new();
    if let Some(report) = &state.latest {
        lines.push(Line::from(vec![
            Span::styled(
                "HoneyGain Sensors  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "poll #{} at {}  available={} unavailable={} poll_ms={}",
                report.cycle,
                report.ts.format("%Y-%m-%d %H:%M:%S"),
                report.available,
                report.unavailable,
                report.poll_ms
            )),
        ]));
        lines.push(Line::from(format!(
            "next poll in {}s  (j/k select, 'r' poll now, 'q' quit)",
            remaining.as_secs()
        )));
    } else {
        lines.push(Line::from("Waiting for first poll..."));
    }

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"))
}

fn render_sensor_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &mut ViewerState) {
    let rows: Vec<Row<'static>> = state
        .latest
        .as_ref()
        .map(|report| {
            report
                .sensors
                .iter()
                .map(|sensor| {
                    let (mark, color) = if sensor.available {
                        ("ok", Color::Green)
                    } else {
                        ("--", Color::Red)
                    };
                    Row::new(vec![
                        Cell::from(mark).style(Style::default().fg(color)),
                        Cell::from(sensor.name.clone()),
                        Cell::from(state_label(sensor)),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();

    let table = Table::new(
        rows,
        [Constraint::Length(3), Constraint::Percentage(60), Constraint::Percentage(40)],
    )
    .header(
        Row::new(vec!["", "Sensor", "State"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("Sensors"))
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, &mut state.table);
}

fn render_attributes(state: &ViewerState) -> Paragraph<'static> {
    let selected = state
        .latest
        .as_ref()
        .zip(state.table.selected())
        .and_then(|(report, idx)| report.sensors.get(idx));

    let Some(sensor) = selected else {
        return Paragraph::new("No sensor selected")
            .block(Block::default().borders(Borders::ALL).title("Attributes"));
    };

    let mut lines = vec![
        Line::from(format!("id: {}", sensor.unique_id)),
        Line::from(format!(
            "last update: {}",
            sensor
                .last_updated
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| "never".to_string())
        )),
        Line::from(""),
    ];

    match &sensor.attributes {
        Some(attributes) if !attributes.is_empty() => {
            for (key, value) in attributes {
                lines.push(Line::from(format!("{key}: {value}")));
            }
        }
        Some(_) => lines.push(Line::from("(no attributes)")),
        None => lines.push(Line::from("(sensor exposes no attributes)")),
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(sensor.name.clone()))
}
