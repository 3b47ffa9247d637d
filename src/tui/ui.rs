//! Stateless rendering of a session view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crypta_trace::{
    ConnectionStatus, Domain, Outcome, PlaybackState, StepKind, Variable, ViewState,
};

use super::keys::HELP;

/// Draws the whole viewer.
pub fn draw(frame: &mut Frame, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Playback status
            Constraint::Min(10),   // Domains and assignments
            Constraint::Length(10), // Step log
            Constraint::Length(4), // Answer / errors / help
        ])
        .split(frame.area());

    draw_title(frame, chunks[0], view);
    draw_status(frame, chunks[1], view);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    draw_domains(frame, middle[0], view);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(middle[1]);
    draw_assignments(frame, side[0], view);
    draw_equations(frame, side[1], view);

    draw_log(frame, chunks[3], view);
    draw_footer(frame, chunks[4], view);
}

fn draw_title(frame: &mut Frame, area: Rect, view: &ViewState) {
    let puzzle = view
        .puzzle
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "no puzzle".to_string());
    let (outcome, color) = match view.outcome {
        Outcome::Pending => ("solving", Color::Yellow),
        Outcome::Solved => ("solved", Color::Green),
        Outcome::NoSolution => ("no solution", Color::Magenta),
    };
    let line = Line::from(vec![
        Span::styled(
            "Crypta Trace  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(puzzle, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[{}]", outcome), Style::default().fg(color)),
    ]);
    let title = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &ViewState) {
    let playback = &view.playback;
    let position = if playback.total_steps == 0 {
        "step -/0".to_string()
    } else {
        format!("step {}/{}", playback.current_index + 1, playback.total_steps)
    };
    let state_color = match playback.state {
        PlaybackState::Playing => Color::Green,
        PlaybackState::Finished => Color::Cyan,
        PlaybackState::Loading => Color::Yellow,
        PlaybackState::Paused | PlaybackState::Idle => Color::Gray,
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{:<9}", playback.state.to_string()),
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {}  speed {}% ({} ms)  ",
            position, playback.speed_percent, playback.period_ms
        )),
        Span::styled(
            backend_label(view),
            Style::default().fg(backend_color(view.backend)),
        ),
    ]);
    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Playback"));
    frame.render_widget(status, area);
}

/// Backend status, noting a live stream.
pub fn backend_label(view: &ViewState) -> String {
    if view.connected && view.backend == ConnectionStatus::Connected {
        "backend connected, streaming".to_string()
    } else {
        format!("backend {}", view.backend)
    }
}

fn backend_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Checking => Color::Yellow,
        ConnectionStatus::Disconnected => Color::Red,
        ConnectionStatus::Unknown => Color::Gray,
    }
}

/// Renders a domain as ten digit cells, candidates shown and the rest
/// dotted out.
pub fn domain_cells(domain: Domain) -> String {
    (0..=9u8)
        .map(|d| {
            if domain.contains(d) {
                char::from(b'0' + d)
            } else {
                '·'
            }
        })
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn draw_domains(frame: &mut Frame, area: Rect, view: &ViewState) {
    let current = view
        .current_letter
        .as_deref()
        .and_then(|l| l.parse::<Variable>().ok());

    let items: Vec<ListItem> = view
        .domains
        .iter()
        .map(|(variable, domain)| {
            let mut style = match domain.len() {
                0 => Style::default().fg(Color::Red),
                1 => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
            if Some(variable) == current {
                style = style.bg(Color::DarkGray);
            }
            let marker = if view.reconciled.contains(&variable) { "*" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>7} ", variable.to_string()), style),
                Span::styled(domain_cells(domain), style),
                Span::styled(format!(" {}", marker), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Domains"));
    frame.render_widget(list, area);
}

fn draw_assignments(frame: &mut Frame, area: Rect, view: &ViewState) {
    let items: Vec<ListItem> = view
        .assignments
        .iter()
        .enumerate()
        .map(|(i, assignment)| {
            let style = if view.reconciled.contains(&assignment.variable) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(format!("{:>2}. {}", i + 1, assignment), style))
        })
        .collect();

    let title = format!("Assignments ({})", view.assignments.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_equations(frame: &mut Frame, area: Rect, view: &ViewState) {
    let items: Vec<ListItem> = view
        .equations
        .iter()
        .map(|equation| {
            let style = if view.is_current_equation(equation) {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(equation.clone(), style))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Equations"));
    frame.render_widget(list, area);
}

/// Colour of a log line for each step kind.
pub fn step_color(kind: StepKind) -> Color {
    match kind {
        StepKind::Select => Color::Yellow,
        StepKind::Assign => Color::Green,
        StepKind::Backtrack => Color::Red,
        StepKind::SolutionFound => Color::Cyan,
        StepKind::NoSolution => Color::Magenta,
        StepKind::Progress => Color::Gray,
    }
}

fn draw_log(frame: &mut Frame, area: Rect, view: &ViewState) {
    let visible = usize::from(area.height.saturating_sub(2));
    let start = view.history.len().saturating_sub(visible);
    let first_index = (view.playback.current_index + 1).saturating_sub(view.history.len());

    let items: Vec<ListItem> = view.history[start..]
        .iter()
        .enumerate()
        .map(|(offset, record)| {
            let index = first_index + start + offset;
            let mut style = Style::default().fg(step_color(*record.kind()));
            if index == view.playback.current_index {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            ListItem::new(Span::styled(
                format!("{:>5} {}", index + 1, record.message()),
                style,
            ))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Solver log"));
    frame.render_widget(list, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &ViewState) {
    let mut lines = Vec::new();

    if let Some(error) = &view.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    match (&view.solution, view.outcome) {
        (Some(solution), _) if view.answer_visible => {
            let mut spans = vec![Span::styled(
                "Answer: ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )];
            if let Some(puzzle) = &view.puzzle {
                let [first, second, result] = puzzle.words();
                spans.push(Span::raw(format!(
                    "{} + {} = {}   ",
                    solution.spell(first),
                    solution.spell(second),
                    solution.spell(result)
                )));
            }
            spans.push(Span::raw(solution.to_string()));
            lines.push(Line::from(spans));
        }
        (None, Outcome::NoSolution) if view.at_final_step => {
            lines.push(Line::from(Span::styled(
                "The solver found no solution for this puzzle.",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )));
        }
        _ => {}
    }

    lines.push(Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))));

    let footer = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_label() {
        let mut view = ViewState::default();
        assert_eq!(backend_label(&view), "backend unknown");
        view.backend = ConnectionStatus::Disconnected;
        assert_eq!(backend_label(&view), "backend disconnected");
        view.backend = ConnectionStatus::Connected;
        view.connected = true;
        assert_eq!(backend_label(&view), "backend connected, streaming");
    }

    #[test]
    fn test_domain_cells() {
        assert_eq!(domain_cells(Domain::binary()), "0 1 · · · · · · · ·");
        assert_eq!(domain_cells(Domain::singleton(9)), "· · · · · · · · · 9");
    }
}
