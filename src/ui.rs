pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::{
    action::Action,
    app::{App, AppState, ShownTimeline},
    attempt::AttemptPhase,
};

const HORIZONTAL_MARGIN: u16 = 2;
const TIMELINE_HEIGHT: u16 = 12;

fn action_color(action: Action) -> Color {
    match action {
        Action::Attack => Color::Red,
        Action::Axe => Color::Green,
        Action::Mace => Color::Cyan,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),               // status
                Constraint::Min(3),                  // transcript
                Constraint::Length(TIMELINE_HEIGHT), // timeline
                Constraint::Length(1),               // legend
            ])
            .split(area);

        let status = match self.state {
            AppState::Binding(action) => Span::styled(
                format!("binding {action}"),
                bold_style.fg(Color::Yellow),
            ),
            AppState::Attempting => {
                let stats = self.session.stats();
                let mean = stats
                    .current_mean()
                    .map(|m| format!("{:.2}%", m * 100.0))
                    .unwrap_or_else(|| "-".to_string());
                Span::styled(
                    format!(
                        "attempts {}   average {}   inputs {}",
                        stats.attempt_count(),
                        mean,
                        self.session.pending_inputs()
                    ),
                    bold_style,
                )
            }
        };
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        // newest lines at the bottom
        let visible = chunks[1].height.saturating_sub(2) as usize;
        let skip = self.transcript.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .transcript
            .iter()
            .skip(skip)
            .map(|l| Line::from(l.as_str()))
            .collect();
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Session"))
            .render(chunks[1], buf);

        match &self.timeline {
            Some(shown) => render_timeline(shown, chunks[2], buf),
            None => Paragraph::new(Span::styled("waiting for inputs", dim_style))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Timeline"))
                .render(chunks[2], buf),
        }

        let legend = match self.state {
            AppState::Binding(_) => "press a key or mouse button to bind / (esc)ape",
            AppState::Attempting if self.session.can_rebind() => "(backspace) rebind / (esc)ape",
            AppState::Attempting => "(esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[3], buf);
    }
}

fn render_timeline(shown: &ShownTimeline, area: Rect, buf: &mut Buffer) {
    let view = &shown.view;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let grid: Vec<[(f64, f64); 2]> = view
        .gridlines
        .iter()
        .map(|x| [(*x, -0.5), (*x, 2.5)])
        .collect();

    let mut datasets: Vec<Dataset> = grid
        .iter()
        .map(|line| {
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(line)
        })
        .collect();

    datasets.extend(view.series.iter().map(|(action, points)| {
        Dataset::default()
            .name(action.to_string())
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(action_color(*action)))
            .data(points)
    }));

    let title = match shown.report.phase {
        AttemptPhase::Incomplete => format!("Attempt {} incomplete", shown.report.ordinal),
        _ => format!(
            "Attempt {}: {:.2}%",
            shown.report.ordinal,
            shown.report.probability * 100.0
        ),
    };

    let x_labels = charting::axis_labels(view.x_bounds)
        .into_iter()
        .map(|l| Span::styled(l, bold_style))
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Input timing (±2 ticks)  {title}")),
        )
        .x_axis(
            Axis::default()
                .title("ms")
                .bounds(view.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([-0.5, 2.5])
                .labels(charting::lane_labels().map(|l| Span::styled(l, bold_style)).to_vec()),
        );

    chart.render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{Bind, Bindings, MouseButtonName};
    use crate::config::MemoryConfigStore;
    use crate::estimator::Estimator;
    use crate::app::DEFAULT_DISPLAY;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton};
    use std::time::{Duration, Instant};

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn bound_app(now: Instant) -> App {
        let mut binds = Bindings::default();
        binds.set(Action::Axe, Bind::from_key_code(KeyCode::Char('1')).unwrap());
        binds.set(Action::Mace, Bind::from_key_code(KeyCode::Char('2')).unwrap());
        binds.set(Action::Attack, Bind::Mouse(MouseButtonName::Left));
        App::new(
            Box::new(MemoryConfigStore::new(Some(binds))),
            Estimator::default(),
            DEFAULT_DISPLAY,
            false,
            now,
        )
    }

    #[test]
    fn capture_screen_shows_prompt() {
        let app = App::new(
            Box::new(MemoryConfigStore::new(None)),
            Estimator::default(),
            DEFAULT_DISPLAY,
            false,
            Instant::now(),
        );
        let text = rendered(&app, Rect::new(0, 0, 80, 30));
        assert!(text.contains("binding AXE"));
        assert!(text.contains("Press your AXE key or mouse button:"));
    }

    #[test]
    fn attempt_screen_shows_timeline() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut app = bound_app(t0);
        app.on_mouse(MouseButton::Left, t0 + ms(10));
        app.on_key(KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE), t0 + ms(12));
        app.on_mouse(MouseButton::Left, t0 + ms(70));
        app.on_key(KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE), t0 + ms(71));
        app.on_tick(t0 + ms(100));

        let text = rendered(&app, Rect::new(0, 0, 100, 40));
        assert!(text.contains("attempts 1"));
        assert!(text.contains("Attempt 1:"));
        assert!(text.contains("ATTACK"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let app = bound_app(Instant::now());
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }
}
