//! Pure view functions.
//!
//! Reads `&AppState` and draws to a ratatui frame; never mutates state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ticker_core::presenter::Segment;

use crate::state::AppState;

const STATUS_HEIGHT: u16 = 1;
const TICKER_HEIGHT: u16 = 3;
const LINK_HEIGHT: u16 = 1;

/// Colour of fully faded-out text.
const FADED: (u8, u8, u8) = (40, 40, 40);
/// Colour of fully visible text.
const VISIBLE: (u8, u8, u8) = (235, 235, 235);

const KEY_HINTS: &str =
    "space pause · n next · s start/stop · r restart · +/- interval · l links · q quit";

pub fn render(state: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(TICKER_HEIGHT),
            Constraint::Length(LINK_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_ticker(state, frame, chunks[1]);
    render_link(state, frame, chunks[2]);
    render_status_line(state, frame, chunks[4]);
}

/// Text colour for the given opacity.
pub fn fade_color(opacity: f32) -> Color {
    let t = opacity.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| -> u8 {
        (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
    };
    Color::Rgb(
        mix(FADED.0, VISIBLE.0),
        mix(FADED.1, VISIBLE.1),
        mix(FADED.2, VISIBLE.2),
    )
}

fn render_ticker(state: &AppState, frame: &mut Frame, area: Rect) {
    let Some(content) = &state.display.content else {
        let waiting = Paragraph::new("…")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(waiting, area);
        return;
    };

    let base = Style::default().fg(fade_color(state.display.opacity));
    let spans: Vec<Span> = content
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => Span::styled(text.clone(), base),
            Segment::Link { text, .. } => {
                Span::styled(text.clone(), base.add_modifier(Modifier::UNDERLINED))
            }
        })
        .collect();

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_link(state: &AppState, frame: &mut Frame, area: Rect) {
    let Some(href) = state
        .display
        .content
        .as_ref()
        .and_then(|content| content.link())
    else {
        return;
    };

    let link = Paragraph::new(href.to_string())
        .style(Style::default().fg(Color::Blue))
        .alignment(Alignment::Center);
    frame.render_widget(link, area);
}

fn render_status_line(state: &AppState, frame: &mut Frame, area: Rect) {
    let (label, color) = match (state.running, state.paused) {
        (false, _) => ("stopped", Color::Red),
        (true, true) => ("paused", Color::Yellow),
        (true, false) => ("running", Color::Green),
    };

    let mut spans = vec![
        Span::styled(format!(" {label} "), Style::default().fg(color)),
        Span::styled(
            format!("every {}s ", state.interval.as_secs_f32()),
            Style::default().fg(Color::Gray),
        ),
    ];

    if let Some(error) = &state.error {
        spans.push(Span::styled(
            format!("{error} "),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(last) = state.recent.back() {
        spans.push(Span::styled(
            format!("{last} "),
            Style::default().fg(Color::DarkGray),
        ));
    }

    spans.push(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Cell;
    use ticker_core::presenter::render as render_ticker_content;
    use ticker_core::{Settings, Ticker};

    use super::*;

    fn screen(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        terminal.draw(|frame| render(state, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(Cell::symbol)
            .collect()
    }

    #[test]
    fn test_fade_color_endpoints() {
        assert_eq!(fade_color(0.0), Color::Rgb(40, 40, 40));
        assert_eq!(fade_color(1.0), Color::Rgb(235, 235, 235));
        assert_eq!(fade_color(7.0), fade_color(1.0));
    }

    #[test]
    fn test_renders_ticker_and_link() {
        let mut state = AppState::new(&Settings::default(), true, false);
        let ticker = Ticker::new("Hallo Welt", "hw").with_link("https://example.com/x");
        state.display.content = Some(render_ticker_content("+++ %s +++ (%s)", &ticker, true));
        state.display.opacity = 1.0;

        let text = screen(&state);
        assert!(text.contains("+++ Hallo Welt +++ (hw)"));
        assert!(text.contains("https://example.com/x"));
        assert!(text.contains("running"));
    }

    #[test]
    fn test_status_line_shows_error() {
        let mut state = AppState::new(&Settings::default(), false, false);
        state.error = Some("Unknown setting".to_string());

        let text = screen(&state);
        assert!(text.contains("stopped"));
        assert!(text.contains("Unknown setting"));
    }
}
