use crate::shared::DisplayState;
use ratatui::layout::{Layout, Direction, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use super::grid::draw_pad_grid;
use super::mode::TuiState;

const HELP: &str = "1-9 step  \u{2190}\u{2192} page  \u{2191}\u{2193} voice  space play  bksp reset  -/= t tempo  [/] g gain  f route  l/h filter  ,/. c cutoff  ;/' q res  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Min(4),    // pad grid
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_header(frame, sections[0], state, ts);
    draw_pad_grid(frame, sections[1], &state.rows, state.selected_voice);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[2],
    );
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let (play_text, play_style) = if state.playing {
        ("PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        ("STOP", Style::default().fg(Color::Red))
    };
    let step = state
        .displayed_step
        .map_or_else(|| String::from("-"), |s| (s + 1).to_string());

    let mut top = Line::from(vec![
        Span::styled(play_text, play_style),
        Span::raw(format!("  {:.0} bpm  step {step}  filter {}", state.tempo, state.filter_text)),
    ]);
    if ts.last_page() > 0 {
        let (first, end) = ts.page_range();
        top.push_span(Span::styled(
            format!("  keys: steps {}-{}", first + 1, end),
            Style::default().fg(Color::Cyan),
        ));
    }
    let status = Line::from(Span::styled(
        state.status_text.clone(),
        Style::default().fg(Color::Yellow),
    ));

    let block = Block::bordered().title(format!(" beatseq: {} ", state.kit_name));
    frame.render_widget(Paragraph::new(vec![top, status]).block(block), area);
}
