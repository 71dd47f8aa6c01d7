use crate::shared::{PadHighlight, VoiceRow};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

const NAME_WIDTH: u16 = 16;

// one row per voice: a label column then one pad per step
pub fn draw_pad_grid(frame: &mut Frame, area: Rect, rows: &[VoiceRow], selected_voice: usize) {
    if rows.is_empty() {
        return;
    }
    let row_constraints = vec![Constraint::Ratio(1, rows.len() as u32); rows.len()];
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (voice, (row, row_area)) in rows.iter().zip(row_areas.iter()).enumerate() {
        let steps = row.cells.len().max(1);
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAME_WIDTH), Constraint::Min(0)])
            .split(*row_area);

        frame.render_widget(voice_label(row, voice == selected_voice), split[0]);

        let col_constraints = vec![Constraint::Ratio(1, steps as u32); steps];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(split[1]);

        for (step, cell_area) in cols.iter().enumerate() {
            let armed = row.cells.get(step).copied().unwrap_or(false);
            let highlight = row.highlight.get(step).copied().unwrap_or_default();
            let style = pad_style(armed, highlight);
            let block = Block::bordered().border_style(style).style(style);
            frame.render_widget(block, *cell_area);
        }
    }
}

fn voice_label(row: &VoiceRow, selected: bool) -> Paragraph<'static> {
    let marker = if selected { "> " } else { "  " };
    let mut name_style = Style::default();
    if selected {
        name_style = name_style.add_modifier(Modifier::BOLD);
    }
    if !row.loaded {
        name_style = name_style.fg(Color::DarkGray); // no sample, will stay silent
    }
    let route = if row.filtered { " ~" } else { "" };
    Paragraph::new(vec![
        Line::from(Span::styled(format!("{marker}{}", row.name), name_style)),
        Line::from(Span::styled(
            format!("  {:.2}{route}", row.gain),
            Style::default().fg(Color::Gray),
        )),
    ])
}

// playing beats armed beats idle
fn pad_style(armed: bool, highlight: PadHighlight) -> Style {
    match (armed, highlight) {
        (true, PadHighlight::Playing) => Style::default().fg(Color::White).bg(Color::LightMagenta),
        (false, PadHighlight::Playing) => Style::default().fg(Color::LightMagenta).bg(Color::Magenta),
        (true, PadHighlight::Off) => Style::default().fg(Color::Yellow).bg(Color::Rgb(90, 70, 0)),
        (false, PadHighlight::Off) => Style::default().fg(Color::DarkGray),
    }
}
