//! Two-column pin diagram for one header.
//!
//! Pins are laid out the way they sit on the physical connector, odd pins on
//! the left and even pins on the right, with the current label next to each
//! number. Rows where both pins are unlisted are hidden.

use crate::board::HeaderState;
use crate::tui::theme::Theme;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Builds the diagram rows as fixed-width text lines.
///
/// Labels are aligned on the central pin-number gutter, so the lines can be
/// rendered centred as a block.
#[must_use]
pub fn diagram_lines(header: &HeaderState) -> Vec<String> {
    let rows = header.display_rows();

    let left_width = rows
        .iter()
        .map(|r| r.odd_label.len())
        .max()
        .unwrap_or(0);
    let right_width = rows
        .iter()
        .map(|r| r.even_label.len())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            format!(
                "{:>left_width$} ({:3}) .. ({:3}) {:<right_width$}",
                row.odd_label, row.odd_pin, row.even_pin, row.even_label
            )
        })
        .collect()
}

/// Number of terminal rows the diagram occupies, including its border.
#[must_use]
pub fn height(header: &HeaderState) -> u16 {
    header.display_rows().len() as u16 + 2
}

/// Renders the diagram with a titled border.
pub fn render(f: &mut Frame, area: Rect, header: &HeaderState, theme: &Theme) {
    let lines: Vec<Line> = diagram_lines(header)
        .into_iter()
        .map(Line::from)
        .collect();

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.text))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(header.name())
                .border_style(Style::default().fg(theme.primary)),
        );
    f.render_widget(paragraph, area);
}
