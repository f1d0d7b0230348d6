//! Report table widget and inline rendering

use super::ThemeColors;
use crate::report::SessionReport;
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
    Terminal, TerminalOptions, Viewport,
};
use std::io;

/// Column titles, in display order
const HEADERS: [&str; 6] = ["Code", "Key", "Count", "Mean (us)", "Min (us)", "Stdev (us)"];

/// Ranked keys as a bordered table
pub struct ReportTable<'a> {
    report: &'a SessionReport,
    colors: ThemeColors,
}

impl<'a> ReportTable<'a> {
    pub fn new(report: &'a SessionReport, colors: ThemeColors) -> Self {
        Self { report, colors }
    }

    /// Rows needed to show the whole table: borders, header, rows
    pub fn height(&self) -> u16 {
        let rows = self.report.rows.len().max(1);
        u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
    }

    fn row_style(&self, index: usize) -> Style {
        let last = self.report.rows.len().saturating_sub(1);
        if index == 0 {
            Style::default().fg(self.colors.green)
        } else if index == last {
            Style::default().fg(self.colors.yellow)
        } else {
            Style::default().fg(self.colors.fg)
        }
    }
}

impl Widget for ReportTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
            Style::default()
                .fg(self.colors.cyan)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = self
            .report
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Row::new(vec![
                    Cell::from(row.key.to_string()),
                    Cell::from(row.name.clone()),
                    Cell::from(row.count.to_string()),
                    Cell::from(format!("{:.1}", row.mean)),
                    Cell::from(row.min.to_string()),
                    Cell::from(format!("{:.1}", row.stdev)),
                ])
                .style(self.row_style(i))
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(11),
        ];

        let block = Block::default()
            .title(" Press-to-press timing ")
            .title_bottom(Line::from(format!(" {} ", self.report.footer())))
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(self.colors.dim));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1);

        Widget::render(table, area, buf);
    }
}

/// Draw the report table below the cursor without taking over the screen
pub fn print_report_table(report: &SessionReport, colors: ThemeColors) -> io::Result<()> {
    let table = ReportTable::new(report, colors);
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(table.height()),
        },
    )?;
    terminal.draw(|frame| frame.render_widget(table, frame.area()))?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyCode;
    use crate::timing::{CollectSummary, ReportRow};
    use std::time::Instant;

    fn report(names: &[&str]) -> SessionReport {
        let rows = names
            .iter()
            .enumerate()
            .map(|(i, name)| ReportRow {
                key: KeyCode(30 + i as u16),
                name: name.to_string(),
                count: 3,
                mean: 200_000.0,
                min: 150_000,
                stdev: 1_000.0 * (i + 1) as f64,
            })
            .collect();
        SessionReport::from_rows(Instant::now(), &CollectSummary::default(), names.len(), rows)
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn height_covers_rows_and_chrome() {
        let r = report(&["A", "S", "D"]);
        assert_eq!(ReportTable::new(&r, ThemeColors::dark()).height(), 6);

        let empty = report(&[]);
        assert_eq!(ReportTable::new(&empty, ThemeColors::dark()).height(), 4);
    }

    #[test]
    fn renders_header_and_names() {
        let r = report(&["A", "Space"]);
        let table = ReportTable::new(&r, ThemeColors::dark());
        let area = Rect::new(0, 0, 80, table.height());
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Stdev (us)"));
        assert!(text.contains("Space"));
        assert!(text.contains("Press-to-press timing"));
    }

    #[test]
    fn steadiest_row_is_highlighted() {
        let r = report(&["A", "S", "D"]);
        let colors = ThemeColors::dark();
        let table = ReportTable::new(&r, colors);
        assert_eq!(table.row_style(0).fg, Some(colors.green));
        assert_eq!(table.row_style(1).fg, Some(colors.fg));
        assert_eq!(table.row_style(2).fg, Some(colors.yellow));
    }
}
