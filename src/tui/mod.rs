//! Ratatui-based terminal dashboard.
//!
//! Three pages (Overview, Loan Performance, Financial Analysis) over one
//! loaded `Dashboard`. `Tab` cycles pages, `1`-`3` pick a tab on the current
//! page, `c` toggles the loan condition, `r` re-reads the dataset, `q` quits.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs},
};

use crate::analysis::{AmountHistogram, CategoryCount, format_thousands};
use crate::dashboard::{Dashboard, DashboardEvent};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{TimeSeriesChart, fmt_value, to_series};

/// Start the TUI on an already-loaded dashboard.
pub fn run(dash: Dashboard) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dash);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiPage {
    Overview,
    LoanPerformance,
    Financial,
}

impl TuiPage {
    const ALL: [TuiPage; 3] = [TuiPage::Overview, TuiPage::LoanPerformance, TuiPage::Financial];

    fn title(self) -> &'static str {
        match self {
            TuiPage::Overview => "Overview",
            TuiPage::LoanPerformance => "Loan Performance",
            TuiPage::Financial => "Financial Analysis",
        }
    }

    fn tabs(self) -> &'static [&'static str] {
        match self {
            TuiPage::Overview => &["Loans Issued Over Time", "Loan Amount Over Time", "Issue Date Analysis"],
            TuiPage::LoanPerformance => &["Condition & Grade"],
            TuiPage::Financial => &[
                "Loan Amount Distribution Condition",
                "Loan Amount Distribution by Purpose",
            ],
        }
    }

    fn next(self) -> Self {
        match self {
            TuiPage::Overview => TuiPage::LoanPerformance,
            TuiPage::LoanPerformance => TuiPage::Financial,
            TuiPage::Financial => TuiPage::Overview,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

struct App {
    dash: Dashboard,
    page: TuiPage,
    tab: usize,
    status: String,
}

impl App {
    fn new(dash: Dashboard) -> Self {
        let status = format!("Loaded {} loans", format_thousands(dash.table().len() as f64, 0));
        Self {
            dash,
            page: TuiPage::Overview,
            tab: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.page = self.page.next();
                self.tab = 0;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let idx = (c as usize) - ('1' as usize);
                if idx < self.page.tabs().len() {
                    self.tab = idx;
                }
            }
            KeyCode::Char('c') => {
                let next = self.dash.condition().toggle();
                match self.dash.apply(DashboardEvent::SelectCondition(next)) {
                    Ok(changed) => {
                        self.status = format!("{} selected ({} views recomputed)", next.label(), changed.len());
                    }
                    Err(e) => self.status = format!("Selection failed: {e}"),
                }
            }
            KeyCode::Char('r') => match self.dash.apply(DashboardEvent::Refresh) {
                Ok(_) => {
                    self.status = format!(
                        "Reloaded {} loans",
                        format_thousands(self.dash.table().len() as f64, 0)
                    );
                }
                Err(e) => self.status = format!("Refresh failed, keeping previous data: {e}"),
            },
            _ => {}
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let pages = Tabs::new(TuiPage::ALL.iter().map(|p| p.title()))
            .select(self.page.index())
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().title(Span::styled(
                "Financial Insights Dashboard: Loan Performance & Trends",
                Style::default().fg(Color::Cyan),
            )));
        frame.render_widget(pages, rows[0]);

        let tiles = self.dash.overview().metrics.tiles();
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(rows[1]);
        for (tile, col) in tiles.iter().zip(cols.iter()) {
            let p = Paragraph::new(Line::from(Span::styled(
                tile.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().title(tile.label).borders(Borders::ALL));
            frame.render_widget(p, *col);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let tabs = Tabs::new(self.page.tabs().iter().copied())
            .select(self.tab)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        let overview = self.dash.overview();
        match (self.page, self.tab) {
            (TuiPage::Overview, 0) => {
                self.draw_time_series(frame, chunks[1], "Number of Loans Issued Over Time", &overview.loans_per_date)
            }
            (TuiPage::Overview, 1) => self.draw_time_series(
                frame,
                chunks[1],
                "Total Loan Amount Issued Over Time",
                &overview.amount_per_date,
            ),
            (TuiPage::Overview, _) => draw_counts(
                frame,
                chunks[1],
                "Distribution of Loans by Day of the Week",
                &overview.loans_per_weekday,
            ),
            (TuiPage::LoanPerformance, _) => self.draw_performance(frame, chunks[1]),
            (TuiPage::Financial, 0) => self.draw_histogram(frame, chunks[1]),
            (TuiPage::Financial, _) => self.draw_boxes(frame, chunks[1]),
        }
    }

    fn draw_time_series(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        points: &[crate::analysis::TimePoint],
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let series = to_series(points);
        frame.render_widget(TimeSeriesChart::new(&series), inner);
    }

    fn draw_performance(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let overview = self.dash.overview();
        let items: Vec<ListItem> = overview
            .condition_share
            .iter()
            .map(|s| {
                ListItem::new(format!(
                    "{:<10} {:>5.1}%  ({})",
                    s.condition.label(),
                    s.percent,
                    format_thousands(s.count as f64, 0)
                ))
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .title("Distribution of Loans by Condition")
                .borders(Borders::ALL),
        );
        frame.render_widget(list, cols[0]);

        draw_counts(frame, cols[1], "Distribution of Loans by Grade", &overview.grade_counts);
    }

    fn draw_histogram(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let financial = self.dash.financial();
        let title = format!(
            "Loan Amount Distribution by Condition [{}]",
            financial.condition.label()
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        if financial.histogram.is_empty() {
            frame.render_widget(Paragraph::new("No data").block(block), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(block.inner(area));
        frame.render_widget(block, area);

        let labels = histogram_labels(&financial.histogram);
        let totals = financial.histogram.totals();
        let data: Vec<(&str, u64)> = labels
            .iter()
            .map(String::as_str)
            .zip(totals.iter().map(|t| *t as u64))
            .collect();
        let width = bar_width(rows[0].width, data.len());
        let chart = BarChart::default()
            .data(data.as_slice())
            .bar_width(width)
            .bar_gap(if width > 1 { 1 } else { 0 })
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(chart, rows[0]);

        let legend: Vec<Span> = financial
            .histogram
            .series
            .iter()
            .map(|s| Span::raw(format!("{}: {}  ", s.term, s.counts.iter().sum::<usize>())))
            .collect();
        let mut spans = vec![Span::styled("Loan Term  ", Style::default().fg(Color::Gray))];
        spans.extend(legend);
        frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
    }

    fn draw_boxes(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let financial = self.dash.financial();
        let title = format!(
            "Loan Amount Distribution by Purpose [{}]",
            financial.condition.label()
        );
        let header = Row::new(vec!["Loan Purpose", "Loan Term", "N", "Min", "Q1", "Median", "Q3", "Max", "Outliers"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = financial
            .boxes
            .iter()
            .map(|b| {
                Row::new(vec![
                    b.purpose.clone(),
                    b.term.clone(),
                    b.n.to_string(),
                    format_thousands(b.min, 0),
                    format_thousands(b.q1, 0),
                    format_thousands(b.median, 0),
                    format_thousands(b.q3, 0),
                    format_thousands(b.max, 0),
                    b.outliers.len().to_string(),
                ])
            })
            .collect();
        let widths = [
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab page  1-3 tab  c condition  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                format!("Select Loan Condition: {}", self.dash.condition().label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(Text::from(line)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_counts(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, counts: &[CategoryCount]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if counts.is_empty() {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    }
    let data: Vec<(&str, u64)> = counts.iter().map(|c| (c.label.as_str(), c.count as u64)).collect();
    let width = bar_width(block.inner(area).width, data.len());
    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}

/// Bar labels: the lower edge of each bin.
fn histogram_labels(histogram: &AmountHistogram) -> Vec<String> {
    histogram
        .edges
        .iter()
        .take(histogram.bins())
        .map(|e| fmt_value(*e))
        .collect()
}

/// Widest bar that still fits `n` bars with one-cell gaps.
fn bar_width(available: u16, n: usize) -> u16 {
    if n == 0 {
        return 1;
    }
    let n = u16::try_from(n).unwrap_or(u16::MAX);
    (available.saturating_sub(n) / n).clamp(1, 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan_with;
    use crate::dashboard::ViewId;
    use crate::domain::{DashboardConfig, LoanCondition};
    use crate::io::ingest::LoanTable;
    use std::path::PathBuf;

    fn app() -> App {
        let table = LoanTable {
            records: vec![
                loan_with("1", 100.0, LoanCondition::Good, "car", "36 months"),
                loan_with("2", 900.0, LoanCondition::Bad, "car", "60 months"),
            ],
            source: PathBuf::from("/nonexistent/loans.csv"),
            row_errors: Vec::new(),
            rows_read: 2,
        };
        App::new(Dashboard::from_table(DashboardConfig::new("/nonexistent/loans.csv"), table))
    }

    #[test]
    fn tab_cycles_pages_and_resets_tab() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('3')));
        assert_eq!(app.tab, 2);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.page, TuiPage::LoanPerformance);
        assert_eq!(app.tab, 0);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.tab, 0);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.page, TuiPage::Overview);
    }

    #[test]
    fn condition_toggle_recomputes_dependent_views() {
        let mut app = app();
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.dash.condition(), LoanCondition::Bad);
        assert_eq!(app.dash.revision(ViewId::PurposeBox), 2);
        assert!(app.status.contains("Bad Loan"));
    }

    #[test]
    fn failed_refresh_keeps_data() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r'));
        assert!(app.status.starts_with("Refresh failed"));
        assert_eq!(app.dash.table().len(), 2);
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn bar_width_fits_area() {
        assert_eq!(bar_width(100, 30), 2);
        assert_eq!(bar_width(10, 30), 1);
        assert_eq!(bar_width(200, 3), 12);
        assert_eq!(bar_width(200, 65_536), 1);
        assert_eq!(bar_width(200, usize::MAX), 1);
    }
}
