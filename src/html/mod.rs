//! Self-contained HTML pages for the browser dashboard.
//!
//! Pages are plain strings with inline CSS, inline JavaScript and inline SVG
//! charts, so a rendered page can be opened straight from disk.

use tracing::debug;

use crate::chart::{self, svg};
use crate::dashboard::{Dashboard, FinancialViews, Page, ViewId};
use crate::domain::LoanCondition;
use crate::error::AppError;

mod assets;

use assets::{inline_css, inline_javascript};

pub const DASHBOARD_TITLE: &str = "Financial Insights Dashboard: Loan Performance & Trends";
pub const PAGE_TITLE: &str = "Demo Dashboard";
pub const PAGE_ICON: &str = "💡";

const FEATURES: [(&str, &str); 4] = [
    ("Overview", "Provides a summary of key loan metrics."),
    ("Time-Based Analysis", "Shows trends over time and loan amounts."),
    ("Loan Performance", "Analyzes loan conditions and distributions."),
    (
        "Financial Analysis",
        "Examines loan amounts and distributions based on conditions.",
    ),
];

/// How the condition dropdown behaves and where navigation links point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Files on disk: every condition is pre-rendered, the dropdown toggles
    /// visibility.
    Static,
    /// Served pages: the dropdown fetches the condition fragment.
    Live,
}

impl RenderMode {
    fn href(self, page: Page) -> &'static str {
        match (self, page) {
            (RenderMode::Static, Page::Overview) => "index.html",
            (RenderMode::Static, Page::Financial) => "financial.html",
            (RenderMode::Live, Page::Overview) => "/",
            (RenderMode::Live, Page::Financial) => "/financial",
        }
    }
}

/// File name a page is written to by the static export.
pub fn page_file_name(page: Page) -> &'static str {
    RenderMode::Static.href(page)
}

/// Render a full page.
pub fn render_page(dash: &Dashboard, page: Page, mode: RenderMode) -> Result<String, AppError> {
    let body = match page {
        Page::Overview => format!(
            "<h1>{title}</h1>\n<hr>\n{metrics}\n{time}\n{performance}\n<h2>Financial Analysis</h2>\n{financial}",
            title = html_escape(DASHBOARD_TITLE),
            metrics = render_metrics(dash),
            time = render_time_tabs(dash)?,
            performance = render_loan_performance(dash)?,
            financial = render_financial_section(dash, mode)?,
        ),
        Page::Financial => render_financial_section(dash, mode)?,
    };
    debug!(page = page.title(), ?mode, bytes = body.len(), "rendered page");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{page_title}</title>
    <link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{icon}</text></svg>">
    <style>{css}</style>
</head>
<body>
    {sidebar}
    <main class="main">
        {body}
    </main>
    <script>{js}</script>
</body>
</html>"#,
        page_title = html_escape(PAGE_TITLE),
        icon = PAGE_ICON,
        css = inline_css(),
        sidebar = render_sidebar(page, mode),
        body = body,
        js = inline_javascript(),
    ))
}

/// The two condition-dependent charts as a tab group.
///
/// This is what the server returns for `/fragment/financial`.
pub fn render_condition_views(views: &FinancialViews, size: (u32, u32)) -> Result<String, AppError> {
    let mut panels = Vec::new();
    for view in ViewId::CONDITION_DEPENDENT {
        if let Some(spec) = chart::financial_chart(view, views) {
            panels.push(chart_div(&svg::render(&spec, size)?));
        }
    }
    Ok(render_tabs(
        &[
            "Loan Amount Distribution Condition",
            "Loan Amount Distribution by Purpose",
        ],
        &panels,
    ))
}

fn render_sidebar(page: Page, mode: RenderMode) -> String {
    let features: String = FEATURES
        .iter()
        .map(|(name, text)| {
            format!(
                "<li><strong>{}</strong>: {}</li>",
                html_escape(name),
                html_escape(text)
            )
        })
        .collect();
    let nav: String = [Page::Overview, Page::Financial]
        .iter()
        .map(|p| {
            let class = if *p == page { " class=\"active\"" } else { "" };
            format!(
                "<a href=\"{}\"{}>{}</a>",
                mode.href(*p),
                class,
                html_escape(p.title())
            )
        })
        .collect();

    format!(
        r#"<aside class="sidebar">
        <nav>{nav}</nav>
        <h2>Dashboard Filters and Features</h2>
        <h3>Features</h3>
        <ul>{features}</ul>
    </aside>"#
    )
}

fn render_metrics(dash: &Dashboard) -> String {
    let tiles = dash.overview().metrics.tiles();
    let tile = |idx: usize| {
        let t = &tiles[idx];
        format!(
            r#"<div class="metric"><div class="metric-label">{label}<span class="help" title="{help}">&#9432;</span></div><div class="metric-value">{value}</div></div>"#,
            label = html_escape(t.label),
            help = html_escape(t.help),
            value = html_escape(&t.value),
        )
    };
    format!(
        r#"<div class="container"><div class="columns"><div>{}{}</div><div>{}{}</div></div></div>"#,
        tile(0),
        tile(1),
        tile(2),
        tile(3)
    )
}

fn render_time_tabs(dash: &Dashboard) -> Result<String, AppError> {
    let size = chart_size(dash);
    let overview = dash.overview();
    let mut panels = Vec::new();
    for view in [ViewId::LoansOverTime, ViewId::AmountOverTime, ViewId::LoansByWeekday] {
        if let Some(spec) = chart::overview_chart(view, overview) {
            panels.push(chart_div(&svg::render(&spec, size)?));
        }
    }
    Ok(format!(
        r#"<div class="container">{}</div>"#,
        render_tabs(
            &["Loans Issued Over Time", "Loan Amount Over Time", "Issue Date Analysis"],
            &panels,
        )
    ))
}

fn render_loan_performance(dash: &Dashboard) -> Result<String, AppError> {
    let size = chart_size(dash);
    let overview = dash.overview();
    let mut columns = String::new();
    for view in [ViewId::ConditionShare, ViewId::GradeDistribution] {
        if let Some(spec) = chart::overview_chart(view, overview) {
            columns.push_str(&chart_div(&svg::render(&spec, size)?));
        }
    }
    Ok(format!(
        r#"<h2>Loan Performance</h2>
<details>
    <summary>Click here to expand visualization</summary>
    <div class="container"><div class="columns">{columns}</div></div>
</details>"#
    ))
}

fn render_financial_section(dash: &Dashboard, mode: RenderMode) -> Result<String, AppError> {
    let size = chart_size(dash);
    let selected = dash.condition();
    let options: String = LoanCondition::ALL
        .iter()
        .map(|c| {
            let sel = if *c == selected { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{}>{}</option>",
                c.slug(),
                sel,
                html_escape(c.label())
            )
        })
        .collect();

    let views = match mode {
        RenderMode::Live => render_condition_views(dash.financial(), size)?,
        RenderMode::Static => {
            let mut panels = String::new();
            for condition in LoanCondition::ALL {
                let hidden = if condition == selected { "" } else { " hidden" };
                panels.push_str(&format!(
                    "<div class=\"condition-panel\" data-condition=\"{}\"{}>{}</div>",
                    condition.slug(),
                    hidden,
                    render_condition_views(&dash.financial_for(condition), size)?
                ));
            }
            panels
        }
    };

    Ok(format!(
        r#"<div class="container">
    <label class="select" for="condition-select">Select Loan Condition</label>
    <select id="condition-select">{options}</select>
    <div id="condition-views" data-live="{live}">{views}</div>
</div>"#,
        live = mode == RenderMode::Live,
    ))
}

fn render_tabs(labels: &[&str], panels: &[String]) -> String {
    let buttons: String = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let active = if i == 0 { " active" } else { "" };
            format!(
                "<button type=\"button\" class=\"tab{}\">{}</button>",
                active,
                html_escape(label)
            )
        })
        .collect();
    let bodies: String = panels
        .iter()
        .enumerate()
        .map(|(i, panel)| {
            let active = if i == 0 { " active" } else { "" };
            format!("<div class=\"tab-panel{}\">{}</div>", active, panel)
        })
        .collect();
    format!("<div class=\"tab-group\"><div class=\"tabs\">{buttons}</div>{bodies}</div>")
}

fn chart_div(svg: &str) -> String {
    format!("<div class=\"chart\">{svg}</div>")
}

fn chart_size(dash: &Dashboard) -> (u32, u32) {
    (dash.config().chart_width, dash.config().chart_height)
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan_with;
    use crate::domain::DashboardConfig;
    use crate::io::ingest::LoanTable;
    use std::path::PathBuf;

    fn dashboard() -> Dashboard {
        let table = LoanTable {
            records: vec![
                loan_with("1", 1000.0, LoanCondition::Good, "credit card", "36 months"),
                loan_with("2", 2500.0, LoanCondition::Bad, "car <fast>", "60 months"),
            ],
            source: PathBuf::from("mem.csv"),
            row_errors: Vec::new(),
            rows_read: 2,
        };
        Dashboard::from_table(DashboardConfig::new("mem.csv"), table)
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(html_escape("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn overview_page_has_every_section() {
        let html = render_page(&dashboard(), Page::Overview, RenderMode::Static).unwrap();
        for needle in [
            "Financial Insights Dashboard: Loan Performance &amp; Trends",
            "<title>Demo Dashboard</title>",
            "Dashboard Filters and Features",
            "Total Loan Amount",
            "$3,500",
            "Loans Issued Over Time",
            "Issue Date Analysis",
            "Click here to expand visualization",
            "Select Loan Condition",
            "Loan Amount Distribution by Purpose",
        ] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn static_page_prerenders_both_conditions() {
        let html = render_page(&dashboard(), Page::Financial, RenderMode::Static).unwrap();
        assert!(html.contains("data-condition=\"good\">"));
        assert!(html.contains("data-condition=\"bad\" hidden>"));
        assert!(html.contains("data-live=\"false\""));
        assert!(!html.contains("Click here to expand visualization"));
    }

    #[test]
    fn live_page_renders_only_selected_condition() {
        let html = render_page(&dashboard(), Page::Financial, RenderMode::Live).unwrap();
        assert!(html.contains("data-live=\"true\""));
        assert!(!html.contains("condition-panel\" data-condition"));
        assert!(html.contains("href=\"/financial\" class=\"active\""));
    }
}
