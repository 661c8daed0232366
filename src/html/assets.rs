//! Inline CSS and JavaScript for the dashboard pages.

pub fn inline_css() -> &'static str {
    r#"
:root {
    --bg: #ffffff;
    --sidebar: #f0f2f6;
    --border: #d6d6de;
    --text: #262730;
    --dim: #6b6d7a;
    --accent: #4c72b0;
}
* { box-sizing: border-box; }
body {
    margin: 0;
    font-family: "Source Sans Pro", -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
    color: var(--text);
    background: var(--bg);
    display: flex;
    min-height: 100vh;
}
.sidebar {
    width: 280px;
    flex-shrink: 0;
    background: var(--sidebar);
    padding: 2rem 1.25rem;
}
.sidebar h2 { font-size: 1.25rem; margin: 0 0 1rem; }
.sidebar h3 { font-size: 1rem; margin: 1.5rem 0 0.5rem; }
.sidebar ul { padding-left: 1.1rem; margin: 0; }
.sidebar li { margin-bottom: 0.5rem; line-height: 1.4; }
.sidebar nav a {
    display: block;
    padding: 0.4rem 0.6rem;
    border-radius: 6px;
    color: var(--text);
    text-decoration: none;
}
.sidebar nav a.active { background: #ffffff; font-weight: 600; }
.main { flex: 1; padding: 2rem 3rem; max-width: 1400px; }
h1 { font-size: 2rem; margin: 0 0 0.5rem; }
hr { border: 0; border-top: 1px solid var(--border); margin: 1rem 0 1.5rem; }
.container {
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 1rem 1.25rem;
    margin-bottom: 1.5rem;
}
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
.metric { margin-bottom: 1rem; }
.metric-label { font-size: 0.875rem; color: var(--dim); }
.metric-label .help { cursor: help; margin-left: 0.25rem; }
.metric-value { font-size: 2.25rem; line-height: 1.2; }
.tabs { display: flex; gap: 1.5rem; border-bottom: 1px solid var(--border); margin-bottom: 1rem; }
.tab {
    background: none;
    border: 0;
    border-bottom: 2px solid transparent;
    padding: 0.5rem 0;
    font: inherit;
    color: var(--dim);
    cursor: pointer;
}
.tab.active { color: var(--accent); border-bottom-color: var(--accent); }
.tab-panel { display: none; }
.tab-panel.active { display: block; }
details { border: 1px solid var(--border); border-radius: 8px; padding: 0.5rem 1rem; margin-bottom: 1.5rem; }
summary { cursor: pointer; padding: 0.25rem 0; }
details .container { margin-top: 0.75rem; }
.chart svg { max-width: 100%; height: auto; }
label.select { display: block; font-size: 0.875rem; margin-bottom: 0.25rem; }
select { font: inherit; padding: 0.35rem 0.5rem; border-radius: 6px; border: 1px solid var(--border); min-width: 240px; margin-bottom: 1rem; }
.condition-panel[hidden] { display: none; }
.caption { color: var(--dim); font-size: 0.8rem; margin-top: 0.25rem; }
"#
}

/// Tabs, plus the condition dropdown.
///
/// In static pages every condition panel is already in the document and the
/// dropdown only toggles visibility. In served pages (`data-live`) the
/// dropdown asks the server for the dependent-views fragment and swaps it in.
pub fn inline_javascript() -> &'static str {
    r#"
function wireTabs(root) {
    root.querySelectorAll('.tab-group').forEach(function (group) {
        var tabs = group.querySelectorAll(':scope > .tabs > .tab');
        var panels = group.querySelectorAll(':scope > .tab-panel');
        tabs.forEach(function (tab, idx) {
            tab.addEventListener('click', function () {
                tabs.forEach(function (t) { t.classList.remove('active'); });
                panels.forEach(function (p) { p.classList.remove('active'); });
                tab.classList.add('active');
                if (panels[idx]) { panels[idx].classList.add('active'); }
            });
        });
    });
}

function wireConditionSelect() {
    var select = document.getElementById('condition-select');
    if (!select) { return; }
    var host = document.getElementById('condition-views');
    select.addEventListener('change', function () {
        var value = select.value;
        if (host.dataset.live === 'true') {
            fetch('/fragment/financial?condition=' + encodeURIComponent(value))
                .then(function (resp) {
                    if (!resp.ok) { throw new Error('HTTP ' + resp.status); }
                    return resp.text();
                })
                .then(function (html) {
                    host.innerHTML = html;
                    wireTabs(host);
                })
                .catch(function (err) { console.error('condition update failed', err); });
        } else {
            host.querySelectorAll('.condition-panel').forEach(function (panel) {
                panel.hidden = panel.dataset.condition !== value;
            });
        }
    });
}

document.addEventListener('DOMContentLoaded', function () {
    wireTabs(document);
    wireConditionSelect();
});
"#
}
