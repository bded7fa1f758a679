//! Dashboard HTML page handler.
//!
//! Serves a self-contained HTML page with inline CSS showing the quote
//! collection, categories, and service status.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (quotes, categories, revision) = {
        let store = state.store.lock().await;
        (
            store.quotes().to_vec(),
            store.categories(),
            store.revision(),
        )
    };
    let last_sync = state.last_sync_at.lock().await.clone();
    let uptime = state.start_time.elapsed().as_secs();

    let stats_html = format!(
        r#"<div class="stats">
            <div class="stat"><span class="val">{}</span><span class="lbl">Quotes</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Categories</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Revision</span></div>
        </div>"#,
        quotes.len(),
        categories.len(),
        revision
    );

    let mut quote_rows = String::new();
    for q in &quotes {
        let text_short = if q.text.chars().count() > 120 {
            let cut: String = q.text.chars().take(120).collect();
            format!("{}...", cut)
        } else {
            q.text.clone()
        };
        quote_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&text_short),
            escape_html(&q.category)
        ));
    }
    if quote_rows.is_empty() {
        quote_rows = "<tr><td colspan=\"2\">No quotes stored.</td></tr>".to_string();
    }

    let category_list = if categories.is_empty() {
        "none".to_string()
    } else {
        categories
            .iter()
            .map(|c| escape_html(c))
            .collect::<Vec<_>>()
            .join(" &middot; ")
    };

    let last_sync_str = last_sync.as_deref().unwrap_or("not yet");
    let uptime_str = format_uptime(uptime);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Quote Sync Dashboard</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0f1117; color: #e0e0e0; padding: 20px; }}
  h1 {{ color: #58a6ff; margin-bottom: 8px; }}
  .meta {{ color: #8b949e; font-size: 0.85em; margin-bottom: 20px; }}
  .stats {{ display: flex; gap: 16px; margin-bottom: 24px; flex-wrap: wrap; }}
  .stat {{ background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px 24px; text-align: center; min-width: 120px; }}
  .stat .val {{ display: block; font-size: 2em; font-weight: bold; color: #58a6ff; }}
  .stat .lbl {{ display: block; font-size: 0.85em; color: #8b949e; margin-top: 4px; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 24px; }}
  th {{ background: #161b22; color: #8b949e; text-align: left; padding: 8px 12px; font-size: 0.85em; text-transform: uppercase; border-bottom: 1px solid #30363d; }}
  td {{ padding: 8px 12px; border-bottom: 1px solid #21262d; font-size: 0.9em; }}
  tr:hover {{ background: #161b22; }}
  h2 {{ color: #c9d1d9; margin-bottom: 12px; font-size: 1.1em; }}
  .section {{ margin-bottom: 28px; }}
</style>
</head>
<body>
  <h1>Quote Sync</h1>
  <p class="meta">Uptime: {uptime_str} &middot; Last sync: {last_sync_str} &middot; Sync interval: {sync_interval}s</p>

  {stats_html}

  <div class="section">
    <h2>Categories</h2>
    <p>{category_list}</p>
  </div>

  <div class="section">
    <h2>Quotes</h2>
    <table>
      <thead><tr><th>Text</th><th>Category</th></tr></thead>
      <tbody>{quote_rows}</tbody>
    </table>
  </div>

  <script>
    // Auto-refresh every 30 seconds
    setTimeout(() => location.reload(), 30000);
  </script>
</body>
</html>"#,
        uptime_str = uptime_str,
        last_sync_str = last_sync_str,
        sync_interval = state.sync_interval_secs,
        stats_html = stats_html,
        category_list = category_list,
        quote_rows = quote_rows,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
