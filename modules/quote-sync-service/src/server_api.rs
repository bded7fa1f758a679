//! HTTP client for the remote quote endpoint.
//!
//! The remote side exposes generic posts; each item's `title` becomes
//! quote text under the fixed `Server` category.

use quote_sync_types::Quote;

pub const DEFAULT_SERVER_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Category assigned to every quote that originates from the server.
pub const SERVER_CATEGORY: &str = "Server";

#[derive(Debug, Clone, serde::Deserialize)]
struct ServerItem {
    title: Option<String>,
}

/// Fetch the remote record set. Items without a usable `title` are
/// skipped.
pub async fn fetch_server_quotes(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Quote>, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Server request failed: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;

    if !status.is_success() {
        return Err(format!("Server error ({}): {}", status, truncate_error(&body)));
    }

    let items: Vec<ServerItem> =
        serde_json::from_str(&body).map_err(|e| format!("Invalid JSON: {}", e))?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.title)
        .map(|title| Quote {
            text: title,
            category: SERVER_CATEGORY.to_string(),
        })
        .collect())
}

/// Push the full local sequence to the server. Fire-and-forget: the
/// response body is ignored beyond the status check.
pub async fn push_quotes(
    client: &reqwest::Client,
    url: &str,
    quotes: &[Quote],
) -> Result<(), String> {
    let response = client
        .post(url)
        .json(quotes)
        .send()
        .await
        .map_err(|e| format!("Server push failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Server error ({}): {}", status, truncate_error(&body)));
    }

    Ok(())
}

fn truncate_error(s: &str) -> String {
    if s.chars().count() > 200 {
        s.chars().take(200).collect()
    } else {
        s.to_string()
    }
}
