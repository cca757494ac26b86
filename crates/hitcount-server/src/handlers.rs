//! Application endpoints.
//!
//! - `/`      : static greeting
//! - `/redis` : bump the shared hit counter and report it with the host name

use std::time::Instant;

use axum::{extract::State, response::Html};
use hitcount_core::error::Result;

use crate::{app_state::AppState, error::HttpError};

pub const GREETING: &str = "Hello World!";

pub async fn greeting(State(state): State<AppState>) -> &'static str {
    let started = Instant::now();
    tracing::info!("This is a log message");
    state.metrics().record_request("/", 200, started.elapsed());
    GREETING
}

pub async fn hit_count(
    State(state): State<AppState>,
) -> std::result::Result<Html<String>, HttpError> {
    let started = Instant::now();
    let page = render_hit_page(&state).await;
    let status = if page.is_ok() { 200 } else { 500 };
    state.metrics().record_request("/redis", status, started.elapsed());
    Ok(Html(page?))
}

async fn render_hit_page(state: &AppState) -> Result<String> {
    let host = state.host().hostname()?;
    let count = state.counter().increment_and_get().await?;
    Ok(hit_page(&host, count))
}

pub fn hit_page(host: &str, count: u64) -> String {
    format!(
        "<html>Welcome to Redis Test App - Home Page - on node {host}.<br\\>Hit count = {count}.<br\\></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::hit_page;

    #[test]
    fn page_template() {
        assert_eq!(
            hit_page("node-a", 7),
            r"<html>Welcome to Redis Test App - Home Page - on node node-a.<br\>Hit count = 7.<br\></html>"
        );
    }
}
