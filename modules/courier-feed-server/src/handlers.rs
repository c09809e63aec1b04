use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use courier_cache::composite_key;
use serde::Deserialize;
use tracing::warn;

use crate::state::AppState;

const CACHE_TTL_KEY_RSS: &str = "rss";
const CACHE_TTL_KEY_ATOM: &str = "atom";
const CACHE_TTL_KEY_JSON: &str = "json";

async fn cached_or_render(
    state: &AppState,
    format: &str,
    content_type: &'static str,
    render: impl FnOnce(&[courier_types::FeedEntry]) -> String,
) -> Response {
    let key = composite_key(&[state.name.as_str(), format]);
    if let Some(body) = state.cache.get(&key) {
        return response_with_body(content_type, body);
    }

    let entries = match state.store.feed.list_recent_entries(state.feed_size).await {
        Ok(mut entries) => {
            entries.truncate(state.max_items);
            entries
        }
        Err(e) => {
            warn!(error = %e, "failed to load feed entries");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = render(&entries);
    state.cache.set(&key, body.clone());
    response_with_body(content_type, body)
}

fn response_with_body(content_type: &'static str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        body,
    )
        .into_response()
}

pub async fn rss_feed(State(state): State<Arc<AppState>>) -> Response {
    let home_url = state.home_url.clone();
    let name = state.name.clone();
    cached_or_render(&state, CACHE_TTL_KEY_RSS, "application/rss+xml", move |entries| {
        crate::render::render_rss(&name, &home_url, entries)
    })
    .await
}

pub async fn atom_feed(State(state): State<Arc<AppState>>) -> Response {
    let home_url = state.home_url.clone();
    let name = state.name.clone();
    cached_or_render(&state, CACHE_TTL_KEY_ATOM, "application/atom+xml", move |entries| {
        crate::render::render_atom(&name, &home_url, entries)
    })
    .await
}

pub async fn json_feed(State(state): State<Arc<AppState>>) -> Response {
    let home_url = state.home_url.clone();
    let name = state.name.clone();
    cached_or_render(&state, CACHE_TTL_KEY_JSON, "application/feed+json", move |entries| {
        crate::render::render_json_feed(&name, &home_url, entries).to_string()
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    page: Option<u32>,
    date: Option<String>,
}

/// `date=today`/`date=yesterday` narrow the window to that UTC calendar
/// day; an absent `date` defaults to `today`.
fn window_for(date: Option<&str>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today_start = Utc.from_utc_datetime(&Utc::now().date_naive().and_time(NaiveTime::MIN));
    match date {
        Some("yesterday") => (today_start - ChronoDuration::days(1), today_start),
        _ => (today_start, today_start + ChronoDuration::days(1)),
    }
}

pub async fn homepage(State(state): State<Arc<AppState>>, Query(query): Query<HomeQuery>) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let (from, to) = window_for(query.date.as_deref());

    let feed_page = match state.store.feed.list_entries_paginated(page, state.per_page, from, to).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "failed to load paginated feed entries");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut body = format!("<html><head><title>{}</title></head><body><h1>{}</h1><ul>", state.name, state.name);
    for entry in &feed_page.entries {
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a> — {}</li>",
            html_escape(&entry.link),
            html_escape(&entry.title),
            html_escape(&entry.description)
        ));
    }
    body.push_str("</ul>");
    if feed_page.has_previous {
        body.push_str(&format!("<a href=\"?page={}\">previous</a> ", page.saturating_sub(1)));
    }
    if feed_page.has_next {
        body.push_str(&format!("<a href=\"?page={}\">next</a>", page + 1));
    }
    body.push_str("</body></html>");

    Html(body).into_response()
}

fn html_escape(input: &str) -> String {
    input.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut payload = serde_json::json!({
        "status": "ok",
        "name": state.name,
        "time": Utc::now().to_rfc3339(),
    });
    if let Some(bot_state) = &state.bot_state {
        payload["bot_state"] = serde_json::json!(format!("{:?}", *bot_state.borrow()).to_lowercase());
    }
    Json(payload)
}
