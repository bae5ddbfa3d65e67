use std::{future::Future, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    api, lookup,
    render::{self, PageState},
    App,
};

/// Remembers the last looked up id, so a plain visit to `/` picks up where it left off
pub const LAST_USER_COOKIE: &str = "last_user_id";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    url: String,
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(
            "/api/proxy",
            get(relay).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .route("/metrics", get(metrics))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(app)
}

/// Serves the router on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: std::net::TcpListener,
    app: Arc<App>,
    shutdown: F,
) -> Result<(), axum::BoxError>
where
    F: Future<Output = ()> + Send + 'static,
{
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Listening");

    axum::Server::from_tcp(listener)?
        .serve(router(app).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tracing::instrument(skip(app, headers))]
async fn index(
    State(app): State<Arc<App>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let user_id = match query.user {
        Some(raw) => raw.trim().to_string(),
        None => {
            return match cookie(&headers, LAST_USER_COOKIE) {
                Some(saved) => {
                    tracing::debug!(%saved, "Resuming last user");
                    Redirect::to(&page_location(saved)).into_response()
                }
                None => Html(render::page(&PageState::Idle, &app.config)).into_response(),
            };
        }
    };

    if !api::is_valid_user_id(&user_id) {
        return (
            StatusCode::BAD_REQUEST,
            Html(render::page(&PageState::Invalid, &app.config)),
        )
            .into_response();
    }

    let lookup = lookup::lookup(&app, &user_id).await;
    let html = render::page(&PageState::Loaded(&lookup), &app.config);

    let mut response = Html(html).into_response();
    match remember_cookie(&user_id) {
        Some(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        None => {
            tracing::debug!(%user_id, "Not remembering id that is not cookie safe");
        }
    };

    response
}

#[tracing::instrument(skip(app))]
async fn relay(State(app): State<Arc<App>>, Query(query): Query<RelayQuery>) -> Response {
    let target = match url::Url::parse(&query.url) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!("Parsing relay target {:?}", e);
            app.metrics.relayed.with_label_values(&["invalid"]).inc();
            return (StatusCode::BAD_REQUEST, "Invalid url").into_response();
        }
    };

    let allowed = app.config.allowed_relay_hosts();
    let host_allowed = matches!(target.scheme(), "http" | "https")
        && target
            .host_str()
            .map(|host| allowed.iter().any(|a| a.eq_ignore_ascii_case(host)))
            .unwrap_or(false);
    if !host_allowed {
        tracing::warn!(%target, "Relay target not allowed");
        app.metrics.relayed.with_label_values(&["forbidden"]).inc();
        return (StatusCode::FORBIDDEN, "Host not allowed").into_response();
    }

    match app.client.relay(&target).await {
        Ok(relayed) => {
            app.metrics.relayed.with_label_values(&["ok"]).inc();

            let mut response = (relayed.status, relayed.body).into_response();
            if let Some(content_type) = relayed
                .content_type
                .and_then(|c| HeaderValue::from_str(&c).ok())
            {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            response
        }
        Err(e) => {
            tracing::error!("Relaying {:?}", e);
            app.metrics.relayed.with_label_values(&["error"]).inc();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

#[tracing::instrument(skip(app))]
async fn metrics(State(app): State<Arc<App>>) -> String {
    tracing::trace!("Getting metrics");

    match app.metrics.encode() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Encoding Metrics {:?}", e);

            String::new()
        }
    }
}

fn page_location(user_id: &str) -> String {
    let mut location = "/?user=".to_string();
    location.extend(url::form_urlencoded::byte_serialize(user_id.as_bytes()));
    location
}

fn is_cookie_safe(value: &str) -> bool {
    api::is_valid_user_id(value)
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn remember_cookie(user_id: &str) -> Option<HeaderValue> {
    if !is_cookie_safe(user_id) {
        return None;
    }

    HeaderValue::from_str(&format!(
        "{LAST_USER_COOKIE}={user_id}; Path=/; Max-Age=31536000; SameSite=Lax"
    ))
    .ok()
}

/// Looks up a cookie by name, ignoring values that could not have been set by us.
fn cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| is_cookie_safe(value))
}
