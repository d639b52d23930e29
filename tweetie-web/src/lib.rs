//! HTTP front end: two HTML views over a [`SocialApi`].
//!
//! - `GET /{name}`: recent posts colored by sentiment, with the batch median
//! - `GET /following/{name}`: followed accounts, most followed first
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tweetie_common::TweetieError;
use tweetie_sentiment::{add_color, median_score};
use tweetie_social::twitter::{self, SocialApi};

pub mod views;

pub use views::{render_following, render_not_found, render_posts};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn SocialApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn SocialApi>) -> Self {
        Self { api }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{name}", get(tweets))
        .route("/following/{name}", get(following))
        .with_state(state)
}

/// Serve the router on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "web.listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[tracing::instrument(skip(state))]
async fn tweets(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, WebError> {
    let mut timeline = twitter::recent_posts(state.api.as_ref(), &name).await?;
    add_color(&mut timeline.posts);
    let median = median_score(&timeline.scores());
    tracing::debug!(count = timeline.count, median, "web.tweets.rendered");
    Ok(Html(render_posts(&name, median, &timeline.posts)))
}

#[tracing::instrument(skip(state))]
async fn following(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, WebError> {
    let accounts = twitter::following(state.api.as_ref(), &name).await?;
    tracing::debug!(count = accounts.len(), "web.following.rendered");
    Ok(Html(render_following(&name, &accounts)))
}

/// Maps domain failures onto HTML error pages.
#[derive(Debug)]
pub struct WebError(pub TweetieError);

impl From<TweetieError> for WebError {
    fn from(err: TweetieError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self.0 {
            TweetieError::NotFound(name) => {
                tracing::info!(screen_name = %name, "web.not_found");
                (StatusCode::NOT_FOUND, Html(render_not_found(&name))).into_response()
            }
            TweetieError::RateLimited { retry_after_secs } => {
                tracing::warn!(?retry_after_secs, "web.rate_limited");
                let page = Html(views::render_message(
                    "Rate limited",
                    "Twitter is rate limiting this server. Please try again later.",
                ));
                let mut resp = (StatusCode::SERVICE_UNAVAILABLE, page).into_response();
                if let Some(secs) = retry_after_secs {
                    resp.headers_mut()
                        .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                }
                resp
            }
            other => {
                tracing::error!(error = %other, "web.internal_error");
                let page = Html(views::render_message(
                    "Something went wrong",
                    "The request could not be completed.",
                ));
                (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
            }
        }
    }
}
