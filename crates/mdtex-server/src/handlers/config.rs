//! Configuration API endpoint.
//!
//! Returns client-side configuration for the editor page.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// Inline math delimiters as `[open, close]`.
    inline_math: [String; 2],
    /// Display math delimiters as `[open, close]`.
    display_math: [String; 2],
    /// MathJax loader URL.
    mathjax_url: String,
    /// Whether to render on every input change.
    live: bool,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let delimiters = state.pipeline.delimiters();
    Json(ConfigResponse {
        inline_math: [delimiters.inline.open.clone(), delimiters.inline.close.clone()],
        display_math: [
            delimiters.display.open.clone(),
            delimiters.display.close.clone(),
        ],
        mathjax_url: state.mathjax_url.clone(),
        live: state.live,
    })
}
