//! Render API endpoint.
//!
//! Runs submitted markdown through the math pipeline and returns HTML with
//! math left between typesetter delimiters for the browser to typeset.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use mdtex_renderer::RenderResult;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /api/render.
#[derive(Deserialize)]
pub(crate) struct RenderRequest {
    /// Markdown source with TeX math.
    markdown: String,
}

/// Handle POST /api/render.
///
/// Responds with `{"html": ..., "mathCount": ...}`.
pub(crate) async fn render(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResult>, ServerError> {
    let result = state.pipeline.render(&request.markdown)?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use mdtex_renderer::MathPipeline;
    use pretty_assertions::assert_eq;

    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            pipeline: MathPipeline::new(),
            mathjax_url: "https://cdn.example.com/mathjax.js".to_owned(),
            live: false,
        })
    }

    #[tokio::test]
    async fn test_render_returns_html_and_count() {
        let request = RenderRequest {
            markdown: "**Area**: $\\pi r^2$ and $$a<b$$".to_owned(),
        };

        let Json(response) = render(State(state()), Json(request)).await.unwrap();

        assert_eq!(
            response.html,
            "<p><strong>Area</strong>: $\\pi r^2$ and $$a&lt;b$$</p>\n"
        );
        assert_eq!(response.math_count, 2);
    }

    #[test]
    fn test_render_result_serializes_camel_case() {
        let response = RenderResult {
            html: "<p>x</p>".to_owned(),
            math_count: 3,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["html"], "<p>x</p>");
        assert_eq!(json["mathCount"], 3);
        assert!(json.get("math_count").is_none());
    }

    #[test]
    fn test_render_request_deserialization() {
        let request: RenderRequest = serde_json::from_str(r#"{"markdown":"$x$"}"#).unwrap();
        assert_eq!(request.markdown, "$x$");
    }
}
