//! HTTP editor server for mdtex.
//!
//! Serves a single-page markdown editor whose preview is rendered by
//! [`mdtex_renderer::MathPipeline`] on the server and typeset by MathJax in
//! the browser:
//!
//! - `GET /` editor page (plus `/app.js` and `/style.css`)
//! - `POST /api/render` markdown in, HTML and math count out
//! - `GET /api/config` delimiters, MathJax URL and live flag for the page
//!
//! # Quick Start
//!
//! ```ignore
//! use mdtex_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     run_server(ServerConfig::default()).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::sync::Arc;

use mdtex_renderer::MathPipeline;
use mdtex_renderer::RenderOptions;
use mdtex_renderer::math::{DelimiterPair, ScanOptions, TypesetDelimiters};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Structural renderer options.
    pub render_options: RenderOptions,
    /// Math scanner options.
    pub scan_options: ScanOptions,
    /// Delimiters written around restored math.
    pub delimiters: TypesetDelimiters,
    /// MathJax loader URL for the editor page.
    pub mathjax_url: String,
    /// Re-render on every input change.
    pub live: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        server_config_from_config(&mdtex_config::Config::default())
    }
}

impl ServerConfig {
    /// Build the math pipeline described by this configuration.
    #[must_use]
    pub fn pipeline(&self) -> MathPipeline {
        MathPipeline::new()
            .with_render_options(self.render_options)
            .with_scan_options(self.scan_options)
            .with_delimiters(self.delimiters.clone())
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState {
        pipeline: config.pipeline(),
        mathjax_url: config.mathjax_url.clone(),
        live: config.live,
    });

    let app = app::create_router(state)?;

    let address = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = address
        .parse()
        .map_err(|source| ServerError::Address { address, source })?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdtex config.
#[must_use]
pub fn server_config_from_config(config: &mdtex_config::Config) -> ServerConfig {
    let typeset = &config.typeset;

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        render_options: RenderOptions {
            allow_raw_html: config.render.allow_raw_html,
            convert_single_newline_to_break: config.render.line_breaks,
            gfm: config.render.gfm,
        },
        scan_options: ScanOptions {
            skip_code_fences: config.render.skip_code_fences,
        },
        delimiters: TypesetDelimiters {
            inline: DelimiterPair::new(&typeset.inline_open, &typeset.inline_close),
            display: DelimiterPair::new(&typeset.display_open, &typeset.display_close),
        },
        mathjax_url: typeset.mathjax_url.clone(),
        live: config.render.live,
    }
}
