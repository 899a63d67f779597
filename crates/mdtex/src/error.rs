//! CLI error types.

use mdtex_config::ConfigError;
use mdtex_page::PageError;
use mdtex_renderer::RenderError;
use mdtex_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
