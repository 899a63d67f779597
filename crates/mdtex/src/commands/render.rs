//! `mdtex render` command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use mdtex_config::Config;
use mdtex_server::server_config_from_config;

use super::RenderFlags;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdtex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    flags: RenderFlags,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, rendering or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.flags.cli_settings()))?;
        let pipeline = server_config_from_config(&config).pipeline();

        let source = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source)?;
                source
            }
        };

        let result = pipeline.render(&source)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                Output::new().wrote(path, result.math_count);
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(result.html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let output = dir.path().join("doc.html");
        let config = dir.path().join("mdtex.toml");
        std::fs::write(&input, "# Title\n\n$a<b$\n").unwrap();
        std::fs::write(&config, "").unwrap();

        RenderArgs {
            input: Some(input),
            output: Some(output.clone()),
            config: Some(config),
            flags: RenderFlags::default(),
        }
        .execute()
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "<h1>Title</h1>\n<p>$a&lt;b$</p>\n"
        );
    }

    #[test]
    fn test_render_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("mdtex.toml");
        std::fs::write(&config, "").unwrap();

        let result = RenderArgs {
            input: Some(dir.path().join("missing.md")),
            output: None,
            config: Some(config),
            flags: RenderFlags::default(),
        }
        .execute();

        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
