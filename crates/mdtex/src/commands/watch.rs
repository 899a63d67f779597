//! `mdtex watch` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use mdtex_config::Config;
use mdtex_page::watch::{FsEventKind, InputWatcher};
use mdtex_page::{EngineReadiness, HtmlContainer, InputBuffer, Page, TypesetTrigger};
use mdtex_server::server_config_from_config;

use super::RenderFlags;
use crate::engine::{CommandEngine, resolve_when_ready};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Markdown file to watch.
    input: PathBuf,

    /// HTML file rewritten after every render.
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration file (default: auto-discover mdtex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    flags: RenderFlags,
}

impl WatchArgs {
    /// Execute the watch command. Runs until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read
    /// initially, or the file watcher cannot be started.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.flags.cli_settings()))?;
        let server_config = server_config_from_config(&config);

        let input = InputBuffer::default();
        input.load(&self.input)?;
        let container = HtmlContainer::mirrored_to(&self.output);

        let engine = CommandEngine::from_argv(&config.typeset.command);
        let readiness = EngineReadiness::new();
        if engine.is_some() {
            tokio::spawn(resolve_when_ready(
                config.typeset.ready_command.clone(),
                readiness.clone(),
            ));
        }
        let trigger = TypesetTrigger::new(engine, readiness);

        let page = Page::initialize(input, container, trigger, || Ok(server_config.pipeline()))
            .with_live(true);

        output.watching(&self.input, &self.output, &config.typeset);
        output.render_outcome(&page.render());

        let mut watcher = InputWatcher::new(&self.input)
            .with_debounce(Duration::from_millis(config.watch.debounce_ms));
        let mut events = watcher.start()?;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if event.kind == FsEventKind::Removed {
                        output.input_removed(&self.input);
                        continue;
                    }
                    if let Err(e) = page.input().load(&self.input) {
                        output.input_unreadable(&e);
                        continue;
                    }
                    if let Some(outcome) = page.input_changed() {
                        output.render_outcome(&outcome);
                    }
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    output.watch_stopped();
                    break;
                }
            }
        }

        Ok(())
    }
}
