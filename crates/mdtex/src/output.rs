//! Status lines for the terminal.
//!
//! Everything goes to stderr so `mdtex render` can stream HTML on stdout.
//! Message text is built by plain functions and only styled on the way out.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use mdtex_config::{Config, TypesetConfig};
use mdtex_page::RenderOutcome;

/// How a status line is styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Plain,
    Done,
    Warning,
    Failure,
    Banner,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Banner => Style::new().cyan().bold(),
        }
    }
}

/// Status reporter for the CLI commands.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Report what one render of the watched file did.
    pub(crate) fn render_outcome(&self, outcome: &RenderOutcome) {
        let (tone, line) = outcome_line(outcome);
        self.emit(tone, &line);
    }

    /// `mdtex render` wrote its HTML to `path`.
    pub(crate) fn wrote(&self, path: &Path, math_count: usize) {
        self.emit(
            Tone::Done,
            &format!("Wrote {} ({})", path.display(), math_spans(math_count)),
        );
    }

    /// Startup banner for `mdtex watch`.
    pub(crate) fn watching(&self, input: &Path, output: &Path, typeset: &TypesetConfig) {
        self.emit(
            Tone::Banner,
            &format!("Watching {} -> {}", input.display(), output.display()),
        );
        if typeset.has_command() {
            self.emit(
                Tone::Plain,
                &format!("Typeset command: {}", typeset.command.join(" ")),
            );
        }
    }

    pub(crate) fn input_removed(&self, input: &Path) {
        self.emit(Tone::Warning, &format!("{} was removed", input.display()));
    }

    pub(crate) fn input_unreadable(&self, error: &dyn Display) {
        self.emit(Tone::Warning, &format!("Failed to read input: {error}"));
    }

    pub(crate) fn watch_stopped(&self) {
        self.emit(Tone::Plain, "Stopping watch");
    }

    /// Startup banner for `mdtex serve`.
    pub(crate) fn editor(&self, config: &Config) {
        for (tone, line) in editor_lines(config) {
            self.emit(tone, &line);
        }
    }

    /// A command failed; the process is about to exit.
    pub(crate) fn fatal(&self, error: &dyn Display) {
        self.emit(Tone::Failure, &format!("Error: {error}"));
    }

    fn emit(&self, tone: Tone, line: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(line).to_string());
    }
}

fn math_spans(count: usize) -> String {
    if count == 1 {
        "1 math span".to_owned()
    } else {
        format!("{count} math spans")
    }
}

fn outcome_line(outcome: &RenderOutcome) -> (Tone, String) {
    match outcome {
        RenderOutcome::Rendered { math_count, .. } => {
            (Tone::Done, format!("Rendered ({})", math_spans(*math_count)))
        }
        RenderOutcome::Failed => (
            Tone::Failure,
            "Render failed, see log for details".to_owned(),
        ),
        RenderOutcome::Disabled => (Tone::Failure, "Renderer unavailable".to_owned()),
    }
}

fn editor_lines(config: &Config) -> Vec<(Tone, String)> {
    let mut lines = vec![(
        Tone::Banner,
        format!(
            "Editor on http://{}:{}",
            config.server.host, config.server.port
        ),
    )];
    if let Some(path) = &config.config_path {
        lines.push((Tone::Plain, format!("Config: {}", path.display())));
    }
    let live = if config.render.live {
        "enabled"
    } else {
        "disabled"
    };
    lines.push((Tone::Plain, format!("Live rendering: {live}")));
    lines
}
