//! External typesetting command.
//!
//! Watch mode can hand each rendered file to a command such as a MathJax or
//! KaTeX CLI that rewrites it in place. The output path is appended to the
//! configured arguments.

use std::future::Future;

use mdtex_page::{EngineReadiness, HtmlContainer, TypesetEngine, TypesetError};
use tokio::process::Command;

/// Runs an external command over each mirrored output file.
#[derive(Clone, Debug)]
pub(crate) struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Build from `[program, args...]`. Returns `None` for an empty command.
    pub(crate) fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    async fn run_on(&self, target: &HtmlContainer) -> Result<(), TypesetError> {
        let Some(path) = target.path() else {
            return Err(TypesetError::Engine(
                "output has no file for the typeset command".to_owned(),
            ));
        };

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| TypesetError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(TypesetError::Status {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }

        target
            .reload()
            .map_err(|e| TypesetError::Engine(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Typeset output");
        Ok(())
    }
}

impl TypesetEngine for CommandEngine {
    fn typeset(
        &self,
        targets: Vec<HtmlContainer>,
    ) -> impl Future<Output = Result<(), TypesetError>> + Send {
        async move {
            for target in &targets {
                self.run_on(target).await?;
            }
            Ok(())
        }
    }
}

/// Resolve `readiness` once `ready_command` succeeds.
///
/// An empty command resolves immediately. If the command fails the signal
/// stays unresolved, so typeset passes never run.
pub(crate) async fn resolve_when_ready(ready_command: Vec<String>, readiness: EngineReadiness) {
    let Some((program, args)) = ready_command.split_first() else {
        readiness.resolve();
        return;
    };

    match Command::new(program).args(args).status().await {
        Ok(status) if status.success() => readiness.resolve(),
        Ok(status) => {
            tracing::warn!(%program, %status, "Typesetting engine not ready; math stays untypeset");
        }
        Err(e) => {
            tracing::warn!(%program, error = %e, "Typesetting engine not available; math stays untypeset");
        }
    }
}
