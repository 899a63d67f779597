//! The editor page.

use mdtex_renderer::{CmarkRenderer, MathPipeline, RendererInitError, StructuralRenderer};
use tokio::task::JoinHandle;

use crate::element::{HtmlContainer, InputBuffer};
use crate::typeset::{NoEngine, TypesetEngine, TypesetTrigger};

/// Persistent message shown when the renderer could not be constructed.
pub const CRITICAL_MESSAGE: &str =
    r#"<p style="color: red;">Critical: markdown renderer failed to load.</p>"#;

/// Message shown when a single render fails.
pub const RENDER_FAILED_MESSAGE: &str = r#"<p style="color: red;">An error occurred during rendering. Check the console for details.</p>"#;

/// A key press delivered to the input area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyPress<'a> {
    /// Key name as reported by the UI (`"Enter"`, `"a"`, ...).
    pub key: &'a str,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
}

impl<'a> KeyPress<'a> {
    #[must_use]
    pub fn new(key: &'a str) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Whether this is the render shortcut (Ctrl+Enter or Cmd+Enter).
    #[must_use]
    pub fn is_render_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.key == "Enter"
    }
}

/// What a render action did.
#[derive(Debug)]
pub enum RenderOutcome {
    /// New HTML was committed to the output.
    Rendered {
        math_count: usize,
        /// Scheduled typeset pass, if an engine is configured.
        typeset: Option<JoinHandle<()>>,
    },
    /// The render failed and the output now shows the error message.
    Failed,
    /// The renderer never initialized; nothing was done.
    Disabled,
}

impl RenderOutcome {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// Wait for the scheduled typeset pass, if any.
    pub async fn typeset_finished(self) {
        if let Self::Rendered {
            typeset: Some(handle),
            ..
        } = self
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Typeset task panicked");
        }
    }
}

/// Markdown editor page: one input, one output, one typeset trigger.
pub struct Page<E = NoEngine, R = CmarkRenderer> {
    input: InputBuffer,
    output: HtmlContainer,
    pipeline: Option<MathPipeline<R>>,
    trigger: TypesetTrigger<E>,
    live: bool,
}

impl<E: TypesetEngine, R: StructuralRenderer> Page<E, R> {
    /// Build a page, constructing the pipeline with `factory`.
    ///
    /// If the factory fails the output shows [`CRITICAL_MESSAGE`] and every
    /// later render returns [`RenderOutcome::Disabled`].
    pub fn initialize<F>(
        input: InputBuffer,
        output: HtmlContainer,
        trigger: TypesetTrigger<E>,
        factory: F,
    ) -> Self
    where
        F: FnOnce() -> Result<MathPipeline<R>, RendererInitError>,
    {
        let pipeline = match factory() {
            Ok(pipeline) => {
                tracing::debug!("Markdown renderer initialized");
                Some(pipeline)
            }
            Err(e) => {
                tracing::error!(error = %e, "Markdown renderer failed to load");
                if let Err(e) = output.replace(CRITICAL_MESSAGE) {
                    tracing::warn!(error = %e, "Failed to write output");
                }
                None
            }
        };

        Self {
            input,
            output,
            pipeline,
            trigger,
            live: false,
        }
    }

    /// Render on every input change.
    #[must_use]
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    #[must_use]
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &HtmlContainer {
        &self.output
    }

    /// Whether the renderer failed to initialize.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.pipeline.is_none()
    }

    /// Render the input into the output and schedule typesetting.
    ///
    /// The output is only replaced once the whole render succeeded; on
    /// failure it is replaced by [`RENDER_FAILED_MESSAGE`] instead.
    pub fn render(&self) -> RenderOutcome {
        let Some(pipeline) = &self.pipeline else {
            tracing::debug!("Render skipped: renderer unavailable");
            return RenderOutcome::Disabled;
        };

        let raw = self.input.text();
        let result = match pipeline.render(&raw) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "An error occurred during rendering");
                if let Err(e) = self.output.replace(RENDER_FAILED_MESSAGE) {
                    tracing::warn!(error = %e, "Failed to write output");
                }
                return RenderOutcome::Failed;
            }
        };

        if let Err(e) = self.output.replace(result.html) {
            tracing::warn!(error = %e, "Failed to write output");
        }
        tracing::info!(math = result.math_count, "Content rendered");

        RenderOutcome::Rendered {
            math_count: result.math_count,
            typeset: self.trigger.trigger(self.output.clone()),
        }
    }

    /// Input changed. Renders only in live mode.
    pub fn input_changed(&self) -> Option<RenderOutcome> {
        self.live.then(|| self.render())
    }

    /// Handle a key press in the input area.
    ///
    /// Returns `Some` when the key was the render shortcut and was consumed.
    pub fn handle_key(&self, key: KeyPress<'_>) -> Option<RenderOutcome> {
        if !key.is_render_shortcut() {
            return None;
        }
        tracing::debug!("Shortcut render triggered");
        Some(self.render())
    }
}
