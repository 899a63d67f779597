//! Editor page model for mdtex.
//!
//! A [`Page`] ties together an [`InputBuffer`] holding markdown source, an
//! [`HtmlContainer`] receiving rendered HTML, a
//! [`MathPipeline`](mdtex_renderer::MathPipeline) and a [`TypesetTrigger`]
//! that hands freshly rendered output to a typesetting engine once that
//! engine reports ready.
//!
//! User actions map to plain methods: [`Page::render`] for the explicit
//! render action, [`Page::input_changed`] for live mode and
//! [`Page::handle_key`] for the Ctrl/Cmd+Enter shortcut.
//!
//! The [`watch`] module feeds file changes into an input buffer for the
//! command-line watch mode.

mod element;
mod error;
mod page;
mod typeset;
pub mod watch;

pub use element::{HtmlContainer, InputBuffer};
pub use error::{PageError, TypesetError};
pub use page::{CRITICAL_MESSAGE, KeyPress, Page, RENDER_FAILED_MESSAGE, RenderOutcome};
pub use typeset::{EngineReadiness, NoEngine, TriggerState, TypesetEngine, TypesetTrigger};
