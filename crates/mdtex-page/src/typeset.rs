//! Typeset scheduling.
//!
//! A typesetting engine (MathJax in the browser, an external command in
//! watch mode) may take a while to become usable. [`EngineReadiness`] is the
//! one-shot signal it fires when it can accept work, and [`TypesetTrigger`]
//! defers each typeset pass until that signal has fired.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::element::HtmlContainer;
use crate::error::TypesetError;

/// One-shot readiness signal shared by everything that typesets.
///
/// Clones observe the same signal. Once resolved it stays resolved.
#[derive(Clone, Debug)]
pub struct EngineReadiness {
    tx: Arc<watch::Sender<bool>>,
}

impl EngineReadiness {
    /// Create an unresolved signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Create a signal that is already resolved.
    #[must_use]
    pub fn ready() -> Self {
        let readiness = Self::new();
        readiness.resolve();
        readiness
    }

    /// Mark the engine ready. Calls after the first are no-ops.
    pub fn resolve(&self) {
        let changed = self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if changed {
            tracing::debug!("Typesetting engine signalled ready");
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is resolved. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for EngineReadiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous typesetting engine.
pub trait TypesetEngine: Send + Sync + 'static {
    /// Typeset the math in `targets` in place.
    fn typeset(
        &self,
        targets: Vec<HtmlContainer>,
    ) -> impl Future<Output = Result<(), TypesetError>> + Send;
}

/// Placeholder engine type for pages that never typeset.
///
/// Pair it with `None` in [`TypesetTrigger::new`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEngine;

impl TypesetEngine for NoEngine {
    fn typeset(
        &self,
        _targets: Vec<HtmlContainer>,
    ) -> impl Future<Output = Result<(), TypesetError>> + Send {
        std::future::ready(Ok(()))
    }
}

/// Trigger lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// No pass has observed the readiness signal yet. Never reported by a
    /// trigger without an engine.
    AwaitingEngineReady,
    /// A pass has observed readiness; later passes run straight away.
    Ready,
}

/// Schedules typeset passes after each render.
pub struct TypesetTrigger<E = NoEngine> {
    engine: Option<Arc<E>>,
    readiness: EngineReadiness,
    ready: Arc<AtomicBool>,
}

impl<E> Clone for TypesetTrigger<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            readiness: self.readiness.clone(),
            ready: Arc::clone(&self.ready),
        }
    }
}

impl TypesetTrigger<NoEngine> {
    /// Trigger with no engine: every pass is a no-op.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, EngineReadiness::ready())
    }
}

impl<E: TypesetEngine> TypesetTrigger<E> {
    #[must_use]
    pub fn new(engine: Option<E>, readiness: EngineReadiness) -> Self {
        // Nothing to wait for without an engine
        let ready = engine.is_none();
        Self {
            engine: engine.map(Arc::new),
            readiness,
            ready: Arc::new(AtomicBool::new(ready)),
        }
    }

    #[must_use]
    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        if self.ready.load(Ordering::Acquire) {
            TriggerState::Ready
        } else {
            TriggerState::AwaitingEngineReady
        }
    }

    /// Schedule a typeset pass over `target`.
    ///
    /// Returns `None` without doing anything when no engine is configured.
    /// Otherwise the pass runs on a spawned task: it waits for readiness
    /// while the trigger is still awaiting the engine, then typesets. Passes
    /// are never cancelled by later calls and engine errors are logged, not
    /// returned.
    ///
    /// Must be called from within a Tokio runtime when an engine is set.
    pub fn trigger(&self, target: HtmlContainer) -> Option<JoinHandle<()>> {
        let engine = Arc::clone(self.engine.as_ref()?);
        let readiness = self.readiness.clone();
        let ready = Arc::clone(&self.ready);

        Some(tokio::spawn(async move {
            if !ready.load(Ordering::Acquire) {
                readiness.wait().await;
                if !ready.swap(true, Ordering::AcqRel) {
                    tracing::info!("Typesetting engine ready");
                }
            }

            if let Err(e) = engine.typeset(vec![target]).await {
                tracing::warn!(error = %e, "Typeset pass failed");
            }
        }))
    }
}
