//! Immutable execution context.
//!
//! A [`Context`] carries the state the façade threads through a call path:
//! at most one *active span binding* (the collaborator span plus its finish
//! gate) and at most one *accumulated metadata* entry. Contexts are
//! persistent: derivation builds a new head node over the parent's chain
//! and the parent is never touched, so one context can seed any number of
//! concurrent children.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ratatoskr_tracer::SharedSpan;

use crate::loggable::Loggable;
use crate::metadata::Metadata;

/// Finish gate for one started span.
///
/// The flag is swapped atomically, so even racing `finish` calls reach the
/// underlying span at most once.
#[derive(Debug, Default)]
pub(crate) struct ActiveSpanState {
    finished: AtomicBool,
}

impl ActiveSpanState {
    /// Returns true exactly once, on the first call.
    pub(crate) fn try_finish(&self) -> bool {
        !self.finished.swap(true, Ordering::AcqRel)
    }
}

enum Binding {
    Span {
        span: SharedSpan,
        state: Arc<ActiveSpanState>,
    },
    Metadata(Metadata),
}

struct Node {
    parent: Option<Arc<Node>>,
    binding: Binding,
}

/// Immutable execution context. Cloning is an `Arc` bump.
///
/// Lookups resolve to the nearest binding, so a context derived for a
/// nested span shadows the outer span while the outer context still sees
/// its own.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// Root context: no span, no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    fn derive(&self, binding: Binding) -> Context {
        Context {
            head: Some(Arc::new(Node {
                parent: self.head.clone(),
                binding,
            })),
        }
    }

    pub(crate) fn with_span(&self, span: SharedSpan, state: Arc<ActiveSpanState>) -> Context {
        self.derive(Binding::Span { span, state })
    }

    pub(crate) fn span_binding(&self) -> Option<(SharedSpan, Arc<ActiveSpanState>)> {
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if let Binding::Span { span, state } = &current.binding {
                return Some((Arc::clone(span), Arc::clone(state)));
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Nearest span bound to this context, if any.
    pub fn span(&self) -> Option<SharedSpan> {
        self.span_binding().map(|(span, _)| span)
    }

    /// Nearest accumulated metadata, if any.
    pub fn metadata(&self) -> Option<&Metadata> {
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if let Binding::Metadata(metadata) = &current.binding {
                return Some(metadata);
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Derive a context whose accumulated metadata is the existing
    /// metadata (or empty) merged with `loggable`'s contribution.
    pub fn with_loggable(&self, loggable: &dyn Loggable) -> Context {
        let merged = match self.metadata() {
            Some(existing) => existing.clone().merge(loggable.to_metadata()),
            None => loggable.to_metadata(),
        };
        self.derive(Binding::Metadata(merged))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_span", &self.span_binding().is_some())
            .field("metadata", &self.metadata())
            .finish()
    }
}
