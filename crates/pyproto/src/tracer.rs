//! Builtin call tracing.
//!
//! The [`BuiltinTracer`] trait defines hook points at the events this layer is responsible
//! for: entering and leaving a builtin, resolving a metaclass, and finishing a class.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (default) |
//! | [`StderrTracer`] | Human-readable log to stderr |
//! | [`RecordingTracer`] | Event capture for tests and post-mortem analysis |
//!
//! # Usage
//!
//! ```
//! use pyproto::{RecordingTracer, Runtime, TraceEvent};
//!
//! let tracer = RecordingTracer::new();
//! let rt = Runtime::builder().tracer(tracer.clone()).build();
//! rt.call_builtin("abs", pyproto::ArgValues::one(pyproto::Value::Int(-1))).unwrap();
//! assert!(matches!(tracer.events()[0], TraceEvent::BuiltinCall { .. }));
//! ```

use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

/// Trace event emitted while builtins run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// A builtin was entered.
    BuiltinCall {
        name: String,
        /// Number of positional arguments.
        argc: usize,
        /// Nesting depth of runtime calls at entry.
        depth: usize,
    },
    /// A builtin returned or raised.
    BuiltinReturn { name: String, ok: bool, depth: usize },
    /// Class construction chose its metaclass.
    MetaclassResolved { class_name: String, metaclass: String },
    /// Class construction finished and produced a class.
    ClassBuilt { class_name: String, metaclass: String },
}

/// Hooks called by the runtime at builtin-level events.
///
/// All methods default to doing nothing, so implementations only override what they need.
pub trait BuiltinTracer: std::fmt::Debug {
    /// Called before a builtin binds its arguments.
    fn on_builtin_call(&mut self, _name: &str, _argc: usize, _depth: usize) {}

    /// Called after a builtin finished, successfully or not.
    fn on_builtin_return(&mut self, _name: &str, _ok: bool, _depth: usize) {}

    /// Called once `__build_class__` has settled on a metaclass.
    fn on_metaclass_resolved(&mut self, _class_name: &str, _metaclass: &str) {}

    /// Called after the metaclass returned the new class.
    fn on_class_built(&mut self, _class_name: &str, _metaclass: &str) {}
}

/// Tracer that does nothing; the runtime default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl BuiltinTracer for NoopTracer {}

/// Tracer that prints a human-readable log to stderr.
///
/// Output format:
/// ```text
///   >>> len                  argc=1  depth=1
///   <<< len                  ok      depth=1
///   ... class Foo            metaclass=type
/// ```
#[derive(Debug, Default)]
pub struct StderrTracer {
    /// Maximum number of lines to print; `None` means unlimited.
    limit: Option<usize>,
    count: usize,
}

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracer that goes quiet after `limit` lines.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if self.limit.is_some_and(|l| self.count >= l) {
            return;
        }
        eprintln!("{line}");
        self.count += 1;
        if let Some(limit) = self.limit
            && self.count == limit
        {
            eprintln!("--- trace limit reached ({limit} lines) ---");
        }
    }
}

impl BuiltinTracer for StderrTracer {
    fn on_builtin_call(&mut self, name: &str, argc: usize, depth: usize) {
        self.emit(format_args!("  >>> {name:<20} argc={argc}  depth={depth}"));
    }

    fn on_builtin_return(&mut self, name: &str, ok: bool, depth: usize) {
        let status = if ok { "ok" } else { "raised" };
        self.emit(format_args!("  <<< {name:<20} {status:<7} depth={depth}"));
    }

    fn on_metaclass_resolved(&mut self, class_name: &str, metaclass: &str) {
        self.emit(format_args!("  ... class {class_name:<14} metaclass={metaclass}"));
    }

    fn on_class_built(&mut self, class_name: &str, metaclass: &str) {
        self.emit(format_args!("  +++ class {class_name:<14} built by {metaclass}"));
    }
}

/// Tracer that records every event.
///
/// Clones share one event buffer, so keep a clone to read the events after handing the
/// tracer to a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Rc<RefCell<Vec<TraceEvent>>>,
    limit: Option<usize>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::with_capacity(limit.min(1024)))),
            limit: Some(limit),
        }
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    fn record(&self, event: TraceEvent) {
        let mut events = self.events.borrow_mut();
        if self.limit.is_none_or(|l| events.len() < l) {
            events.push(event);
        }
    }
}

impl BuiltinTracer for RecordingTracer {
    fn on_builtin_call(&mut self, name: &str, argc: usize, depth: usize) {
        self.record(TraceEvent::BuiltinCall {
            name: name.to_owned(),
            argc,
            depth,
        });
    }

    fn on_builtin_return(&mut self, name: &str, ok: bool, depth: usize) {
        self.record(TraceEvent::BuiltinReturn {
            name: name.to_owned(),
            ok,
            depth,
        });
    }

    fn on_metaclass_resolved(&mut self, class_name: &str, metaclass: &str) {
        self.record(TraceEvent::MetaclassResolved {
            class_name: class_name.to_owned(),
            metaclass: metaclass.to_owned(),
        });
    }

    fn on_class_built(&mut self, class_name: &str, metaclass: &str) {
        self.record(TraceEvent::ClassBuilt {
            class_name: class_name.to_owned(),
            metaclass: metaclass.to_owned(),
        });
    }
}
