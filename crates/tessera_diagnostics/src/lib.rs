//! Diagnostic creation, severity management, and rendering for the mapper.
//!
//! Every user-facing problem the mapper finds (a cyclic DFG, an infeasible
//! architecture, an exhausted search budget) becomes a structured
//! [`Diagnostic`] with a stable code. The thread-safe [`DiagnosticSink`]
//! accumulates them during a run and a [`DiagnosticRenderer`] formats them for
//! a terminal or as JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
