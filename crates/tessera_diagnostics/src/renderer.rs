//! Rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;

/// Formats a single diagnostic for an output target.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic into a string, including its trailing newline.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a sequence of diagnostics back to back.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

/// Renders diagnostics in a rustc-like terminal format:
///
/// ```text
/// error[S201]: no mapping found
///    = note: 64 attempts exhausted
///    = help: raise max_attempts or relax ii
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalRenderer {
    /// Whether to wrap the severity in ANSI color codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let ansi = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{ansi}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.severity_label(diag),
            diag.code,
            diag.message
        );
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

/// Renders each diagnostic as one line of JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut line = serde_json::to_string(diag)
            .unwrap_or_else(|e| format!("{{\"error\":\"unserializable diagnostic: {e}\"}}"));
        line.push('\n');
        line
    }
}
