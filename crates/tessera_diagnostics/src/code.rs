//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Input and structural errors (`E`), e.g. a DFG with a cycle.
    Error,
    /// Search outcomes (`S`): mapping found, budget or attempts exhausted.
    Search,
    /// Timing properties of a schedule (`T`), e.g. skewed operation inputs.
    Timing,
    /// Warnings (`W`) that do not stop the run by themselves.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Search => 'S',
            Category::Timing => 'T',
            Category::Warning => 'W',
        }
    }
}

/// A structured diagnostic code: category prefix plus a number.
///
/// Displayed zero-padded to three digits, e.g. `E101`, `S201`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
