//! Transition representation

use crate::state_machine::Symbol;
use serde::{Deserialize, Serialize};

/// Edge weight mirroring one wired entry of a state's transition table.
///
/// The implicit self-loop taken when neither a symbol entry nor a fallback
/// exists is not an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Taken on an exact symbol match
    On(Symbol),
    /// Taken when the symbol has no entry
    Fallback,
}

impl Transition {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Transition::Fallback)
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Transition::On(symbol) => Some(*symbol),
            Transition::Fallback => None,
        }
    }

    /// Get display label for the transition
    pub fn display_label(&self) -> String {
        match self {
            Transition::On(symbol) => format!("'{}'", symbol),
            Transition::Fallback => "else".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        assert_eq!(Transition::On('a').display_label(), "'a'");
        assert_eq!(Transition::Fallback.display_label(), "else");
        assert_eq!(Transition::On('b').symbol(), Some('b'));
        assert!(Transition::Fallback.is_fallback());
    }
}
