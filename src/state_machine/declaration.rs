//! Declarative state descriptions

use crate::state_machine::{StateName, Symbol};
use std::collections::BTreeMap;

/// Description of one state, referring to other states by name only.
///
/// Because targets are plain names, a declaration can point at states declared
/// later in the same batch, at itself, or around a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateDeclaration {
    pub name: StateName,
    pub transitions: BTreeMap<Symbol, StateName>,
    pub fallback: Option<StateName>,
    pub is_accepting: bool,
}

impl StateDeclaration {
    pub fn new(name: impl Into<StateName>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Route `symbol` to `target`. A repeated symbol keeps the last target.
    pub fn on(mut self, symbol: Symbol, target: impl Into<StateName>) -> Self {
        self.transitions.insert(symbol, target.into());
        self
    }

    /// Route every symbol without an entry to `target`
    pub fn otherwise(mut self, target: impl Into<StateName>) -> Self {
        self.fallback = Some(target.into());
        self
    }

    pub fn accepting(mut self) -> Self {
        self.is_accepting = true;
        self
    }

    /// Every name this declaration refers to, transitions first
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.transitions
            .values()
            .chain(self.fallback.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let decl = StateDeclaration::new("Q0")
            .on('a', "Q1")
            .on('a', "Q0")
            .otherwise("Q2")
            .accepting();

        assert_eq!(decl.name, "Q0");
        assert_eq!(decl.transitions.get(&'a').map(String::as_str), Some("Q0"));
        assert_eq!(decl.fallback.as_deref(), Some("Q2"));
        assert!(decl.is_accepting);
        assert_eq!(decl.references().collect::<Vec<_>>(), vec!["Q0", "Q2"]);
    }
}
