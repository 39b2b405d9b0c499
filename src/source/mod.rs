//! Machine source module - Where declaration batches come from
//!
//! This module provides a trait-based abstraction over the places a machine can
//! be loaded from (the built-in registry, declaration files).

use crate::state_machine::{Automaton, StateDeclaration, build_automaton};
use crate::{Config, Result};
use std::path::PathBuf;

pub mod builtin;
pub mod file;

pub use builtin::{BuiltinMachine, registry};
pub use file::{DeclarationFile, FileMachine};

/// Source of a declaration batch
///
/// Implementations:
/// - `BuiltinMachine`: one of the fixed example machines
/// - `FileMachine`: a TOML or JSON declaration file
pub trait MachineSource: Send + Sync {
    /// Human readable name of the machine
    fn label(&self) -> String;

    /// Fetch the declarations; the first one is the start state
    fn declarations(&self) -> Result<Vec<StateDeclaration>>;

    /// Fetch and wire the declarations
    fn build(&self) -> Result<Automaton> {
        let declarations = self.declarations()?;
        tracing::debug!(
            "Building {} from {} declarations",
            self.label(),
            declarations.len()
        );
        build_automaton(&declarations)
    }
}

/// Create a machine source: an explicit file wins, then a named built-in,
/// then the configured default machine
pub fn create_source(
    machine: Option<&str>,
    file: Option<PathBuf>,
    config: &Config,
) -> Result<Box<dyn MachineSource>> {
    if let Some(path) = file {
        return Ok(Box::new(FileMachine::new(path)));
    }

    let key = machine.unwrap_or(&config.default.machine);
    Ok(Box::new(*builtin::find(key)?))
}
