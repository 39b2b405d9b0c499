//! Declarations loaded from TOML or JSON files
//!
//! ```toml
//! [[state]]
//! name = "Q0"
//! accepting = true
//! else = "Q2"
//! transitions = { a = "Q1" }
//! ```

use crate::source::MachineSource;
use crate::state_machine::{Automaton, StateDeclaration, StateName};
use crate::{Error, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk form of a declaration batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    /// Optional display name
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, rename = "state")]
    pub states: Vec<DeclaredState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclaredState {
    pub name: StateName,
    #[serde(default)]
    pub accepting: bool,
    #[serde(default, rename = "else")]
    pub fallback: Option<StateName>,
    /// Keys must be exactly one character
    #[serde(default)]
    pub transitions: BTreeMap<String, StateName>,
}

/// Supported encodings, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(FileFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(FileFormat::Json),
            _ => Err(Error::declaration(format!(
                "Unsupported declaration file {:?}: expected a .toml or .json extension",
                path
            ))),
        }
    }
}

impl DeclarationFile {
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self> {
        let file = match format {
            FileFormat::Toml => toml::from_str(contents)?,
            FileFormat::Json => serde_json::from_str(contents)?,
        };
        Ok(file)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Convert to declarations, validating transition keys
    pub fn into_declarations(self) -> Result<Vec<StateDeclaration>> {
        self.states
            .into_iter()
            .map(DeclaredState::into_declaration)
            .collect()
    }
}

impl DeclaredState {
    fn into_declaration(self) -> Result<StateDeclaration> {
        let mut decl = StateDeclaration::new(self.name);
        for (key, target) in self.transitions {
            let mut chars = key.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(Error::declaration(format!(
                    "State {}: transition key {:?} must be exactly one character",
                    decl.name, key
                )));
            };
            decl = decl.on(symbol, target);
        }
        if let Some(target) = self.fallback {
            decl = decl.otherwise(target);
        }
        if self.accepting {
            decl = decl.accepting();
        }
        Ok(decl)
    }
}

/// A machine read from a declaration file every time it is requested
#[derive(Debug, Clone)]
pub struct FileMachine {
    pub path: PathBuf,
}

impl FileMachine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the raw file contents, naming the file on failure
    pub fn read_contents(&self) -> Result<String> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read declaration file {:?}", self.path))?;
        Ok(contents)
    }

    /// Build from contents already read from this file
    pub fn build_from(&self, contents: &str) -> Result<Automaton> {
        let format = FileFormat::from_path(&self.path)?;
        let declarations = DeclarationFile::parse(contents, format)?.into_declarations()?;
        Automaton::from_declarations(&declarations)
    }
}

impl MachineSource for FileMachine {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn declarations(&self) -> Result<Vec<StateDeclaration>> {
        tracing::debug!("Reading declarations from {:?}", self.path);
        DeclarationFile::from_file(&self.path)?.into_declarations()
    }
}
