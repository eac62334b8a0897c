//! Class registry: the exported class graph and dotted-path resolution
//!
//! Stands in for the host's module import machinery. The host dumps its
//! class graph to a JSON snapshot once; resolving a dotted path is a
//! lookup against that snapshot, and a missing entry is the analogue of
//! an import failure.

pub mod model;

pub use model::{
    CallableValue, ClassDef, ClassRef, ClassRole, DataValue, DescriptorShape, DescriptorValue,
    FieldInfo, FormFieldDef, MemberDef, MemberKind, MemberValue, MetaOption, RemoteInfo,
    SourceInfo,
};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One module in the exported graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Fully-qualified paths of classes visible in this module.
    /// May include re-exports defined elsewhere.
    pub classes: Vec<String>,
}

/// Result of resolving a dotted path
#[derive(Debug)]
pub enum Resolved<'a> {
    Class(&'a ClassDef),
    Module(&'a ModuleDef),
}

/// The exported class graph, keyed by dotted path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassRegistry {
    modules: HashMap<String, ModuleDef>,
    classes: HashMap<String, ClassDef>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON and check its internal consistency
    pub fn from_json(json: &str) -> Result<Self> {
        let registry: ClassRegistry = serde_json::from_str(json)?;
        registry.check()?;
        Ok(registry)
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Every class key must match the (module, name) pair it maps to
    fn check(&self) -> Result<()> {
        for (key, class) in &self.classes {
            if *key != class.path() {
                return Err(Error::snapshot(format!(
                    "class key '{}' does not match entry '{}'",
                    key,
                    class.path()
                )));
            }
        }
        Ok(())
    }

    pub fn add_module(&mut self, path: impl Into<String>, module: ModuleDef) {
        self.modules.insert(path.into(), module);
    }

    pub fn add_class(&mut self, class: ClassDef) {
        self.classes.insert(class.path(), class);
    }

    /// Resolve a dotted path to a class or module
    pub fn resolve(&self, path: &str) -> Result<Resolved<'_>> {
        if let Some(class) = self.classes.get(path) {
            return Ok(Resolved::Class(class));
        }
        if let Some(module) = self.modules.get(path) {
            return Ok(Resolved::Module(module));
        }
        Err(Error::resolution(path))
    }

    /// Resolve a dotted path that must name a class
    pub fn get_class(&self, path: &str) -> Result<&ClassDef> {
        match self.resolve(path)? {
            Resolved::Class(class) => Ok(class),
            Resolved::Module(_) => Err(Error::not_a_class(path)),
        }
    }

    /// Resolve a dotted path that must name a module
    pub fn import_module(&self, path: &str) -> Result<&ModuleDef> {
        self.modules
            .get(path)
            .ok_or_else(|| Error::resolution(path))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn iter_classes(&self) -> impl Iterator<Item = (&str, &ClassDef)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
