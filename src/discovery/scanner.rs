// Discovery scanning
//
// Enumerates every documentable class across the configured
// applications, grouped by application and module type for the index
// page. A module that fails to import is reported and skipped; the
// scan always continues.

use crate::config::Config;
use crate::registry::ClassRegistry;
use log::{debug, warn};
use serde::Serialize;

/// One discovered class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassEntry {
    pub name: String,
    pub path: String,
}

/// Classes found under one module type of an application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleClasses {
    pub module_type: String,
    pub classes: Vec<ClassEntry>,
}

/// Modules found for one application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppModules {
    pub app: String,
    pub modules: Vec<ModuleClasses>,
}

/// Discovery results grouped for index generation:
/// application -> module type -> ordered (name, path) pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryIndex {
    pub apps: Vec<AppModules>,
}

impl DiscoveryIndex {
    pub fn get(&self, app: &str) -> Option<&AppModules> {
        self.apps.iter().find(|entry| entry.app == app)
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Total number of discovered classes
    pub fn class_count(&self) -> usize {
        self.apps
            .iter()
            .flat_map(|app| app.modules.iter())
            .map(|module| module.classes.len())
            .sum()
    }
}

impl AppModules {
    pub fn get(&self, module_type: &str) -> Option<&ModuleClasses> {
        self.modules
            .iter()
            .find(|entry| entry.module_type == module_type)
    }
}

/// Enumerates documentable classes over a registry
pub struct DiscoveryScanner<'a> {
    registry: &'a ClassRegistry,
    config: &'a Config,
}

impl<'a> DiscoveryScanner<'a> {
    pub fn new(registry: &'a ClassRegistry, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Scan every configured application.
    ///
    /// Returns the grouped index and the flat ordered path list, seeded
    /// with the explicit include list before scanning begins.
    pub fn discover(&self) -> (DiscoveryIndex, Vec<String>) {
        let rules = &self.config.eligibility;
        let mut paths: Vec<String> = rules.include.clone();
        let mut index = DiscoveryIndex::default();

        for app in self.config.applications() {
            if !rules.bases.iter().any(|base| app.starts_with(base.as_str())) {
                continue;
            }

            let mut modules = Vec::new();
            for module_type in &rules.module_types {
                let candidate = format!("{}.{}", app, module_type);

                if self.is_known_app_module(&candidate) {
                    debug!("skipping {}: covered by a known-app group", candidate);
                    continue;
                }

                let module = match self.registry.import_module(&candidate) {
                    Ok(module) => module,
                    Err(e) => {
                        warn!("unable to import {}: {}", candidate, e);
                        continue;
                    }
                };

                // Class-like members defined directly in this module, in
                // name order; re-exports keep their own module attribute
                // and are excluded here.
                let mut local: Vec<&crate::registry::ClassDef> = module
                    .classes
                    .iter()
                    .filter_map(|path| self.registry.get_class(path).ok())
                    .filter(|class| class.module == candidate)
                    .collect();
                local.sort_by(|a, b| a.name.cmp(&b.name));

                let mut entries = Vec::new();
                for class in local {
                    let full = format!("{}.{}", candidate, class.name);
                    if rules.exclude.iter().any(|p| p == &full) {
                        continue;
                    }
                    paths.push(full.clone());
                    entries.push(ClassEntry {
                        name: class.name.clone(),
                        path: full,
                    });
                }

                if !entries.is_empty() {
                    modules.push(ModuleClasses {
                        module_type: module_type.clone(),
                        classes: entries,
                    });
                }
            }

            if !modules.is_empty() {
                index.apps.push(AppModules {
                    app: app.to_string(),
                    modules,
                });
            }
        }

        (index, paths)
    }

    /// Module paths under a known-app group are documented elsewhere
    /// and excluded from fresh discovery.
    fn is_known_app_module(&self, candidate: &str) -> bool {
        let candidate_dotted = format!("{}.", candidate);
        self.config
            .known_apps
            .values()
            .flatten()
            .any(|prefix| candidate_dotted.starts_with(&format!("{}.", prefix)))
    }
}
