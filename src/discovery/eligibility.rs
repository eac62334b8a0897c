// Eligibility rules
//
// Decides whether a fully-qualified class path should be documented at
// all. The include list wins unconditionally, then the exclude list,
// then every structural check must pass.

use crate::config::Config;

/// Should the class at `path` be documented?
pub fn is_eligible(path: &str, config: &Config) -> bool {
    let rules = &config.eligibility;

    if rules.include.iter().any(|p| p == path) {
        return true;
    }
    if rules.exclude.iter().any(|p| p == path) {
        return false;
    }

    // The owning application must be configured at all
    let applications = config.applications();
    let Some(app) = owning_application(path, &applications) else {
        return false;
    };

    // ... and live under one of the base prefixes
    if !rules.bases.iter().any(|base| app.starts_with(base.as_str())) {
        return false;
    }

    // ... and the path must pass through a recognized module type
    path.split('.')
        .any(|segment| rules.module_types.iter().any(|t| t == segment))
}

/// The longest configured application owning `path`, if any
fn owning_application<'a>(path: &str, applications: &[&'a str]) -> Option<&'a str> {
    applications
        .iter()
        .copied()
        .filter(|app| path == *app || path.starts_with(&format!("{}.", app)))
        .max_by_key(|app| app.len())
}
