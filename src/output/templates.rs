// Template engine for generating HTML output

use crate::classify::ClassReport;
use crate::discovery::DiscoveryIndex;
use crate::error::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html.tera")),
            ("klass.html", include_str!("../../templates/klass.html.tera")),
            ("index.html", include_str!("../../templates/index.html.tera")),
        ])?;

        tera.register_filter("definer_module", definer_module);
        tera.register_filter("definer_name", definer_name);
        tera.register_filter("display_group", display_group);

        Ok(Self { tera })
    }

    /// Render the page for one classified class
    pub fn render_klass(
        &self,
        report: &ClassReport,
        known_apps: &BTreeMap<String, Vec<String>>,
        project_name: &str,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("klass", report);
        context.insert("known_apps", known_apps);
        context.insert("project_name", project_name);

        Ok(self.tera.render("klass.html", &context)?)
    }

    /// Render the index page grouping classes by app and module type
    pub fn render_index(&self, index: &DiscoveryIndex, project_name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("index", index);
        context.insert("project_name", project_name);

        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render a custom template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Module portion of a defining-class reference.
///
/// The reference is a raw dotted path for records the assembler leaves
/// alone, or a (module, name) object after normalization; both forms
/// are accepted.
fn definer_module(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(definer_parts(value).0))
}

/// Class-name portion of a defining-class reference
fn definer_name(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(definer_parts(value).1))
}

fn definer_parts(value: &Value) -> (String, String) {
    match value {
        Value::String(path) => match path.rsplit_once('.') {
            Some((module, name)) => (module.to_string(), name.to_string()),
            None => (String::new(), path.clone()),
        },
        Value::Object(map) => (
            map.get("module").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            map.get("name").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        ),
        _ => (String::new(), String::new()),
    }
}

/// Display group owning a defining-class reference.
///
/// Looks the defining module up in the known-app groups passed as
/// `groups`; members outside every group belong to "local".
fn display_group(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let (module, _) = definer_parts(value);

    if let Some(Value::Object(groups)) = args.get("groups") {
        for (group, prefixes) in groups {
            let Some(prefixes) = prefixes.as_array() else {
                continue;
            };
            let owned = prefixes.iter().filter_map(|p| p.as_str()).any(|prefix| {
                module == prefix || module.starts_with(&format!("{}.", prefix))
            });
            if owned {
                return Ok(Value::String(group.clone()));
            }
        }
    }

    Ok(Value::String("local".to_string()))
}

/// Context for rendering the search index
#[derive(Debug, Serialize)]
pub struct SearchEntry {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub description: Option<String>,
    pub module: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{assemble, HierarchyWalker};
    use crate::registry::{ClassDef, ClassRegistry, ClassRole};

    fn sample_report() -> ClassReport {
        let mut registry = ClassRegistry::new();
        registry.add_class(ClassDef {
            name: "Category".to_string(),
            module: "shop.models".to_string(),
            doc: Some("A product category.".to_string()),
            bases: vec![],
            members: vec![],
            role: ClassRole::Plain,
            declared_fields: vec![],
            base_fields: vec![],
        });

        let walker = HierarchyWalker::new(&registry);
        assemble(walker.walk("shop.models.Category").unwrap())
    }

    #[test]
    fn test_render_klass_page() {
        let engine = TemplateEngine::new().unwrap();
        let report = sample_report();
        let html = engine
            .render_klass(&report, &BTreeMap::new(), "Shop")
            .unwrap();

        assert!(html.contains("Category"));
        assert!(html.contains("shop.models"));
        assert!(html.contains("A product category."));
        assert!(html.contains("builtins.object"));
    }

    #[test]
    fn test_render_index_page_empty() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render_index(&DiscoveryIndex::default(), "Shop")
            .unwrap();
        assert!(html.contains("No applications were discovered"));
    }

    #[test]
    fn test_definer_module_from_path() {
        let value = Value::String("shop.models.Product".to_string());
        let result = definer_module(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), "shop.models");
    }

    #[test]
    fn test_definer_name_from_object() {
        let value = serde_json::json!({"module": "shop.models", "name": "Product"});
        let result = definer_name(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), "Product");
    }

    #[test]
    fn test_display_group_match() {
        let value = Value::String("django.views.generic.base.TemplateView".to_string());
        let mut args = HashMap::new();
        args.insert(
            "groups".to_string(),
            serde_json::json!({"django": ["django"]}),
        );

        let result = display_group(&value, &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "django");
    }

    #[test]
    fn test_display_group_requires_segment_boundary() {
        // Module "djangoish.views" must not match the "django" prefix
        let value = Value::String("djangoish.views.Thing".to_string());
        let mut args = HashMap::new();
        args.insert(
            "groups".to_string(),
            serde_json::json!({"django": ["django"]}),
        );

        let result = display_group(&value, &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "local");
    }

    #[test]
    fn test_display_group_without_groups_is_local() {
        let value = Value::String("shop.models.Product".to_string());
        let result = display_group(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), "local");
    }
}
