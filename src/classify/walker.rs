// Hierarchy walking
//
// Computes a class's resolution order and accumulates classified
// members ancestor by ancestor. Each ancestor contributes only the
// members its own definition introduces; inherited-but-not-overridden
// members stay attributed to their original definer.

use crate::classify::member::{
    auto_field_record, classify_member, declared_field_record, meta_info, Classified,
};
use crate::classify::report::{ClassReport, MemberMap};
use crate::error::{Error, Result};
use crate::registry::{ClassDef, ClassRef, ClassRegistry, Resolved};
use std::collections::{HashMap, HashSet};

/// Walks a class's ancestry and produces a raw classification report
pub struct HierarchyWalker<'a> {
    registry: &'a ClassRegistry,
}

impl<'a> HierarchyWalker<'a> {
    pub fn new(registry: &'a ClassRegistry) -> Self {
        Self { registry }
    }

    /// Classify every inherited member of the class at `path`.
    ///
    /// Fails when the path does not resolve, names a module instead of
    /// a class, or the hierarchy cannot be linearized.
    pub fn walk(&self, path: &str) -> Result<ClassReport> {
        let class = match self.registry.resolve(path)? {
            Resolved::Class(class) => class,
            Resolved::Module(_) => return Err(Error::not_a_class(path)),
        };

        let order = self.resolution_order(class)?;
        let mro: Vec<&ClassDef> = order
            .iter()
            .map(|p| self.registry.get_class(p))
            .collect::<Result<_>>()?;

        let mut ancestors = vec![ClassRef::universal_root()];
        ancestors.extend(mro.iter().map(|c| c.class_ref()));

        let parents = class
            .bases
            .iter()
            .map(|base| self.registry.get_class(base).map(|c| c.class_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut attributes = MemberMap::new();
        let mut methods = MemberMap::new();
        let mut fields = MemberMap::new();
        let mut everything = MemberMap::new();

        for ancestor in &mro {
            for member in ancestor.members.iter().filter(|m| is_visible(&m.name)) {
                match classify_member(ancestor, member) {
                    Classified::Attribute(record) => attributes.push(&member.name, record),
                    Classified::Method(record) => methods.push(&member.name, record),
                    Classified::Field(record) => fields.push(&member.name, record),
                    Classified::Other(record) => everything.push(&member.name, record),
                    Classified::Skipped => {}
                }
            }

            // Form ancestors synthesize one field record per declared field
            for form_field in &ancestor.declared_fields {
                fields.push(&form_field.name, declared_field_record(ancestor, form_field));
            }
        }

        // Active form fields with no declaring ancestor get the sentinel
        for form_field in &class.base_fields {
            if !fields.contains(&form_field.name) {
                fields.push(&form_field.name, auto_field_record(form_field));
            }
        }

        Ok(ClassReport {
            name: class.name.clone(),
            module: class.module.clone(),
            doc: class.doc.clone(),
            ancestors,
            parents,
            attributes,
            methods,
            fields,
            everything,
            meta_info: meta_info(class),
        })
    }

    /// Resolution order of `class` as dotted paths, base-to-derived,
    /// ending with the class itself. The universal root is implicit and
    /// not included.
    pub fn resolution_order(&self, class: &ClassDef) -> Result<Vec<String>> {
        let mut memo = HashMap::new();
        let mut visiting = HashSet::new();
        let mut order = self.linearize(&class.path(), &mut memo, &mut visiting)?;
        order.reverse();
        Ok(order)
    }

    /// C3 linearization, derived-first
    fn linearize(
        &self,
        path: &str,
        memo: &mut HashMap<String, Vec<String>>,
        visiting: &mut HashSet<String>,
    ) -> Result<Vec<String>> {
        if let Some(order) = memo.get(path) {
            return Ok(order.clone());
        }
        if !visiting.insert(path.to_string()) {
            return Err(Error::linearization(path, "inheritance cycle"));
        }

        let class = self.registry.get_class(path)?;

        let mut sequences: Vec<Vec<String>> = Vec::new();
        for base in &class.bases {
            sequences.push(self.linearize(base, memo, visiting)?);
        }
        if !class.bases.is_empty() {
            sequences.push(class.bases.clone());
        }

        let merged = c3_merge(sequences)
            .ok_or_else(|| Error::linearization(path, "inconsistent base order"))?;

        let mut order = vec![path.to_string()];
        order.extend(merged);

        visiting.remove(path);
        memo.insert(path.to_string(), order.clone());
        Ok(order)
    }
}

/// Merge base linearizations: repeatedly take the first head that
/// appears in no other sequence's tail.
fn c3_merge(mut sequences: Vec<Vec<String>>) -> Option<Vec<String>> {
    let mut result = Vec::new();

    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let head = sequences
            .iter()
            .map(|s| s[0].clone())
            .find(|candidate| !sequences.iter().any(|s| s[1..].contains(candidate)))?;

        for sequence in &mut sequences {
            sequence.retain(|c| *c != head);
        }
        result.push(head);
    }
}

/// Member names visible to documentation: private single-underscore
/// names are hidden, dunders survive here and are skipped during
/// classification instead.
fn is_visible(name: &str) -> bool {
    !name.starts_with('_') || name.starts_with("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        CallableValue, ClassRole, DataValue, MemberDef, MemberKind, MemberValue, ModuleDef,
    };

    fn class(module: &str, name: &str, bases: &[&str], members: Vec<MemberDef>) -> ClassDef {
        ClassDef {
            name: name.to_string(),
            module: module.to_string(),
            doc: None,
            bases: bases.iter().map(|b| b.to_string()).collect(),
            members,
            role: ClassRole::Plain,
            declared_fields: vec![],
            base_fields: vec![],
        }
    }

    fn data(name: &str, repr: &str) -> MemberDef {
        MemberDef {
            name: name.to_string(),
            kind: MemberKind::Data,
            value: MemberValue::Data(DataValue {
                repr: repr.to_string(),
                elements: None,
            }),
        }
    }

    fn method(name: &str) -> MemberDef {
        MemberDef {
            name: name.to_string(),
            kind: MemberKind::Method,
            value: MemberValue::Callable(CallableValue {
                doc: None,
                arguments: None,
                source: None,
            }),
        }
    }

    fn diamond_registry() -> ClassRegistry {
        // A <- B, A <- C, (B, C) <- D
        let mut registry = ClassRegistry::new();
        registry.add_class(class("app.views", "A", &[], vec![method("dispatch")]));
        registry.add_class(class("app.views", "B", &["app.views.A"], vec![method("get")]));
        registry.add_class(class("app.views", "C", &["app.views.A"], vec![method("post")]));
        registry.add_class(class(
            "app.views",
            "D",
            &["app.views.B", "app.views.C"],
            vec![method("dispatch")],
        ));
        registry
    }

    #[test]
    fn test_resolution_order_linear_chain() {
        let mut registry = ClassRegistry::new();
        registry.add_class(class("a", "Base", &[], vec![]));
        registry.add_class(class("a", "Mid", &["a.Base"], vec![]));
        registry.add_class(class("a", "Leaf", &["a.Mid"], vec![]));

        let walker = HierarchyWalker::new(&registry);
        let leaf = registry.get_class("a.Leaf").unwrap();
        let order = walker.resolution_order(leaf).unwrap();
        assert_eq!(order, vec!["a.Base", "a.Mid", "a.Leaf"]);
    }

    #[test]
    fn test_resolution_order_diamond() {
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let d = registry.get_class("app.views.D").unwrap();
        let order = walker.resolution_order(d).unwrap();
        assert_eq!(
            order,
            vec!["app.views.A", "app.views.C", "app.views.B", "app.views.D"]
        );
    }

    #[test]
    fn test_every_class_after_its_bases() {
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let d = registry.get_class("app.views.D").unwrap();
        let order = walker.resolution_order(d).unwrap();

        for (index, path) in order.iter().enumerate() {
            let def = registry.get_class(path).unwrap();
            for base in &def.bases {
                let base_index = order.iter().position(|p| p == base).unwrap();
                assert!(base_index < index, "{} must come before {}", base, path);
            }
        }
    }

    #[test]
    fn test_walk_ancestors_end_with_target() {
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("app.views.D").unwrap();

        assert_eq!(report.ancestors.first(), Some(&ClassRef::universal_root()));
        assert_eq!(
            report.ancestors.last(),
            Some(&ClassRef::new("app.views", "D"))
        );
    }

    #[test]
    fn test_walk_parents_are_immediate_bases_only() {
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("app.views.D").unwrap();

        assert_eq!(
            report.parents,
            vec![ClassRef::new("app.views", "B"), ClassRef::new("app.views", "C")]
        );
    }

    #[test]
    fn test_walk_attributes_each_introducer() {
        // dispatch is introduced by both A and D
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("app.views.D").unwrap();

        let dispatch = report.methods.get("dispatch").unwrap();
        assert_eq!(dispatch.len(), 2);
        assert_eq!(dispatch[0].defining_class.module(), "app.views");
        // Base-to-derived accumulation: A's record first, D's second
        let definers: Vec<String> = dispatch
            .iter()
            .map(|r| serde_json::to_string(&r.defining_class).unwrap())
            .collect();
        assert!(definers[0].contains("A"));
        assert!(definers[1].contains("D"));
    }

    #[test]
    fn test_walk_single_introducer_not_reattributed() {
        let registry = diamond_registry();
        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("app.views.D").unwrap();

        // get is introduced by B alone; D inherits it without a record
        let get = report.methods.get("get").unwrap();
        assert_eq!(get.len(), 1);
        assert!(serde_json::to_string(&get[0].defining_class)
            .unwrap()
            .contains("app.views.B"));
    }

    #[test]
    fn test_walk_hides_private_members() {
        let mut registry = ClassRegistry::new();
        registry.add_class(class(
            "a",
            "Thing",
            &[],
            vec![
                data("_private", "1"),
                data("__dunder__", "2"),
                data("public", "3"),
            ],
        ));

        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("a.Thing").unwrap();

        assert!(report.attributes.contains("public"));
        assert!(!report.attributes.contains("_private"));
        assert!(!report.attributes.contains("__dunder__"));
    }

    #[test]
    fn test_walk_module_is_not_a_class() {
        let mut registry = ClassRegistry::new();
        registry.add_module("shop.models", ModuleDef::default());

        let walker = HierarchyWalker::new(&registry);
        let err = walker.walk("shop.models").unwrap_err();
        assert!(matches!(err, Error::NotAClass { .. }));
    }

    #[test]
    fn test_walk_missing_path() {
        let registry = ClassRegistry::new();
        let walker = HierarchyWalker::new(&registry);
        assert!(walker.walk("nowhere.Nothing").unwrap_err().is_resolution());
    }

    #[test]
    fn test_walk_missing_base() {
        let mut registry = ClassRegistry::new();
        registry.add_class(class("a", "Orphan", &["a.Missing"], vec![]));

        let walker = HierarchyWalker::new(&registry);
        assert!(walker.walk("a.Orphan").unwrap_err().is_resolution());
    }

    #[test]
    fn test_inheritance_cycle_fails() {
        let mut registry = ClassRegistry::new();
        registry.add_class(class("a", "X", &["a.Y"], vec![]));
        registry.add_class(class("a", "Y", &["a.X"], vec![]));

        let walker = HierarchyWalker::new(&registry);
        let err = walker.walk("a.X").unwrap_err();
        assert!(matches!(err, Error::Linearization { .. }));
    }

    #[test]
    fn test_declared_fields_synthesized_per_ancestor() {
        let mut registry = ClassRegistry::new();
        let mut base_form = class("app.forms", "BaseForm", &[], vec![]);
        base_form.declared_fields = vec![crate::registry::FormFieldDef {
            name: "email".to_string(),
            field_type: "EmailField".to_string(),
        }];
        registry.add_class(base_form);

        let mut contact = class("app.forms", "ContactForm", &["app.forms.BaseForm"], vec![]);
        contact.base_fields = vec![
            crate::registry::FormFieldDef {
                name: "email".to_string(),
                field_type: "EmailField".to_string(),
            },
            crate::registry::FormFieldDef {
                name: "name".to_string(),
                field_type: "CharField".to_string(),
            },
        ];
        registry.add_class(contact);

        let walker = HierarchyWalker::new(&registry);
        let report = walker.walk("app.forms.ContactForm").unwrap();

        // email comes from the declaring ancestor, name from the sentinel
        let email = report.fields.get("email").unwrap();
        assert_eq!(email.len(), 1);
        assert_eq!(email[0].defining_class, ClassRef::new("app.forms", "BaseForm"));

        let name = report.fields.get("name").unwrap();
        assert!(name[0].defining_class.is_auto());
    }

    #[test]
    fn test_c3_merge_rejects_inconsistent_order() {
        let sequences = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string(), "a".to_string()],
        ];
        assert!(c3_merge(sequences).is_none());
    }

    #[test]
    fn test_is_visible() {
        assert!(is_visible("save"));
        assert!(is_visible("__init__"));
        assert!(!is_visible("_secret"));
    }
}
