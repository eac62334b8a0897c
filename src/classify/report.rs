// Report structures produced by the hierarchy walk
//
// Buckets are insertion-ordered multimaps: distinct ancestors in a
// diamond hierarchy can each introduce a same-named member, so every
// name maps to a sequence of records.

use crate::registry::{ClassRef, MemberKind, MetaOption};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered mapping from member name to its records
#[derive(Debug, Clone, PartialEq)]
pub struct MemberMap<T>(Vec<(String, Vec<T>)>);

impl<T> MemberMap<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a record under a name, keeping first-seen name order
    pub fn push(&mut self, name: &str, record: T) {
        if let Some((_, records)) = self.0.iter_mut().find(|(n, _)| n == name) {
            records.push(record);
        } else {
            self.0.push((name.to_string(), vec![record]));
        }
    }

    pub fn get(&self, name: &str) -> Option<&[T]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reorder entries ascending by member name
    pub fn sort_by_name(&mut self) {
        self.0.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.0.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<T>)> {
        self.0.iter_mut().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl<T> Default for MemberMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for MemberMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, records) in &self.0 {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

/// Defining-class reference: the raw dotted path captured during the
/// walk, or the normalized (module, name) form after assembly
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefiningClass {
    Path(String),
    Ref(ClassRef),
}

impl DefiningClass {
    /// Module portion of the reference
    pub fn module(&self) -> &str {
        match self {
            DefiningClass::Path(path) => path.rsplit_once('.').map(|(m, _)| m).unwrap_or(""),
            DefiningClass::Ref(r) => &r.module,
        }
    }

    /// The (module, name) pair form
    pub fn normalized(&self) -> DefiningClass {
        match self {
            DefiningClass::Path(path) => DefiningClass::Ref(ClassRef::from_path(path)),
            DefiningClass::Ref(r) => DefiningClass::Ref(r.clone()),
        }
    }
}

/// A classified data attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    pub kind: MemberKind,
    /// HTML-escaped rendering of the value read off the introducing class
    pub value: String,
    pub defining_class: DefiningClass,
    /// Display string for sequence-valued defaults, set by the assembler
    pub default: Option<String>,
    /// Element type names when the raw value was a sequence; consumed by
    /// the assembler when rendering `default`
    #[serde(skip)]
    pub elements: Option<Vec<Option<String>>>,
}

/// Line range of a method's source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub total: usize,
}

/// A classified method, class method, static method or property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodRecord {
    pub kind: MemberKind,
    pub doc: Option<String>,
    pub defining_class: DefiningClass,
    pub arguments: Option<String>,
    pub code: String,
    pub lines: LineSpan,
    pub file: Option<String>,
}

/// A classified ORM field or form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRecord {
    pub kind: MemberKind,
    pub defining_class: ClassRef,
    pub field_type: String,
    /// (module, name) of the related entity type for relationship fields
    pub related: Option<ClassRef>,
}

/// Catch-all record so no member is silently dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherRecord {
    pub kind: MemberKind,
    /// Raw rendering of the descriptor, kept for later inspection
    pub repr: String,
}

/// The classification report for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub name: String,
    pub module: String,
    pub doc: Option<String>,
    /// Resolution order as (module, name) pairs, base-to-derived,
    /// ending with the class itself
    pub ancestors: Vec<ClassRef>,
    /// Immediate base classes
    pub parents: Vec<ClassRef>,
    pub attributes: MemberMap<AttributeRecord>,
    pub methods: MemberMap<MethodRecord>,
    pub fields: MemberMap<FieldRecord>,
    pub everything: MemberMap<OtherRecord>,
    pub meta_info: Option<Vec<MetaOption>>,
}

impl ClassReport {
    /// Fully-qualified dotted path of the reported class
    pub fn path(&self) -> String {
        ClassRef::new(&self.module, &self.name).path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_map_push_and_get() {
        let mut map: MemberMap<u32> = MemberMap::new();
        map.push("save", 1);
        map.push("save", 2);
        map.push("clean", 3);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("save"), Some(&[1, 2][..]));
        assert_eq!(map.get("clean"), Some(&[3][..]));
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn test_member_map_preserves_insertion_order() {
        let mut map: MemberMap<u32> = MemberMap::new();
        map.push("zebra", 1);
        map.push("apple", 2);
        map.push("zebra", 3);

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["zebra", "apple"]);
    }

    #[test]
    fn test_member_map_sort_by_name() {
        let mut map: MemberMap<u32> = MemberMap::new();
        map.push("zebra", 1);
        map.push("apple", 2);
        map.push("mango", 3);
        map.sort_by_name();

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_member_map_serializes_in_order() {
        let mut map: MemberMap<u32> = MemberMap::new();
        map.push("zebra", 1);
        map.push("apple", 2);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zebra":[1],"apple":[2]}"#);
    }

    #[test]
    fn test_defining_class_module() {
        let path = DefiningClass::Path("shop.models.Product".to_string());
        assert_eq!(path.module(), "shop.models");

        let reference = DefiningClass::Ref(ClassRef::new("shop.models", "Product"));
        assert_eq!(reference.module(), "shop.models");
    }

    #[test]
    fn test_defining_class_normalized() {
        let path = DefiningClass::Path("shop.models.Product".to_string());
        let normalized = path.normalized();
        assert_eq!(
            normalized,
            DefiningClass::Ref(ClassRef::new("shop.models", "Product"))
        );
    }

    #[test]
    fn test_defining_class_serialization_forms() {
        let path = DefiningClass::Path("shop.models.Product".to_string());
        assert_eq!(
            serde_json::to_string(&path).unwrap(),
            r#""shop.models.Product""#
        );

        let reference = DefiningClass::Ref(ClassRef::new("shop.models", "Product"));
        assert_eq!(
            serde_json::to_string(&reference).unwrap(),
            r#"{"module":"shop.models","name":"Product"}"#
        );
    }
}
