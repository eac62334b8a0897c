// Class graph model exported by the host application
//
// The host's integration layer dumps its modules, classes and raw member
// descriptors into this serializable form. Everything the classifier
// touches is one of these records; nothing livelier than data crosses
// the boundary.

use serde::{Deserialize, Serialize};

/// Reference to a class as a (module, name) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    pub module: String,
    pub name: String,
}

impl ClassRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// The universal root base type every hierarchy terminates in
    pub fn universal_root() -> Self {
        Self::new("builtins", "object")
    }

    /// Sentinel for a member synthesized with no known declaring ancestor
    pub fn auto() -> Self {
        Self::new("Auto", "")
    }

    pub fn is_auto(&self) -> bool {
        self.module == "Auto" && self.name.is_empty()
    }

    /// Fully-qualified dotted path
    pub fn path(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }

    /// Split a dotted path on its last segment
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((module, name)) => Self::new(module, name),
            None => Self::new("", path),
        }
    }
}

/// Kind of class member as reported by the host's reflection layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    Data,
    Method,
    ClassMethod,
    StaticMethod,
    Property,
    DataDescriptor,
}

impl MemberKind {
    /// Human-readable label used in rendered output
    pub fn label(&self) -> &'static str {
        match self {
            MemberKind::Data => "data",
            MemberKind::Method => "method",
            MemberKind::ClassMethod => "class method",
            MemberKind::StaticMethod => "static method",
            MemberKind::Property => "property",
            MemberKind::DataDescriptor => "data descriptor",
        }
    }

    /// Method-like kinds, including properties
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            MemberKind::Method
                | MemberKind::ClassMethod
                | MemberKind::StaticMethod
                | MemberKind::Property
        )
    }
}

/// Shape of a host-framework descriptor
///
/// The finite set of descriptor classes the host ORM defines, supplied
/// as an explicit tag instead of sniffing runtime type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorShape {
    ForwardOneToOne,
    ForwardManyToOne,
    ReverseOneToOne,
    ReverseMany,
    ManyToMany,
    DeferredAttribute,
}

impl DescriptorShape {
    /// Relation descriptors wrap a concrete field object
    pub fn is_relation(&self) -> bool {
        !self.is_deferred()
    }

    /// The deferred-field-access wrapper delays loading until first access
    pub fn is_deferred(&self) -> bool {
        matches!(self, DescriptorShape::DeferredAttribute)
    }

    /// Host-framework class name, used as a field-type fallback
    pub fn label(&self) -> &'static str {
        match self {
            DescriptorShape::ForwardOneToOne => "ForwardOneToOneDescriptor",
            DescriptorShape::ForwardManyToOne => "ForwardManyToOneDescriptor",
            DescriptorShape::ReverseOneToOne => "ReverseOneToOneDescriptor",
            DescriptorShape::ReverseMany => "ReverseManyToOneDescriptor",
            DescriptorShape::ManyToMany => "ManyToManyDescriptor",
            DescriptorShape::DeferredAttribute => "DeferredAttribute",
        }
    }
}

/// Remote end of a relation field (`.field.remote_field` upstream)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInfo {
    /// The related entity type
    pub model: ClassRef,
    /// Class name of the remote field, when the host exposed one
    #[serde(default)]
    pub field_type: Option<String>,
}

/// Concrete field unwrapped from a descriptor (`.field` upstream)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field class name, e.g. "ForeignKey" or "CharField"
    pub field_type: String,
    #[serde(default)]
    pub remote: Option<RemoteInfo>,
}

/// A descriptor value: its shape plus whatever could be unwrapped from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorValue {
    pub shape: DescriptorShape,
    /// Absent when the descriptor exposed no `.field` to unwrap
    #[serde(default)]
    pub field: Option<FieldInfo>,
}

/// A plain data value read off the introducing class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValue {
    /// Raw rendering of the value (escaped later, at classification)
    pub repr: String,
    /// Type names of the elements when the value is a sequence.
    /// An entry is None when no type name could be extracted.
    #[serde(default)]
    pub elements: Option<Vec<Option<String>>>,
}

/// Introspection results for a callable member.
///
/// Each piece may independently be unavailable; a member implemented
/// natively has no retrievable source at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableValue {
    #[serde(default)]
    pub doc: Option<String>,
    /// Rendered argument signature, e.g. "(self, request, *args, **kwargs)"
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

/// Source location of a callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub code: String,
    pub line_start: usize,
    pub file: String,
}

impl SourceInfo {
    /// Number of source lines
    pub fn total_lines(&self) -> usize {
        self.code.lines().count()
    }
}

/// Raw value behind a member, as captured by the host's reflection layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemberValue {
    Data(DataValue),
    Callable(CallableValue),
    Descriptor(DescriptorValue),
    /// Reading the member off the class raised; carries the message
    Inaccessible { message: String },
    /// Anything the reflection layer could not shape further
    Opaque { type_name: String, repr: String },
}

impl MemberValue {
    /// True when the value is the deferred-field-access wrapper
    pub fn is_deferred(&self) -> bool {
        matches!(self, MemberValue::Descriptor(d) if d.shape.is_deferred())
    }
}

/// One member as declared directly on a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub value: MemberValue,
}

/// One declared form field (name plus field value-type name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldDef {
    pub name: String,
    pub field_type: String,
}

/// One meta option copied off a model's or form's Meta declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaOption {
    pub name: String,
    pub value: String,
}

/// Host-framework role of a class, driving metadata augmentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassRole {
    #[default]
    Plain,
    /// Persisted entity model; carries its originally declared meta options
    Model { meta_options: Vec<MetaOption> },
    Form,
    /// Model-backed form; carries its nested Meta attributes, stringified
    ModelForm { meta_options: Vec<MetaOption> },
}

/// One class in the exported graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Module path where the class is defined
    pub module: String,
    #[serde(default)]
    pub doc: Option<String>,
    /// Fully-qualified paths of immediate base classes, declaration order
    #[serde(default)]
    pub bases: Vec<String>,
    /// Members declared directly on this class
    #[serde(default)]
    pub members: Vec<MemberDef>,
    #[serde(default)]
    pub role: ClassRole,
    /// Form classes: fields declared explicitly on the class
    #[serde(default)]
    pub declared_fields: Vec<FormFieldDef>,
    /// Form classes: all active fields, declared or inherited
    #[serde(default)]
    pub base_fields: Vec<FormFieldDef>,
}

impl ClassDef {
    pub fn class_ref(&self) -> ClassRef {
        ClassRef::new(&self.module, &self.name)
    }

    pub fn path(&self) -> String {
        self.class_ref().path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_ref_path() {
        let r = ClassRef::new("shop.models", "Category");
        assert_eq!(r.path(), "shop.models.Category");
    }

    #[test]
    fn test_class_ref_from_path() {
        let r = ClassRef::from_path("shop.models.Category");
        assert_eq!(r.module, "shop.models");
        assert_eq!(r.name, "Category");
    }

    #[test]
    fn test_class_ref_from_bare_name() {
        let r = ClassRef::from_path("Category");
        assert_eq!(r.module, "");
        assert_eq!(r.name, "Category");
        assert_eq!(r.path(), "Category");
    }

    #[test]
    fn test_universal_root() {
        let root = ClassRef::universal_root();
        assert_eq!(root.path(), "builtins.object");
    }

    #[test]
    fn test_auto_sentinel() {
        let auto = ClassRef::auto();
        assert!(auto.is_auto());
        assert!(!ClassRef::universal_root().is_auto());
    }

    #[test]
    fn test_member_kind_labels() {
        assert_eq!(MemberKind::Data.label(), "data");
        assert_eq!(MemberKind::ClassMethod.label(), "class method");
        assert_eq!(MemberKind::DataDescriptor.label(), "data descriptor");
    }

    #[test]
    fn test_member_kind_is_callable() {
        assert!(MemberKind::Method.is_callable());
        assert!(MemberKind::StaticMethod.is_callable());
        assert!(MemberKind::Property.is_callable());
        assert!(!MemberKind::Data.is_callable());
        assert!(!MemberKind::DataDescriptor.is_callable());
    }

    #[test]
    fn test_descriptor_shape_deferred() {
        assert!(DescriptorShape::DeferredAttribute.is_deferred());
        assert!(!DescriptorShape::ForwardManyToOne.is_deferred());
        assert!(DescriptorShape::ForwardManyToOne.is_relation());
        assert!(!DescriptorShape::DeferredAttribute.is_relation());
    }

    #[test]
    fn test_member_value_is_deferred() {
        let deferred = MemberValue::Descriptor(DescriptorValue {
            shape: DescriptorShape::DeferredAttribute,
            field: None,
        });
        assert!(deferred.is_deferred());

        let forward = MemberValue::Descriptor(DescriptorValue {
            shape: DescriptorShape::ForwardManyToOne,
            field: None,
        });
        assert!(!forward.is_deferred());

        let data = MemberValue::Data(DataValue {
            repr: "1".to_string(),
            elements: None,
        });
        assert!(!data.is_deferred());
    }

    #[test]
    fn test_source_info_total_lines() {
        let source = SourceInfo {
            code: "def save(self):\n    pass\n".to_string(),
            line_start: 10,
            file: "shop/models.py".to_string(),
        };
        assert_eq!(source.total_lines(), 2);
    }

    #[test]
    fn test_member_value_json_round_trip() {
        let value = MemberValue::Descriptor(DescriptorValue {
            shape: DescriptorShape::ForwardManyToOne,
            field: Some(FieldInfo {
                field_type: "ForeignKey".to_string(),
                remote: Some(RemoteInfo {
                    model: ClassRef::new("shop.models", "Category"),
                    field_type: None,
                }),
            }),
        });

        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"type\":\"descriptor\""));
        assert!(json.contains("forward_many_to_one"));

        let back: MemberValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_class_def_minimal_json() {
        let json = r#"{"name": "Category", "module": "shop.models"}"#;
        let def: ClassDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.path(), "shop.models.Category");
        assert!(def.bases.is_empty());
        assert_eq!(def.role, ClassRole::Plain);
    }
}
