// Member classification
//
// Takes one class and one inherited member descriptor and decides which
// bucket it lands in. Rules are evaluated in order; the catch-all
// bucket exists so no member is ever silently dropped.

use crate::classify::report::{
    AttributeRecord, DefiningClass, FieldRecord, LineSpan, MethodRecord, OtherRecord,
};
use crate::registry::{
    ClassDef, ClassRef, ClassRole, DescriptorValue, FormFieldDef, MemberDef, MemberKind,
    MemberValue, MetaOption,
};

/// Reserved metadata member name, never documented
pub const RESERVED_META_NAME: &str = "Meta";

/// Reverse one-to-one descriptors introduced by this class are dropped.
/// Known host-framework special case, not generalizable.
const DROPPED_REVERSE_ONE_TO_ONE_OWNER: &str = "Page";

/// Outcome of classifying one member
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Attribute(AttributeRecord),
    Method(MethodRecord),
    Field(FieldRecord),
    Other(OtherRecord),
    Skipped,
}

/// Classify one member introduced by `introducing`
pub fn classify_member(introducing: &ClassDef, member: &MemberDef) -> Classified {
    if member.name == RESERVED_META_NAME || member.name.starts_with("__") {
        return Classified::Skipped;
    }

    if member.kind == MemberKind::Data {
        return Classified::Attribute(attribute_record(introducing, member));
    }

    if member.kind.is_callable() && !member.value.is_deferred() {
        return Classified::Method(method_record(introducing, member));
    }

    if member.kind == MemberKind::DataDescriptor || member.value.is_deferred() {
        if is_dropped_reverse_one_to_one(introducing, &member.value) {
            return Classified::Skipped;
        }
        return Classified::Field(field_record(introducing, member));
    }

    Classified::Other(OtherRecord {
        kind: member.kind,
        repr: value_repr(&member.value),
    })
}

fn attribute_record(introducing: &ClassDef, member: &MemberDef) -> AttributeRecord {
    let (raw, elements) = match &member.value {
        MemberValue::Data(data) => (data.repr.clone(), data.elements.clone()),
        MemberValue::Inaccessible { message } => (message.clone(), None),
        other => (value_repr(other), None),
    };

    AttributeRecord {
        kind: member.kind,
        value: escape(&raw),
        defining_class: DefiningClass::Path(introducing.path()),
        default: None,
        elements,
    }
}

fn method_record(introducing: &ClassDef, member: &MemberDef) -> MethodRecord {
    let mut doc = None;
    let mut arguments = None;
    let mut code = String::new();
    let mut lines = LineSpan { start: 0, total: 0 };
    let mut file = None;

    match &member.value {
        MemberValue::Callable(callable) => {
            doc = callable.doc.clone();
            arguments = callable.arguments.clone();
            if let Some(source) = &callable.source {
                code = source.code.clone();
                lines = LineSpan {
                    start: source.line_start,
                    total: source.total_lines(),
                };
                file = Some(source.file.clone());
            }
        }
        // Reading the member raised; the message stands in for the doc
        MemberValue::Inaccessible { message } => doc = Some(message.clone()),
        _ => {}
    }

    MethodRecord {
        kind: member.kind,
        doc,
        defining_class: DefiningClass::Path(introducing.path()),
        arguments,
        code,
        lines,
        file,
    }
}

fn field_record(introducing: &ClassDef, member: &MemberDef) -> FieldRecord {
    let (field_type, related) = match &member.value {
        MemberValue::Descriptor(descriptor) => resolve_field_type(descriptor),
        MemberValue::Opaque { type_name, .. } => (type_name.clone(), None),
        _ => ("object".to_string(), None),
    };

    FieldRecord {
        kind: member.kind,
        defining_class: introducing.class_ref(),
        field_type,
        related,
    }
}

/// Resolve the concrete field type behind a descriptor, and the related
/// entity type when the field represents a relationship.
///
/// Every step is a fallible lookup: a descriptor with no unwrappable
/// field keeps its shape name, a field with no remote end yields no
/// relation.
pub fn resolve_field_type(descriptor: &DescriptorValue) -> (String, Option<ClassRef>) {
    let shape = descriptor.shape;

    if shape.is_relation() {
        match &descriptor.field {
            Some(field) => {
                let related = field.remote.as_ref().map(|remote| remote.model.clone());
                (field.field_type.clone(), related)
            }
            None => (shape.label().to_string(), None),
        }
    } else {
        // Deferred wrapper: relationship case unwraps through the remote
        // field, plain attribute case falls back to the field itself
        let field_type = descriptor
            .field
            .as_ref()
            .map(|field| {
                field
                    .remote
                    .as_ref()
                    .and_then(|remote| remote.field_type.clone())
                    .unwrap_or_else(|| field.field_type.clone())
            })
            .unwrap_or_else(|| shape.label().to_string());
        (field_type, None)
    }
}

fn is_dropped_reverse_one_to_one(introducing: &ClassDef, value: &MemberValue) -> bool {
    matches!(value, MemberValue::Descriptor(d)
        if d.shape == crate::registry::DescriptorShape::ReverseOneToOne
            && introducing.name == DROPPED_REVERSE_ONE_TO_ONE_OWNER)
}

/// Field record synthesized for a form's explicitly declared field
pub fn declared_field_record(introducing: &ClassDef, field: &FormFieldDef) -> FieldRecord {
    FieldRecord {
        kind: MemberKind::Data,
        defining_class: introducing.class_ref(),
        field_type: field.field_type.clone(),
        related: None,
    }
}

/// Field record synthesized for an active form field with no known
/// declaring ancestor
pub fn auto_field_record(field: &FormFieldDef) -> FieldRecord {
    FieldRecord {
        kind: MemberKind::Data,
        defining_class: ClassRef::auto(),
        field_type: field.field_type.clone(),
        related: None,
    }
}

/// Meta options copied off a model or model-form class, dunders dropped
pub fn meta_info(class: &ClassDef) -> Option<Vec<MetaOption>> {
    let options = match &class.role {
        ClassRole::Model { meta_options } | ClassRole::ModelForm { meta_options } => meta_options,
        _ => return None,
    };

    let kept: Vec<MetaOption> = options
        .iter()
        .filter(|option| !option.name.starts_with("__"))
        .cloned()
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

fn value_repr(value: &MemberValue) -> String {
    match value {
        MemberValue::Data(data) => data.repr.clone(),
        MemberValue::Callable(_) => "<callable>".to_string(),
        MemberValue::Descriptor(descriptor) => format!("<{}>", descriptor.shape.label()),
        MemberValue::Inaccessible { message } => message.clone(),
        MemberValue::Opaque { repr, .. } => repr.clone(),
    }
}

/// Escape HTML special characters
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
