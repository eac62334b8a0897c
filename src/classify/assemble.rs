// Report assembly
//
// Pure post-processing of a raw classification report: no registry
// access, no reflection. Normalizes defining-class references, renders
// sequence-valued defaults, and fixes the ordering the rendering layer
// relies on.

use crate::classify::report::ClassReport;

/// Produce the final, stable, serialization-ready report.
///
/// Attributes and methods are reordered ascending by member name;
/// fields and the catch-all bucket keep first-introducing-ancestor
/// order.
pub fn assemble(mut report: ClassReport) -> ClassReport {
    for (_, records) in report.attributes.iter_mut() {
        for record in records.iter_mut() {
            record.defining_class = record.defining_class.normalized();

            if let Some(elements) = record.elements.take() {
                record.default = render_sequence_default(&elements);
            }
        }
    }

    report.attributes.sort_by_name();
    report.methods.sort_by_name();
    report
}

/// Display string for a sequence-valued attribute, built from element
/// type names. Any element without an extractable type name abandons
/// the rendering; the record is left without a default.
fn render_sequence_default(elements: &[Option<String>]) -> Option<String> {
    let names: Option<Vec<&str>> = elements
        .iter()
        .map(|element| element.as_deref())
        .collect();

    names.map(|names| format!("[{}]", names.join(", ")))
}
