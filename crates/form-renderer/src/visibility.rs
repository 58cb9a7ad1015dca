use std::collections::BTreeMap;

use crate::spec::FieldDescriptor;
use crate::values::ValueSet;

/// Whether `field` should currently render.
///
/// Unconditional fields always render. A conditional field renders only while
/// its dependency holds exactly the declared value; an unset dependency never
/// matches, so dependent fields start hidden. Only the dependency's value is
/// consulted, never its own visibility.
pub fn should_render(field: &FieldDescriptor, values: &ValueSet) -> bool {
    match field.conditional.as_ref() {
        None => true,
        Some(cond) => values.get(&cond.depends_on) == Some(&cond.equals),
    }
}

/// Dependency field name to the names of the fields it gates, in field order.
pub fn dependency_index(fields: &[FieldDescriptor]) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for field in fields {
        if let Some(cond) = field.conditional.as_ref() {
            index
                .entry(cond.depends_on.clone())
                .or_default()
                .push(field.name.clone());
        }
    }
    index
}
