// registry-core/src/inspector/classify.rs
//
// Structural diff between two `SchemaModel`s (spec.md §4.3). Severity
// assignment mirrors the common GraphQL-inspector convention: removals
// and type-shape changes are breaking, additions are safe, and newly
// required arguments are merely dangerous (they break nothing until a
// caller actually needs the new argument).

use serde_json::json;

use crate::domain::schema_change::{
    Severity, SchemaChange, ARGUMENT_ADDED, ARGUMENT_REMOVED, ARGUMENT_TYPE_CHANGED, ENUM_VALUE_ADDED, ENUM_VALUE_REMOVED,
    FIELD_ADDED, FIELD_REMOVED, FIELD_TYPE_CHANGED, TYPE_ADDED, TYPE_KIND_CHANGED, TYPE_REMOVED,
};
use crate::inspector::schema_model::SchemaModel;

pub fn diff(previous: &SchemaModel, incoming: &SchemaModel) -> Vec<SchemaChange> {
    let mut changes = Vec::new();

    for (type_name, previous_shape) in &previous.types {
        match incoming.types.get(type_name) {
            None => changes.push(SchemaChange::new(
                TYPE_REMOVED,
                Severity::Breaking,
                json!({"typeName": type_name}),
                Some(type_name.clone()),
            )),
            Some(incoming_shape) => {
                if incoming_shape.kind != previous_shape.kind {
                    changes.push(SchemaChange::new(
                        TYPE_KIND_CHANGED,
                        Severity::Breaking,
                        json!({"typeName": type_name, "from": format!("{:?}", previous_shape.kind), "to": format!("{:?}", incoming_shape.kind)}),
                        Some(type_name.clone()),
                    ));
                    continue;
                }

                diff_fields(type_name, previous_shape, incoming_shape, &mut changes);
                diff_enum_values(type_name, previous_shape, incoming_shape, &mut changes);
            }
        }
    }

    for type_name in incoming.types.keys() {
        if !previous.types.contains_key(type_name) {
            changes.push(SchemaChange::new(
                TYPE_ADDED,
                Severity::Safe,
                json!({"typeName": type_name}),
                Some(type_name.clone()),
            ));
        }
    }

    changes
}

fn diff_fields(
    type_name: &str,
    previous: &crate::inspector::schema_model::TypeShape,
    incoming: &crate::inspector::schema_model::TypeShape,
    changes: &mut Vec<SchemaChange>,
) {
    for (field_name, previous_field) in &previous.fields {
        let path = format!("{type_name}.{field_name}");
        match incoming.fields.get(field_name) {
            None => changes.push(SchemaChange::new(
                FIELD_REMOVED,
                Severity::Breaking,
                json!({"typeName": type_name, "fieldName": field_name}),
                Some(path),
            )),
            Some(incoming_field) => {
                if incoming_field.type_signature != previous_field.type_signature {
                    changes.push(SchemaChange::new(
                        FIELD_TYPE_CHANGED,
                        Severity::Breaking,
                        json!({
                            "typeName": type_name,
                            "fieldName": field_name,
                            "from": previous_field.type_signature,
                            "to": incoming_field.type_signature,
                        }),
                        Some(path.clone()),
                    ));
                }
                diff_arguments(type_name, field_name, previous_field, incoming_field, changes);
            }
        }
    }

    for field_name in incoming.fields.keys() {
        if !previous.fields.contains_key(field_name) {
            changes.push(SchemaChange::new(
                FIELD_ADDED,
                Severity::Safe,
                json!({"typeName": type_name, "fieldName": field_name}),
                Some(format!("{type_name}.{field_name}")),
            ));
        }
    }
}

fn diff_arguments(
    type_name: &str,
    field_name: &str,
    previous: &crate::inspector::schema_model::FieldShape,
    incoming: &crate::inspector::schema_model::FieldShape,
    changes: &mut Vec<SchemaChange>,
) {
    let path = format!("{type_name}.{field_name}");
    for (arg_name, previous_type) in &previous.args {
        match incoming.args.get(arg_name) {
            None => changes.push(SchemaChange::new(
                ARGUMENT_REMOVED,
                Severity::Breaking,
                json!({"typeName": type_name, "fieldName": field_name, "argName": arg_name}),
                Some(format!("{path}.{arg_name}")),
            )),
            Some(incoming_type) if incoming_type != previous_type => changes.push(SchemaChange::new(
                ARGUMENT_TYPE_CHANGED,
                Severity::Breaking,
                json!({
                    "typeName": type_name,
                    "fieldName": field_name,
                    "argName": arg_name,
                    "from": previous_type,
                    "to": incoming_type,
                }),
                Some(format!("{path}.{arg_name}")),
            )),
            _ => {}
        }
    }

    for arg_name in incoming.args.keys() {
        if !previous.args.contains_key(arg_name) {
            changes.push(SchemaChange::new(
                ARGUMENT_ADDED,
                Severity::Dangerous,
                json!({"typeName": type_name, "fieldName": field_name, "argName": arg_name}),
                Some(format!("{path}.{arg_name}")),
            ));
        }
    }
}

fn diff_enum_values(
    type_name: &str,
    previous: &crate::inspector::schema_model::TypeShape,
    incoming: &crate::inspector::schema_model::TypeShape,
    changes: &mut Vec<SchemaChange>,
) {
    for value in &previous.enum_values {
        if !incoming.enum_values.contains(value) {
            changes.push(SchemaChange::new(
                ENUM_VALUE_REMOVED,
                Severity::Breaking,
                json!({"typeName": type_name, "value": value}),
                Some(format!("{type_name}.{value}")),
            ));
        }
    }
    for value in &incoming.enum_values {
        if !previous.enum_values.contains(value) {
            changes.push(SchemaChange::new(
                ENUM_VALUE_ADDED,
                Severity::Safe,
                json!({"typeName": type_name, "value": value}),
                Some(format!("{type_name}.{value}")),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::schema_model::extract;

    #[test]
    fn field_removal_is_breaking() {
        let previous = extract("type Query { a: String b: Int }");
        let incoming = extract("type Query { a: String }");
        let changes = diff(&previous, &incoming);
        assert!(changes.iter().any(|c| c.change_type == FIELD_REMOVED && c.is_breaking()));
    }

    #[test]
    fn field_addition_is_safe() {
        let previous = extract("type Query { a: String }");
        let incoming = extract("type Query { a: String b: Int }");
        let changes = diff(&previous, &incoming);
        let change = changes.iter().find(|c| c.change_type == FIELD_ADDED).unwrap();
        assert_eq!(change.severity, Severity::Safe);
    }

    #[test]
    fn field_type_change_is_breaking() {
        let previous = extract("type Query { a: String }");
        let incoming = extract("type Query { a: Int }");
        let changes = diff(&previous, &incoming);
        assert!(changes.iter().any(|c| c.change_type == FIELD_TYPE_CHANGED));
    }

    #[test]
    fn new_required_argument_is_dangerous() {
        let previous = extract("type Query { a: String }");
        let incoming = extract("type Query { a(limit: Int!): String }");
        let changes = diff(&previous, &incoming);
        let change = changes.iter().find(|c| c.change_type == ARGUMENT_ADDED).unwrap();
        assert_eq!(change.severity, Severity::Dangerous);
    }

    #[test]
    fn type_removed_is_breaking() {
        let previous = extract("type Query { a: String } type Legacy { x: Int }");
        let incoming = extract("type Query { a: String }");
        let changes = diff(&previous, &incoming);
        assert!(changes.iter().any(|c| c.change_type == TYPE_REMOVED));
    }
}
