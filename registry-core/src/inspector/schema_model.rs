// registry-core/src/inspector/schema_model.rs
//
// Flattens a parsed SDL document into a comparison-friendly shape.
// `classify` diffs two of these instead of walking two CSTs side by
// side.

use std::collections::{HashMap, HashSet};

use apollo_parser::cst::{CstNode, Definition, Type};
use apollo_parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    Interface,
    InputObject,
    Enum,
    Union,
    Scalar,
}

#[derive(Debug, Clone, Default)]
pub struct FieldShape {
    pub type_signature: String,
    pub args: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TypeShape {
    pub kind: TypeKind,
    pub fields: HashMap<String, FieldShape>,
    pub enum_values: HashSet<String>,
    pub union_members: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    pub types: HashMap<String, TypeShape>,
}

pub fn extract(sdl: &str) -> SchemaModel {
    let parser = Parser::new(sdl);
    let cst = parser.parse();
    let mut types = HashMap::new();

    for definition in cst.document().definitions() {
        if let Some((name, shape)) = shape_of(&definition) {
            types.insert(name, shape);
        }
    }

    SchemaModel { types }
}

fn shape_of(definition: &Definition) -> Option<(String, TypeShape)> {
    match definition {
        Definition::ObjectTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            let fields = field_shapes(d.fields_definition().map(|f| f.field_definitions().collect()).unwrap_or_default());
            Some((name, TypeShape { kind: TypeKind::Object, fields, enum_values: HashSet::new(), union_members: HashSet::new() }))
        }
        Definition::InterfaceTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            let fields = field_shapes(d.fields_definition().map(|f| f.field_definitions().collect()).unwrap_or_default());
            Some((name, TypeShape { kind: TypeKind::Interface, fields, enum_values: HashSet::new(), union_members: HashSet::new() }))
        }
        Definition::InputObjectTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            let mut fields = HashMap::new();
            if let Some(values) = d.input_fields_definition() {
                for field in values.input_value_definitions() {
                    let Some(field_name) = field.name() else { continue };
                    let ty = field.ty().map(type_signature).unwrap_or_default();
                    fields.insert(field_name.text().to_string(), FieldShape { type_signature: ty, args: HashMap::new() });
                }
            }
            Some((name, TypeShape { kind: TypeKind::InputObject, fields, enum_values: HashSet::new(), union_members: HashSet::new() }))
        }
        Definition::EnumTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            let mut enum_values = HashSet::new();
            if let Some(values) = d.enum_values_definition() {
                for value in values.enum_value_definitions() {
                    if let Some(v) = value.enum_value() {
                        enum_values.insert(v.name().map(|n| n.text().to_string()).unwrap_or_default());
                    }
                }
            }
            Some((name, TypeShape { kind: TypeKind::Enum, fields: HashMap::new(), enum_values, union_members: HashSet::new() }))
        }
        Definition::UnionTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            let mut union_members = HashSet::new();
            if let Some(members) = d.union_member_types() {
                for member in members.named_types() {
                    if let Some(n) = member.name() {
                        union_members.insert(n.text().to_string());
                    }
                }
            }
            Some((name, TypeShape { kind: TypeKind::Union, fields: HashMap::new(), enum_values: HashSet::new(), union_members }))
        }
        Definition::ScalarTypeDefinition(d) => {
            let name = d.name()?.text().to_string();
            Some((name, TypeShape { kind: TypeKind::Scalar, fields: HashMap::new(), enum_values: HashSet::new(), union_members: HashSet::new() }))
        }
        _ => None,
    }
}

fn field_shapes(fields: Vec<apollo_parser::cst::FieldDefinition>) -> HashMap<String, FieldShape> {
    let mut out = HashMap::new();
    for field in fields {
        let Some(name) = field.name() else { continue };
        let field_type_signature = field.ty().map(type_signature).unwrap_or_default();
        let mut args = HashMap::new();
        if let Some(arg_defs) = field.arguments_definition() {
            for arg in arg_defs.input_value_definitions() {
                let Some(arg_name) = arg.name() else { continue };
                let arg_type = arg.ty().map(type_signature).unwrap_or_default();
                args.insert(arg_name.text().to_string(), arg_type);
            }
        }
        out.insert(name.text().to_string(), FieldShape { type_signature: field_type_signature, args });
    }
    out
}

fn type_signature(ty: Type) -> String {
    ty.syntax().text().to_string()
}
