//! Serializing a [`Schema`] as GraphQL SDL.

use crate::ast;
use crate::name::Name;
use crate::node::Node;
use crate::schema::BUILT_IN_SCALARS;
use crate::schema::FieldDefinition;
use crate::schema::InputValueDefinition;
use crate::schema::Schema;
use crate::schema::TypeDef;
use indexmap::IndexMap;
use std::fmt;

impl Schema {
    /// Serializes the schema as SDL.
    ///
    /// Type definitions are printed in name order. Introspection meta-types
    /// and the built-in scalars are omitted, and a `schema { ... }` block is
    /// only printed when a root operation type has an unconventional name.
    pub fn to_sdl(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        let conventional_roots = self.query_type == "Query"
            && self.mutation_type.as_ref().map_or(true, |name| name == "Mutation")
            && self
                .subscription_type
                .as_ref()
                .map_or(true, |name| name == "Subscription");
        if !conventional_roots {
            f.write_str("schema {\n")?;
            writeln!(f, "  query: {}", self.query_type)?;
            if let Some(name) = &self.mutation_type {
                writeln!(f, "  mutation: {name}")?;
            }
            if let Some(name) = &self.subscription_type {
                writeln!(f, "  subscription: {name}")?;
            }
            f.write_str("}")?;
            first = false;
        }

        let mut printable: Vec<&TypeDef> = self
            .types
            .values()
            .filter(|def| {
                let name = def.name();
                !name.starts_with("__") && !BUILT_IN_SCALARS.contains(&name.as_str())
            })
            .collect();
        printable.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));

        for def in printable {
            if !first {
                f.write_str("\n\n")?;
            }
            first = false;
            print_type_def(f, def)?;
        }
        if !first {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn print_type_def(f: &mut fmt::Formatter<'_>, def: &TypeDef) -> fmt::Result {
    match def {
        TypeDef::Scalar(def) => {
            print_description(f, "", def.description.as_deref())?;
            write!(f, "scalar {}", def.name)
        }
        TypeDef::Object(def) => {
            print_description(f, "", def.description.as_deref())?;
            write!(f, "type {}", def.name)?;
            let mut sep = " implements ";
            for interface in &def.implements_interfaces {
                write!(f, "{sep}{interface}")?;
                sep = " & ";
            }
            print_fields(f, def.fields())
        }
        TypeDef::Interface(def) => {
            print_description(f, "", def.description.as_deref())?;
            write!(f, "interface {}", def.name)?;
            print_fields(f, def.fields())
        }
        TypeDef::Union(def) => {
            print_description(f, "", def.description.as_deref())?;
            write!(f, "union {}", def.name)?;
            let mut sep = " = ";
            for member in &def.members {
                write!(f, "{sep}{member}")?;
                sep = " | ";
            }
            Ok(())
        }
        TypeDef::Enum(def) => {
            print_description(f, "", def.description.as_deref())?;
            writeln!(f, "enum {} {{", def.name)?;
            for (name, value) in &def.values {
                print_description(f, "  ", value.description.as_deref())?;
                write!(f, "  {name}")?;
                print_deprecated(f, value.deprecation_reason.as_deref())?;
                f.write_str("\n")?;
            }
            f.write_str("}")
        }
        TypeDef::InputObject(def) => {
            print_description(f, "", def.description.as_deref())?;
            writeln!(f, "input {} {{", def.name)?;
            for field in def.fields().values() {
                print_description(f, "  ", field.description.as_deref())?;
                write!(f, "  {}: {}", field.name, field.ty)?;
                if let Some(default) = &field.default_value {
                    write!(f, " = {default}")?;
                }
                f.write_str("\n")?;
            }
            f.write_str("}")
        }
    }
}

fn print_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &IndexMap<Name, Node<FieldDefinition>>,
) -> fmt::Result {
    f.write_str(" {\n")?;
    for field in fields.values() {
        print_description(f, "  ", field.description.as_deref())?;
        write!(f, "  {}", field.name)?;
        print_arguments(f, &field.arguments)?;
        write!(f, ": {}", field.ty)?;
        print_deprecated(f, field.deprecation_reason.as_deref())?;
        f.write_str("\n")?;
    }
    f.write_str("}")
}

fn print_arguments(
    f: &mut fmt::Formatter<'_>,
    arguments: &[Node<InputValueDefinition>],
) -> fmt::Result {
    let mut sep = "(";
    for argument in arguments {
        write!(f, "{sep}{}: {}", argument.name, argument.ty)?;
        if let Some(default) = &argument.default_value {
            write!(f, " = {default}")?;
        }
        sep = ", ";
    }
    if !arguments.is_empty() {
        f.write_str(")")?;
    }
    Ok(())
}

fn print_description(
    f: &mut fmt::Formatter<'_>,
    indent: &str,
    description: Option<&str>,
) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };
    // https://spec.graphql.org/October2021/#sec-String-Value.Block-Strings
    let escaped = description.replace("\"\"\"", "\\\"\"\"");
    if escaped.contains('\n') || escaped.ends_with('"') {
        writeln!(f, "{indent}\"\"\"")?;
        for line in escaped.lines() {
            writeln!(f, "{indent}{line}")?;
        }
        writeln!(f, "{indent}\"\"\"")
    } else {
        writeln!(f, "{indent}\"\"\"{escaped}\"\"\"")
    }
}

fn print_deprecated(f: &mut fmt::Formatter<'_>, reason: Option<&str>) -> fmt::Result {
    let Some(reason) = reason else {
        return Ok(());
    };
    if reason == "No longer supported" {
        f.write_str(" @deprecated")
    } else {
        write!(f, " @deprecated(reason: {})", ast::Value::String(reason.into()))
    }
}
