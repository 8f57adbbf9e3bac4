use crate::ast;
use crate::execution::engine::ExecutionContext;
use crate::execution::engine::LinkedPath;
use crate::execution::engine::PropagateNull;
use crate::node::Node;
use crate::request::RequestError;
use crate::request::SuspectedValidationBug;
use crate::response::GraphQLError;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::schema::FieldDefinition;
use crate::schema::Schema;
use crate::schema::TypeDef;
use crate::Valid;
use std::sync::Arc;

/// A request error from coercing a JSON value, which carries no source location
macro_rules! request_error {
    ($($arg: tt)+) => {
        RequestError::new(format!($($arg)+), None)
    };
}

/// An error that validation of the document against the schema
/// should have caught earlier
macro_rules! validation_bug {
    ($($arg: tt)+) => {
        SuspectedValidationBug {
            message: format!($($arg)+),
            location: None,
        }
        .into_request_error()
    };
}

/// Coerce the values of variables from a request to the types expected by the
/// operation.
///
/// This is a pre-requisite to [executing][crate::execution::Execution] that
/// operation.
///
/// <https://spec.graphql.org/October2021/#sec-Coercing-Variable-Values>
pub fn coerce_variable_values(
    schema: &Valid<Schema>,
    operation: &ast::OperationDefinition,
    values: &JsonMap,
) -> Result<Valid<JsonMap>, RequestError> {
    let mut coerced_values = JsonMap::new();
    for variable_def in &operation.variables {
        let name = variable_def.name.as_str();
        if let Some((key, value)) = values.get_key_value(name) {
            let value =
                coerce_variable_value(schema, "variable", "", "", name, &variable_def.ty, value)?;
            coerced_values.insert(key.clone(), value);
        } else if let Some(default) = &variable_def.default_value {
            let value = graphql_value_to_json("variable", "", "", name, default)?;
            coerced_values.insert(name, value);
        } else if variable_def.ty.is_non_null() {
            return Err(request_error!("missing value for non-null variable '{name}'"));
        } else {
            // Nullable variable with no provided value or default:
            // its key is absent from the coerced map
        }
    }
    Ok(Valid(coerced_values))
}

fn coerce_variable_value(
    schema: &Valid<Schema>,
    kind: &str,
    parent: &str,
    sep: &str,
    name: &str,
    ty: &ast::Type,
    value: &JsonValue,
) -> Result<JsonValue, RequestError> {
    if value.is_null() {
        if ty.is_non_null() {
            return Err(request_error!(
                "null value for non-null {kind} {parent}{sep}{name}"
            ));
        } else {
            return Ok(JsonValue::Null);
        }
    }
    let ty_name = ty.inner_named_type();
    let Some(ty_def) = schema.type_by_name(ty_name) else {
        return Err(validation_bug!(
            "Undefined type {ty_name} for {kind} {parent}{sep}{name}"
        ));
    };
    if !ty_def.is_input_type() {
        return Err(validation_bug!(
            "Non-input type {ty_name} for {kind} {parent}{sep}{name}."
        ));
    }
    if let ast::Type::List(inner_ty) | ast::Type::NonNullList(inner_ty) = ty {
        // <https://spec.graphql.org/October2021/#sec-List.Input-Coercion>
        let values = if let Some(array) = value.as_array() {
            array.as_slice()
        } else {
            // A single value is coerced to a list of one
            std::slice::from_ref(value)
        };
        return Ok(JsonValue::Array(
            values
                .iter()
                .map(|item| coerce_variable_value(schema, kind, parent, sep, name, inner_ty, item))
                .collect::<Result<_, _>>()?,
        ));
    }
    match ty_def {
        TypeDef::InputObject(ty_def) => {
            // <https://spec.graphql.org/October2021/#sec-Input-Objects.Input-Coercion>
            if let Some(object) = value.as_object() {
                let fields = ty_def.fields();
                for key in object.keys() {
                    if !fields.contains_key(key.as_str()) {
                        return Err(request_error!(
                            "Input object has key {} not in type {ty_name}",
                            key.as_str()
                        ));
                    }
                }
                let mut coerced_object = JsonMap::with_capacity(object.len());
                for (field_name, field_def) in fields {
                    if let Some((key, field_value)) = object.get_key_value(field_name.as_str()) {
                        let coerced = coerce_variable_value(
                            schema,
                            "input field",
                            ty_name,
                            ".",
                            field_name,
                            &field_def.ty,
                            field_value,
                        )?;
                        coerced_object.insert(key.clone(), coerced);
                    } else if let Some(default) = &field_def.default_value {
                        let default = graphql_value_to_json(
                            "input field",
                            ty_name,
                            ".",
                            field_name,
                            default,
                        )?;
                        coerced_object.insert(field_name.as_str(), default);
                    } else if field_def.ty.is_non_null() {
                        return Err(request_error!(
                            "Missing value for non-null input object field {ty_name}.{field_name}"
                        ));
                    } else {
                        // Field not required
                    }
                }
                return Ok(JsonValue::Object(coerced_object));
            }
        }
        TypeDef::Enum(ty_def) => {
            // <https://spec.graphql.org/October2021/#sec-Enums.Input-Coercion>
            if let Some(value_name) = value.as_str() {
                if let Some(coerced) = ty_def.parse_value(value_name) {
                    return Ok(coerced);
                }
            }
        }
        TypeDef::Scalar(ty_def) => match ty_name.as_str() {
            "Int" => {
                // <https://spec.graphql.org/October2021/#sec-Int.Input-Coercion>
                if value
                    .as_i64()
                    .is_some_and(|value| i32::try_from(value).is_ok())
                {
                    return Ok(value.clone());
                }
            }
            "Float" => {
                // <https://spec.graphql.org/October2021/#sec-Float.Input-Coercion>
                if value.is_f64() {
                    return Ok(value.clone());
                }
                if let Some(int) = value.as_i64() {
                    return Ok((int as f64).into());
                }
            }
            "String" => {
                // <https://spec.graphql.org/October2021/#sec-String.Input-Coercion>
                if value.is_string() {
                    return Ok(value.clone());
                }
            }
            "Boolean" => {
                // <https://spec.graphql.org/October2021/#sec-Boolean.Input-Coercion>
                if value.is_boolean() {
                    return Ok(value.clone());
                }
            }
            "ID" => {
                // <https://spec.graphql.org/October2021/#sec-ID.Input-Coercion>
                if value.is_string() || value.is_i64() {
                    return Ok(value.clone());
                }
            }
            _ => {
                if let Some(parse_value) = &ty_def.parse_value {
                    return parse_value(value).map_err(|err| {
                        request_error!("Could not coerce {kind} {parent}{sep}{name}: {err}")
                    });
                } else {
                    // No parser configured: the resolver takes the value as-is
                    return Ok(value.clone());
                }
            }
        },
        TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_) => {
            // Not an input type, checked above
        }
    }
    Err(request_error!(
        "Could not coerce {kind} {parent}{sep}{name}: {value} to type {ty_name}"
    ))
}

/// Convert a GraphQL value from a default in the schema or the document
/// to a JSON value, without knowledge of the expected type
fn graphql_value_to_json(
    kind: &str,
    parent: &str,
    sep: &str,
    name: &str,
    value: &Node<ast::Value>,
) -> Result<JsonValue, RequestError> {
    match value.as_ref() {
        ast::Value::Null => Ok(JsonValue::Null),
        ast::Value::Variable(_) => {
            // Every variable is in scope in an operation, but not in a default value
            Err(SuspectedValidationBug {
                message: format!("Variable in default value of {kind} {parent}{sep}{name}."),
                location: value.location(),
            }
            .into_request_error())
        }
        ast::Value::Enum(value) => Ok(value.as_str().into()),
        ast::Value::String(value) => Ok(value.as_str().into()),
        ast::Value::Boolean(value) => Ok((*value).into()),
        ast::Value::Int(int) => Ok(int
            .try_to_i32()
            .map_err(|_| {
                RequestError::new(
                    format!("Int value overflow in {kind} {parent}{sep}{name}"),
                    value.location(),
                )
            })?
            .into()),
        ast::Value::Float(float) => Ok(float
            .try_to_f64()
            .map_err(|_| {
                RequestError::new(
                    format!("Float value overflow in {kind} {parent}{sep}{name}"),
                    value.location(),
                )
            })?
            .into()),
        ast::Value::List(values) => Ok(JsonValue::Array(
            values
                .iter()
                .map(|value| graphql_value_to_json(kind, parent, sep, name, value))
                .collect::<Result<_, _>>()?,
        )),
        ast::Value::Object(fields) => Ok(JsonValue::Object(
            fields
                .iter()
                .map(|(key, value)| {
                    Ok((
                        key.as_str().into(),
                        graphql_value_to_json(kind, parent, sep, name, value)?,
                    ))
                })
                .collect::<Result<_, _>>()?,
        )),
    }
}

/// Coerce the argument values of one field selection, memoized in
/// [`ExecutionContext::argument_cache`] so that the same selection against the
/// same field definition is only coerced once per operation.
///
/// <https://spec.graphql.org/October2021/#sec-Coercing-Argument-Values>
pub(crate) fn coerce_argument_values<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    field_def: &'a Node<FieldDefinition>,
    field: &'a Node<ast::Field>,
) -> Result<Arc<JsonMap>, PropagateNull> {
    let cache_key = (
        field_def.as_ref() as *const FieldDefinition as usize,
        field.as_ref() as *const ast::Field as usize,
    );
    if let Some(cached) = ctx.argument_cache.get(&cache_key) {
        return Ok(Arc::clone(cached));
    }
    let mut coerced_values = JsonMap::new();
    for arg_def in &field_def.arguments {
        let arg_name = &arg_def.name;
        if let Some(arg) = field.arguments.iter().find(|arg| arg.name == *arg_name) {
            if let Some(var_name) = arg.value.as_variable() {
                if let Some(var_value) = ctx.variable_values.get(var_name.as_str()) {
                    if var_value.is_null() && arg_def.ty.is_non_null() {
                        ctx.errors.push(GraphQLError::field_error(
                            format!("null value for non-nullable argument {arg_name}"),
                            path,
                            arg.value.location(),
                            &ctx.document.sources,
                        ));
                        return Err(PropagateNull);
                    } else {
                        coerced_values.insert(arg_name.as_str(), var_value.clone());
                        continue;
                    }
                }
                // Variable not provided: fall through to the default value
            } else if arg.value.is_null() {
                if arg_def.ty.is_non_null() {
                    ctx.errors.push(GraphQLError::field_error(
                        format!("null value for non-nullable argument {arg_name}"),
                        path,
                        arg.value.location(),
                        &ctx.document.sources,
                    ));
                    return Err(PropagateNull);
                } else {
                    coerced_values.insert(arg_name.as_str(), JsonValue::Null);
                    continue;
                }
            } else {
                let coerced_value = coerce_argument_value(
                    ctx,
                    path,
                    "argument",
                    "",
                    "",
                    arg_name,
                    &arg_def.ty,
                    &arg.value,
                )?;
                coerced_values.insert(arg_name.as_str(), coerced_value);
                continue;
            }
        }
        if let Some(default) = &arg_def.default_value {
            let value =
                graphql_value_to_json("argument", "", "", arg_name, default).map_err(|err| {
                    ctx.errors.push(GraphQLError::field_error(
                        err.message,
                        path,
                        err.location,
                        &ctx.document.sources,
                    ));
                    PropagateNull
                })?;
            coerced_values.insert(arg_name.as_str(), value);
            continue;
        }
        if arg_def.ty.is_non_null() {
            ctx.errors.push(GraphQLError::field_error(
                format!("missing value for required argument {arg_name}"),
                path,
                field.name.location(),
                &ctx.document.sources,
            ));
            return Err(PropagateNull);
        }
    }
    let coerced = Arc::new(coerced_values);
    ctx.argument_cache.insert(cache_key, Arc::clone(&coerced));
    Ok(coerced)
}

#[allow(clippy::too_many_arguments)]
fn coerce_argument_value(
    ctx: &mut ExecutionContext<'_>,
    path: LinkedPath<'_>,
    kind: &str,
    parent: &str,
    sep: &str,
    name: &str,
    ty: &ast::Type,
    value: &Node<ast::Value>,
) -> Result<JsonValue, PropagateNull> {
    if value.is_null() {
        if ty.is_non_null() {
            ctx.errors.push(GraphQLError::field_error(
                format!("null value for non-null {kind} {parent}{sep}{name}"),
                path,
                value.location(),
                &ctx.document.sources,
            ));
            return Err(PropagateNull);
        } else {
            return Ok(JsonValue::Null);
        }
    }
    if let Some(var_name) = value.as_variable() {
        if let Some(var_value) = ctx.variable_values.get(var_name.as_str()) {
            if var_value.is_null() && ty.is_non_null() {
                ctx.errors.push(GraphQLError::field_error(
                    format!("null variable value for non-null {kind} {parent}{sep}{name}"),
                    path,
                    value.location(),
                    &ctx.document.sources,
                ));
                return Err(PropagateNull);
            } else {
                return Ok(var_value.clone());
            }
        } else if ty.is_non_null() {
            ctx.errors.push(GraphQLError::field_error(
                format!("missing variable for non-null {kind} {parent}{sep}{name}"),
                path,
                value.location(),
                &ctx.document.sources,
            ));
            return Err(PropagateNull);
        } else {
            return Ok(JsonValue::Null);
        }
    }
    let ty_name = ty.inner_named_type();
    let Some(ty_def) = ctx.schema.type_by_name(ty_name) else {
        ctx.errors.push(
            SuspectedValidationBug {
                message: format!("Undefined type {ty_name} for {kind} {parent}{sep}{name}"),
                location: value.location(),
            }
            .into_field_error(&ctx.document.sources, path),
        );
        return Err(PropagateNull);
    };
    if !ty_def.is_input_type() {
        ctx.errors.push(
            SuspectedValidationBug {
                message: format!("Non-input type {ty_name} for {kind} {parent}{sep}{name}."),
                location: value.location(),
            }
            .into_field_error(&ctx.document.sources, path),
        );
        return Err(PropagateNull);
    }
    if let ast::Type::List(inner_ty) | ast::Type::NonNullList(inner_ty) = ty {
        // <https://spec.graphql.org/October2021/#sec-List.Input-Coercion>
        let values = if let Some(list) = value.as_list() {
            list
        } else {
            // A single value is coerced to a list of one
            std::slice::from_ref(value)
        };
        return Ok(JsonValue::Array(
            values
                .iter()
                .map(|value| {
                    coerce_argument_value(ctx, path, kind, parent, sep, name, inner_ty, value)
                })
                .collect::<Result<_, _>>()?,
        ));
    }
    match ty_def {
        TypeDef::InputObject(ty_def) => {
            // <https://spec.graphql.org/October2021/#sec-Input-Objects.Input-Coercion>
            if let Some(object) = value.as_object() {
                let fields = ty_def.fields();
                for (key, _) in object {
                    if !fields.contains_key(key.as_str()) {
                        ctx.errors.push(GraphQLError::field_error(
                            format!("Input object has key {key} not in type {ty_name}"),
                            path,
                            value.location(),
                            &ctx.document.sources,
                        ));
                        return Err(PropagateNull);
                    }
                }
                let mut coerced_object = JsonMap::with_capacity(object.len());
                for (field_name, field_def) in fields {
                    if let Some((_, field_value)) =
                        object.iter().find(|(key, _)| key == field_name)
                    {
                        let coerced = coerce_argument_value(
                            ctx,
                            path,
                            "input field",
                            ty_name,
                            ".",
                            field_name,
                            &field_def.ty,
                            field_value,
                        )?;
                        coerced_object.insert(field_name.as_str(), coerced);
                    } else if let Some(default) = &field_def.default_value {
                        let default =
                            graphql_value_to_json("input field", ty_name, ".", field_name, default)
                                .map_err(|err| {
                                    ctx.errors.push(GraphQLError::field_error(
                                        err.message,
                                        path,
                                        err.location,
                                        &ctx.document.sources,
                                    ));
                                    PropagateNull
                                })?;
                        coerced_object.insert(field_name.as_str(), default);
                    } else if field_def.ty.is_non_null() {
                        ctx.errors.push(GraphQLError::field_error(
                            format!(
                                "Missing value for non-null input object field \
                                 {ty_name}.{field_name}"
                            ),
                            path,
                            value.location(),
                            &ctx.document.sources,
                        ));
                        return Err(PropagateNull);
                    } else {
                        // Field not required
                    }
                }
                return Ok(JsonValue::Object(coerced_object));
            }
        }
        TypeDef::Enum(ty_def) => {
            // Accept enum values as names, not as strings.
            // <https://spec.graphql.org/October2021/#sec-Enums.Input-Coercion>
            if let Some(value_name) = value.as_enum() {
                if let Some(coerced) = ty_def.parse_value(value_name.as_str()) {
                    return Ok(coerced);
                }
            }
        }
        TypeDef::Scalar(ty_def) => match ty_name.as_str() {
            "Int" => {
                // <https://spec.graphql.org/October2021/#sec-Int.Input-Coercion>
                if let ast::Value::Int(int) = value.as_ref() {
                    if let Ok(int) = int.try_to_i32() {
                        return Ok(int.into());
                    }
                }
            }
            "Float" => {
                // <https://spec.graphql.org/October2021/#sec-Float.Input-Coercion>
                match value.as_ref() {
                    ast::Value::Float(float) => {
                        if let Ok(float) = float.try_to_f64() {
                            return Ok(float.into());
                        }
                    }
                    ast::Value::Int(int) => {
                        if let Ok(float) = int.try_to_f64() {
                            return Ok(float.into());
                        }
                    }
                    _ => {}
                }
            }
            "String" => {
                // <https://spec.graphql.org/October2021/#sec-String.Input-Coercion>
                if let ast::Value::String(string) = value.as_ref() {
                    return Ok(string.as_str().into());
                }
            }
            "Boolean" => {
                // <https://spec.graphql.org/October2021/#sec-Boolean.Input-Coercion>
                if let ast::Value::Boolean(boolean) = value.as_ref() {
                    return Ok((*boolean).into());
                }
            }
            "ID" => {
                // <https://spec.graphql.org/October2021/#sec-ID.Input-Coercion>
                match value.as_ref() {
                    ast::Value::String(string) => return Ok(string.as_str().into()),
                    ast::Value::Int(int) => {
                        if let Ok(int) = int.as_str().parse::<i64>() {
                            return Ok(int.into());
                        }
                    }
                    _ => {}
                }
            }
            _ => {
                if let Some(parse_literal) = &ty_def.parse_literal {
                    match parse_literal(value) {
                        Ok(coerced) => return Ok(coerced),
                        Err(err) => {
                            ctx.errors.push(GraphQLError::field_error(
                                format!("Could not coerce {kind} {parent}{sep}{name}: {err}"),
                                path,
                                value.location(),
                                &ctx.document.sources,
                            ));
                            return Err(PropagateNull);
                        }
                    }
                }
                // No parser configured: convert the literal structurally
                return graphql_value_to_json(kind, parent, sep, name, value).map_err(|err| {
                    ctx.errors.push(GraphQLError::field_error(
                        err.message,
                        path,
                        err.location,
                        &ctx.document.sources,
                    ));
                    PropagateNull
                });
            }
        },
        TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_) => {
            // Not an input type, checked above
        }
    }
    ctx.errors.push(GraphQLError::field_error(
        format!("Could not coerce {kind} {parent}{sep}{name}: {value} to type {ty_name}"),
        path,
        value.location(),
        &ctx.document.sources,
    ));
    Err(PropagateNull)
}
