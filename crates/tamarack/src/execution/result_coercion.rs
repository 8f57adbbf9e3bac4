use crate::ast;
use crate::execution::engine::execute_selection_set;
use crate::execution::engine::try_nullify;
use crate::execution::engine::ExecutionContext;
use crate::execution::engine::ExecutionError;
use crate::execution::engine::ExecutionMode;
use crate::execution::engine::LinkedPath;
use crate::execution::engine::LinkedPathElement;
use crate::execution::engine::PropagateNull;
use crate::execution::resolver::AsyncObjectSource;
use crate::execution::resolver::AsyncResolvedValue;
use crate::execution::resolver::MaybeAsync;
use crate::execution::resolver::MaybeAsyncResolved;
use crate::execution::resolver::MaybeAsyncSource;
use crate::execution::resolver::ObjectSource;
use crate::execution::resolver::ResolvedValue;
use crate::execution::resolver::ResolverError;
use crate::execution::resolver::SourceProbe;
use crate::name::NamedType;
use crate::node::Node;
use crate::request::SuspectedValidationBug;
use crate::response::GraphQLError;
use crate::response::JsonValue;
use crate::response::PathElement;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::TypeDef;
use crate::Valid;
use futures::stream::BoxStream;
use futures::StreamExt as _;

/// <https://spec.graphql.org/October2021/#CompleteValue()>
pub(crate) async fn complete_value<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    ty: &ast::Type,
    resolved: MaybeAsyncResolved<'_>,
    fields: &[&'a Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let location = fields[0].name.location();
    macro_rules! field_error {
        ($($arg: tt)+) => {{
            ctx.errors.push(GraphQLError::field_error(
                format!($($arg)+),
                path,
                location,
                &ctx.document.sources,
            ));
            return Err(PropagateNull.into());
        }};
    }
    if let MaybeAsync::Sync(ResolvedValue::Leaf(JsonValue::Null))
    | MaybeAsync::Async(AsyncResolvedValue::Leaf(JsonValue::Null)) = &resolved
    {
        if ty.is_non_null() {
            field_error!("non-null type {ty} resolved to null")
        } else {
            return Ok(JsonValue::Null);
        }
    }
    match resolved {
        MaybeAsync::Sync(ResolvedValue::List(iter)) => {
            return match ty {
                ast::Type::Named(_) | ast::Type::NonNullNamed(_) => {
                    field_error!("Non-list type {ty} resolved to a list")
                }
                ast::Type::List(inner_ty) | ast::Type::NonNullList(inner_ty) => {
                    complete_list_value(ctx, path, mode, inner_ty, MaybeAsync::Sync(iter), fields)
                        .await
                }
            }
        }
        MaybeAsync::Async(AsyncResolvedValue::List(stream)) => {
            return match ty {
                ast::Type::Named(_) | ast::Type::NonNullNamed(_) => {
                    field_error!("Non-list type {ty} resolved to a list")
                }
                ast::Type::List(inner_ty) | ast::Type::NonNullList(inner_ty) => {
                    complete_list_value(
                        ctx,
                        path,
                        mode,
                        inner_ty,
                        MaybeAsync::Async(stream),
                        fields,
                    )
                    .await
                }
            }
        }
        // Leaf or object, completed below
        _ => {}
    }
    let ty_name = match ty {
        ast::Type::List(_) | ast::Type::NonNullList(_) => {
            field_error!("list type {ty} resolved to an object")
        }
        ast::Type::Named(ty_name) | ast::Type::NonNullNamed(ty_name) => ty_name,
    };
    let Some(ty_def) = ctx.schema.type_by_name(ty_name) else {
        ctx.errors.push(
            SuspectedValidationBug {
                message: format!("Undefined type {ty_name}"),
                location,
            }
            .into_field_error(&ctx.document.sources, path),
        );
        return Err(PropagateNull.into());
    };
    if let TypeDef::InputObject(_) = ty_def {
        ctx.errors.push(
            SuspectedValidationBug {
                message: format!("Non-output type {ty_name}"),
                location,
            }
            .into_field_error(&ctx.document.sources, path),
        );
        return Err(PropagateNull.into());
    }
    match resolved {
        MaybeAsync::Sync(ResolvedValue::Leaf(value))
        | MaybeAsync::Async(AsyncResolvedValue::Leaf(value)) => {
            complete_leaf_value(ctx, path, ty_name, ty_def, value, fields)
        }
        MaybeAsync::Sync(ResolvedValue::Object(source)) => {
            complete_object_value(
                ctx,
                path,
                mode,
                ty_name,
                ty_def,
                MaybeAsync::Sync(source),
                fields,
            )
            .await
        }
        MaybeAsync::Async(AsyncResolvedValue::Object(source)) => {
            complete_object_value(
                ctx,
                path,
                mode,
                ty_name,
                ty_def,
                MaybeAsync::Async(source),
                fields,
            )
            .await
        }
        MaybeAsync::Sync(ResolvedValue::List(_))
        | MaybeAsync::Async(AsyncResolvedValue::List(_)) => {
            // `ty` is not a list type here, lists were dispatched above
            field_error!("Non-list type {ty} resolved to a list")
        }
    }
}

/// <https://spec.graphql.org/October2021/#sec-Value-Completion.Coercing-Results>
fn complete_leaf_value(
    ctx: &mut ExecutionContext<'_>,
    path: LinkedPath<'_>,
    ty_name: &NamedType,
    ty_def: &TypeDef,
    value: JsonValue,
    fields: &[&Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let location = fields[0].name.location();
    macro_rules! field_error {
        ($($arg: tt)+) => {{
            ctx.errors.push(GraphQLError::field_error(
                format!($($arg)+),
                path,
                location,
                &ctx.document.sources,
            ));
            return Err(PropagateNull.into());
        }};
    }
    let coerced = match ty_def {
        TypeDef::Enum(enum_def) => {
            // <https://spec.graphql.org/October2021/#sec-Enums.Result-Coercion>
            match enum_def.serialize(&value) {
                Some(name) => name.as_str().into(),
                None => field_error!("resolver returned {value}, expected enum {ty_name}"),
            }
        }
        TypeDef::Scalar(scalar_def) => match ty_name.as_str() {
            "Int" => {
                // <https://spec.graphql.org/October2021/#sec-Int.Result-Coercion>
                match value.as_i64() {
                    Some(int) if i32::try_from(int).is_ok() => value,
                    Some(_) => field_error!("resolver returned {value} which overflows Int"),
                    None => field_error!("resolver returned {value}, expected Int"),
                }
            }
            "Float" => {
                // <https://spec.graphql.org/October2021/#sec-Float.Result-Coercion>
                if value.is_f64() {
                    value
                } else {
                    field_error!("resolver returned {value}, expected Float")
                }
            }
            "String" => {
                // <https://spec.graphql.org/October2021/#sec-String.Result-Coercion>
                if value.is_string() {
                    value
                } else {
                    field_error!("resolver returned {value}, expected String")
                }
            }
            "Boolean" => {
                // <https://spec.graphql.org/October2021/#sec-Boolean.Result-Coercion>
                if value.is_boolean() {
                    value
                } else {
                    field_error!("resolver returned {value}, expected Boolean")
                }
            }
            "ID" => {
                // <https://spec.graphql.org/October2021/#sec-ID.Result-Coercion>
                if value.is_string() {
                    value
                } else if let Some(int) = value.as_i64() {
                    int.to_string().into()
                } else {
                    field_error!("resolver returned {value}, expected ID")
                }
            }
            _ => {
                if let Some(serialize) = &scalar_def.serialize {
                    match serialize(&value) {
                        Ok(serialized) => serialized,
                        Err(err) => field_error!(
                            "resolver returned a value that scalar {ty_name} \
                             cannot serialize: {err}"
                        ),
                    }
                } else {
                    // `ScalarType::new` requires `serialize`, and the
                    // built-in scalars are matched by name above
                    value
                }
            }
        },
        _ => {
            field_error!(
                "resolver returned a leaf value \
                 but expected an object for type {ty_name}"
            )
        }
    };
    Ok(coerced)
}

async fn complete_object_value<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    ty_name: &NamedType,
    ty_def: &'a TypeDef,
    source: MaybeAsync<Box<dyn AsyncObjectSource + '_>, Box<dyn ObjectSource + '_>>,
    fields: &[&'a Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let location = fields[0].name.location();
    macro_rules! field_error {
        ($($arg: tt)+) => {{
            ctx.errors.push(GraphQLError::field_error(
                format!($($arg)+),
                path,
                location,
                &ctx.document.sources,
            ));
            return Err(PropagateNull.into());
        }};
    }
    let borrowed: MaybeAsyncSource<'_> = match &source {
        MaybeAsync::Async(boxed) => MaybeAsync::Async(&**boxed),
        MaybeAsync::Sync(boxed) => MaybeAsync::Sync(&**boxed),
    };
    let probe = SourceProbe { source: borrowed };
    let object_type = match ty_def {
        TypeDef::Object(object_def) => {
            if let Some(hinted) = probe.type_name() {
                if hinted != ty_name.as_str() {
                    field_error!(
                        "resolver returned an object of type {hinted}, expected {ty_name}"
                    )
                }
            }
            if let Some(is_type_of) = &object_def.is_type_of {
                if !is_type_of(&probe) {
                    field_error!(
                        "resolver returned an object that is not of expected type {ty_name}"
                    )
                }
            }
            object_def
        }
        TypeDef::Interface(_) | TypeDef::Union(_) => {
            match resolve_abstract_object_type(ctx.schema, ty_name, ty_def, &probe) {
                Ok(object_def) => object_def,
                Err(message) => field_error!("{message}"),
            }
        }
        _ => {
            // Scalar or enum; input object types are rejected before this point
            field_error!("resolver returned an object, expected a leaf value for type {ty_name}")
        }
    };
    let selections = fields.iter().flat_map(|field| &field.selection_set);
    Ok(JsonValue::Object(
        Box::pin(execute_selection_set(
            ctx,
            path,
            mode,
            object_type,
            borrowed,
            selections,
        ))
        .await?,
    ))
}

/// Identify the concrete object type of a value resolved for an abstract
/// (interface or union) type position.
///
/// The abstract type's `resolve_type` callback is consulted first. If there
/// is none, or it declines, the `is_type_of` probes of the possible object
/// types are tried in schema declaration order. The source's own
/// [`type_name`][ObjectSource::type_name] hint is the last resort.
fn resolve_abstract_object_type<'a>(
    schema: &'a Valid<Schema>,
    ty_name: &NamedType,
    ty_def: &TypeDef,
    probe: &SourceProbe<'_>,
) -> Result<&'a Node<ObjectType>, String> {
    let resolve_type = match ty_def {
        TypeDef::Interface(def) => def.resolve_type.as_ref(),
        TypeDef::Union(def) => def.resolve_type.as_ref(),
        _ => None,
    };
    if let Some(resolve_type) = resolve_type {
        if let Some(resolved_name) = resolve_type(probe) {
            return check_concrete_type(schema, ty_name, ty_def, &resolved_name);
        }
        // The callback declined: fall through to the probes
    }
    for possible in schema.possible_types(ty_name) {
        let Some(object_def) = schema.get_object(possible) else {
            continue;
        };
        let Some(is_type_of) = &object_def.is_type_of else {
            continue;
        };
        if is_type_of(probe) {
            return Ok(object_def);
        }
    }
    if let Some(hinted) = probe.type_name() {
        return check_concrete_type(schema, ty_name, ty_def, hinted);
    }
    Err(format!(
        "could not resolve the concrete type of a value of abstract type {ty_name}"
    ))
}

fn check_concrete_type<'a>(
    schema: &'a Valid<Schema>,
    abstract_name: &NamedType,
    abstract_def: &TypeDef,
    concrete_name: &str,
) -> Result<&'a Node<ObjectType>, String> {
    let Some(object_def) = schema.get_object(concrete_name) else {
        return Err(if schema.type_by_name(concrete_name).is_some() {
            mismatch_message(abstract_def, abstract_name, concrete_name)
        } else {
            format!("resolver returned an object of type {concrete_name} not defined in the schema")
        });
    };
    if schema.is_subtype(abstract_name, concrete_name) {
        Ok(object_def)
    } else {
        Err(mismatch_message(abstract_def, abstract_name, concrete_name))
    }
}

fn mismatch_message(
    abstract_def: &TypeDef,
    abstract_name: &NamedType,
    concrete_name: &str,
) -> String {
    match abstract_def {
        TypeDef::Union(_) => format!(
            "resolver returned an object of type {concrete_name}, \
             expected a member of union type {abstract_name}"
        ),
        _ => format!(
            "resolver returned an object of type {concrete_name} \
             which does not implement interface {abstract_name}"
        ),
    }
}

/// <https://spec.graphql.org/October2021/#sec-Value-Completion.List-Value-Completion>
async fn complete_list_value<'a, 'b>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    inner_ty: &ast::Type,
    resolved: MaybeAsync<
        BoxStream<'b, Result<AsyncResolvedValue<'b>, ResolverError>>,
        Box<dyn Iterator<Item = Result<ResolvedValue<'b>, ResolverError>> + 'b>,
    >,
    fields: &[&'a Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let mut completed_list = Vec::new();
    match resolved {
        MaybeAsync::Sync(iter) => {
            completed_list.reserve(iter.size_hint().0);
            for (index, item) in iter.enumerate() {
                let value = complete_list_item(
                    ctx,
                    path,
                    mode,
                    inner_ty,
                    index,
                    item.map(MaybeAsync::Sync),
                    fields,
                )
                .await?;
                completed_list.push(value);
            }
        }
        MaybeAsync::Async(mut stream) => {
            let mut index = 0;
            while let Some(item) = stream.next().await {
                let value = complete_list_item(
                    ctx,
                    path,
                    mode,
                    inner_ty,
                    index,
                    item.map(MaybeAsync::Async),
                    fields,
                )
                .await?;
                completed_list.push(value);
                index += 1;
            }
        }
    }
    Ok(JsonValue::Array(completed_list))
}

async fn complete_list_item<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    inner_ty: &ast::Type,
    index: usize,
    item: Result<MaybeAsyncResolved<'_>, ResolverError>,
    fields: &[&'a Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let index_path = LinkedPathElement {
        element: PathElement::ListIndex(index),
        next: path,
    };
    let index_path = Some(&index_path);
    let result = match item {
        Ok(resolved) => {
            Box::pin(complete_value(
                ctx, index_path, mode, inner_ty, resolved, fields,
            ))
            .await
        }
        Err(error) => {
            ctx.errors.push(GraphQLError::field_error(
                format!("resolver error: {}", error.message),
                index_path,
                fields[0].name.location(),
                &ctx.document.sources,
            ));
            Err(PropagateNull.into())
        }
    };
    // An item error is absorbed here when the item type is nullable,
    // so the rest of the list still completes
    try_nullify(inner_ty, result)
}
