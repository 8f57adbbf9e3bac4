use crate::ast;
use crate::execution::input_coercion::coerce_argument_values;
use crate::execution::introspection;
use crate::execution::resolver::MaybeAsync;
use crate::execution::resolver::MaybeAsyncSource;
use crate::execution::resolver::ResolveInfo;
use crate::execution::resolver::ResolvedValue;
use crate::execution::result_coercion::complete_value;
use crate::name::Name;
use crate::node::Node;
use crate::request::RequestError;
use crate::request::SuspectedValidationBug;
use crate::response::GraphQLError;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::response::PathElement;
use crate::schema::FieldDefinition;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::TypeDef;
use crate::Valid;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// State that is common to the execution of one operation
pub(crate) struct ExecutionContext<'a> {
    pub(crate) schema: &'a Valid<Schema>,
    pub(crate) document: &'a ast::Document,
    pub(crate) operation: &'a ast::OperationDefinition,
    pub(crate) fragments: &'a IndexMap<&'a Name, &'a Node<ast::FragmentDefinition>>,
    pub(crate) variable_values: &'a Valid<JsonMap>,
    pub(crate) errors: Vec<GraphQLError>,
    /// Coerced argument values, memoized per (field definition, field selection)
    /// pair so that repeated selections of the same field coerce only once.
    /// Keys are the addresses of the two `Node`s.
    pub(crate) argument_cache: HashMap<(usize, usize), Arc<JsonMap>>,
    pub(crate) enable_introspection: bool,
}

/// <https://spec.graphql.org/October2021/#sec-Normal-and-Serial-Execution>
#[derive(Debug, Clone, Copy)]
pub(crate) enum ExecutionMode {
    /// Allowed to resolve fields in any order
    Normal,
    /// Top-level fields of a mutation operation must be executed in order
    Sequential,
}

/// A field error that caused the corresponding response position to be set
/// to null, and is now propagating towards the nearest nullable position
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PropagateNull;

/// Failure of part or all of the execution of one operation
pub(crate) enum ExecutionError {
    /// A field error, to be absorbed at the nearest nullable position
    PropagateNull,
    /// The whole request must be abandoned with an errors-only response
    Fatal(RequestError),
}

impl From<PropagateNull> for ExecutionError {
    fn from(_: PropagateNull) -> Self {
        Self::PropagateNull
    }
}

/// Linked-list version of `Vec<PathElement>`, taking advantage of the call
/// stack of recursive `execute_selection_set`
pub(crate) type LinkedPath<'a> = Option<&'a LinkedPathElement<'a>>;

pub(crate) struct LinkedPathElement<'a> {
    pub(crate) element: PathElement,
    pub(crate) next: LinkedPath<'a>,
}

impl LinkedPathElement<'_> {
    /// The response path from the root to `link`, in execution order
    pub(crate) fn to_vec(link: LinkedPath<'_>) -> Vec<PathElement> {
        let mut path = Vec::new();
        let mut node = link;
        while let Some(element) = node {
            path.push(element.element.clone());
            node = element.next;
        }
        path.reverse();
        path
    }
}

/// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
pub(crate) async fn execute_selection_set<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    object_type: &'a Node<ObjectType>,
    object_value: MaybeAsyncSource<'_>,
    selections: impl IntoIterator<Item = &'a ast::Selection>,
) -> Result<JsonMap, ExecutionError> {
    let mut grouped_field_set = IndexMap::new();
    collect_fields(
        ctx,
        object_type,
        selections,
        &mut HashSet::new(),
        &mut grouped_field_set,
    );

    // Fields are resolved one at a time in collection order, which happens
    // to satisfy `ExecutionMode::Sequential` too.
    let mut response_map = JsonMap::with_capacity(grouped_field_set.len());
    for (&response_key, fields) in &grouped_field_set {
        // `collect_fields` only creates a group when pushing a first field
        let field_name = &fields[0].name;
        let Ok(field_def) = ctx.schema.type_field(&object_type.name, field_name) else {
            // Validation should have caught this, fail the whole request
            return Err(ExecutionError::Fatal(
                SuspectedValidationBug {
                    message: format!(
                        "type `{}` does not have a field `{}`",
                        object_type.name, field_name
                    ),
                    location: field_name.location(),
                }
                .into_request_error(),
            ));
        };
        let field_path = LinkedPathElement {
            element: PathElement::Field(response_key.clone()),
            next: path,
        };
        let value = execute_field(
            ctx,
            Some(&field_path),
            mode,
            object_type,
            object_value,
            field_def,
            fields,
        )
        .await?;
        response_map.insert(response_key.as_str(), value);
    }
    Ok(response_map)
}

/// <https://spec.graphql.org/October2021/#CollectFields()>
fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &Node<ObjectType>,
    selections: impl IntoIterator<Item = &'a ast::Selection>,
    visited_fragments: &mut HashSet<&'a Name>,
    grouped_fields: &mut IndexMap<&'a Name, Vec<&'a Node<ast::Field>>>,
) {
    for selection in selections {
        if eval_if_arg(selection, "skip", ctx.variable_values).unwrap_or(false)
            || !eval_if_arg(selection, "include", ctx.variable_values).unwrap_or(true)
        {
            continue;
        }
        match selection {
            ast::Selection::Field(field) => grouped_fields
                .entry(field.response_key())
                .or_default()
                .push(field),
            ast::Selection::FragmentSpread(spread) => {
                let new = visited_fragments.insert(&spread.fragment_name);
                if !new {
                    // Prevent infinite recursion through a fragment cycle
                    continue;
                }
                let Some(&fragment) = ctx.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !does_fragment_type_apply(ctx.schema, object_type, &fragment.type_condition) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &fragment.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
            ast::Selection::InlineFragment(inline) => {
                if let Some(type_condition) = &inline.type_condition {
                    if !does_fragment_type_apply(ctx.schema, object_type, type_condition) {
                        continue;
                    }
                }
                collect_fields(
                    ctx,
                    object_type,
                    &inline.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
        }
    }
}

/// <https://spec.graphql.org/October2021/#DoesFragmentTypeApply()>
fn does_fragment_type_apply(
    schema: &Valid<Schema>,
    object_type: &Node<ObjectType>,
    fragment_type: &Name,
) -> bool {
    match schema.type_by_name(fragment_type) {
        Some(TypeDef::Object(_)) => *fragment_type == object_type.name,
        Some(TypeDef::Interface(_)) => object_type.implements_interfaces.contains(fragment_type),
        Some(TypeDef::Union(def)) => def.members.contains(fragment_type),
        // Undefined or not a composite type: validation should have caught
        // this, skip the fragment
        _ => false,
    }
}

/// The boolean value of the `if` argument of a `@skip` or `@include`
/// directive on this selection, following a variable reference if need be
fn eval_if_arg(
    selection: &ast::Selection,
    directive_name: &str,
    variable_values: &Valid<JsonMap>,
) -> Option<bool> {
    match selection
        .directives()
        .get(directive_name)?
        .argument_by_name("if")?
        .as_ref()
    {
        ast::Value::Boolean(value) => Some(*value),
        ast::Value::Variable(var) => variable_values.get(var.as_str())?.as_bool(),
        _ => None,
    }
}

/// <https://spec.graphql.org/October2021/#ExecuteField()>
async fn execute_field<'a>(
    ctx: &mut ExecutionContext<'a>,
    path: LinkedPath<'_>,
    mode: ExecutionMode,
    object_type: &'a Node<ObjectType>,
    object_value: MaybeAsyncSource<'_>,
    field_def: &'a Node<FieldDefinition>,
    fields: &[&'a Node<ast::Field>],
) -> Result<JsonValue, ExecutionError> {
    let field = fields[0];
    let argument_values = match coerce_argument_values(ctx, path, field_def, field) {
        Ok(argument_values) => argument_values,
        Err(PropagateNull) => return try_nullify(&field_def.ty, Err(PropagateNull.into())),
    };
    let info = ResolveInfo {
        schema: ctx.schema,
        document: ctx.document,
        operation: ctx.operation,
        fragments: ctx.fragments,
        fields,
        field_definition: field_def,
        object_type,
        variable_values: ctx.variable_values,
        arguments: &argument_values,
    };
    let resolved_result = match field.name.as_str() {
        // <https://spec.graphql.org/October2021/#sec-Type-Name-Introspection>
        "__typename" => Ok(MaybeAsync::Sync(ResolvedValue::leaf(
            object_type.name.as_str(),
        ))),
        // <https://spec.graphql.org/October2021/#sec-Schema-Introspection>
        "__schema" if object_type.name == *ctx.schema.query_root() => {
            introspection::resolve_schema_meta_field(ctx)
        }
        "__type" if object_type.name == *ctx.schema.query_root() => {
            introspection::resolve_type_meta_field(ctx, &argument_values)
        }
        _ => match object_value {
            MaybeAsync::Async(object_value) => object_value
                .resolve_field(&info)
                .await
                .map(MaybeAsync::Async),
            MaybeAsync::Sync(object_value) => {
                object_value.resolve_field(&info).map(MaybeAsync::Sync)
            }
        },
    };
    let completed_result = match resolved_result {
        Ok(resolved) => complete_value(ctx, path, mode, &field_def.ty, resolved, fields).await,
        Err(error) => {
            ctx.errors.push(GraphQLError::field_error(
                format!("resolver error: {}", error.message),
                path,
                field.name.location(),
                &ctx.document.sources,
            ));
            Err(PropagateNull.into())
        }
    };
    try_nullify(&field_def.ty, completed_result)
}

/// Try to insert a propagated null if possible, per error propagation:
/// if the field type is non-null the null propagates further to the parent.
/// A fatal error passes through unchanged.
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) fn try_nullify(
    ty: &ast::Type,
    result: Result<JsonValue, ExecutionError>,
) -> Result<JsonValue, ExecutionError> {
    match result {
        Ok(json) => Ok(json),
        Err(ExecutionError::PropagateNull) => {
            if ty.is_non_null() {
                Err(ExecutionError::PropagateNull)
            } else {
                Ok(JsonValue::Null)
            }
        }
        Err(fatal @ ExecutionError::Fatal(_)) => Err(fatal),
    }
}
