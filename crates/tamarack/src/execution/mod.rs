//! Executing a parsed operation against a [`Schema`], with resolvers
//! supplying the data.
//!
//! Start from [`Execution`]. The initial value given to
//! [`execute_sync`][Execution::execute_sync] or
//! [`execute`][Execution::execute] is the resolver for the root operation
//! object; nested objects are resolved through the values it returns.

use crate::ast;
use crate::name::Name;
use crate::request::RequestError;
use crate::request::SuspectedValidationBug;
use crate::response::JsonMap;
use crate::response::Response;
use crate::response::ResponseData;
use crate::schema::Schema;
use crate::Valid;
use futures::FutureExt as _;
use indexmap::IndexMap;
use std::collections::HashMap;

pub(crate) mod engine;
pub(crate) mod input_coercion;
pub(crate) mod introspection;
mod resolver;
mod result_coercion;

pub use self::input_coercion::coerce_variable_values;
pub use self::resolver::AsyncObjectSource;
pub use self::resolver::AsyncResolvedValue;
pub use self::resolver::ObjectSource;
pub use self::resolver::ResolveInfo;
pub use self::resolver::ResolvedValue;
pub use self::resolver::ResolverError;
pub use self::resolver::SourceProbe;

use self::engine::execute_selection_set;
use self::engine::ExecutionContext;
use self::engine::ExecutionError;
use self::engine::ExecutionMode;
use self::resolver::MaybeAsync;
use self::resolver::MaybeAsyncSource;

/// Configures the execution of one operation of a document against a schema.
///
/// # Example
///
/// ```rust
/// use tamarack::Execution;
/// use tamarack::SchemaBuilder;
/// use tamarack::name;
/// use tamarack::schema::FieldDefinition;
/// use tamarack::schema::ObjectType;
/// use tamarack::schema::Type;
///
/// let schema = SchemaBuilder::new()
///     .query(ObjectType::new(
///         name!("Query"),
///         [FieldDefinition::new(
///             name!("hello"),
///             Type::named(name!("String")),
///         )],
///     ))
///     .build()
///     .unwrap();
/// let document = tamarack::ast::Document::parse("{ hello }", "example.graphql").unwrap();
/// let mut data = tamarack::response::JsonMap::new();
/// data.insert("hello", "world".into());
/// let response = Execution::new(&schema, &document).execute_sync(&data).unwrap();
/// assert_eq!(
///     serde_json::to_string(&response).unwrap(),
///     r#"{"data":{"hello":"world"}}"#
/// );
/// ```
pub struct Execution<'a> {
    schema: &'a Valid<Schema>,
    document: &'a ast::Document,
    operation_name: Option<&'a str>,
    variable_values: Option<&'a JsonMap>,
    enable_introspection: Option<bool>,
}

impl<'a> Execution<'a> {
    pub fn new(schema: &'a Valid<Schema>, document: &'a ast::Document) -> Self {
        Self {
            schema,
            document,
            operation_name: None,
            variable_values: None,
            enable_introspection: None,
        }
    }

    /// Name the operation to execute, when the document contains more than one
    pub fn operation_name(mut self, operation_name: &'a str) -> Self {
        assert!(
            self.operation_name.is_none(),
            "`operation_name` already provided"
        );
        self.operation_name = Some(operation_name);
        self
    }

    /// Provide the values of the operation's variables, before coercion.
    ///
    /// The default is an empty map.
    pub fn variables(mut self, variable_values: &'a JsonMap) -> Self {
        assert!(
            self.variable_values.is_none(),
            "`variables` already provided"
        );
        self.variable_values = Some(variable_values);
        self
    }

    /// Enable or disable the `__schema` and `__type` meta-fields on the query
    /// root. Enabled by default; when disabled, selecting them resolves to a
    /// field error. `__typename` is always available.
    pub fn enable_introspection(mut self, enable: bool) -> Self {
        assert!(
            self.enable_introspection.is_none(),
            "`enable_introspection` already provided"
        );
        self.enable_introspection = Some(enable);
        self
    }

    /// Execute with synchronous resolvers, driving execution to completion on
    /// the current thread.
    pub fn execute_sync(&self, initial_value: &dyn ObjectSource) -> Result<Response, RequestError> {
        self.execute_common(MaybeAsync::Sync(initial_value))
            .now_or_never()
            .expect("expected async fn with sync resolvers to never be pending")
    }

    /// Execute with asynchronous resolvers.
    pub async fn execute(
        &self,
        initial_value: &dyn AsyncObjectSource,
    ) -> Result<Response, RequestError> {
        self.execute_common(MaybeAsync::Async(initial_value)).await
    }

    /// A request error leaves `Response::data` absent entirely;
    /// field errors during execution are collected in `Response::errors`.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Executing-Requests>
    async fn execute_common(
        &self,
        initial_value: MaybeAsyncSource<'_>,
    ) -> Result<Response, RequestError> {
        let schema = self.schema;
        let document = self.document;
        let mut fragments = IndexMap::new();
        for definition in &document.definitions {
            match definition {
                ast::Definition::OperationDefinition(_) => {}
                ast::Definition::FragmentDefinition(fragment) => {
                    // The first definition wins in case of a duplicate name
                    fragments.entry(&fragment.name).or_insert(fragment);
                }
                ast::Definition::TypeSystemDefinition(_) => {
                    return Err(RequestError::new(
                        format!(
                            "GraphQL cannot execute a request containing {}.",
                            definition.describe()
                        ),
                        definition.location(),
                    ));
                }
            }
        }
        let operation = select_operation(document, self.operation_name)?;
        tracing::trace!(
            operation_type = operation.operation_type.name(),
            operation_name = operation.name.as_ref().map(Name::as_str),
            "executing operation"
        );
        let Some(root_name) = schema.root_operation(operation.operation_type) else {
            return Err(RequestError::new(
                match operation.operation_type {
                    // The builder requires a query root, but the schema may
                    // have been built for other operation types only
                    ast::OperationType::Query => "Schema is not configured for queries.",
                    ast::OperationType::Mutation => "Schema is not configured for mutations.",
                    ast::OperationType::Subscription => {
                        "Schema is not configured for subscriptions."
                    }
                },
                None,
            ));
        };
        let Some(root_object) = schema.get_object(root_name) else {
            return Err(SuspectedValidationBug {
                message: format!("Undefined root operation type {root_name}"),
                location: None,
            }
            .into_request_error());
        };
        let empty;
        let provided_values = match self.variable_values {
            Some(values) => values,
            None => {
                empty = JsonMap::new();
                &empty
            }
        };
        let variable_values = coerce_variable_values(schema, operation, provided_values)?;
        let mode = match operation.operation_type {
            ast::OperationType::Query | ast::OperationType::Subscription => ExecutionMode::Normal,
            // Top-level mutation fields run in order, each seeing the
            // side effects of the previous ones
            ast::OperationType::Mutation => ExecutionMode::Sequential,
        };
        let mut ctx = ExecutionContext {
            schema,
            document,
            operation,
            fragments: &fragments,
            variable_values: &variable_values,
            errors: Vec::new(),
            argument_cache: HashMap::new(),
            enable_introspection: self.enable_introspection.unwrap_or(true),
        };
        let result = execute_selection_set(
            &mut ctx,
            None,
            mode,
            root_object,
            initial_value,
            &operation.selection_set,
        )
        .await;
        let data = match result {
            Ok(map) => ResponseData::Object(map),
            Err(ExecutionError::PropagateNull) => ResponseData::Null,
            Err(ExecutionError::Fatal(request_error)) => {
                tracing::debug!(
                    message = request_error.message(),
                    "execution aborted by a fatal error"
                );
                return Err(request_error);
            }
        };
        Ok(Response {
            errors: ctx.errors,
            data,
            extensions: JsonMap::new(),
        })
    }
}

/// <https://spec.graphql.org/October2021/#GetOperation()>
fn select_operation<'a>(
    document: &'a ast::Document,
    operation_name: Option<&str>,
) -> Result<&'a ast::OperationDefinition, RequestError> {
    let mut selected = None;
    for definition in &document.definitions {
        let ast::Definition::OperationDefinition(operation) = definition else {
            continue;
        };
        match operation_name {
            None => {
                if selected.is_some() {
                    return Err(RequestError::new(
                        "Must provide operation name \
                         if query contains multiple operations.",
                        operation.location(),
                    ));
                }
                selected = Some(operation);
            }
            Some(name) => {
                if operation.name.as_ref().is_some_and(|n| n == name) {
                    selected = Some(operation);
                    break;
                }
            }
        }
    }
    match (selected, operation_name) {
        (Some(operation), _) => Ok(operation),
        (None, Some(name)) => Err(RequestError::new(
            format!("Unknown operation named \"{name}\"."),
            None,
        )),
        (None, None) => Err(RequestError::new("Must provide an operation.", None)),
    }
}
