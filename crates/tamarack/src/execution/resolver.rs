//! Resolver traits connecting application data to the execution engine.
//!
//! A value for a GraphQL object type implements [`ObjectSource`] (or
//! [`AsyncObjectSource`] for resolvers that suspend on I/O). The engine calls
//! [`resolve_field`][ObjectSource::resolve_field] for each selected field;
//! its provided implementation looks the field up by its declared name
//! through [`field`][ObjectSource::field], which is all that plain
//! data-backed types need to implement.
//!
//! How to implement the trait is up to the user:
//! there could be a separate Rust struct per GraphQL object type,
//! or a single Rust enum with a variant per GraphQL object type,
//! or some other strategy. JSON object maps implement it out of the box.

use crate::ast;
use crate::name::Name;
use crate::node::Node;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::schema::FieldDefinition;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::Valid;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt as _;
use indexmap::IndexMap;

/// Dispatches between the async and sync flavors of a resolver surface.
/// Execution is written once as `async fn`s; the sync entry point drives
/// them to completion without a runtime.
#[derive(Clone, Copy)]
pub(crate) enum MaybeAsync<A, S> {
    Async(A),
    Sync(S),
}

pub(crate) type MaybeAsyncSource<'a> = MaybeAsync<&'a dyn AsyncObjectSource, &'a dyn ObjectSource>;

pub(crate) type MaybeAsyncResolved<'a> = MaybeAsync<AsyncResolvedValue<'a>, ResolvedValue<'a>>;

/// A concrete GraphQL object whose fields can be resolved during execution.
pub trait ObjectSource {
    /// The name of the concrete object type this value belongs to, if known.
    ///
    /// Consulted as a fallback when resolving the concrete type behind an
    /// interface or union field, after the abstract type's `resolve_type`
    /// callback and the possible types' `is_type_of` probes.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Looks up a field of this object by its declared name.
    ///
    /// This backs the default resolver and abstract-type probing. Returns
    /// `None` when the object has no data under that name.
    fn field(&self, name: &str) -> Option<ResolvedValue<'_>>;

    /// Resolves a concrete field of this object.
    ///
    /// The resolved value is expected to match the type of the corresponding
    /// field definition in the schema. The provided implementation is the
    /// default resolver: a [`field`][Self::field] lookup by declared name,
    /// resolving to null when the lookup misses.
    ///
    /// This is _not_ called for [introspection](https://spec.graphql.org/draft/#sec-Introspection)
    /// meta-fields `__typename`, `__type`, or `__schema`: those are handled separately.
    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(self
            .field(info.field_name())
            .unwrap_or_else(ResolvedValue::null))
    }
}

/// A concrete GraphQL object whose fields can be resolved asynchronously during execution.
pub trait AsyncObjectSource: Send {
    /// The name of the concrete object type this value belongs to, if known.
    ///
    /// Consulted as a fallback when resolving the concrete type behind an
    /// interface or union field, after the abstract type's `resolve_type`
    /// callback and the possible types' `is_type_of` probes.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Looks up a field of this object by its declared name.
    ///
    /// The lookup itself is synchronous; fields whose values require I/O
    /// belong in [`resolve_field`][Self::resolve_field] instead.
    fn field(&self, name: &str) -> Option<AsyncResolvedValue<'_>>;

    /// Resolves a concrete field of this object.
    ///
    /// The resolved value is expected to match the type of the corresponding
    /// field definition in the schema. The provided implementation is the
    /// default resolver: a [`field`][Self::field] lookup by declared name,
    /// resolving to null when the lookup misses.
    ///
    /// This is _not_ called for [introspection](https://spec.graphql.org/draft/#sec-Introspection)
    /// meta-fields `__typename`, `__type`, or `__schema`: those are handled separately.
    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> BoxFuture<'a, Result<AsyncResolvedValue<'a>, ResolverError>> {
        let resolved = self
            .field(info.field_name())
            .unwrap_or_else(AsyncResolvedValue::null);
        std::future::ready(Ok(resolved)).boxed()
    }
}

/// The successful return type of [`ObjectSource::resolve_field`].
pub enum ResolvedValue<'a> {
    /// * JSON null represents GraphQL null
    /// * A GraphQL enum value is represented as a JSON string
    /// * GraphQL built-in scalars are coerced according to their respective *Result Coercion* rules
    /// * For custom scalars, any JSON value is passed through as-is (including array or object)
    Leaf(JsonValue),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(Box<dyn ObjectSource + 'a>),

    /// Expected for GraphQL list types
    List(Box<dyn Iterator<Item = Result<Self, ResolverError>> + 'a>),
}

/// The successful return type of [`AsyncObjectSource::resolve_field`].
pub enum AsyncResolvedValue<'a> {
    /// * JSON null represents GraphQL null
    /// * A GraphQL enum value is represented as a JSON string
    /// * GraphQL built-in scalars are coerced according to their respective *Result Coercion* rules
    /// * For custom scalars, any JSON value is passed through as-is (including array or object)
    Leaf(JsonValue),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(Box<dyn AsyncObjectSource + 'a>),

    /// Expected for GraphQL list types
    List(BoxStream<'a, Result<Self, ResolverError>>),
}

/// The error type returned by [`ObjectSource::resolve_field`] or
/// [`AsyncObjectSource::resolve_field`].
///
/// It is converted to a field error at the field's response path and source
/// location; execution continues with sibling fields.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ResolverError {
    pub message: String,
}

/// Information passed to [`ObjectSource::resolve_field`] or
/// [`AsyncObjectSource::resolve_field`].
pub struct ResolveInfo<'a> {
    pub(crate) schema: &'a Valid<Schema>,
    pub(crate) document: &'a ast::Document,
    pub(crate) operation: &'a ast::OperationDefinition,
    pub(crate) fragments: &'a IndexMap<&'a Name, &'a Node<ast::FragmentDefinition>>,
    pub(crate) fields: &'a [&'a Node<ast::Field>],
    pub(crate) field_definition: &'a Node<FieldDefinition>,
    pub(crate) object_type: &'a Node<ObjectType>,
    pub(crate) variable_values: &'a Valid<JsonMap>,
    pub(crate) arguments: &'a JsonMap,
}

/// A resolved object as seen by abstract-type resolution: just enough
/// surface to decide which concrete object type the value belongs to.
///
/// Passed to [`resolve_type`][crate::schema::InterfaceType::resolve_type]
/// callbacks and [`is_type_of`][crate::schema::ObjectType::is_type_of]
/// probes.
pub struct SourceProbe<'a> {
    pub(crate) source: MaybeAsyncSource<'a>,
}

impl<'a> ResolveInfo<'a> {
    // https://github.com/graphql/graphql-js/blob/v16.11.0/src/type/definition.ts#L980-L991

    /// The schema execution is running against
    pub fn schema(&self) -> &'a Valid<Schema> {
        self.schema
    }

    /// The document containing the operation being executed
    pub fn document(&self) -> &'a ast::Document {
        self.document
    }

    /// The operation being executed
    pub fn operation(&self) -> &'a ast::OperationDefinition {
        self.operation
    }

    /// The fragment definitions of the document, by name
    pub fn fragments(&self) -> &'a IndexMap<&'a Name, &'a Node<ast::FragmentDefinition>> {
        self.fragments
    }

    /// The name of the field being resolved
    pub fn field_name(&self) -> &'a str {
        &self.fields[0].name
    }

    /// The field selections being resolved.
    ///
    /// There is always at least one, but there may be more in case of
    /// [field merging](https://spec.graphql.org/draft/#sec-Field-Selection-Merging).
    pub fn field_selections(&self) -> &'a [&'a Node<ast::Field>] {
        self.fields
    }

    /// The definition of the field being resolved, carrying its declared type
    pub fn field_definition(&self) -> &'a Node<FieldDefinition> {
        self.field_definition
    }

    /// The object type the field belongs to
    pub fn object_type(&self) -> &'a Node<ObjectType> {
        self.object_type
    }

    /// The request's variable values, after coercion
    pub fn variable_values(&self) -> &'a JsonMap {
        &self.variable_values.0
    }

    /// The arguments passed to this field, after coercion against the
    /// argument definitions in the schema
    pub fn arguments(&self) -> &'a JsonMap {
        self.arguments
    }
}

impl<'a> ResolvedValue<'a> {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    /// Construct an object resolved value
    pub fn object(object: impl ObjectSource + 'a) -> Self {
        Self::Object(Box::new(object))
    }

    /// Construct an object resolved value or null
    pub fn nullable_object(opt_object: Option<impl ObjectSource + 'a>) -> Self {
        match opt_object {
            Some(object) => Self::Object(Box::new(object)),
            None => Self::null(),
        }
    }

    /// Construct a list resolved value from an iterator
    ///
    /// If errors can happen during iteration,
    /// construct the [`ResolvedValue::List`] enum variant directly instead.
    pub fn list<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        I::IntoIter: 'a,
    {
        Self::List(Box::new(iter.into_iter().map(Ok)))
    }
}

impl<'a> AsyncResolvedValue<'a> {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    /// Construct an object resolved value
    pub fn object(object: impl AsyncObjectSource + 'a) -> Self {
        Self::Object(Box::new(object))
    }

    /// Construct an object resolved value or null
    pub fn nullable_object(opt_object: Option<impl AsyncObjectSource + 'a>) -> Self {
        match opt_object {
            Some(object) => Self::Object(Box::new(object)),
            None => Self::null(),
        }
    }

    /// Construct a list resolved value from an iterator
    ///
    /// If errors can happen during iteration,
    /// construct the [`AsyncResolvedValue::List`] enum variant directly instead.
    pub fn list<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        I::IntoIter: 'a + Send,
    {
        Self::List(Box::pin(futures::stream::iter(iter.into_iter().map(Ok))))
    }
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ResolverError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ResolverError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

impl SourceProbe<'_> {
    /// The source's own claim about its concrete type name, if it makes one
    pub fn type_name(&self) -> Option<&str> {
        match &self.source {
            MaybeAsync::Async(source) => source.type_name(),
            MaybeAsync::Sync(source) => source.type_name(),
        }
    }

    /// Whether the source has data under the given declared field name
    pub fn has_field(&self, name: &str) -> bool {
        match &self.source {
            MaybeAsync::Async(source) => source.field(name).is_some(),
            MaybeAsync::Sync(source) => source.field(name).is_some(),
        }
    }

    /// The value of a leaf field, if the source has one under that name.
    ///
    /// Useful for discriminator fields like `{"kind": "Dog"}`.
    pub fn leaf_field(&self, name: &str) -> Option<JsonValue> {
        match &self.source {
            MaybeAsync::Async(source) => match source.field(name)? {
                AsyncResolvedValue::Leaf(value) => Some(value),
                AsyncResolvedValue::Object(_) | AsyncResolvedValue::List(_) => None,
            },
            MaybeAsync::Sync(source) => match source.field(name)? {
                ResolvedValue::Leaf(value) => Some(value),
                ResolvedValue::Object(_) | ResolvedValue::List(_) => None,
            },
        }
    }
}

impl MaybeAsyncSource<'_> {
    pub(crate) fn type_name(&self) -> Option<&str> {
        match self {
            MaybeAsync::Async(source) => source.type_name(),
            MaybeAsync::Sync(source) => source.type_name(),
        }
    }
}

/// Delegation so `Box<dyn ObjectSource>` contents and plain references
/// can be re-wrapped as sources themselves.
impl<T: ObjectSource + ?Sized> ObjectSource for &T {
    fn type_name(&self) -> Option<&str> {
        (**self).type_name()
    }

    fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
        (**self).field(name)
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        (**self).resolve_field(info)
    }
}

impl<T: AsyncObjectSource + ?Sized + Sync> AsyncObjectSource for &T {
    fn type_name(&self) -> Option<&str> {
        (**self).type_name()
    }

    fn field(&self, name: &str) -> Option<AsyncResolvedValue<'_>> {
        (**self).field(name)
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> BoxFuture<'a, Result<AsyncResolvedValue<'a>, ResolverError>> {
        (**self).resolve_field(info)
    }
}

/// Plain JSON objects are sources: every key is a field, objects and arrays
/// nest, everything else is a leaf. This is the default-resolver data model
/// for schema-less sources.
impl ObjectSource for JsonMap {
    fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
        self.get(name).map(ResolvedValue::from_json)
    }
}

impl AsyncObjectSource for JsonMap {
    fn field(&self, name: &str) -> Option<AsyncResolvedValue<'_>> {
        self.get(name).map(AsyncResolvedValue::from_json)
    }
}

impl<'a> ResolvedValue<'a> {
    /// View a borrowed JSON value as a resolved value:
    /// objects become [`ObjectSource`]s, arrays become lists, the rest are leaves.
    pub fn from_json(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::Object(Box::new(map)),
            JsonValue::Array(items) => {
                Self::List(Box::new(items.iter().map(|item| Ok(Self::from_json(item)))))
            }
            leaf => Self::Leaf(leaf.clone()),
        }
    }
}

impl<'a> AsyncResolvedValue<'a> {
    /// View a borrowed JSON value as a resolved value:
    /// objects become [`AsyncObjectSource`]s, arrays become lists, the rest are leaves.
    pub fn from_json(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::Object(Box::new(map)),
            JsonValue::Array(items) => Self::List(Box::pin(futures::stream::iter(
                items.iter().map(|item| Ok(Self::from_json(item))),
            ))),
            leaf => Self::Leaf(leaf.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;

    #[test]
    fn json_map_source_lookup() {
        let JsonValue::Object(map) =
            json!({"id": 1, "name": "Demo", "tags": ["a"], "pet": {"barks": true}})
        else {
            panic!("expected an object")
        };
        assert!(matches!(
            ObjectSource::field(&map, "id"),
            Some(ResolvedValue::Leaf(JsonValue::Number(_)))
        ));
        assert!(matches!(
            ObjectSource::field(&map, "pet"),
            Some(ResolvedValue::Object(_))
        ));
        assert!(matches!(
            ObjectSource::field(&map, "tags"),
            Some(ResolvedValue::List(_))
        ));
        assert!(ObjectSource::field(&map, "missing").is_none());
    }

    #[test]
    fn probe_sees_leaf_discriminators() {
        let JsonValue::Object(map) = json!({"kind": "Dog", "friends": []}) else {
            panic!("expected an object")
        };
        let probe = SourceProbe {
            source: MaybeAsync::Sync(&map),
        };
        assert_eq!(probe.leaf_field("kind"), Some(json!("Dog")));
        assert_eq!(probe.leaf_field("friends"), None);
        assert!(probe.has_field("friends"));
        assert!(!probe.has_field("absent"));
        assert_eq!(probe.type_name(), None);
    }
}
