//! High-level representation of a GraphQL type system, defined in Rust code
//! rather than parsed from SDL.
//!
//! Type definitions are created with the constructors on [`ObjectType`],
//! [`InterfaceType`], [`UnionType`], [`EnumType`], [`InputObjectType`], and
//! [`ScalarType`], then assembled and checked by [`SchemaBuilder`] into a
//! [`Valid<Schema>`][crate::Valid] that execution can rely on.

use crate::ast;
use crate::execution::SourceProbe;
use crate::name;
use crate::name::Name;
use crate::name::NamedType;
use crate::node::Node;
use crate::response::JsonValue;
use crate::schema::thunk::Thunk;
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

mod builder;
mod print;
pub(crate) mod thunk;

pub use self::builder::SchemaBuilder;
pub use self::builder::SchemaError;
pub use crate::ast::Type;

/// Serializes a resolved Rust-side value to the JSON form of a custom scalar.
pub type SerializeFn = Arc<dyn Fn(&JsonValue) -> Result<JsonValue, ScalarError> + Send + Sync>;

/// Coerces a JSON input value (a variable value) for a custom scalar.
pub type ParseValueFn = Arc<dyn Fn(&JsonValue) -> Result<JsonValue, ScalarError> + Send + Sync>;

/// Coerces a GraphQL literal (an argument value in a document) for a custom scalar.
pub type ParseLiteralFn = Arc<dyn Fn(&ast::Value) -> Result<JsonValue, ScalarError> + Send + Sync>;

/// Decides whether a resolved object belongs to one concrete object type.
///
/// Probes run during abstract type resolution, in the declaration order of the
/// candidate types.
pub type IsTypeOfFn = Arc<dyn Fn(&SourceProbe<'_>) -> bool + Send + Sync>;

/// Names the concrete object type of a value resolved for an interface or union
/// field. Returning `None` falls back to `is_type_of` probes, then to the
/// source's own type name hint.
pub type ResolveTypeFn = Arc<dyn Fn(&SourceProbe<'_>) -> Option<NamedType> + Send + Sync>;

/// Error returned by custom scalar callbacks to reject a value.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct ScalarError {
    pub message: String,
}

impl ScalarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ScalarError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&'_ str> for ScalarError {
    fn from(message: &'_ str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The definition of a named type, the unit stored in [`Schema::types`].
#[derive(Debug, Clone)]
pub enum TypeDef {
    Scalar(Node<ScalarType>),
    Object(Node<ObjectType>),
    Interface(Node<InterfaceType>),
    Union(Node<UnionType>),
    Enum(Node<EnumType>),
    InputObject(Node<InputObjectType>),
}

macro_rules! type_def_from {
    ($($variant: ident: $ty: ty),+ $(,)?) => {
        $(
            impl From<$ty> for TypeDef {
                fn from(def: $ty) -> Self {
                    Self::$variant(def.into())
                }
            }

            impl From<Node<$ty>> for TypeDef {
                fn from(def: Node<$ty>) -> Self {
                    Self::$variant(def)
                }
            }
        )+
    };
}

type_def_from!(
    Scalar: ScalarType,
    Object: ObjectType,
    Interface: InterfaceType,
    Union: UnionType,
    Enum: EnumType,
    InputObject: InputObjectType,
);

impl TypeDef {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(def) => def.description.as_deref(),
            Self::Object(def) => def.description.as_deref(),
            Self::Interface(def) => def.description.as_deref(),
            Self::Union(def) => def.description.as_deref(),
            Self::Enum(def) => def.description.as_deref(),
            Self::InputObject(def) => def.description.as_deref(),
        }
    }

    /// Returns whether this type can appear in input positions:
    /// variable types, argument types, and input object field types.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Returns whether this type can appear in output positions: field types.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_output_type(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }

    /// A short phrase naming this kind of definition, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar type",
            Self::Object(_) => "an object type",
            Self::Interface(_) => "an interface type",
            Self::Union(_) => "a union type",
            Self::Enum(_) => "an enum type",
            Self::InputObject(_) => "an input object type",
        }
    }

    /// Whether both sides are the same definition node, not merely equal names.
    pub(crate) fn same_definition(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Interface(a), Self::Interface(b)) => a.ptr_eq(b),
            (Self::Union(a), Self::Union(b)) => a.ptr_eq(b),
            (Self::Enum(a), Self::Enum(b)) => a.ptr_eq(b),
            (Self::InputObject(a), Self::InputObject(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// The names of the built-in scalar types, which cannot be redefined.
pub(crate) const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// A scalar type definition.
///
/// The five built-in scalars are provided by the schema builder and coerced by
/// dedicated rules. Custom scalars carry a required `serialize` callback for
/// result coercion, and optionally a `parse_value`/`parse_literal` pair for
/// input coercion. Without the pair, input values pass through unchanged.
pub struct ScalarType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) serialize: Option<SerializeFn>,
    pub(crate) parse_value: Option<ParseValueFn>,
    pub(crate) parse_literal: Option<ParseLiteralFn>,
}

impl ScalarType {
    pub fn new(
        name: Name,
        serialize: impl Fn(&JsonValue) -> Result<JsonValue, ScalarError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            description: None,
            serialize: Some(Arc::new(serialize)),
            parse_value: None,
            parse_literal: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the callback that coerces JSON input values (variable values).
    ///
    /// Must be paired with [`parse_literal`][Self::parse_literal].
    pub fn parse_value(
        mut self,
        parse_value: impl Fn(&JsonValue) -> Result<JsonValue, ScalarError> + Send + Sync + 'static,
    ) -> Self {
        self.parse_value = Some(Arc::new(parse_value));
        self
    }

    /// Sets the callback that coerces GraphQL literals (argument values).
    ///
    /// Must be paired with [`parse_value`][Self::parse_value].
    pub fn parse_literal(
        mut self,
        parse_literal: impl Fn(&ast::Value) -> Result<JsonValue, ScalarError> + Send + Sync + 'static,
    ) -> Self {
        self.parse_literal = Some(Arc::new(parse_literal));
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub(crate) fn is_built_in(&self) -> bool {
        BUILT_IN_SCALARS.contains(&self.name.as_str())
    }

    /// The definitions of the five built-in scalars. They have no callbacks;
    /// coercion special-cases them by name.
    pub(crate) fn built_ins() -> &'static [Node<Self>; 5] {
        static BUILT_INS: OnceLock<[Node<ScalarType>; 5]> = OnceLock::new();
        BUILT_INS.get_or_init(|| {
            ["Int", "Float", "String", "Boolean", "ID"].map(|name| {
                Node::new(ScalarType {
                    name: Name::new_static_unchecked(name),
                    description: None,
                    serialize: None,
                    parse_value: None,
                    parse_literal: None,
                })
            })
        })
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An object type definition: an ordered map of fields, and the interfaces the
/// type implements.
///
/// The field list may be deferred with [`new_lazy`][Self::new_lazy] so that
/// mutually recursive types can reference each other. Deferred lists run at
/// most once, when first accessed (at the latest during schema build).
pub struct ObjectType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) implements_interfaces: IndexSet<Name>,
    pub(crate) fields: Thunk<IndexMap<Name, Node<FieldDefinition>>>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

impl ObjectType {
    pub fn new(name: Name, fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        Self {
            name,
            description: None,
            implements_interfaces: IndexSet::new(),
            fields: Thunk::eager(field_map(fields)),
            is_type_of: None,
        }
    }

    /// Like [`new`][Self::new], with the field list deferred until first use.
    pub fn new_lazy(
        name: Name,
        fields: impl FnOnce() -> Vec<FieldDefinition> + Send + 'static,
    ) -> Self {
        Self {
            name,
            description: None,
            implements_interfaces: IndexSet::new(),
            fields: Thunk::lazy(move || field_map(fields())),
            is_type_of: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares that this type implements an interface.
    pub fn implements(mut self, interface: Name) -> Self {
        self.implements_interfaces.insert(interface);
        self
    }

    /// Sets the predicate consulted during abstract type resolution to decide
    /// whether a resolved object is of this concrete type.
    pub fn is_type_of(
        mut self,
        predicate: impl Fn(&SourceProbe<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_type_of = Some(Arc::new(predicate));
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn implements_interfaces(&self) -> &IndexSet<Name> {
        &self.implements_interfaces
    }

    /// The fields of this type, in declaration order.
    /// Forces the field thunk on first access.
    pub fn fields(&self) -> &IndexMap<Name, Node<FieldDefinition>> {
        self.fields.get()
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("implements_interfaces", &self.implements_interfaces)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// An interface type definition.
pub struct InterfaceType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) fields: Thunk<IndexMap<Name, Node<FieldDefinition>>>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceType {
    pub fn new(name: Name, fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        Self {
            name,
            description: None,
            fields: Thunk::eager(field_map(fields)),
            resolve_type: None,
        }
    }

    /// Like [`new`][Self::new], with the field list deferred until first use.
    pub fn new_lazy(
        name: Name,
        fields: impl FnOnce() -> Vec<FieldDefinition> + Send + 'static,
    ) -> Self {
        Self {
            name,
            description: None,
            fields: Thunk::lazy(move || field_map(fields())),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the callback that names the concrete type of a value resolved for
    /// a field of this interface type.
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&SourceProbe<'_>) -> Option<NamedType> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The fields of this interface, in declaration order.
    /// Forces the field thunk on first access.
    pub fn fields(&self) -> &IndexMap<Name, Node<FieldDefinition>> {
        self.fields.get()
    }
}

impl fmt::Debug for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// A union type definition: a set of member object type names.
pub struct UnionType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) members: IndexSet<NamedType>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl UnionType {
    pub fn new(name: Name, members: impl IntoIterator<Item = NamedType>) -> Self {
        Self {
            name,
            description: None,
            members: members.into_iter().collect(),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the callback that names the concrete type of a value resolved for
    /// a field of this union type.
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&SourceProbe<'_>) -> Option<NamedType> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The member object type names, in declaration order.
    pub fn members(&self) -> &IndexSet<NamedType> {
        &self.members
    }
}

impl fmt::Debug for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

/// An enum type definition.
#[derive(Debug)]
pub struct EnumType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) values: IndexMap<Name, EnumValueDefinition>,
}

/// One value of an [`EnumType`].
///
/// `value` is the internal representation handed to and returned by resolvers.
/// When unset it defaults to the value's own name as a JSON string.
#[derive(Debug, Clone, Default)]
pub struct EnumValueDefinition {
    pub value: Option<JsonValue>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl EnumValueDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the internal representation for this enum value.
    pub fn value(mut self, value: impl Into<JsonValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

impl EnumType {
    /// Creates an enum whose values all use their own name as internal
    /// representation. Use [`value`][Self::value] to configure one further.
    pub fn new(name: Name, values: impl IntoIterator<Item = Name>) -> Self {
        Self {
            name,
            description: None,
            values: values
                .into_iter()
                .map(|value| (value, EnumValueDefinition::default()))
                .collect(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds or replaces a value with an explicit definition.
    pub fn value(mut self, name: Name, definition: EnumValueDefinition) -> Self {
        self.values.insert(name, definition);
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn values(&self) -> &IndexMap<Name, EnumValueDefinition> {
        &self.values
    }

    /// Maps a resolved internal representation back to the value name,
    /// for result coercion. `None` if no value matches.
    pub(crate) fn serialize(&self, resolved: &JsonValue) -> Option<&Name> {
        self.values.iter().find_map(|(name, def)| {
            let matches = match &def.value {
                Some(configured) => configured == resolved,
                None => resolved.as_str() == Some(name.as_str()),
            };
            matches.then_some(name)
        })
    }

    /// Maps a value name to its internal representation, for input coercion.
    /// `None` if the name is not a value of this enum.
    pub(crate) fn parse_value(&self, value_name: &str) -> Option<JsonValue> {
        let (name, def) = self.values.get_key_value(value_name)?;
        Some(match &def.value {
            Some(configured) => configured.clone(),
            None => JsonValue::String(name.as_str().into()),
        })
    }
}

/// An input object type definition.
///
/// As with [`ObjectType`], the field list may be deferred with
/// [`new_lazy`][Self::new_lazy] to allow recursive input types.
#[derive(Debug)]
pub struct InputObjectType {
    pub(crate) name: Name,
    pub(crate) description: Option<String>,
    pub(crate) fields: Thunk<IndexMap<Name, Node<InputValueDefinition>>>,
}

impl InputObjectType {
    pub fn new(name: Name, fields: impl IntoIterator<Item = InputValueDefinition>) -> Self {
        Self {
            name,
            description: None,
            fields: Thunk::eager(input_field_map(fields)),
        }
    }

    /// Like [`new`][Self::new], with the field list deferred until first use.
    pub fn new_lazy(
        name: Name,
        fields: impl FnOnce() -> Vec<InputValueDefinition> + Send + 'static,
    ) -> Self {
        Self {
            name,
            description: None,
            fields: Thunk::lazy(move || input_field_map(fields())),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The fields of this input type, in declaration order.
    /// Forces the field thunk on first access.
    pub fn fields(&self) -> &IndexMap<Name, Node<InputValueDefinition>> {
        self.fields.get()
    }
}

fn field_map(
    fields: impl IntoIterator<Item = FieldDefinition>,
) -> IndexMap<Name, Node<FieldDefinition>> {
    fields
        .into_iter()
        .map(|field| (field.name.clone(), field.into()))
        .collect()
}

fn input_field_map(
    fields: impl IntoIterator<Item = InputValueDefinition>,
) -> IndexMap<Name, Node<InputValueDefinition>> {
    fields
        .into_iter()
        .map(|field| (field.name.clone(), field.into()))
        .collect()
}

/// The definition of a field of an object or interface type.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: Vec<Node<InputValueDefinition>>,
    pub ty: Type,
    pub deprecation_reason: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: Name, ty: Type) -> Self {
        Self {
            name,
            description: None,
            arguments: Vec::new(),
            ty,
            deprecation_reason: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Returns the definition of the argument named `name`, if it exists.
    pub fn argument_by_name(&self, name: &str) -> Option<&Node<InputValueDefinition>> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

/// The definition of an argument or input object field.
#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: Type,
    pub default_value: Option<Node<ast::Value>>,
}

impl InputValueDefinition {
    pub fn new(name: Name, ty: Type) -> Self {
        Self {
            name,
            description: None,
            ty,
            default_value: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, default_value: ast::Value) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// An input value is required if it is non-null and has no default.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Required-Arguments>
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// The definition of a directive.
///
/// Execution only reads `@skip` and `@include`, which every schema carries
/// along with `@deprecated`. Other definitions registered with
/// [`SchemaBuilder::directive`] are exposed through introspection.
#[derive(Debug, Clone)]
pub struct DirectiveDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: Vec<Node<InputValueDefinition>>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
}

impl DirectiveDefinition {
    pub fn new(name: Name, locations: impl IntoIterator<Item = DirectiveLocation>) -> Self {
        Self {
            name,
            description: None,
            arguments: Vec::new(),
            repeatable: false,
            locations: locations.into_iter().collect(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Returns the definition of the argument named `name`, if it exists.
    pub fn argument_by_name(&self, name: &str) -> Option<&Node<InputValueDefinition>> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    /// The definitions of `@skip`, `@include`, and `@deprecated`, which are
    /// part of every schema.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Type-System.Directives.Built-in-Directives>
    pub(crate) fn built_ins() -> &'static [Node<Self>; 3] {
        static BUILT_INS: OnceLock<[Node<DirectiveDefinition>; 3]> = OnceLock::new();
        BUILT_INS.get_or_init(|| {
            let executable = [
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ];
            [
                Node::new(
                    DirectiveDefinition::new(name!("skip"), executable)
                        .description(
                            "Directs the executor to skip this field or fragment \
                             when the `if` argument is true.",
                        )
                        .argument(
                            InputValueDefinition::new(
                                name!("if"),
                                Type::named(name!("Boolean")).non_null(),
                            )
                            .description("Skipped when true."),
                        ),
                ),
                Node::new(
                    DirectiveDefinition::new(name!("include"), executable)
                        .description(
                            "Directs the executor to include this field or fragment \
                             only when the `if` argument is true.",
                        )
                        .argument(
                            InputValueDefinition::new(
                                name!("if"),
                                Type::named(name!("Boolean")).non_null(),
                            )
                            .description("Included when true."),
                        ),
                ),
                Node::new(
                    DirectiveDefinition::new(
                        name!("deprecated"),
                        [
                            DirectiveLocation::FieldDefinition,
                            DirectiveLocation::ArgumentDefinition,
                            DirectiveLocation::InputFieldDefinition,
                            DirectiveLocation::EnumValue,
                        ],
                    )
                    .description("Marks an element of a GraphQL schema as no longer supported.")
                    .argument(
                        InputValueDefinition::new(
                            name!("reason"),
                            Type::named(name!("String")),
                        )
                        .description(
                            "Explains why this element was deprecated, usually also including \
                             a suggestion for how to access supported similar data. Formatted \
                             using the Markdown syntax, as specified by \
                             [CommonMark](https://commonmark.org/).",
                        )
                        .default_value(ast::Value::String("No longer supported".into())),
                    ),
                ),
            ]
        })
    }
}

/// The place in a document or type system where a directive can be applied.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// The name of this directive location as it appears in GraphQL source.
    pub fn name(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A registry of type definitions making up a complete GraphQL type system,
/// created with [`SchemaBuilder`].
///
/// Only reachable definitions are registered: everything the builder can walk
/// to from the root operation types, the explicitly added types, and the
/// introspection meta-types.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) description: Option<String>,
    pub(crate) query_type: NamedType,
    pub(crate) mutation_type: Option<NamedType>,
    pub(crate) subscription_type: Option<NamedType>,
    pub(crate) types: IndexMap<NamedType, TypeDef>,
    pub(crate) directives: IndexMap<Name, Node<DirectiveDefinition>>,
    pub(crate) implementers: OnceLock<IndexMap<Name, IndexSet<NamedType>>>,
}

/// Error type of [`Schema::type_field`]
#[derive(Debug, Clone, Copy)]
pub enum FieldLookupError<'schema> {
    NoSuchType,
    NoSuchField(&'schema NamedType, &'schema TypeDef),
}

impl Schema {
    /// Returns a new builder for creating a schema programmatically.
    ///
    /// Built-in scalars, built-in directives, and the introspection
    /// meta-types are registered during [`SchemaBuilder::build`].
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All registered type definitions, keyed by name, in reachability order.
    pub fn types(&self) -> &IndexMap<NamedType, TypeDef> {
        &self.types
    }

    /// All directive definitions, including the built-in
    /// `@skip`, `@include`, and `@deprecated`.
    pub fn directives(&self) -> &IndexMap<Name, Node<DirectiveDefinition>> {
        &self.directives
    }

    /// The name of the object type serving `query` operations.
    pub fn query_root(&self) -> &NamedType {
        &self.query_type
    }

    /// The name of the object type serving operations of the given kind,
    /// or `None` if the schema does not support that kind.
    pub fn root_operation(&self, operation_type: ast::OperationType) -> Option<&NamedType> {
        match operation_type {
            ast::OperationType::Query => Some(&self.query_type),
            ast::OperationType::Mutation => self.mutation_type.as_ref(),
            ast::OperationType::Subscription => self.subscription_type.as_ref(),
        }
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns the definition of a scalar type by name, if it exists.
    pub fn get_scalar(&self, name: &str) -> Option<&Node<ScalarType>> {
        if let Some(TypeDef::Scalar(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of an object type by name, if it exists.
    pub fn get_object(&self, name: &str) -> Option<&Node<ObjectType>> {
        if let Some(TypeDef::Object(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of an interface type by name, if it exists.
    pub fn get_interface(&self, name: &str) -> Option<&Node<InterfaceType>> {
        if let Some(TypeDef::Interface(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of a union type by name, if it exists.
    pub fn get_union(&self, name: &str) -> Option<&Node<UnionType>> {
        if let Some(TypeDef::Union(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of an enum type by name, if it exists.
    pub fn get_enum(&self, name: &str) -> Option<&Node<EnumType>> {
        if let Some(TypeDef::Enum(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of an input object type by name, if it exists.
    pub fn get_input_object(&self, name: &str) -> Option<&Node<InputObjectType>> {
        if let Some(TypeDef::InputObject(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of a type's explicit field or meta-field.
    ///
    /// `__typename` is a field of every object, interface, and union type.
    /// `__schema` and `__type` are fields of the query root only.
    pub fn type_field(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Result<&Node<FieldDefinition>, FieldLookupError<'_>> {
        let (ty_name, ty_def) = self
            .types
            .get_key_value(type_name)
            .ok_or(FieldLookupError::NoSuchType)?;
        let explicit_field = match ty_def {
            TypeDef::Object(def) => def.fields().get(field_name),
            TypeDef::Interface(def) => def.fields().get(field_name),
            _ => None,
        };
        if let Some(def) = explicit_field {
            return Ok(def);
        }
        let meta = MetaFieldDefinitions::get();
        if field_name == "__typename"
            && matches!(
                ty_def,
                TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_)
            )
        {
            return Ok(&meta.__typename);
        }
        if *ty_name == self.query_type {
            if field_name == "__schema" {
                return Ok(&meta.__schema);
            }
            if field_name == "__type" {
                return Ok(&meta.__type);
            }
        }
        Err(FieldLookupError::NoSuchField(ty_name, ty_def))
    }

    /// Maps interface names to the names of object types that implement them.
    ///
    /// Computed on first access and cached for the lifetime of the schema.
    pub fn implementers_map(&self) -> &IndexMap<Name, IndexSet<NamedType>> {
        self.implementers.get_or_init(|| {
            let mut map = IndexMap::<Name, IndexSet<NamedType>>::new();
            for (name, def) in &self.types {
                let TypeDef::Object(object) = def else { continue };
                for interface in &object.implements_interfaces {
                    map.entry(interface.clone()).or_default().insert(name.clone());
                }
            }
            map
        })
    }

    /// Returns whether `maybe_subtype` is a member of the union `abstract_type`
    /// or an object type implementing the interface `abstract_type`.
    pub fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.types.get(abstract_type).is_some_and(|def| match def {
            TypeDef::Interface(_) => self.get_object(maybe_subtype).is_some_and(|object| {
                object.implements_interfaces.contains(abstract_type)
            }),
            TypeDef::Union(def) => def.members.contains(maybe_subtype),
            _ => false,
        })
    }

    /// The names of the object types a value of the given abstract type can
    /// be: union members in declaration order, or interface implementers in
    /// registration order.
    pub fn possible_types<'a>(
        &'a self,
        abstract_type: &str,
    ) -> impl Iterator<Item = &'a NamedType> + 'a {
        let set = match self.types.get(abstract_type) {
            Some(TypeDef::Union(def)) => Some(&def.members),
            Some(TypeDef::Interface(_)) => self.implementers_map().get(abstract_type),
            _ => None,
        };
        set.into_iter().flatten()
    }
}

/// Definitions of the meta-fields `__typename`, `__schema`, and `__type`,
/// which belong to types without being in their explicit field map.
pub(crate) struct MetaFieldDefinitions {
    /// `__typename: String!`
    pub(crate) __typename: Node<FieldDefinition>,
    /// `__schema: __Schema!`
    pub(crate) __schema: Node<FieldDefinition>,
    /// `__type(name: String!): __Type`
    pub(crate) __type: Node<FieldDefinition>,
}

impl MetaFieldDefinitions {
    pub(crate) fn get() -> &'static Self {
        static DEFS: OnceLock<MetaFieldDefinitions> = OnceLock::new();
        DEFS.get_or_init(|| Self {
            __typename: Node::new(FieldDefinition::new(
                name!("__typename"),
                Type::named(name!("String")).non_null(),
            )),
            __schema: Node::new(FieldDefinition::new(
                name!("__schema"),
                Type::named(name!("__Schema")).non_null(),
            )),
            __type: Node::new(
                FieldDefinition::new(
                    name!("__type"),
                    Type::named(name!("__Type")),
                )
                .argument(InputValueDefinition::new(
                    name!("name"),
                    Type::named(name!("String")).non_null(),
                )),
            ),
        })
    }
}
