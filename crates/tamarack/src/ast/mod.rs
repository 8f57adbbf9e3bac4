//! Abstract syntax tree for executable GraphQL documents:
//! operations, fragments, selections, and input values.
//!
//! A [`Document`] is obtained by [parsing][Document::parse] a request string.
//! The type system is *not* represented here: schemas are built
//! programmatically through [`Schema::builder`][crate::Schema::builder].

use crate::name::Name;
use crate::name::NamedType;
use crate::node::Node;
use crate::sources::SourceMap;
use std::fmt;

pub(crate) mod from_cst;
mod impls;

pub use crate::name::InvalidNameError;

/// An executable document, parsed from a request string.
#[derive(Clone, Default)]
pub struct Document {
    /// The source files this document was parsed from, for error reporting.
    pub sources: SourceMap,
    pub definitions: Vec<Definition>,
}

/// A top-level definition in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Definition {
    OperationDefinition(Node<OperationDefinition>),
    FragmentDefinition(Node<FragmentDefinition>),
    /// A type-system definition or extension. These can be parsed,
    /// but executing a document that contains one is a request error;
    /// only the kind of construct is retained, for that error's message.
    TypeSystemDefinition(Node<TypeSystemDefinition>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationDefinition {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<Node<VariableDefinition>>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: NamedType,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

/// The retained kind of a type-system definition found in an executable document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSystemDefinition {
    pub(crate) describe: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Node<Type>,
    pub default_value: Option<Node<Value>>,
    pub directives: DirectiveList,
}

/// A reference to a type: a (possibly non-null) named type or list type.
///
/// Non-null of non-null is not representable, per the GraphQL grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(NamedType),
    NonNullNamed(NamedType),
    List(Box<Type>),
    NonNullList(Box<Type>),
}

/// The list of directives on a syntax element, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DirectiveList(pub Vec<Node<Directive>>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    pub name: Name,
    pub value: Node<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Field(Node<Field>),
    FragmentSpread(Node<FragmentSpread>),
    InlineFragment(Node<InlineFragment>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
    pub directives: DirectiveList,
    /// Empty for leaf fields without sub-selections
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentSpread {
    pub fragment_name: Name,
    pub directives: DirectiveList,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InlineFragment {
    pub type_condition: Option<NamedType>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Enum(Name),
    Variable(Name),
    String(String),
    Float(FloatValue),
    Int(IntValue),
    Boolean(bool),
    List(Vec<Node<Value>>),
    Object(Vec<(Name, Node<Value>)>),
}

/// The source text of an integer literal. Convert with `try_to_i32` or `try_to_f64`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IntValue(String);

/// The source text of a float literal. Convert with `try_to_f64`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FloatValue(String);

/// Tried to convert a numeric literal whose magnitude is
/// too large to be represented as `f64`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("value magnitude too large to be converted to `f64`")]
pub struct FloatOverflowError {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}
