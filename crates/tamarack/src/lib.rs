//! Tamarack is a GraphQL runtime for Rust: define a typed schema in code,
//! parse executable documents, and execute operations against resolvers.
//!
//! ## Features
//!
//! * A [`Schema`] built programmatically with [`SchemaBuilder`],
//!   with lazy field definitions for recursive types
//! * A complete parser for executable documents,
//!   returning an [`ast::Document`]
//! * [`Execution`] of queries and mutations with sync or async resolvers:
//!   field collection, input and result coercion, error propagation
//! * [Schema introspection](https://spec.graphql.org/October2021/#sec-Introspection)
//!   and SDL printing with [`Schema::to_sdl`]
//! * [`diagnostic`] reporting for parse errors,
//!   with source line and column numbers
//!
//! ## Getting started
//!
//! ```rust
//! use tamarack::name;
//! use tamarack::schema::FieldDefinition;
//! use tamarack::schema::ObjectType;
//! use tamarack::schema::Type;
//! use tamarack::Execution;
//! use tamarack::SchemaBuilder;
//!
//! let schema = SchemaBuilder::new()
//!     .query(ObjectType::new(
//!         name!("Query"),
//!         [FieldDefinition::new(
//!             name!("greeting"),
//!             Type::named(name!("String")).non_null(),
//!         )],
//!     ))
//!     .build()?;
//! let document = tamarack::ast::Document::parse(
//!     r#"{ greeting }"#,
//!     "greeting.graphql",
//! )
//! .unwrap();
//! let mut root = tamarack::response::JsonMap::new();
//! root.insert("greeting", "Hello, world!".into());
//! let response = Execution::new(&schema, &document).execute_sync(&root)?;
//! assert_eq!(
//!     serde_json::to_string(&response)?,
//!     r#"{"data":{"greeting":"Hello, world!"}}"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod diagnostic;
pub mod execution;
mod name;
mod node;
pub mod parser;
pub mod request;
pub mod response;
pub mod schema;
pub mod sources;

pub use crate::ast::Document;
pub use crate::execution::Execution;
pub use crate::name::InvalidNameError;
pub use crate::name::Name;
pub use crate::node::Node;
pub use crate::parser::Parser;
pub use crate::request::RequestError;
pub use crate::response::Response;
pub use crate::schema::Schema;
pub use crate::schema::SchemaBuilder;

/// A [`Schema`] that was checked for internal consistency, or a variable map
/// that was coerced against one.
///
/// The only way to obtain a `Valid<Schema>` is
/// [`SchemaBuilder::build`], which resolves every type reference
/// before handing the schema out.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Valid<T>(pub(crate) T);

impl<T> Valid<T> {
    /// Mark `value` as valid without checking anything
    pub(crate) fn assume_valid(value: T) -> Self {
        Self(value)
    }

    /// Extract the wrapped value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Valid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
