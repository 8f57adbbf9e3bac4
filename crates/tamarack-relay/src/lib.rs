//! Relay-style [global object identification] for [`tamarack`] schemas.
//!
//! Clients following the Relay server conventions expect every identified
//! object to expose an `id: ID!` field whose value is unique across the
//! whole schema, and a `node(id: ID!)` field on the query root that can
//! refetch any object from such an ID.
//!
//! [`to_global_id`] packs a type name and a type-local ID into one opaque
//! base64 string and [`from_global_id`] unpacks it again. The remaining
//! helpers build the schema definitions these IDs flow through.
//!
//! [global object identification]: https://relay.dev/graphql/objectidentification.htm
//!
//! # Example
//!
//! ```rust
//! use tamarack::execution::ObjectSource;
//! use tamarack::execution::ResolveInfo;
//! use tamarack::execution::ResolvedValue;
//! use tamarack::execution::ResolverError;
//! use tamarack::name;
//! use tamarack::schema::ObjectType;
//! use tamarack::Execution;
//! use tamarack::SchemaBuilder;
//! use tamarack_relay::from_global_id;
//! use tamarack_relay::global_id_field;
//! use tamarack_relay::node_field;
//! use tamarack_relay::node_interface;
//! use tamarack_relay::to_global_id;
//!
//! struct QueryRoot;
//!
//! impl ObjectSource for QueryRoot {
//!     fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
//!         None
//!     }
//!
//!     fn resolve_field<'a>(
//!         &'a self,
//!         info: &'a ResolveInfo<'a>,
//!     ) -> Result<ResolvedValue<'a>, ResolverError> {
//!         if info.field_name() != "node" {
//!             return Ok(ResolvedValue::null());
//!         }
//!         let Some(id) = info.arguments().get("id").and_then(|id| id.as_str()) else {
//!             return Err("expected an `id` argument".into());
//!         };
//!         let global_id = from_global_id(id).map_err(|err| err.to_string())?;
//!         match (global_id.type_name.as_str(), global_id.id.as_str()) {
//!             ("Patron", "1") => Ok(ResolvedValue::object(Patron { local_id: "1" })),
//!             _ => Ok(ResolvedValue::null()),
//!         }
//!     }
//! }
//!
//! struct Patron {
//!     local_id: &'static str,
//! }
//!
//! impl ObjectSource for Patron {
//!     fn type_name(&self) -> Option<&str> {
//!         Some("Patron")
//!     }
//!
//!     fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
//!         match name {
//!             "id" => Some(ResolvedValue::leaf(to_global_id("Patron", self.local_id))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let schema = SchemaBuilder::new()
//!     .query(ObjectType::new(name!("Query"), [node_field()]))
//!     .type_(node_interface())
//!     .type_(
//!         ObjectType::new(name!("Patron"), [global_id_field("Patron")])
//!             .implements(name!("Node")),
//!     )
//!     .build()?;
//! let document = tamarack::Document::parse(
//!     r#"{ node(id: "UGF0cm9uOjE=") { __typename id } }"#,
//!     "node.graphql",
//! )
//! .unwrap();
//! let response = Execution::new(&schema, &document).execute_sync(&QueryRoot)?;
//! assert_eq!(
//!     serde_json::to_string(&response).unwrap(),
//!     r#"{"data":{"node":{"__typename":"Patron","id":"UGF0cm9uOjE="}}}"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use tamarack::name;
use tamarack::schema::FieldDefinition;
use tamarack::schema::InputValueDefinition;
use tamarack::schema::InterfaceType;
use tamarack::schema::Type;

/// The decoded form of a global ID: which type the object belongs to,
/// and its ID local to that type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    pub type_name: String,
    pub id: String,
}

/// A global ID string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobalIdError {
    #[error("global ID is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("global ID does not decode to a UTF-8 string")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    #[error("global ID does not contain a `:` separator")]
    MissingSeparator,
}

/// Encodes a type name and an ID specific to that type into a single
/// string that is unique among all types.
///
/// The result is the standard base64 encoding of `{type_name}:{id}`,
/// treated by clients as opaque.
pub fn to_global_id(type_name: &str, id: impl fmt::Display) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// Decodes a global ID created by [`to_global_id`] back into the type name
/// and the type-local ID used to create it.
///
/// Splits at the first `:`, so the local ID may itself contain the
/// separator.
pub fn from_global_id(global_id: &str) -> Result<GlobalId, GlobalIdError> {
    let decoded = String::from_utf8(STANDARD.decode(global_id)?)?;
    let (type_name, id) = decoded
        .split_once(':')
        .ok_or(GlobalIdError::MissingSeparator)?;
    Ok(GlobalId {
        type_name: type_name.to_owned(),
        id: id.to_owned(),
    })
}

/// The `Node` interface definition: `interface Node { id: ID! }`.
///
/// Object types taking part in global identification
/// [implement][tamarack::schema::ObjectType::implements] it and include a
/// [`global_id_field`]. Without a
/// [`resolve_type`][tamarack::schema::InterfaceType::resolve_type] callback
/// chained on, concrete types behind `node` are identified through their
/// `is_type_of` probes or the source's own type name, like any other
/// interface.
pub fn node_interface() -> InterfaceType {
    InterfaceType::new(
        name!("Node"),
        [
            FieldDefinition::new(name!("id"), Type::named(name!("ID")).non_null())
                .description("The id of the object."),
        ],
    )
    .description("An object with an ID")
}

/// A `node(id: ID!): Node` field definition for the query root.
///
/// The root source is expected to resolve it by decoding the argument with
/// [`from_global_id`] and fetching the identified object.
pub fn node_field() -> FieldDefinition {
    FieldDefinition::new(name!("node"), Type::named(name!("Node")))
        .description("Fetches an object given its ID")
        .argument(
            InputValueDefinition::new(name!("id"), Type::named(name!("ID")).non_null())
                .description("The ID of an object"),
        )
}

/// An `id: ID!` field definition for an object type implementing `Node`.
///
/// The source backing the object is expected to resolve it to
/// [`to_global_id`] of `type_name` and the object's own local ID.
pub fn global_id_field(type_name: &str) -> FieldDefinition {
    FieldDefinition::new(name!("id"), Type::named(name!("ID")).non_null())
        .description(format!("The globally unique ID of the {type_name}."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use tamarack::schema::ObjectType;

    #[test]
    fn global_id_round_trip() {
        let global = to_global_id("Patron", 1);
        assert_eq!(global, "UGF0cm9uOjE=");
        let decoded = from_global_id(&global).unwrap();
        assert_eq!(decoded.type_name, "Patron");
        assert_eq!(decoded.id, "1");
    }

    #[test]
    fn local_id_may_contain_the_separator() {
        let decoded = from_global_id(&to_global_id("Shelf", "fiction:row:3")).unwrap();
        assert_eq!(decoded.type_name, "Shelf");
        assert_eq!(decoded.id, "fiction:row:3");
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(
            from_global_id("not base64!"),
            Err(GlobalIdError::Base64(_))
        ));
        assert!(matches!(
            from_global_id(&STANDARD.encode([0xff, 0xfe])),
            Err(GlobalIdError::NotUtf8(_))
        ));
        let no_separator = from_global_id(&STANDARD.encode("Patron1")).unwrap_err();
        assert_eq!(no_separator, GlobalIdError::MissingSeparator);
        assert_eq!(
            no_separator.to_string(),
            "global ID does not contain a `:` separator"
        );
    }

    #[test]
    fn definitions_print_as_relay_sdl() {
        let schema = tamarack::SchemaBuilder::new()
            .query(ObjectType::new(name!("Query"), [node_field()]))
            .type_(node_interface())
            .type_(
                ObjectType::new(name!("Patron"), [global_id_field("Patron")])
                    .implements(name!("Node")),
            )
            .build()
            .unwrap();
        expect![[r#"
            """An object with an ID"""
            interface Node {
              """The id of the object."""
              id: ID!
            }

            type Patron implements Node {
              """The globally unique ID of the Patron."""
              id: ID!
            }

            type Query {
              """Fetches an object given its ID"""
              node(id: ID!): Node
            }
        "#]]
        .assert_eq(&schema.to_sdl());
    }
}
