//! The response shape of GraphQL execution, as described in
//! [the GraphQL specification](https://spec.graphql.org/October2021/#sec-Response-Format).

use crate::execution::engine::LinkedPath;
use crate::execution::engine::LinkedPathElement;
use crate::name::Name;
use crate::sources::SourceMap;
use crate::sources::SourceSpan;
use serde::Deserialize;
use serde::Serialize;

/// A JSON value, as used for resolved leaves, coerced variables, and response data.
pub type JsonValue = serde_json_bytes::Value;

/// A JSON object whose entries preserve insertion order.
pub type JsonMap = serde_json_bytes::Map<serde_json_bytes::ByteString, JsonValue>;

/// The result of executing a request against a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    // <https://spec.graphql.org/October2021/#note-6f005> suggests serializing this first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<GraphQLError>,

    #[serde(skip_serializing_if = "ResponseData::is_absent", default)]
    pub data: ResponseData,

    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub extensions: JsonMap,
}

/// The `data` entry of a [`Response`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseData {
    /// Execution returned an object
    Object(JsonMap),

    /// Execution encountered a field error on a non-null field
    /// and null was propagated all the way to the response root.
    Null,

    /// A request error was encountered before execution could start,
    /// so the `data` entry is missing from the response entirely.
    /// Such a response is "invalid": [`Response::errors`] is never empty in this case.
    #[default]
    Absent,
}

/// An error that occurred during execution, in the response `errors` list shape:
/// <https://spec.graphql.org/October2021/#sec-Errors.Error-result-format>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// A string description of the error intended for the developer
    pub message: String,

    /// Locations relevant to the error, if any
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<GraphQLLocation>,

    /// If non-empty, the error is a field error for the particular field found
    /// at this path in [`Response::data`]
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<PathElement>,

    /// Reserved for any additional information
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub extensions: JsonMap,
}

/// A source location for a [`GraphQLError`], line and column numbers starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLLocation {
    pub line: usize,
    pub column: usize,
}

/// An element of [`GraphQLError::path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// The relevant key in an object value
    Field(Name),

    /// The index of the relevant item in a list value
    ListIndex(usize),
}

impl Response {
    /// A response for a request that failed before execution could start.
    ///
    /// `data` is absent, which makes the response "invalid" in the sense of
    /// <https://spec.graphql.org/October2021/#sec-Response-Format>:
    /// the `errors` entry must be non-empty.
    pub fn from_request_error(error: &crate::request::RequestError, sources: &SourceMap) -> Self {
        Self {
            errors: vec![error.to_graphql_error(sources)],
            data: ResponseData::Absent,
            extensions: JsonMap::new(),
        }
    }

    /// Returns whether this response is missing its `data` entry.
    ///
    /// Invalid responses carry at least one error and must not be cached.
    pub fn is_invalid(&self) -> bool {
        self.data.is_absent()
    }
}

impl ResponseData {
    /// Returns the data as a JSON value: either an object or null.
    ///
    /// Returns `None` if the data is absent (for an invalid response).
    pub fn to_json_value(&self) -> Option<JsonValue> {
        match self {
            Self::Object(map) => Some(JsonValue::Object(map.clone())),
            Self::Null => Some(JsonValue::Null),
            Self::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_object(&self) -> Option<&JsonMap> {
        if let Self::Object(map) = self {
            Some(map)
        } else {
            None
        }
    }
}

impl Serialize for ResponseData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Object(map) => map.serialize(serializer),
            Self::Null => serializer.serialize_unit(),
            // Skipped with `skip_serializing_if`, except in non-self-describing formats
            Self::Absent => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Option::<JsonMap>::deserialize(deserializer)? {
            Some(map) => Ok(Self::Object(map)),
            None => Ok(Self::Null),
        }
    }
}

impl GraphQLLocation {
    /// Convert a span to a line and column number, using the given source map
    pub fn from_span(sources: &SourceMap, span: Option<SourceSpan>) -> Option<Self> {
        span?.line_column(sources)
    }
}

impl GraphQLError {
    pub fn new(
        message: impl Into<String>,
        location: Option<SourceSpan>,
        sources: &SourceMap,
    ) -> Self {
        Self {
            message: message.into(),
            locations: GraphQLLocation::from_span(sources, location)
                .into_iter()
                .collect(),
            path: Default::default(),
            extensions: Default::default(),
        }
    }

    pub(crate) fn field_error(
        message: impl Into<String>,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
        sources: &SourceMap,
    ) -> Self {
        Self {
            message: message.into(),
            locations: GraphQLLocation::from_span(sources, location)
                .into_iter()
                .collect(),
            path: LinkedPathElement::to_vec(path),
            extensions: Default::default(),
        }
    }
}
