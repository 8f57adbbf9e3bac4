use crate::execution::engine::LinkedPath;
use crate::execution::engine::LinkedPathElement;
use crate::response::GraphQLError;
use crate::response::Response;
use crate::sources::SourceMap;
use crate::sources::SourceSpan;

/// A [request error](https://spec.graphql.org/October2021/#sec-Errors.Request-errors)
/// that aborts a request before execution can start.
///
/// The corresponding [`Response`] contains errors but no data, not even null.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct RequestError {
    pub(crate) message: String,
    pub(crate) location: Option<SourceSpan>,
    pub(crate) is_suspected_validation_bug: bool,
}

/// Shorthand for conditions that full request validation would have rejected
/// before execution. When execution trips over one anyway, the resulting
/// request error is flagged as a suspected validation bug.
#[derive(Debug, Clone)]
pub(crate) struct SuspectedValidationBug {
    pub message: String,
    pub location: Option<SourceSpan>,
}

impl RequestError {
    pub(crate) fn new(message: impl Into<String>, location: Option<SourceSpan>) -> Self {
        Self {
            message: message.into(),
            location,
            is_suspected_validation_bug: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<SourceSpan> {
        self.location
    }

    /// Whether this error is caused by a document that full validation
    /// would have rejected before execution.
    pub fn is_suspected_validation_bug(&self) -> bool {
        self.is_suspected_validation_bug
    }

    pub fn to_graphql_error(&self, sources: &SourceMap) -> GraphQLError {
        GraphQLError::new(&self.message, self.location, sources)
    }

    /// The errors-only [`Response`] for this request error.
    pub fn to_response(&self, sources: &SourceMap) -> Response {
        Response::from_request_error(self, sources)
    }
}

impl SuspectedValidationBug {
    pub(crate) fn into_request_error(self) -> RequestError {
        let Self { message, location } = self;
        RequestError {
            message,
            location,
            is_suspected_validation_bug: true,
        }
    }

    pub(crate) fn into_field_error(
        self,
        sources: &SourceMap,
        path: LinkedPath<'_>,
    ) -> GraphQLError {
        let Self { message, location } = self;
        let mut error = GraphQLError::new(message, location, sources);
        error.path = LinkedPathElement::to_vec(path);
        error
    }
}
