use super::*;
use crate::parser::Parser;
use crate::parser::WithErrors;

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            sources: Default::default(),
            definitions: Vec::new(),
        }
    }

    /// Return a new configurable parser
    pub fn parser() -> Parser {
        Parser::default()
    }

    /// Parse `input` with the default parser configuration.
    ///
    /// `path` is the filesystem path (or hypothetical path) of the input,
    /// used for diagnostics.
    pub fn parse(
        source_text: impl Into<String>,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, WithErrors<Self>> {
        Self::parser().parse(source_text, path)
    }

    /// Iterate the operation definitions of this document.
    pub fn operations(&self) -> impl Iterator<Item = &Node<OperationDefinition>> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::OperationDefinition(operation) => Some(operation),
            _ => None,
        })
    }

    /// Iterate the fragment definitions of this document.
    pub fn fragments(&self) -> impl Iterator<Item = &Node<FragmentDefinition>> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::FragmentDefinition(fragment) => Some(fragment),
            _ => None,
        })
    }
}

impl Eq for Document {}

/// Source files are ignored: only the parsed contents are compared
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.definitions == other.definitions
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Skip `sources`, it's not useful and contains the entire input text
        for def in &self.definitions {
            def.fmt(f)?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl Definition {
    /// A short description of the kind of this definition, such as
    /// `an operation definition`, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::OperationDefinition(_) => "an operation definition",
            Self::FragmentDefinition(_) => "a fragment definition",
            Self::TypeSystemDefinition(def) => def.describe,
        }
    }

    pub fn location(&self) -> Option<crate::sources::SourceSpan> {
        match self {
            Self::OperationDefinition(def) => def.location(),
            Self::FragmentDefinition(def) => def.location(),
            Self::TypeSystemDefinition(def) => def.location(),
        }
    }
}

impl OperationType {
    /// Get the GraphQL keyword for this operation type: `query`, `mutation`, or `subscription`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }

    /// The conventional name of the object type for the root of this operation type
    pub const fn default_type_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Type {
    /// Returns a new `Type::Named` with the given name
    pub fn named(name: impl Into<Name>) -> Self {
        Type::Named(name.into())
    }

    /// Returns this type made non-null, if it isn't already.
    pub fn non_null(self) -> Self {
        match self {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            Type::NonNullNamed(_) => self,
            Type::NonNullList(_) => self,
        }
    }

    /// Returns a list type whose items are this type.
    pub fn list(self) -> Self {
        Type::List(Box::new(self))
    }

    /// Returns the inner named type, after unwrapping any non-null or list markers.
    pub fn inner_named_type(&self) -> &NamedType {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.inner_named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_) | Type::NonNullList(_))
    }
}

impl DirectiveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first directive with the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Node<Directive>> {
        self.0.iter().find(|directive| directive.name == name)
    }

    /// Returns whether there is a directive with the given name
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl std::ops::Deref for DirectiveList {
    type Target = Vec<Node<Directive>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for DirectiveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a DirectiveList {
    type Item = &'a Node<Directive>;
    type IntoIter = std::slice::Iter<'a, Node<Directive>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Directive {
    /// Returns the value of the argument with the given name, if any.
    pub fn argument_by_name(&self, name: &str) -> Option<&Node<Value>> {
        self.arguments
            .iter()
            .find(|argument| argument.name == name)
            .map(|argument| &argument.value)
    }
}

impl Field {
    /// The response key of this field entry: the alias if there is one, the name otherwise.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

impl Selection {
    pub fn directives(&self) -> &DirectiveList {
        match self {
            Self::Field(field) => &field.directives,
            Self::FragmentSpread(spread) => &spread.directives,
            Self::InlineFragment(inline) => &inline.directives,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_enum(&self) -> Option<&Name> {
        if let Value::Enum(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_variable(&self) -> Option<&Name> {
        if let Value::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        if let Value::Boolean(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&[Node<Value>]> {
        if let Value::List(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&[(Name, Node<Value>)]> {
        if let Value::Object(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Displays the value in GraphQL syntax, on a single line.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(true) => f.write_str("true"),
            Value::Boolean(false) => f.write_str("false"),
            Value::Enum(name) => name.fmt(f),
            Value::Variable(name) => write!(f, "${name}"),
            Value::Float(value) => value.fmt(f),
            Value::Int(value) => value.fmt(f),
            Value::String(value) => write_string_literal(f, value),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ if ch.is_control() => write!(f, "\\u{:04x}", ch as u32)?,
            _ => f.write_str(ch.encode_utf8(&mut [0; 4]))?,
        }
    }
    f.write_str("\"")
}

impl IntValue {
    pub(crate) fn new_parsed(text: &str) -> Self {
        Self(text.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as `i32`, returning an error on overflow
    pub fn try_to_i32(&self) -> Result<i32, std::num::ParseIntError> {
        self.0.parse()
    }

    /// Parse as `i64`, returning an error on overflow
    pub fn try_to_i64(&self) -> Result<i64, std::num::ParseIntError> {
        self.0.parse()
    }

    /// Convert to `f64`, which may lose precision
    pub fn try_to_f64(&self) -> Result<f64, FloatOverflowError> {
        try_to_f64(&self.0)
    }
}

impl FloatValue {
    pub(crate) fn new_parsed(text: &str) -> Self {
        Self(text.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to `f64`, which may lose precision
    pub fn try_to_f64(&self) -> Result<f64, FloatOverflowError> {
        try_to_f64(&self.0)
    }
}

fn try_to_f64(text: &str) -> Result<f64, FloatOverflowError> {
    let parsed = text.parse::<f64>();
    debug_assert!(parsed.is_ok(), "{parsed:?}");
    let float = parsed.map_err(|_| FloatOverflowError {})?;
    if float.is_finite() {
        Ok(float)
    } else {
        Err(FloatOverflowError {})
    }
}

impl From<i32> for IntValue {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<f64> for FloatValue {
    fn from(value: f64) -> Self {
        let mut text = value.to_string();
        // Make sure the RHS parses as a float and not an int:
        if !text.contains(['.', 'e', 'E']) {
            text.push_str(".0")
        }
        Self(text)
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Node<OperationDefinition>> for Definition {
    fn from(def: Node<OperationDefinition>) -> Self {
        Self::OperationDefinition(def)
    }
}

impl From<Node<FragmentDefinition>> for Definition {
    fn from(def: Node<FragmentDefinition>) -> Self {
        Self::FragmentDefinition(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name;

    #[test]
    fn type_display() {
        let int = Type::named(name!("Int"));
        assert_eq!(int.to_string(), "Int");
        assert_eq!(int.clone().non_null().to_string(), "Int!");
        assert_eq!(int.clone().list().to_string(), "[Int]");
        assert_eq!(int.clone().list().non_null().to_string(), "[Int]!");
        assert_eq!(int.clone().non_null().list().to_string(), "[Int!]");
        // Already non-null: no double wrapping
        let non_null = int.non_null();
        assert_eq!(non_null.clone().non_null(), non_null);
    }

    #[test]
    fn value_display() {
        let value = Value::Object(vec![
            (name!(id), Node::new(Value::Int(4.into()))),
            (
                name!(tags),
                Node::new(Value::List(vec![
                    Node::new(Value::String("a\"b".into())),
                    Node::new(Value::Enum(name!(EXPIRED))),
                    Node::new(Value::Variable(name!(v))),
                ])),
            ),
        ]);
        assert_eq!(value.to_string(), r#"{id: 4, tags: ["a\"b", EXPIRED, $v]}"#);
    }
}
