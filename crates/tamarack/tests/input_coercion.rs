use pretty_assertions::assert_eq;
use serde_json_bytes::json;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tamarack::ast;
use tamarack::execution::coerce_variable_values;
use tamarack::execution::ObjectSource;
use tamarack::execution::ResolveInfo;
use tamarack::execution::ResolvedValue;
use tamarack::execution::ResolverError;
use tamarack::name;
use tamarack::response::JsonMap;
use tamarack::response::JsonValue;
use tamarack::schema::EnumType;
use tamarack::schema::FieldDefinition;
use tamarack::schema::InputObjectType;
use tamarack::schema::InputValueDefinition;
use tamarack::schema::ObjectType;
use tamarack::schema::ScalarType;
use tamarack::schema::SchemaBuilder;
use tamarack::schema::Type;
use tamarack::Document;
use tamarack::Execution;
use tamarack::Schema;
use tamarack::Valid;

fn json_object(value: serde_json_bytes::Value) -> JsonMap {
    match value {
        serde_json_bytes::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn defaults_and_list_wrapping_fill_out_variable_values() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Int")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse(
        "query Paging($first: Int = 10, $after: String, $tags: [String!], $rows: [[Int]])
         { ping }",
        "query.graphql",
    )
    .unwrap();
    let operation = document.operations().next().unwrap();

    let provided = json_object(json!({"tags": "solo", "rows": 5}));
    let coerced = coerce_variable_values(&schema, operation, &provided).unwrap();
    assert_eq!(
        coerced.into_inner(),
        json_object(json!({"first": 10, "tags": ["solo"], "rows": [[5]]}))
    );

    let provided = json_object(json!({"after": null}));
    let coerced = coerce_variable_values(&schema, operation, &provided).unwrap();
    assert_eq!(
        coerced.into_inner(),
        json_object(json!({"first": 10, "after": null}))
    );
}

#[test]
fn required_variables_must_be_provided_and_non_null() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Boolean")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document =
        Document::parse("query Find($term: String!) { ping }", "query.graphql").unwrap();
    let operation = document.operations().next().unwrap();

    let err = coerce_variable_values(&schema, operation, &JsonMap::new()).unwrap_err();
    assert_eq!(err.message(), "missing value for non-null variable 'term'");

    let provided = json_object(json!({"term": null}));
    let err = coerce_variable_values(&schema, operation, &provided).unwrap_err();
    assert_eq!(err.message(), "null value for non-null variable term");
}

#[test]
fn input_objects_check_their_keys_and_fill_defaults() {
    let filter = InputObjectType::new(
        name!("Filter"),
        [
            InputValueDefinition::new(name!("after"), Type::named(name!("String")).non_null()),
            InputValueDefinition::new(name!("limit"), Type::named(name!("Int")))
                .default_value(ast::Value::Int(20.into())),
        ],
    );
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Boolean")))],
    );
    let schema = SchemaBuilder::new().query(query).type_(filter).build().unwrap();
    let document =
        Document::parse("query Search($filter: Filter) { ping }", "query.graphql").unwrap();
    let operation = document.operations().next().unwrap();

    let provided = json_object(json!({"filter": {"after": "a"}}));
    let coerced = coerce_variable_values(&schema, operation, &provided).unwrap();
    assert_eq!(
        coerced.into_inner(),
        json_object(json!({"filter": {"after": "a", "limit": 20}}))
    );

    let provided = json_object(json!({"filter": {"after": "a", "extra": 1}}));
    let err = coerce_variable_values(&schema, operation, &provided).unwrap_err();
    assert_eq!(err.message(), "Input object has key extra not in type Filter");

    let provided = json_object(json!({"filter": {"limit": 3}}));
    let err = coerce_variable_values(&schema, operation, &provided).unwrap_err();
    assert_eq!(
        err.message(),
        "Missing value for non-null input object field Filter.after"
    );
}

#[test]
fn integer_variable_values_coerce_to_float() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Float")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document =
        Document::parse("query Drive($kilometers: Float!) { ping }", "query.graphql").unwrap();
    let operation = document.operations().next().unwrap();
    let provided = json_object(json!({"kilometers": 3000}));
    let coerced = coerce_variable_values(&schema, operation, &provided)
        .unwrap()
        .into_inner();
    let kilometers = &coerced["kilometers"];
    assert!(kilometers.is_f64());
    assert_eq!(kilometers.as_f64(), Some(3000.0));
}

#[test]
fn enum_variables_coerce_by_value_name() {
    let format = EnumType::new(name!("Format"), [name!("HARDCOVER"), name!("PAPERBACK")]);
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Boolean")))],
    );
    let schema = SchemaBuilder::new().query(query).type_(format).build().unwrap();
    let document =
        Document::parse("query Pick($format: Format) { ping }", "query.graphql").unwrap();
    let operation = document.operations().next().unwrap();

    let provided = json_object(json!({"format": "PAPERBACK"}));
    let coerced = coerce_variable_values(&schema, operation, &provided).unwrap();
    assert_eq!(coerced.into_inner(), json_object(json!({"format": "PAPERBACK"})));

    let provided = json_object(json!({"format": "BOGUS"}));
    let err = coerce_variable_values(&schema, operation, &provided).unwrap_err();
    assert_eq!(
        err.message(),
        "Could not coerce variable format: \"BOGUS\" to type Format"
    );
}

#[test]
fn arguments_coerce_once_per_field_selection() {
    static PARSES: AtomicUsize = AtomicUsize::new(0);
    let code = ScalarType::new(name!("Code"), |value| Ok(value.clone()))
        .parse_value(|value| Ok(value.clone()))
        .parse_literal(|value| {
            PARSES.fetch_add(1, Ordering::Relaxed);
            Ok(value.as_str().unwrap_or_default().into())
        });
    let shelf = ObjectType::new(
        name!("Shelf"),
        [FieldDefinition::new(name!("tagged"), Type::named(name!("String"))).argument(
            InputValueDefinition::new(name!("code"), Type::named(name!("Code")).non_null()),
        )],
    );
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(
            name!("shelves"),
            Type::named(name!("Shelf")).non_null().list().non_null(),
        )],
    );
    let schema = SchemaBuilder::new()
        .query(query)
        .type_(code)
        .type_(shelf)
        .build()
        .unwrap();
    let document =
        Document::parse(r#"{ shelves { tagged(code: "A-1") } }"#, "query.graphql").unwrap();
    let root = json_object(json!({
        "shelves": [{"tagged": "left"}, {"tagged": "center"}, {"tagged": "right"}],
    }));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"shelves":[{"tagged":"left"},{"tagged":"center"},{"tagged":"right"}]}}"#
    );
    // One field selection, three parent objects: the literal parses once
    assert_eq!(PARSES.load(Ordering::Relaxed), 1);
}

/// Resolves every field to the JSON object of its own coerced arguments.
struct EchoArguments;

impl ObjectSource for EchoArguments {
    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(ResolvedValue::leaf(JsonValue::Object(info.arguments().clone())))
    }
}

fn echo_schema() -> Valid<Schema> {
    let json = ScalarType::new(name!("Json"), |value| Ok(value.clone()));
    let where_input = InputObjectType::new(
        name!("Where"),
        [InputValueDefinition::new(name!("shelf"), Type::named(name!("String")))],
    );
    let query = ObjectType::new(
        name!("Query"),
        [
            FieldDefinition::new(name!("echo"), Type::named(name!("Json")))
                .argument(
                    InputValueDefinition::new(name!("limit"), Type::named(name!("Int")))
                        .default_value(ast::Value::Int(10.into())),
                )
                .argument(InputValueDefinition::new(name!("tag"), Type::named(name!("String")))),
            FieldDefinition::new(name!("find"), Type::named(name!("Json"))).argument(
                InputValueDefinition::new(name!("term"), Type::named(name!("String")).non_null()),
            ),
            FieldDefinition::new(name!("filter"), Type::named(name!("Json"))).argument(
                InputValueDefinition::new(name!("where"), Type::named(name!("Where")).non_null()),
            ),
        ],
    );
    SchemaBuilder::new()
        .query(query)
        .type_(json)
        .type_(where_input)
        .build()
        .unwrap()
}

#[test]
fn argument_defaults_apply_when_variables_are_missing() {
    let schema = echo_schema();
    let document =
        Document::parse("query Echo($limit: Int) { echo(limit: $limit) }", "query.graphql")
            .unwrap();
    let response = Execution::new(&schema, &document)
        .execute_sync(&EchoArguments)
        .unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"echo":{"limit":10}}}"#
    );
}

#[test]
fn provided_variables_reach_the_arguments() {
    let schema = echo_schema();
    let document = Document::parse(
        "query Echo($limit: Int, $tag: String) { echo(limit: $limit, tag: $tag) }",
        "query.graphql",
    )
    .unwrap();
    let variables = json_object(json!({"limit": 3}));
    let response = Execution::new(&schema, &document)
        .variables(&variables)
        .execute_sync(&EchoArguments)
        .unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"echo":{"limit":3}}}"#
    );
}

#[test]
fn argument_errors_are_field_errors() {
    let schema = echo_schema();

    let document = Document::parse("{ find }", "query.graphql").unwrap();
    let response = Execution::new(&schema, &document)
        .execute_sync(&EchoArguments)
        .unwrap();
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "missing value for required argument term"
    );
    assert_eq!(serde_json::to_string(&response.data).unwrap(), r#"{"find":null}"#);

    let document = Document::parse("{ find(term: null) }", "query.graphql").unwrap();
    let response = Execution::new(&schema, &document)
        .execute_sync(&EchoArguments)
        .unwrap();
    assert_eq!(
        response.errors[0].message,
        "null value for non-nullable argument term"
    );

    let document = Document::parse("{ filter(where: {bogus: 1}) }", "query.graphql").unwrap();
    let response = Execution::new(&schema, &document)
        .execute_sync(&EchoArguments)
        .unwrap();
    assert_eq!(
        response.errors[0].message,
        "Input object has key bogus not in type Where"
    );
}
