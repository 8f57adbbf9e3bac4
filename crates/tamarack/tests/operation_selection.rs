use serde_json_bytes::json;
use tamarack::name;
use tamarack::response::JsonMap;
use tamarack::schema::FieldDefinition;
use tamarack::schema::ObjectType;
use tamarack::schema::SchemaBuilder;
use tamarack::schema::Type;
use tamarack::Document;
use tamarack::Execution;
use tamarack::Schema;
use tamarack::Valid;

fn ping_schema() -> Valid<Schema> {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ping"), Type::named(name!("Boolean")))],
    );
    SchemaBuilder::new().query(query).build().unwrap()
}

fn json_object(value: serde_json_bytes::Value) -> JsonMap {
    match value {
        serde_json_bytes::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn a_single_unnamed_operation_needs_no_name() {
    let schema = ping_schema();
    let document = Document::parse("{ ping }", "query.graphql").unwrap();
    let root = json_object(json!({"ping": true}));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"ping":true}}"#
    );
}

#[test]
fn multiple_operations_require_a_name() {
    let schema = ping_schema();
    let document =
        Document::parse("query A { ping } query B { pong: ping }", "query.graphql").unwrap();
    let root = json_object(json!({"ping": true}));

    let err = Execution::new(&schema, &document).execute_sync(&root).unwrap_err();
    assert_eq!(
        err.message(),
        "Must provide operation name if query contains multiple operations."
    );

    let response = Execution::new(&schema, &document)
        .operation_name("B")
        .execute_sync(&root)
        .unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"pong":true}}"#
    );
}

#[test]
fn unknown_operation_names_are_rejected() {
    let schema = ping_schema();
    let document = Document::parse("query A { ping }", "query.graphql").unwrap();
    let root = json_object(json!({"ping": true}));
    let err = Execution::new(&schema, &document)
        .operation_name("Nope")
        .execute_sync(&root)
        .unwrap_err();
    assert_eq!(err.message(), r#"Unknown operation named "Nope"."#);
    // No location: the name is not part of the document
    assert!(err.location().is_none());
    let response = err.to_response(&document.sources);
    assert!(response.is_invalid());
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"errors":[{"message":"Unknown operation named \"Nope\"."}]}"#
    );
}

#[test]
fn a_document_without_operations_cannot_execute() {
    let schema = ping_schema();
    let document =
        Document::parse("fragment Loose on Query { ping }", "query.graphql").unwrap();
    let root = json_object(json!({"ping": true}));
    let err = Execution::new(&schema, &document).execute_sync(&root).unwrap_err();
    assert_eq!(err.message(), "Must provide an operation.");
}

#[test]
fn type_system_definitions_cannot_execute() {
    let schema = ping_schema();
    let document =
        Document::parse("type Extra { id: ID }\n{ ping }", "query.graphql").unwrap();
    let root = json_object(json!({"ping": true}));
    let err = Execution::new(&schema, &document).execute_sync(&root).unwrap_err();
    assert_eq!(
        err.message(),
        "GraphQL cannot execute a request containing an object type definition."
    );
}

#[test]
fn operations_need_a_matching_schema_root() {
    let schema = ping_schema();
    let document = Document::parse("mutation { bump }", "mutation.graphql").unwrap();
    let root = json_object(json!({}));
    let err = Execution::new(&schema, &document).execute_sync(&root).unwrap_err();
    assert_eq!(err.message(), "Schema is not configured for mutations.");
}
