use expect_test::expect;
use serde_json_bytes::json;
use tamarack::name;
use tamarack::response::JsonMap;
use tamarack::schema::EnumType;
use tamarack::schema::FieldDefinition;
use tamarack::schema::ObjectType;
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

fn library_schema() -> Valid<Schema> {
    let format = EnumType::new(name!("Format"), [name!("HARDCOVER"), name!("PAPERBACK")]);
    let book = ObjectType::new(
        name!("Book"),
        [
            FieldDefinition::new(name!("title"), Type::named(name!("String")).non_null()),
            FieldDefinition::new(name!("format"), Type::named(name!("Format"))),
        ],
    );
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("book"), Type::named(name!("Book")))],
    );
    SchemaBuilder::new()
        .query(query)
        .type_(book)
        .type_(format)
        .build()
        .unwrap()
}

#[test]
fn reports_schema_and_types() {
    let schema = library_schema();
    let root = json_object(json!({}));
    let introspect = |query: &str| {
        let document = Document::parse(query, "query.graphql").unwrap();
        let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
        serde_json::to_string_pretty(&response).unwrap()
    };

    expect![[r#"
        {
          "data": {
            "__schema": {
              "queryType": {
                "name": "Query"
              }
            }
          }
        }"#]]
    .assert_eq(&introspect("{ __schema { queryType { name } } }"));

    expect![[r#"
        {
          "data": {
            "__typename": "Query"
          }
        }"#]]
    .assert_eq(&introspect("{ __typename }"));

    expect![[r#"
        {
          "data": {
            "__schema": {
              "directives": [
                {
                  "name": "skip"
                },
                {
                  "name": "include"
                },
                {
                  "name": "deprecated"
                }
              ]
            }
          }
        }"#]]
    .assert_eq(&introspect("{ __schema { directives { name } } }"));
}

#[test]
fn describes_a_type_by_name() {
    let schema = library_schema();
    let root = json_object(json!({}));
    let document = Document::parse(
        r#"{
            __type(name: "Book") {
                kind
                name
                fields {
                    name
                    type {
                        kind
                        name
                        ofType {
                            kind
                            name
                        }
                    }
                }
            }
        }"#,
        "query.graphql",
    )
    .unwrap();
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    expect![[r#"
        {
          "data": {
            "__type": {
              "kind": "OBJECT",
              "name": "Book",
              "fields": [
                {
                  "name": "title",
                  "type": {
                    "kind": "NON_NULL",
                    "name": null,
                    "ofType": {
                      "kind": "SCALAR",
                      "name": "String"
                    }
                  }
                },
                {
                  "name": "format",
                  "type": {
                    "kind": "ENUM",
                    "name": "Format",
                    "ofType": null
                  }
                }
              ]
            }
          }
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());

    let document =
        Document::parse(r#"{ __type(name: "Missing") { kind name } }"#, "query.graphql").unwrap();
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"__type":null}}"#
    );
}

#[test]
fn introspection_can_be_disabled() {
    let schema = library_schema();
    let root = json_object(json!({}));
    let document =
        Document::parse("{ __schema { queryType { name } } }", "query.graphql").unwrap();
    let response = Execution::new(&schema, &document)
        .enable_introspection(false)
        .execute_sync(&root)
        .unwrap();
    // `__schema` is non-null, so the error reaches the response root
    expect![[r#"
        {
          "errors": [
            {
              "message": "resolver error: schema introspection is disabled",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "__schema"
              ]
            }
          ],
          "data": null
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
}
