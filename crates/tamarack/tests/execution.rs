use expect_test::expect;
use futures::future::BoxFuture;
use futures::FutureExt as _;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use tamarack::execution::AsyncObjectSource;
use tamarack::execution::AsyncResolvedValue;
use tamarack::execution::ObjectSource;
use tamarack::execution::ResolveInfo;
use tamarack::execution::ResolvedValue;
use tamarack::execution::ResolverError;
use tamarack::name;
use tamarack::response::JsonMap;
use tamarack::schema::FieldDefinition;
use tamarack::schema::InterfaceType;
use tamarack::schema::ObjectType;
use tamarack::schema::SchemaBuilder;
use tamarack::schema::Type;
use tamarack::schema::UnionType;
use tamarack::Document;
use tamarack::Execution;

fn json_object(value: serde_json_bytes::Value) -> JsonMap {
    match value {
        serde_json_bytes::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn resolves_against_json_backed_sources() {
    let patron = ObjectType::new(
        name!("Patron"),
        [
            FieldDefinition::new(name!("id"), Type::named(name!("ID")).non_null()),
            FieldDefinition::new(name!("name"), Type::named(name!("String"))),
        ],
    );
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("patron"), Type::named(name!("Patron")))],
    );
    let schema = SchemaBuilder::new().query(query).type_(patron).build().unwrap();
    let document = Document::parse("{ patron { id name } }", "query.graphql").unwrap();
    let root = json_object(json!({"patron": {"id": "1", "name": "Demo"}}));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"patron":{"id":"1","name":"Demo"}}}"#
    );
}

#[test]
fn unknown_selected_fields_abort_the_whole_request() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("greeting"), Type::named(name!("String")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse("{ missingField }", "query.graphql").unwrap();
    let root = json_object(json!({}));
    let err = Execution::new(&schema, &document).execute_sync(&root).unwrap_err();
    assert!(err.is_suspected_validation_bug());
    let response = err.to_response(&document.sources);
    assert!(response.is_invalid());
    expect![[r#"
        {
          "errors": [
            {
              "message": "type `Query` does not have a field `missingField`",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ]
            }
          ]
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
}

#[test]
fn skip_beats_include() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("greeting"), Type::named(name!("String")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse(
        "query Visibility($skip: Boolean!, $include: Boolean!) {
            greeting @skip(if: $skip) @include(if: $include)
        }",
        "query.graphql",
    )
    .unwrap();
    let root = json_object(json!({"greeting": "hi"}));
    let selected = |skip: bool, include: bool| {
        let variables = json_object(json!({"skip": skip, "include": include}));
        let response = Execution::new(&schema, &document)
            .variables(&variables)
            .execute_sync(&root)
            .unwrap();
        response.data.as_object().unwrap().get("greeting").is_some()
    };
    assert!(!selected(true, true));
    assert!(!selected(true, false));
    assert!(selected(false, true));
    assert!(!selected(false, false));
}

#[test]
fn field_errors_bubble_to_the_nearest_nullable_ancestor() {
    let patron_fields = || {
        [
            FieldDefinition::new(name!("id"), Type::named(name!("ID")).non_null()),
            FieldDefinition::new(name!("name"), Type::named(name!("String")).non_null()),
        ]
    };
    let patron = ObjectType::new(name!("Patron"), patron_fields());
    let query = ObjectType::new(
        name!("Query"),
        [
            FieldDefinition::new(name!("greeting"), Type::named(name!("String"))),
            FieldDefinition::new(name!("patron"), Type::named(name!("Patron"))),
        ],
    );
    let schema = SchemaBuilder::new().query(query).type_(patron).build().unwrap();
    let document = Document::parse("{ greeting patron { id name } }", "query.graphql").unwrap();
    let root = json_object(json!({"greeting": "hi", "patron": {"id": "1", "name": null}}));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "non-null type String! resolved to null",
              "locations": [
                {
                  "line": 1,
                  "column": 24
                }
              ],
              "path": [
                "patron",
                "name"
              ]
            }
          ],
          "data": {
            "greeting": "hi",
            "patron": null
          }
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());

    // With a non-null `patron` the null reaches the response root
    let patron = ObjectType::new(name!("Patron"), patron_fields());
    let query = ObjectType::new(
        name!("Query"),
        [
            FieldDefinition::new(name!("greeting"), Type::named(name!("String"))),
            FieldDefinition::new(name!("patron"), Type::named(name!("Patron")).non_null()),
        ],
    );
    let schema = SchemaBuilder::new().query(query).type_(patron).build().unwrap();
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "non-null type String! resolved to null",
              "locations": [
                {
                  "line": 1,
                  "column": 24
                }
              ],
              "path": [
                "patron",
                "name"
              ]
            }
          ],
          "data": null
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
}

#[test]
fn union_members_resolve_through_is_type_of_probes() {
    struct Dog;
    struct Cat;
    struct Kennel;

    impl ObjectSource for Dog {
        fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
            (name == "barks").then(|| ResolvedValue::leaf(true))
        }
    }

    impl ObjectSource for Cat {
        fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
            (name == "meows").then(|| ResolvedValue::leaf(false))
        }
    }

    impl ObjectSource for Kennel {
        fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
            (name == "pets").then(|| {
                ResolvedValue::list([ResolvedValue::object(Dog), ResolvedValue::object(Cat)])
            })
        }
    }

    let dog = ObjectType::new(
        name!("Dog"),
        [FieldDefinition::new(name!("barks"), Type::named(name!("Boolean")).non_null())],
    )
    .is_type_of(|probe| probe.has_field("barks"));
    let cat = ObjectType::new(
        name!("Cat"),
        [FieldDefinition::new(name!("meows"), Type::named(name!("Boolean")).non_null())],
    )
    .is_type_of(|probe| probe.has_field("meows"));
    let pet = UnionType::new(name!("Pet"), [name!("Dog"), name!("Cat")]);
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(
            name!("pets"),
            Type::named(name!("Pet")).non_null().list().non_null(),
        )],
    );
    let schema = SchemaBuilder::new()
        .query(query)
        .type_(dog)
        .type_(cat)
        .type_(pet)
        .build()
        .unwrap();
    let document = Document::parse(
        "{ pets { __typename ... on Dog { barks } ... on Cat { meows } } }",
        "query.graphql",
    )
    .unwrap();
    let response = Execution::new(&schema, &document).execute_sync(&Kennel).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"pets":[{"__typename":"Dog","barks":true},{"__typename":"Cat","meows":false}]}}"#
    );
}

#[test]
fn interface_resolution_uses_the_resolve_type_callback() {
    let media = InterfaceType::new(
        name!("Media"),
        [
            FieldDefinition::new(name!("kind"), Type::named(name!("String")).non_null()),
            FieldDefinition::new(name!("title"), Type::named(name!("String")).non_null()),
        ],
    )
    .resolve_type(|probe| match probe.leaf_field("kind")?.as_str()? {
        "book" => Some(name!("Book")),
        "magazine" => Some(name!("Magazine")),
        _ => None,
    });
    let concrete = |name| {
        ObjectType::new(
            name,
            [
                FieldDefinition::new(name!("kind"), Type::named(name!("String")).non_null()),
                FieldDefinition::new(name!("title"), Type::named(name!("String")).non_null()),
            ],
        )
        .implements(name!("Media"))
    };
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(
            name!("items"),
            Type::named(name!("Media")).non_null().list().non_null(),
        )],
    );
    let schema = SchemaBuilder::new()
        .query(query)
        .type_(media)
        .type_(concrete(name!("Book")))
        .type_(concrete(name!("Magazine")))
        .build()
        .unwrap();
    let document = Document::parse("{ items { kind title } }", "query.graphql").unwrap();
    let root = json_object(json!({
        "items": [
            {"kind": "book", "title": "Dune"},
            {"kind": "magazine", "title": "Nature"},
        ],
    }));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"items":[{"kind":"book","title":"Dune"},{"kind":"magazine","title":"Nature"}]}}"#
    );
}

#[test]
fn fragment_cycles_and_unknown_spreads_are_skipped() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("greeting"), Type::named(name!("String")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse(
        "{ greeting ...Loop ...Missing }
         fragment Loop on Query { greeting ...Loop }",
        "query.graphql",
    )
    .unwrap();
    let root = json_object(json!({"greeting": "hi"}));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"greeting":"hi"}}"#
    );
}

#[test]
fn resolver_errors_become_field_errors() {
    struct FailingRoot;

    impl ObjectSource for FailingRoot {
        fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
            None
        }

        fn resolve_field<'a>(
            &'a self,
            _info: &'a ResolveInfo<'a>,
        ) -> Result<ResolvedValue<'a>, ResolverError> {
            Err(ResolverError::new("database offline"))
        }
    }

    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("greeting"), Type::named(name!("String")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse("{ greeting }", "query.graphql").unwrap();
    let response = Execution::new(&schema, &document)
        .execute_sync(&FailingRoot)
        .unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "resolver error: database offline",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "greeting"
              ]
            }
          ],
          "data": {
            "greeting": null
          }
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
}

#[test]
fn mutation_root_fields_run_in_document_order() {
    struct CounterRoot {
        next: AtomicI64,
    }

    impl ObjectSource for CounterRoot {
        fn field(&self, name: &str) -> Option<ResolvedValue<'_>> {
            (name == "bump")
                .then(|| ResolvedValue::leaf(self.next.fetch_add(1, Ordering::SeqCst)))
        }
    }

    let bump = || [FieldDefinition::new(name!("bump"), Type::named(name!("Int")).non_null())];
    let schema = SchemaBuilder::new()
        .query(ObjectType::new(name!("Query"), bump()))
        .mutation(ObjectType::new(name!("Mutation"), bump()))
        .build()
        .unwrap();
    let document = Document::parse(
        "mutation { first: bump second: bump third: bump }",
        "mutation.graphql",
    )
    .unwrap();
    let root = CounterRoot {
        next: AtomicI64::new(1),
    };
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"first":1,"second":2,"third":3}}"#
    );
}

#[test]
fn a_bad_list_item_nulls_only_that_item() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("numbers"), Type::named(name!("Int")).list())],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let document = Document::parse("{ numbers }", "query.graphql").unwrap();
    let root = json_object(json!({"numbers": [1, "two", 3]}));
    let response = Execution::new(&schema, &document).execute_sync(&root).unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "resolver returned \"two\", expected Int",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "numbers",
                1
              ]
            }
          ],
          "data": {
            "numbers": [
              1,
              null,
              3
            ]
          }
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
}

#[tokio::test]
async fn async_resolvers_match_sync_output() {
    struct AsyncLibrary;
    struct AsyncPatron;

    impl AsyncObjectSource for AsyncLibrary {
        fn field(&self, name: &str) -> Option<AsyncResolvedValue<'_>> {
            match name {
                "numbers" => Some(AsyncResolvedValue::list([
                    AsyncResolvedValue::leaf(1),
                    AsyncResolvedValue::leaf(2),
                    AsyncResolvedValue::leaf(3),
                ])),
                "patron" => Some(AsyncResolvedValue::object(AsyncPatron)),
                _ => None,
            }
        }
    }

    impl AsyncObjectSource for AsyncPatron {
        fn field(&self, name: &str) -> Option<AsyncResolvedValue<'_>> {
            (name == "name").then(|| AsyncResolvedValue::leaf("Demo"))
        }

        fn resolve_field<'a>(
            &'a self,
            info: &'a ResolveInfo<'a>,
        ) -> BoxFuture<'a, Result<AsyncResolvedValue<'a>, ResolverError>> {
            async move {
                tokio::task::yield_now().await;
                Ok(self
                    .field(info.field_name())
                    .unwrap_or_else(AsyncResolvedValue::null))
            }
            .boxed()
        }
    }

    let patron = ObjectType::new(
        name!("Patron"),
        [FieldDefinition::new(name!("name"), Type::named(name!("String")))],
    );
    let query = ObjectType::new(
        name!("Query"),
        [
            FieldDefinition::new(name!("numbers"), Type::named(name!("Int")).non_null().list()),
            FieldDefinition::new(name!("patron"), Type::named(name!("Patron"))),
        ],
    );
    let schema = SchemaBuilder::new().query(query).type_(patron).build().unwrap();
    let document = Document::parse("{ numbers patron { name } }", "query.graphql").unwrap();

    let from_async = Execution::new(&schema, &document)
        .execute(&AsyncLibrary)
        .await
        .unwrap();
    let root = json_object(json!({"numbers": [1, 2, 3], "patron": {"name": "Demo"}}));
    let from_sync = Execution::new(&schema, &document).execute_sync(&root).unwrap();

    let from_async = serde_json::to_string(&from_async).unwrap();
    let from_sync = serde_json::to_string(&from_sync).unwrap();
    assert_eq!(from_async, from_sync);
    assert_eq!(
        from_async,
        r#"{"data":{"numbers":[1,2,3],"patron":{"name":"Demo"}}}"#
    );
}
