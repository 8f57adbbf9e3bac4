use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tamarack::name;
use tamarack::schema::EnumType;
use tamarack::schema::FieldDefinition;
use tamarack::schema::InputObjectType;
use tamarack::schema::InputValueDefinition;
use tamarack::schema::ObjectType;
use tamarack::schema::ScalarType;
use tamarack::schema::SchemaBuilder;
use tamarack::schema::Type;
use tamarack::schema::UnionType;
use tamarack::Node;

#[test]
fn registers_types_reachable_from_the_roots() {
    let book = ObjectType::new_lazy(name!("Book"), || {
        vec![
            FieldDefinition::new(name!("title"), Type::named(name!("String")).non_null()),
            FieldDefinition::new(name!("author"), Type::named(name!("Author"))),
        ]
    });
    let author = ObjectType::new_lazy(name!("Author"), || {
        vec![
            FieldDefinition::new(name!("name"), Type::named(name!("String"))),
            FieldDefinition::new(name!("books"), Type::named(name!("Book")).non_null().list()),
        ]
    });
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("book"), Type::named(name!("Book")))],
    );
    let schema = SchemaBuilder::new()
        .query(query)
        .type_(book)
        .type_(author)
        .build()
        .unwrap();
    let expected = ["Query", "Book", "Author", "String", "Boolean", "__Schema", "__Type"];
    for name in expected {
        assert!(schema.types().contains_key(name), "missing {name}");
    }
    // Built-in scalars are only part of schemas that reference them
    assert!(!schema.types().contains_key("Int"));
    assert!(!schema.types().contains_key("Float"));
    assert!(!schema.types().contains_key("ID"));
    assert_eq!(schema.query_root(), "Query");
}

#[test]
fn rejects_references_to_undefined_types() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("pet"), Type::named(name!("Pet")))],
    );
    let err = SchemaBuilder::new().query(query).build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "type `Pet`, referenced by `Query.pet`, is not defined in the schema"
    );
}

#[test]
fn rejects_two_definitions_under_one_name() {
    let one = EnumType::new(name!("Status"), [name!("OPEN")]);
    let other = EnumType::new(name!("Status"), [name!("CLOSED")]);
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("status"), Type::named(name!("Status")))],
    );
    let err = SchemaBuilder::new()
        .query(query)
        .type_(one)
        .type_(other)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "the type `Status` is defined multiple times in the schema"
    );
}

#[test]
fn accepts_the_same_definition_registered_twice() {
    let status = Node::new(EnumType::new(name!("Status"), [name!("OPEN")]));
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("status"), Type::named(name!("Status")))],
    );
    let schema = SchemaBuilder::new()
        .query(query)
        .type_(status.clone())
        .type_(status)
        .build()
        .unwrap();
    assert!(schema.types().contains_key("Status"));
}

#[test]
fn runs_deferred_field_lists_once_in_declaration_order() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);
    let query = ObjectType::new_lazy(name!("Query"), || {
        RUNS.fetch_add(1, Ordering::Relaxed);
        vec![
            FieldDefinition::new(name!("zebra"), Type::named(name!("String"))),
            FieldDefinition::new(name!("aardvark"), Type::named(name!("String"))),
            FieldDefinition::new(name!("mongoose"), Type::named(name!("String"))),
        ]
    });
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    let object = schema.get_object("Query").unwrap();
    let fields: Vec<&str> = object.fields().keys().map(|name| name.as_str()).collect();
    assert_eq!(fields, ["zebra", "aardvark", "mongoose"]);
    let again: Vec<&str> = object.fields().keys().map(|name| name.as_str()).collect();
    assert_eq!(fields, again);
    assert_eq!(RUNS.load(Ordering::Relaxed), 1);
}

#[test]
fn wrapping_syntax_prints_and_collapses() {
    let book = Type::named(name!("Book"));
    assert_eq!(book.to_string(), "Book");
    assert_eq!(book.clone().non_null().to_string(), "Book!");
    assert_eq!(book.clone().list().to_string(), "[Book]");
    assert_eq!(book.clone().list().non_null().to_string(), "[Book]!");
    assert_eq!(book.clone().non_null().list().to_string(), "[Book!]");
    // `non_null` on an already non-null type is a no-op
    let required = book.non_null();
    assert_eq!(required.clone().non_null(), required);
}

#[test]
fn rejects_a_scalar_with_half_a_parser() {
    let date = ScalarType::new(name!("Date"), |value| Ok(value.clone()))
        .parse_value(|value| Ok(value.clone()));
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("today"), Type::named(name!("Date")))],
    );
    let err = SchemaBuilder::new()
        .query(query)
        .type_(date)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "scalar `Date` defines only one of `parse_value` and `parse_literal`, \
         they must be provided together"
    );
}

#[test]
fn rejects_types_in_the_wrong_position() {
    // An input object is not an output type
    let filter = InputObjectType::new(
        name!("Filter"),
        [InputValueDefinition::new(name!("after"), Type::named(name!("String")))],
    );
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("filter"), Type::named(name!("Filter")))],
    );
    let err = SchemaBuilder::new()
        .query(query)
        .type_(filter)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "`Filter` is not an output type, but it is the type of `Query.filter`"
    );

    // A union may only have object members
    let age = EnumType::new(name!("Age"), [name!("PUPPY"), name!("ADULT")]);
    let pets = UnionType::new(name!("Pet"), [name!("Age")]);
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("pet"), Type::named(name!("Pet")))],
    );
    let err = SchemaBuilder::new()
        .query(query)
        .type_(age)
        .type_(pets)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "union `Pet` has member `Age` which is not an object type"
    );
}

#[test]
fn requires_a_query_root() {
    let err = SchemaBuilder::new().build().unwrap_err();
    assert_eq!(err.to_string(), "schema does not define a query root type");
}
