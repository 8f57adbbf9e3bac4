use expect_test::expect;
use tamarack::ast;
use tamarack::name;
use tamarack::schema::EnumType;
use tamarack::schema::EnumValueDefinition;
use tamarack::schema::FieldDefinition;
use tamarack::schema::InputObjectType;
use tamarack::schema::InputValueDefinition;
use tamarack::schema::InterfaceType;
use tamarack::schema::ObjectType;
use tamarack::schema::ScalarType;
use tamarack::schema::SchemaBuilder;
use tamarack::schema::Type;
use tamarack::schema::UnionType;

#[test]
fn prints_sorted_sdl_with_a_schema_block_for_unconventional_roots() {
    let isbn = ScalarType::new(name!("Isbn"), |value| Ok(value.clone()))
        .description("International Standard Book Number.");
    let printed = InterfaceType::new(
        name!("Printed"),
        [FieldDefinition::new(name!("pages"), Type::named(name!("Int")).non_null())],
    );
    let book = ObjectType::new(
        name!("Book"),
        [
            FieldDefinition::new(name!("title"), Type::named(name!("String")).non_null()),
            FieldDefinition::new(name!("pages"), Type::named(name!("Int")).non_null()),
            FieldDefinition::new(name!("isbn"), Type::named(name!("Isbn"))),
        ],
    )
    .implements(name!("Printed"))
    .description("A bound volume.\n\nDonated copies keep their provenance record.");
    let magazine = ObjectType::new(
        name!("Magazine"),
        [
            FieldDefinition::new(name!("issue"), Type::named(name!("Int")).non_null()),
            FieldDefinition::new(name!("pages"), Type::named(name!("Int")).non_null()),
        ],
    )
    .implements(name!("Printed"));
    let item = UnionType::new(name!("Item"), [name!("Book"), name!("Magazine")]);
    let format = EnumType::new(name!("Format"), [name!("HARDCOVER"), name!("PAPERBACK")])
        .value(
            name!("LARGE_PRINT"),
            EnumValueDefinition::new().description("Easier on the eyes."),
        )
        .value(
            name!("MICROFICHE"),
            EnumValueDefinition::new().deprecated("No longer supported"),
        )
        .value(name!("SCROLL"), EnumValueDefinition::new().deprecated("Print only"));
    let checkout_input = InputObjectType::new(
        name!("CheckoutInput"),
        [
            InputValueDefinition::new(name!("patronId"), Type::named(name!("ID")).non_null()),
            InputValueDefinition::new(name!("days"), Type::named(name!("Int")))
                .default_value(ast::Value::Int(14.into())),
        ],
    );
    let query_root = ObjectType::new(
        name!("QueryRoot"),
        [
            FieldDefinition::new(name!("search"), Type::named(name!("Item")).non_null().list())
                .argument(InputValueDefinition::new(
                    name!("term"),
                    Type::named(name!("String")).non_null(),
                ))
                .argument(
                    InputValueDefinition::new(name!("limit"), Type::named(name!("Int")))
                        .default_value(ast::Value::Int(10.into())),
                ),
            FieldDefinition::new(name!("featured"), Type::named(name!("Item")))
                .deprecated("Use search"),
            FieldDefinition::new(name!("checkout"), Type::named(name!("Boolean")).non_null())
                .argument(InputValueDefinition::new(
                    name!("input"),
                    Type::named(name!("CheckoutInput")).non_null(),
                )),
        ],
    );
    let schema = SchemaBuilder::new()
        .query(query_root)
        .type_(isbn)
        .type_(printed)
        .type_(book)
        .type_(magazine)
        .type_(item)
        .type_(format)
        .type_(checkout_input)
        .build()
        .unwrap();

    expect![[r#"
        schema {
          query: QueryRoot
        }

        """
        A bound volume.

        Donated copies keep their provenance record.
        """
        type Book implements Printed {
          title: String!
          pages: Int!
          isbn: Isbn
        }

        input CheckoutInput {
          patronId: ID!
          days: Int = 14
        }

        enum Format {
          HARDCOVER
          PAPERBACK
          """Easier on the eyes."""
          LARGE_PRINT
          MICROFICHE @deprecated
          SCROLL @deprecated(reason: "Print only")
        }

        """International Standard Book Number."""
        scalar Isbn

        union Item = Book | Magazine

        type Magazine implements Printed {
          issue: Int!
          pages: Int!
        }

        interface Printed {
          pages: Int!
        }

        type QueryRoot {
          search(term: String!, limit: Int = 10): [Item!]
          featured: Item @deprecated(reason: "Use search")
          checkout(input: CheckoutInput!): Boolean!
        }
    "#]]
    .assert_eq(&schema.to_string());
}

#[test]
fn conventional_root_names_need_no_schema_block() {
    let query = ObjectType::new(
        name!("Query"),
        [FieldDefinition::new(name!("ok"), Type::named(name!("Boolean")))],
    );
    let schema = SchemaBuilder::new().query(query).build().unwrap();
    expect![[r#"
        type Query {
          ok: Boolean
        }
    "#]]
    .assert_eq(&schema.to_string());
}
