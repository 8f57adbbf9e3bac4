//! Schema introspection: the meta-type definitions registered in every
//! schema, and the sources that resolve their fields from the schema itself.
//!
//! <https://spec.graphql.org/October2021/#sec-Introspection>

use crate::ast;
use crate::execution::engine::ExecutionContext;
use crate::execution::resolver::MaybeAsync;
use crate::execution::resolver::MaybeAsyncResolved;
use crate::execution::resolver::ObjectSource;
use crate::execution::resolver::ResolveInfo;
use crate::execution::resolver::ResolvedValue;
use crate::execution::resolver::ResolverError;
use crate::name;
use crate::name::Name;
use crate::node::Node;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::schema::DirectiveDefinition;
use crate::schema::DirectiveLocation;
use crate::schema::EnumType;
use crate::schema::EnumValueDefinition;
use crate::schema::FieldDefinition;
use crate::schema::InputValueDefinition;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::Type;
use crate::schema::TypeDef;
use crate::Valid;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::sync::OnceLock;

/// The definitions of the eight `__`-prefixed meta-types.
/// The schema builder registers them in every schema.
pub(crate) fn meta_types() -> &'static [TypeDef; 8] {
    // Local constructors, only ever given literal names from the
    // introspection schema
    fn ty(name: &'static str) -> Type {
        Type::named(Name::new_static_unchecked(name))
    }
    fn field(name: &'static str, ty: Type) -> FieldDefinition {
        FieldDefinition::new(Name::new_static_unchecked(name), ty)
    }
    fn include_deprecated_argument() -> InputValueDefinition {
        InputValueDefinition::new(name!("includeDeprecated"), Type::named(name!("Boolean")))
            .default_value(ast::Value::Boolean(false))
    }

    static TYPES: OnceLock<[TypeDef; 8]> = OnceLock::new();
    TYPES.get_or_init(|| {
        [
            ObjectType::new(
                name!("__Schema"),
                [
                    field("description", ty("String")),
                    field("types", ty("__Type").non_null().list().non_null()),
                    field("queryType", ty("__Type").non_null()),
                    field("mutationType", ty("__Type")),
                    field("subscriptionType", ty("__Type")),
                    field("directives", ty("__Directive").non_null().list().non_null()),
                ],
            )
            .into(),
            ObjectType::new(
                name!("__Type"),
                [
                    field("kind", ty("__TypeKind").non_null()),
                    field("name", ty("String")),
                    field("description", ty("String")),
                    field("fields", ty("__Field").non_null().list())
                        .argument(include_deprecated_argument()),
                    field("interfaces", ty("__Type").non_null().list()),
                    field("possibleTypes", ty("__Type").non_null().list()),
                    field("enumValues", ty("__EnumValue").non_null().list())
                        .argument(include_deprecated_argument()),
                    field("inputFields", ty("__InputValue").non_null().list()),
                    field("ofType", ty("__Type")),
                ],
            )
            .into(),
            ObjectType::new(
                name!("__Field"),
                [
                    field("name", ty("String").non_null()),
                    field("description", ty("String")),
                    field("args", ty("__InputValue").non_null().list().non_null()),
                    field("type", ty("__Type").non_null()),
                    field("isDeprecated", ty("Boolean").non_null()),
                    field("deprecationReason", ty("String")),
                ],
            )
            .into(),
            ObjectType::new(
                name!("__InputValue"),
                [
                    field("name", ty("String").non_null()),
                    field("description", ty("String")),
                    field("type", ty("__Type").non_null()),
                    field("defaultValue", ty("String")),
                ],
            )
            .into(),
            ObjectType::new(
                name!("__EnumValue"),
                [
                    field("name", ty("String").non_null()),
                    field("description", ty("String")),
                    field("isDeprecated", ty("Boolean").non_null()),
                    field("deprecationReason", ty("String")),
                ],
            )
            .into(),
            ObjectType::new(
                name!("__Directive"),
                [
                    field("name", ty("String").non_null()),
                    field("description", ty("String")),
                    field(
                        "locations",
                        ty("__DirectiveLocation").non_null().list().non_null(),
                    ),
                    field("args", ty("__InputValue").non_null().list().non_null()),
                    field("isRepeatable", ty("Boolean").non_null()),
                ],
            )
            .into(),
            EnumType::new(
                name!("__TypeKind"),
                [
                    name!("SCALAR"),
                    name!("OBJECT"),
                    name!("INTERFACE"),
                    name!("UNION"),
                    name!("ENUM"),
                    name!("INPUT_OBJECT"),
                    name!("LIST"),
                    name!("NON_NULL"),
                ],
            )
            .into(),
            EnumType::new(
                name!("__DirectiveLocation"),
                [
                    DirectiveLocation::Query,
                    DirectiveLocation::Mutation,
                    DirectiveLocation::Subscription,
                    DirectiveLocation::Field,
                    DirectiveLocation::FragmentDefinition,
                    DirectiveLocation::FragmentSpread,
                    DirectiveLocation::InlineFragment,
                    DirectiveLocation::VariableDefinition,
                    DirectiveLocation::Schema,
                    DirectiveLocation::Scalar,
                    DirectiveLocation::Object,
                    DirectiveLocation::FieldDefinition,
                    DirectiveLocation::ArgumentDefinition,
                    DirectiveLocation::Interface,
                    DirectiveLocation::Union,
                    DirectiveLocation::Enum,
                    DirectiveLocation::EnumValue,
                    DirectiveLocation::InputObject,
                    DirectiveLocation::InputFieldDefinition,
                ]
                .map(|location| Name::new_static_unchecked(location.name())),
            )
            .into(),
        ]
    })
}

/// Resolves the `__schema` meta-field of the query root.
pub(crate) fn resolve_schema_meta_field<'a>(
    ctx: &ExecutionContext<'a>,
) -> Result<MaybeAsyncResolved<'a>, ResolverError> {
    check_introspection_enabled(ctx)?;
    Ok(MaybeAsync::Sync(ResolvedValue::object(SchemaMetaField)))
}

/// Resolves the `__type(name:)` meta-field of the query root.
pub(crate) fn resolve_type_meta_field<'a>(
    ctx: &ExecutionContext<'a>,
    arguments: &JsonMap,
) -> Result<MaybeAsyncResolved<'a>, ResolverError> {
    check_introspection_enabled(ctx)?;
    let resolved = match arguments.get("name").and_then(JsonValue::as_str) {
        Some(name) => type_def(ctx.schema, name),
        None => ResolvedValue::null(),
    };
    Ok(MaybeAsync::Sync(resolved))
}

fn check_introspection_enabled(ctx: &ExecutionContext<'_>) -> Result<(), ResolverError> {
    if ctx.enable_introspection {
        Ok(())
    } else {
        Err(ResolverError::new("schema introspection is disabled"))
    }
}

fn unknown_field(type_name: &str, info: &ResolveInfo<'_>) -> ResolverError {
    ResolverError::new(format!(
        "unexpected field name: {} in type {}",
        info.field_name(),
        type_name
    ))
}

fn type_def_opt<'a>(schema: &'a Valid<Schema>, name: impl AsRef<str>) -> Option<&'a TypeDef> {
    schema.type_by_name(name.as_ref())
}

fn type_def<'a>(schema: &'a Valid<Schema>, name: impl AsRef<str>) -> ResolvedValue<'a> {
    ResolvedValue::nullable_object(type_def_opt(schema, name).map(|def| TypeDefResolver { def }))
}

fn types<'a>(
    schema: &'a Valid<Schema>,
    names: impl IntoIterator<Item = &'a Name> + 'a,
) -> ResolvedValue<'a> {
    ResolvedValue::list(names.into_iter().map(move |name| type_def(schema, name)))
}

/// Resolves a `__Type` reference for any type syntax: named types go through
/// [`TypeDefResolver`], wrapping syntax through [`WrappedTypeResolver`].
fn ty<'a>(info: &'a ResolveInfo<'a>, ty: &'a Type) -> ResolvedValue<'a> {
    match ty {
        Type::Named(name) => type_def(info.schema(), name),
        _ => ResolvedValue::object(WrappedTypeResolver {
            ty: Cow::Borrowed(ty),
        }),
    }
}

fn fields_list<'a>(
    fields: &'a IndexMap<Name, Node<FieldDefinition>>,
    include_deprecated: bool,
) -> ResolvedValue<'a> {
    ResolvedValue::list(
        fields
            .values()
            .filter(move |def| include_deprecated || def.deprecation_reason.is_none())
            .map(|def| ResolvedValue::object(FieldResolver { def })),
    )
}

fn include_deprecated(arguments: &JsonMap) -> bool {
    matches!(
        arguments.get("includeDeprecated"),
        Some(JsonValue::Bool(true))
    )
}

/// Source for the `__Schema` object.
struct SchemaMetaField;

impl ObjectSource for SchemaMetaField {
    fn type_name(&self) -> Option<&str> {
        Some("__Schema")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        let schema = info.schema();
        Ok(match info.field_name() {
            "description" => ResolvedValue::leaf(schema.description()),
            "types" => ResolvedValue::list(
                schema
                    .types()
                    .values()
                    .map(|def| ResolvedValue::object(TypeDefResolver { def })),
            ),
            "queryType" => type_def(schema, schema.query_root()),
            "mutationType" => match schema.root_operation(ast::OperationType::Mutation) {
                Some(name) => type_def(schema, name),
                None => ResolvedValue::null(),
            },
            "subscriptionType" => match schema.root_operation(ast::OperationType::Subscription) {
                Some(name) => type_def(schema, name),
                None => ResolvedValue::null(),
            },
            "directives" => ResolvedValue::list(
                schema
                    .directives()
                    .values()
                    .map(|def| ResolvedValue::object(DirectiveResolver { def })),
            ),
            _ => return Err(unknown_field("__Schema", info)),
        })
    }
}

/// Source for `__Type` objects backed by a named type definition.
struct TypeDefResolver<'a> {
    def: &'a TypeDef,
}

impl ObjectSource for TypeDefResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__Type")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        let schema = info.schema();
        Ok(match info.field_name() {
            "kind" => ResolvedValue::leaf(match self.def {
                TypeDef::Scalar(_) => "SCALAR",
                TypeDef::Object(_) => "OBJECT",
                TypeDef::Interface(_) => "INTERFACE",
                TypeDef::Union(_) => "UNION",
                TypeDef::Enum(_) => "ENUM",
                TypeDef::InputObject(_) => "INPUT_OBJECT",
            }),
            "name" => ResolvedValue::leaf(self.def.name().as_str()),
            "description" => ResolvedValue::leaf(self.def.description()),
            "fields" => match self.def {
                TypeDef::Object(def) => {
                    fields_list(def.fields(), include_deprecated(info.arguments()))
                }
                TypeDef::Interface(def) => {
                    fields_list(def.fields(), include_deprecated(info.arguments()))
                }
                _ => ResolvedValue::null(),
            },
            "interfaces" => match self.def {
                TypeDef::Object(def) => types(schema, def.implements_interfaces()),
                _ => ResolvedValue::null(),
            },
            "possibleTypes" => match self.def {
                TypeDef::Interface(_) | TypeDef::Union(_) => {
                    types(schema, schema.possible_types(self.def.name()))
                }
                _ => ResolvedValue::null(),
            },
            "enumValues" => match self.def {
                TypeDef::Enum(def) => {
                    let include_deprecated = include_deprecated(info.arguments());
                    ResolvedValue::list(
                        def.values()
                            .iter()
                            .filter(move |(_, value)| {
                                include_deprecated || value.deprecation_reason.is_none()
                            })
                            .map(|(name, value)| {
                                ResolvedValue::object(EnumValueResolver { name, def: value })
                            }),
                    )
                }
                _ => ResolvedValue::null(),
            },
            "inputFields" => match self.def {
                TypeDef::InputObject(def) => ResolvedValue::list(
                    def.fields()
                        .values()
                        .map(|def| ResolvedValue::object(InputValueResolver { def })),
                ),
                _ => ResolvedValue::null(),
            },
            "ofType" => ResolvedValue::null(),
            _ => return Err(unknown_field("__Type", info)),
        })
    }
}

/// Source for `__Type` objects backed by list and non-null type syntax.
struct WrappedTypeResolver<'a> {
    ty: Cow<'a, Type>,
}

impl ObjectSource for WrappedTypeResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__Type")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(match info.field_name() {
            "kind" => ResolvedValue::leaf(match &*self.ty {
                // Named types go through `TypeDefResolver` instead
                Type::Named(_) => unreachable!(),
                Type::List(_) => "LIST",
                Type::NonNullNamed(_) | Type::NonNullList(_) => "NON_NULL",
            }),
            "ofType" => match &*self.ty {
                Type::Named(_) => unreachable!(),
                Type::List(inner) => ty(info, inner),
                Type::NonNullNamed(name) => type_def(info.schema(), name),
                Type::NonNullList(inner) => ResolvedValue::object(WrappedTypeResolver {
                    ty: Cow::Owned(Type::List(inner.clone())),
                }),
            },
            "name" | "description" | "fields" | "interfaces" | "possibleTypes" | "enumValues"
            | "inputFields" => ResolvedValue::null(),
            _ => return Err(unknown_field("__Type", info)),
        })
    }
}

/// Source for `__Field` objects.
struct FieldResolver<'a> {
    def: &'a Node<FieldDefinition>,
}

impl ObjectSource for FieldResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__Field")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(match info.field_name() {
            "name" => ResolvedValue::leaf(self.def.name.as_str()),
            "description" => ResolvedValue::leaf(self.def.description.as_deref()),
            "args" => ResolvedValue::list(
                self.def
                    .arguments
                    .iter()
                    .map(|def| ResolvedValue::object(InputValueResolver { def })),
            ),
            "type" => ty(info, &self.def.ty),
            "isDeprecated" => ResolvedValue::leaf(self.def.deprecation_reason.is_some()),
            "deprecationReason" => ResolvedValue::leaf(self.def.deprecation_reason.as_deref()),
            _ => return Err(unknown_field("__Field", info)),
        })
    }
}

/// Source for `__EnumValue` objects.
struct EnumValueResolver<'a> {
    name: &'a Name,
    def: &'a EnumValueDefinition,
}

impl ObjectSource for EnumValueResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__EnumValue")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(match info.field_name() {
            "name" => ResolvedValue::leaf(self.name.as_str()),
            "description" => ResolvedValue::leaf(self.def.description.as_deref()),
            "isDeprecated" => ResolvedValue::leaf(self.def.deprecation_reason.is_some()),
            "deprecationReason" => ResolvedValue::leaf(self.def.deprecation_reason.as_deref()),
            _ => return Err(unknown_field("__EnumValue", info)),
        })
    }
}

/// Source for `__InputValue` objects.
struct InputValueResolver<'a> {
    def: &'a Node<InputValueDefinition>,
}

impl ObjectSource for InputValueResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__InputValue")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(match info.field_name() {
            "name" => ResolvedValue::leaf(self.def.name.as_str()),
            "description" => ResolvedValue::leaf(self.def.description.as_deref()),
            "type" => ty(info, &self.def.ty),
            "defaultValue" => ResolvedValue::leaf(
                self.def
                    .default_value
                    .as_ref()
                    .map(|value| value.to_string()),
            ),
            _ => return Err(unknown_field("__InputValue", info)),
        })
    }
}

/// Source for `__Directive` objects.
struct DirectiveResolver<'a> {
    def: &'a Node<DirectiveDefinition>,
}

impl ObjectSource for DirectiveResolver<'_> {
    fn type_name(&self) -> Option<&str> {
        Some("__Directive")
    }

    fn field(&self, _name: &str) -> Option<ResolvedValue<'_>> {
        None
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, ResolverError> {
        Ok(match info.field_name() {
            "name" => ResolvedValue::leaf(self.def.name.as_str()),
            "description" => ResolvedValue::leaf(self.def.description.as_deref()),
            "locations" => ResolvedValue::list(
                self.def
                    .locations
                    .iter()
                    .map(|location| ResolvedValue::leaf(location.name())),
            ),
            "args" => ResolvedValue::list(
                self.def
                    .arguments
                    .iter()
                    .map(|def| ResolvedValue::object(InputValueResolver { def })),
            ),
            "isRepeatable" => ResolvedValue::leaf(self.def.repeatable),
            _ => return Err(unknown_field("__Directive", info)),
        })
    }
}
