//! Assembling and checking a [`Schema`] from programmatic type definitions.

use crate::execution::introspection;
use crate::name;
use crate::name::Name;
use crate::name::NamedType;
use crate::node::Node;
use crate::schema::BUILT_IN_SCALARS;
use crate::schema::DirectiveDefinition;
use crate::schema::FieldDefinition;
use crate::schema::ObjectType;
use crate::schema::ScalarType;
use crate::schema::Schema;
use crate::schema::Type;
use crate::schema::TypeDef;
use crate::Valid;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// Assembles type definitions into a checked [`Valid<Schema>`].
///
/// Only the `query` root is mandatory. Types reachable from the roots are
/// registered automatically; unions and interfaces whose members or
/// implementers are not otherwise reachable need those types registered
/// explicitly with [`type_`][Self::type_].
///
/// ```rust
/// use tamarack::name;
/// use tamarack::schema::{FieldDefinition, ObjectType, SchemaBuilder, Type};
///
/// let schema = SchemaBuilder::new()
///     .query(ObjectType::new(
///         name!("Query"),
///         [FieldDefinition::new(name!("hello"), Type::named(name!("String")))],
///     ))
///     .build()
///     .unwrap();
/// assert!(schema.get_object("Query").is_some());
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    description: Option<String>,
    query_type: Option<Node<ObjectType>>,
    mutation_type: Option<Node<ObjectType>>,
    subscription_type: Option<Node<ObjectType>>,
    types: Vec<TypeDef>,
    directives: Vec<Node<DirectiveDefinition>>,
}

/// Error from [`SchemaBuilder::build`]: the definitions do not form a
/// coherent type system.
#[derive(thiserror::Error, Debug, Clone)]
pub enum SchemaError {
    #[error("schema does not define a query root type")]
    NoQueryRoot,
    #[error("the type `{name}` is defined multiple times in the schema")]
    TypeCollision { name: NamedType },
    #[error("built-in type `{name}` must not be redefined")]
    BuiltInRedefinition { name: NamedType },
    #[error("`{name}`: type names starting with `__` are reserved for introspection")]
    ReservedName { name: NamedType },
    #[error("the directive `@{name}` is defined multiple times in the schema")]
    DirectiveCollision { name: Name },
    #[error("type `{name}`, referenced by {referrer}, is not defined in the schema")]
    UndefinedType { name: NamedType, referrer: String },
    #[error("`{ty}` is not an output type, but it is the type of {coordinate}")]
    NonOutputFieldType { ty: NamedType, coordinate: String },
    #[error("`{ty}` is not an input type, but it is the type of {coordinate}")]
    NonInputValueType { ty: NamedType, coordinate: String },
    #[error("union `{union_name}` has member `{member}` which is not an object type")]
    NonObjectUnionMember { union_name: NamedType, member: NamedType },
    #[error("type `{implementer}` implements `{name}` which is not an interface type")]
    NonInterfaceImplemented { implementer: NamedType, name: NamedType },
    #[error(
        "scalar `{name}` defines only one of `parse_value` and `parse_literal`, \
         they must be provided together"
    )]
    IncompleteScalarParsing { name: NamedType },
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        assert!(
            self.description.is_none(),
            "`description` already provided"
        );
        self.description = Some(description.into());
        self
    }

    /// Sets the object type serving `query` operations. Mandatory.
    pub fn query(mut self, query: impl Into<Node<ObjectType>>) -> Self {
        assert!(self.query_type.is_none(), "`query` root already provided");
        self.query_type = Some(query.into());
        self
    }

    /// Sets the object type serving `mutation` operations.
    pub fn mutation(mut self, mutation: impl Into<Node<ObjectType>>) -> Self {
        assert!(
            self.mutation_type.is_none(),
            "`mutation` root already provided"
        );
        self.mutation_type = Some(mutation.into());
        self
    }

    /// Sets the object type serving `subscription` operations.
    pub fn subscription(mut self, subscription: impl Into<Node<ObjectType>>) -> Self {
        assert!(
            self.subscription_type.is_none(),
            "`subscription` root already provided"
        );
        self.subscription_type = Some(subscription.into());
        self
    }

    /// Registers a type definition explicitly.
    ///
    /// Types reachable from the roots are found on their own; this is for
    /// definitions only referenced by name from an abstract type's
    /// resolution, or not referenced at all.
    pub fn type_(mut self, ty: impl Into<TypeDef>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Registers a directive definition, exposed through introspection.
    pub fn directive(mut self, directive: impl Into<Node<DirectiveDefinition>>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Checks the definitions and assembles the schema.
    ///
    /// Name references are resolved from the roots outward, forcing deferred
    /// field lists along the way. Every reference must name a definition, in
    /// a position (input or output) its kind allows.
    pub fn build(self) -> Result<Valid<Schema>, SchemaError> {
        let Self {
            description,
            query_type,
            mutation_type,
            subscription_type,
            types,
            directives: extra_directives,
        } = self;
        let query_type = query_type.ok_or(SchemaError::NoQueryRoot)?;

        let mut directives = IndexMap::new();
        for directive in DirectiveDefinition::built_ins() {
            directives.insert(directive.name.clone(), directive.clone());
        }
        for directive in extra_directives {
            match directives.entry(directive.name.clone()) {
                Entry::Occupied(entry) => {
                    if !entry.get().ptr_eq(&directive) {
                        return Err(SchemaError::DirectiveCollision {
                            name: directive.name.clone(),
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(directive);
                }
            }
        }

        let explicit_names: Vec<NamedType> = types.iter().map(|def| def.name().clone()).collect();

        // Everything a name reference may resolve to. Reachability decides
        // which of these end up registered in the schema.
        let mut pool = IndexMap::new();
        let roots = [
            Some(&query_type),
            mutation_type.as_ref(),
            subscription_type.as_ref(),
        ];
        for root in roots.into_iter().flatten() {
            add_to_pool(&mut pool, TypeDef::Object(root.clone()))?;
        }
        for def in types {
            add_to_pool(&mut pool, def)?;
        }
        for scalar in ScalarType::built_ins() {
            pool.insert(scalar.name.clone(), TypeDef::Scalar(scalar.clone()));
        }
        for def in introspection::meta_types() {
            pool.insert(def.name().clone(), def.clone());
        }

        let mut walker = Walker {
            pool,
            registry: IndexMap::new(),
            queue: VecDeque::new(),
        };

        walker.reach(&query_type.name, || "the schema definition".into())?;
        for root in [&mutation_type, &subscription_type].into_iter().flatten() {
            walker.reach(&root.name, || "the schema definition".into())?;
        }
        for name in &explicit_names {
            walker.reach(name, || "the schema definition".into())?;
        }
        walker.reach(&name!("__Schema"), || "introspection".into())?;
        for directive in directives.values() {
            for argument in &directive.arguments {
                let directive_name = &directive.name;
                let argument_name = &argument.name;
                walker.reach_input(&argument.ty, || {
                    format!("`@{directive_name}({argument_name}:)`")
                })?;
            }
        }

        while let Some(name) = walker.queue.pop_front() {
            // Cheap clone of the definition node, so the walk can register
            // further types without holding a borrow of the registry
            let def = walker.registry[name.as_str()].clone();
            match &def {
                TypeDef::Scalar(def) => {
                    if def.parse_value.is_some() != def.parse_literal.is_some() {
                        return Err(SchemaError::IncompleteScalarParsing {
                            name: def.name.clone(),
                        });
                    }
                }
                TypeDef::Object(def) => {
                    for interface in &def.implements_interfaces {
                        let implementer = &def.name;
                        let resolved =
                            walker.reach(interface, || format!("`{implementer}`"))?;
                        if !matches!(resolved, TypeDef::Interface(_)) {
                            return Err(SchemaError::NonInterfaceImplemented {
                                implementer: def.name.clone(),
                                name: interface.clone(),
                            });
                        }
                    }
                    walker.walk_fields(&def.name, def.fields())?;
                }
                TypeDef::Interface(def) => {
                    walker.walk_fields(&def.name, def.fields())?;
                }
                TypeDef::Union(def) => {
                    for member in &def.members {
                        let union_name = &def.name;
                        let resolved =
                            walker.reach(member, || format!("union `{union_name}`"))?;
                        if !matches!(resolved, TypeDef::Object(_)) {
                            return Err(SchemaError::NonObjectUnionMember {
                                union_name: def.name.clone(),
                                member: member.clone(),
                            });
                        }
                    }
                }
                TypeDef::Enum(_) => {}
                TypeDef::InputObject(def) => {
                    for field in def.fields().values() {
                        let parent = &def.name;
                        let field_name = &field.name;
                        walker
                            .reach_input(&field.ty, || format!("`{parent}.{field_name}`"))?;
                    }
                }
            }
        }

        let schema = Schema {
            description,
            query_type: query_type.name.clone(),
            mutation_type: mutation_type.map(|root| root.name.clone()),
            subscription_type: subscription_type.map(|root| root.name.clone()),
            types: walker.registry,
            directives,
            implementers: OnceLock::new(),
        };
        tracing::debug!(
            types = schema.types.len(),
            query = schema.query_type.as_str(),
            "schema built"
        );
        Ok(Valid::assume_valid(schema))
    }
}

fn add_to_pool(
    pool: &mut IndexMap<NamedType, TypeDef>,
    def: TypeDef,
) -> Result<(), SchemaError> {
    let name = def.name().clone();
    if BUILT_IN_SCALARS.contains(&name.as_str()) {
        return Err(SchemaError::BuiltInRedefinition { name });
    }
    if name.starts_with("__") {
        return Err(SchemaError::ReservedName { name });
    }
    match pool.entry(name) {
        Entry::Occupied(entry) => {
            // Registering the same definition node twice is a no-op,
            // two distinct definitions with one name is an error
            if !entry.get().same_definition(&def) {
                return Err(SchemaError::TypeCollision {
                    name: entry.key().clone(),
                });
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(def);
        }
    }
    Ok(())
}

struct Walker {
    pool: IndexMap<NamedType, TypeDef>,
    registry: IndexMap<NamedType, TypeDef>,
    queue: VecDeque<NamedType>,
}

impl Walker {
    /// Resolves a name reference, registering the definition and scheduling
    /// it for its own walk when this is the first reach.
    fn reach(
        &mut self,
        name: &Name,
        referrer: impl FnOnce() -> String,
    ) -> Result<&TypeDef, SchemaError> {
        if !self.registry.contains_key(name.as_str()) {
            let Some(def) = self.pool.get(name.as_str()) else {
                return Err(SchemaError::UndefinedType {
                    name: name.clone(),
                    referrer: referrer(),
                });
            };
            let def = def.clone();
            self.registry.insert(name.clone(), def);
            self.queue.push_back(name.clone());
        }
        Ok(&self.registry[name.as_str()])
    }

    /// Resolves the inner named type of an input position: a field argument,
    /// input object field, or directive argument.
    fn reach_input(
        &mut self,
        ty: &Type,
        coordinate: impl Fn() -> String,
    ) -> Result<(), SchemaError> {
        let name = ty.inner_named_type();
        let def = self.reach(name, &coordinate)?;
        if !def.is_input_type() {
            return Err(SchemaError::NonInputValueType {
                ty: name.clone(),
                coordinate: coordinate(),
            });
        }
        Ok(())
    }

    /// Resolves the inner named type of an output position: a field type.
    fn reach_output(
        &mut self,
        ty: &Type,
        coordinate: impl Fn() -> String,
    ) -> Result<(), SchemaError> {
        let name = ty.inner_named_type();
        let def = self.reach(name, &coordinate)?;
        if !def.is_output_type() {
            return Err(SchemaError::NonOutputFieldType {
                ty: name.clone(),
                coordinate: coordinate(),
            });
        }
        Ok(())
    }

    fn walk_fields(
        &mut self,
        parent: &Name,
        fields: &IndexMap<Name, Node<FieldDefinition>>,
    ) -> Result<(), SchemaError> {
        for field in fields.values() {
            let field_name = &field.name;
            self.reach_output(&field.ty, || format!("`{parent}.{field_name}`"))?;
            for argument in &field.arguments {
                let argument_name = &argument.name;
                self.reach_input(&argument.ty, || {
                    format!("`{parent}.{field_name}({argument_name}:)`")
                })?;
            }
        }
        Ok(())
    }
}
