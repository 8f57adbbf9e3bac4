use crate::ast;
use crate::ast::Document;
use crate::name::Name;
use crate::node::Node;
use crate::sources::FileId;
use crate::sources::SourceMap;
use crate::sources::SourceSpan;
use apollo_parser::cst;
use apollo_parser::cst::CstNode;
use apollo_parser::SyntaxNode;
use apollo_parser::S;

impl Document {
    pub(crate) fn from_cst(document: cst::Document, file_id: FileId, sources: SourceMap) -> Self {
        Self {
            sources,
            definitions: document
                .definitions()
                .filter_map(|def| def.convert(file_id))
                .collect(),
        }
    }
}

/// Similar to `TryFrom`, but with an `Option` return type because the CST uses Option a lot.
trait Convert {
    type Target;
    fn convert(&self, file_id: FileId) -> Option<Self::Target>;
}

fn with_location<T>(file_id: FileId, syntax_node: &SyntaxNode, node: T) -> Node<T> {
    Node::new_parsed(node, SourceSpan::new(file_id, syntax_node))
}

/// Convert and collect, silently skipping entries with conversion errors
/// as they have corresponding parse errors in `SyntaxTree::errors`
#[inline]
fn collect<CstType, AstType>(
    file_id: FileId,
    iter: impl IntoIterator<Item = CstType>,
) -> Vec<Node<AstType>>
where
    CstType: CstNode + Convert<Target = AstType>,
{
    iter.into_iter()
        .filter_map(|value| {
            Some(with_location(
                file_id,
                value.syntax(),
                value.convert(file_id)?,
            ))
        })
        .collect()
}

#[inline]
fn collect_opt<CstType1, CstType2, AstType, F, I>(
    file_id: FileId,
    opt: Option<CstType1>,
    convert: F,
) -> Vec<Node<AstType>>
where
    F: FnOnce(CstType1) -> I,
    I: IntoIterator<Item = CstType2>,
    CstType2: CstNode + Convert<Target = AstType>,
{
    if let Some(cst) = opt {
        collect(file_id, convert(cst))
    } else {
        Vec::new()
    }
}

fn directives(file_id: FileId, opt: Option<cst::Directives>) -> ast::DirectiveList {
    ast::DirectiveList(collect_opt(file_id, opt, |x| x.directives()))
}

impl<T: Convert> Convert for Option<T> {
    type Target = Option<T::Target>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(if let Some(inner) = self {
            Some(inner.convert(file_id)?)
        } else {
            None
        })
    }
}

impl Convert for cst::Definition {
    type Target = ast::Definition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Definition as A;
        use cst::Definition as C;

        // Only executable definitions get a full conversion. Type-system
        // definitions keep just enough for execution to reject them.
        macro_rules! type_system {
            ($def: ident, $describe: literal) => {
                A::TypeSystemDefinition(with_location(
                    file_id,
                    $def.syntax(),
                    ast::TypeSystemDefinition {
                        describe: $describe,
                    },
                ))
            };
        }
        Some(match self {
            C::OperationDefinition(def) => {
                A::OperationDefinition(with_location(file_id, def.syntax(), def.convert(file_id)?))
            }
            C::FragmentDefinition(def) => {
                A::FragmentDefinition(with_location(file_id, def.syntax(), def.convert(file_id)?))
            }
            C::DirectiveDefinition(def) => type_system!(def, "a directive definition"),
            C::SchemaDefinition(def) => type_system!(def, "a schema definition"),
            C::ScalarTypeDefinition(def) => type_system!(def, "a scalar type definition"),
            C::ObjectTypeDefinition(def) => type_system!(def, "an object type definition"),
            C::InterfaceTypeDefinition(def) => type_system!(def, "an interface type definition"),
            C::UnionTypeDefinition(def) => type_system!(def, "a union type definition"),
            C::EnumTypeDefinition(def) => type_system!(def, "an enum type definition"),
            C::InputObjectTypeDefinition(def) => {
                type_system!(def, "an input object type definition")
            }
            C::SchemaExtension(def) => type_system!(def, "a schema extension"),
            C::ScalarTypeExtension(def) => type_system!(def, "a scalar type extension"),
            C::ObjectTypeExtension(def) => type_system!(def, "an object type extension"),
            C::InterfaceTypeExtension(def) => type_system!(def, "an interface type extension"),
            C::UnionTypeExtension(def) => type_system!(def, "a union type extension"),
            C::EnumTypeExtension(def) => type_system!(def, "an enum type extension"),
            C::InputObjectTypeExtension(def) => {
                type_system!(def, "an input object type extension")
            }
        })
    }
}

impl Convert for cst::OperationDefinition {
    type Target = ast::OperationDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let operation_type = if let Some(ty) = self.operation_type() {
            ty.convert(file_id)?
        } else {
            ast::OperationType::Query
        };
        Some(Self::Target {
            operation_type,
            name: self.name().convert(file_id)?,
            variables: collect_opt(file_id, self.variable_definitions(), |x| {
                x.variable_definitions()
            }),
            directives: directives(file_id, self.directives()),
            selection_set: self
                .selection_set()?
                .selections()
                .filter_map(|sel| sel.convert(file_id))
                .collect(),
        })
    }
}

impl Convert for cst::FragmentDefinition {
    type Target = ast::FragmentDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.fragment_name()?.name()?.convert(file_id)?,
            type_condition: self.type_condition()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            selection_set: self.selection_set().convert(file_id)??,
        })
    }
}

impl Convert for cst::TypeCondition {
    type Target = ast::NamedType;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        self.named_type()?.name()?.convert(file_id)
    }
}

impl Convert for cst::Directive {
    type Target = ast::Directive;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            arguments: collect_opt(file_id, self.arguments(), |x| x.arguments()),
        })
    }
}

impl Convert for cst::OperationType {
    type Target = ast::OperationType;

    fn convert(&self, _file_id: FileId) -> Option<Self::Target> {
        let token = self.syntax().first_token()?;
        match token.kind() {
            S![query] => Some(ast::OperationType::Query),
            S![mutation] => Some(ast::OperationType::Mutation),
            S![subscription] => Some(ast::OperationType::Subscription),
            _ => None,
        }
    }
}

impl Convert for cst::VariableDefinition {
    type Target = ast::VariableDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let default_value = if let Some(default) = self.default_value() {
            let value = default.value()?;
            Some(with_location(
                file_id,
                value.syntax(),
                value.convert(file_id)?,
            ))
        } else {
            None
        };
        let ty = &self.ty()?;
        Some(Self::Target {
            name: self.variable()?.name()?.convert(file_id)?,
            ty: with_location(file_id, ty.syntax(), ty.convert(file_id)?),
            default_value,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::Type {
    type Target = ast::Type;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Type as A;
        use cst::Type as C;
        match self {
            C::NamedType(name) => Some(A::Named(name.name()?.convert(file_id)?)),
            C::ListType(inner) => Some(A::List(Box::new(inner.ty()?.convert(file_id)?))),
            C::NonNullType(inner) => {
                if let Some(named) = inner.named_type() {
                    Some(A::NonNullNamed(named.name()?.convert(file_id)?))
                } else if let Some(list) = inner.list_type() {
                    Some(A::NonNullList(Box::new(list.ty()?.convert(file_id)?)))
                } else {
                    None
                }
            }
        }
    }
}

impl Convert for cst::Argument {
    type Target = ast::Argument;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let name = self.name()?.convert(file_id)?;
        let value = self.value()?;
        let value = with_location(file_id, value.syntax(), value.convert(file_id)?);
        Some(ast::Argument { name, value })
    }
}

impl Convert for cst::SelectionSet {
    type Target = Vec<ast::Selection>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(
            self.selections()
                .filter_map(|selection| selection.convert(file_id))
                .collect(),
        )
    }
}

impl Convert for cst::Selection {
    type Target = ast::Selection;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Selection as A;
        use cst::Selection as C;

        Some(match self {
            C::Field(x) => A::Field(with_location(file_id, x.syntax(), x.convert(file_id)?)),
            C::FragmentSpread(x) => {
                A::FragmentSpread(with_location(file_id, x.syntax(), x.convert(file_id)?))
            }
            C::InlineFragment(x) => {
                A::InlineFragment(with_location(file_id, x.syntax(), x.convert(file_id)?))
            }
        })
    }
}

impl Convert for cst::Field {
    type Target = ast::Field;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            alias: self.alias().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            arguments: collect_opt(file_id, self.arguments(), |x| x.arguments()),
            directives: directives(file_id, self.directives()),
            // Use an empty Vec for a field without sub-selections
            selection_set: self.selection_set().convert(file_id)?.unwrap_or_default(),
        })
    }
}

impl Convert for cst::FragmentSpread {
    type Target = ast::FragmentSpread;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            fragment_name: self.fragment_name()?.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::InlineFragment {
    type Target = ast::InlineFragment;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            type_condition: self.type_condition().convert(file_id)?,
            directives: directives(file_id, self.directives()),
            selection_set: self.selection_set().convert(file_id)??,
        })
    }
}

impl Convert for cst::Value {
    type Target = ast::Value;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Value as A;
        use cst::Value as C;

        Some(match self {
            C::Variable(v) => A::Variable(v.name()?.convert(file_id)?),
            C::StringValue(v) => A::String(String::from(v)),
            C::FloatValue(v) => {
                A::Float(ast::FloatValue::new_parsed(v.syntax().first_token()?.text()))
            }
            C::IntValue(v) => A::Int(ast::IntValue::new_parsed(v.syntax().first_token()?.text())),
            C::BooleanValue(v) => A::Boolean(bool::try_from(v).ok()?),
            C::NullValue(_) => A::Null,
            C::EnumValue(v) => A::Enum(v.name()?.convert(file_id)?),
            C::ListValue(v) => A::List(collect(file_id, v.values())),
            C::ObjectValue(v) => A::Object(
                v.object_fields()
                    .filter_map(|x| x.convert(file_id))
                    .collect(),
            ),
        })
    }
}

impl Convert for cst::ObjectField {
    type Target = (Name, Node<ast::Value>);

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let name = self.name()?.convert(file_id)?;
        let value = self.value()?;
        let value = with_location(file_id, value.syntax(), value.convert(file_id)?);
        Some((name, value))
    }
}

impl Convert for cst::Alias {
    type Target = Name;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        self.name()?.convert(file_id)
    }
}

impl Convert for cst::Name {
    type Target = Name;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Name::new_parsed(self.text().as_str(), SourceSpan::new(file_id, self.syntax())).ok()
    }
}
