//! Read-only queries over the item an attribute macro was attached to.

use proc_macro2::Span;
use syn::{
    Attribute, Error, Expr, Field, Fields, FnArg, Generics, Ident, ImplItem, Item, ItemImpl,
    ItemStruct, Meta, Path, Token, Type, Visibility, punctuated::Punctuated, spanned::Spanned,
};

/// Name of the field helper attribute understood by `#[observable]`.
pub const OBSERVATION_ATTR: &str = "observation";

/// Type name of the observation registrar a struct stores.
pub const REGISTRAR_TYPE: &str = "ObservationRegistrar";

/// Borrowed view over the annotated item. Never outlives a single expansion.
#[derive(Clone, Copy)]
pub enum Declaration<'a> {
    /// A struct definition.
    Struct(&'a ItemStruct),
    /// An `impl` block, inherent or for a trait.
    Impl(&'a ItemImpl),
    /// Anything else, which no macro accepts.
    Other(&'a Item),
}

impl<'a> Declaration<'a> {
    pub fn from_item(item: &'a Item) -> Self {
        match item {
            Item::Struct(item_struct) => Declaration::Struct(item_struct),
            Item::Impl(item_impl) => Declaration::Impl(item_impl),
            item => Declaration::Other(item),
        }
    }

    /// Human readable kind of the declaration, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Struct(_) => "struct",
            Declaration::Impl(_) => "impl block",
            Declaration::Other(Item::Enum(_)) => "enum",
            Declaration::Other(Item::Fn(_)) => "function",
            Declaration::Other(Item::Trait(_)) => "trait",
            Declaration::Other(Item::Union(_)) => "union",
            Declaration::Other(Item::Mod(_)) => "module",
            Declaration::Other(_) => "item",
        }
    }

    /// Name of the declared type. For `impl` blocks this is the last segment of the self type.
    pub fn ident(&self) -> Option<&'a Ident> {
        match self {
            Declaration::Struct(item_struct) => Some(&item_struct.ident),
            Declaration::Impl(item_impl) => match item_impl.self_ty.as_ref() {
                Type::Path(type_path) => type_path.path.segments.last().map(|seg| &seg.ident),
                _ => None,
            },
            Declaration::Other(_) => None,
        }
    }

    /// Span that diagnostics about this declaration should point at.
    pub fn span(&self) -> Span {
        match self {
            Declaration::Struct(item_struct) => item_struct.ident.span(),
            Declaration::Impl(item_impl) => item_impl.self_ty.span(),
            Declaration::Other(item) => item.span(),
        }
    }

    pub fn attrs(&self) -> &'a [Attribute] {
        match self {
            Declaration::Struct(item_struct) => &item_struct.attrs,
            Declaration::Impl(item_impl) => &item_impl.attrs,
            Declaration::Other(_) => &[],
        }
    }

    pub fn generics(&self) -> Option<&'a Generics> {
        match self {
            Declaration::Struct(item_struct) => Some(&item_struct.generics),
            Declaration::Impl(item_impl) => Some(&item_impl.generics),
            Declaration::Other(_) => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        self.generics()
            .is_some_and(|generics| !generics.params.is_empty())
    }

    /// Capabilities declared in the header, in order and without duplicates.
    ///
    /// For a struct these are the paths listed in its `#[derive(..)]` attributes. For an `impl`
    /// block it is the implemented trait. Names are compared by their last path segment.
    pub fn conformances(&self) -> Vec<String> {
        let paths = match self {
            Declaration::Struct(item_struct) => derived_paths(&item_struct.attrs),
            Declaration::Impl(item_impl) => item_impl
                .trait_
                .iter()
                .map(|(_, path, _)| path.clone())
                .collect(),
            Declaration::Other(_) => Vec::new(),
        };

        paths
            .iter()
            .filter_map(last_segment)
            .fold(Vec::new(), |mut names, name| {
                if !names.contains(&name) {
                    names.push(name);
                }
                names
            })
    }

    pub fn conforms_to(&self, name: &str) -> bool {
        self.conformances().iter().any(|conformance| conformance == name)
    }

    /// Whether the declaration is explicitly `pub`. Restricted visibility such as `pub(crate)`
    /// is not public.
    pub fn is_public(&self) -> bool {
        matches!(self.visibility(), Visibility::Public(_))
    }

    /// Visibility of the declaration. `impl` blocks never carry one.
    pub fn visibility(&self) -> Visibility {
        match self {
            Declaration::Struct(item_struct) => item_struct.vis.clone(),
            Declaration::Impl(_) | Declaration::Other(_) => Visibility::Inherited,
        }
    }

    /// Whether an attribute with the given name (last path segment) is attached.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs()
            .iter()
            .any(|attr| last_segment(attr.path()).is_some_and(|ident| ident == name))
    }

    pub fn members(&self) -> Vec<MemberDescriptor<'a>> {
        match self {
            Declaration::Struct(item_struct) => item_struct
                .fields
                .iter()
                .map(MemberDescriptor::Field)
                .collect(),
            Declaration::Impl(item_impl) => item_impl
                .items
                .iter()
                .filter_map(|item| match item {
                    ImplItem::Fn(item_fn) => Some(MemberDescriptor::Function(FunctionDescriptor {
                        ident: &item_fn.sig.ident,
                        has_receiver: item_fn.sig.receiver().is_some(),
                        params: item_fn
                            .sig
                            .inputs
                            .iter()
                            .filter_map(|input| match input {
                                FnArg::Typed(pat_type) => Some(pat_type.ty.as_ref()),
                                FnArg::Receiver(_) => None,
                            })
                            .collect(),
                    })),
                    ImplItem::Type(item_type) => {
                        Some(MemberDescriptor::AssociatedType(&item_type.ident))
                    }
                    ImplItem::Const(item_const) => {
                        Some(MemberDescriptor::AssociatedConst(&item_const.ident))
                    }
                    _ => None,
                })
                .collect(),
            Declaration::Other(_) => Vec::new(),
        }
    }

    /// First function named `name` taking exactly `arity` typed parameters (the receiver is not
    /// counted).
    pub fn find_function(&self, name: &str, arity: usize) -> Option<FunctionDescriptor<'a>> {
        self.members().into_iter().find_map(|member| match member {
            MemberDescriptor::Function(function)
                if function.ident == name && function.params.len() == arity =>
            {
                Some(function)
            }
            _ => None,
        })
    }

    /// Whether the struct has named fields. `false` for tuple and unit structs.
    pub fn has_named_fields(&self) -> bool {
        matches!(
            self,
            Declaration::Struct(ItemStruct {
                fields: Fields::Named(_),
                ..
            })
        )
    }
}

/// A single member of a declaration.
#[derive(Clone)]
pub enum MemberDescriptor<'a> {
    Field(&'a Field),
    Function(FunctionDescriptor<'a>),
    AssociatedType(&'a Ident),
    AssociatedConst(&'a Ident),
}

impl<'a> MemberDescriptor<'a> {
    /// Name the member is declared under. `None` for unnamed (tuple) fields.
    pub fn ident(&self) -> Option<&'a Ident> {
        match self {
            MemberDescriptor::Field(field) => field.ident.as_ref(),
            MemberDescriptor::Function(function) => Some(function.ident),
            MemberDescriptor::AssociatedType(ident) | MemberDescriptor::AssociatedConst(ident) => {
                Some(ident)
            }
        }
    }
}

#[derive(Clone)]
pub struct FunctionDescriptor<'a> {
    pub ident: &'a Ident,
    pub has_receiver: bool,
    /// Types of the typed parameters, in order.
    pub params: Vec<&'a Type>,
}

/// Derived view of a named struct field.
#[derive(Clone)]
pub struct PropertyDescriptor<'a> {
    pub field: &'a Field,
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub vis: &'a Visibility,
    /// Initial value from `#[observation(default = ..)]`.
    pub default: Option<Expr>,
    /// Marked `#[observation(ignored)]`.
    pub ignored: bool,
    /// Names of every attribute attached to the field.
    pub annotations: Vec<String>,
}

impl PropertyDescriptor<'_> {
    /// Whether this field is the observation registrar itself.
    pub fn is_registrar(&self) -> bool {
        type_name(self.ty).is_some_and(|name| name == REGISTRAR_TYPE)
    }

    /// Whether an attribute with the given name (last path segment) is attached to the field.
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|annotation| annotation == name)
    }

    /// Fields that `#[observable]` wraps with tracked accessors.
    pub fn is_eligible_for_observation(&self) -> bool {
        !self.ignored && !self.is_registrar()
    }
}

/// Build a [`PropertyDescriptor`] for `field`. Returns `None` for unnamed (tuple) fields, and an
/// error if the `#[observation(..)]` helper attribute is malformed.
pub fn property_descriptor(field: &Field) -> Result<Option<PropertyDescriptor<'_>>, Error> {
    let Some(ident) = field.ident.as_ref() else {
        return Ok(None);
    };

    let mut default = None;
    let mut ignored = false;

    for attr in &field.attrs {
        if !attr.path().is_ident(OBSERVATION_ATTR) {
            continue;
        }

        let Meta::List(_) = &attr.meta else {
            return Err(Error::new_spanned(
                attr,
                "attribute must be in list format (eg `#[observation(ignored)]`)",
            ));
        };

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignored") {
                ignored = true;
                return Ok(());
            }

            if meta.path.is_ident("default") {
                default = Some(meta.value()?.parse()?);
                return Ok(());
            }

            Err(Error::new_spanned(
                meta.path,
                "unknown observation argument, expected `ignored` or `default = ..`",
            ))
        })?;
    }

    Ok(Some(PropertyDescriptor {
        field,
        ident,
        ty: &field.ty,
        vis: &field.vis,
        default,
        ignored,
        annotations: field
            .attrs
            .iter()
            .filter_map(|attr| last_segment(attr.path()))
            .collect(),
    }))
}

/// Last path segment of a type, looking through references.
pub fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => last_segment(&type_path.path),
        Type::Reference(reference) => type_name(&reference.elem),
        Type::Paren(paren) => type_name(&paren.elem),
        _ => None,
    }
}

fn last_segment(path: &Path) -> Option<String> {
    path.segments.last().map(|segment| segment.ident.to_string())
}

/// Every path listed across the `#[derive(..)]` attributes. Malformed derives are left for the
/// compiler to report.
fn derived_paths(attrs: &[Attribute]) -> Vec<Path> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .collect()
}
