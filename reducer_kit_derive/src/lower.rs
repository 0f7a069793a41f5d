mod container;
mod loadable;
mod logger;
mod mapping;
mod observation;

use quote::format_ident;
use syn::{Ident, LitStr, Type, Visibility, parse_quote};

use crate::{
    analyse::Model,
    context::ExpansionContext,
    fragment::{AccessorBlock, AccessorFragment, AccessorKind, Fragment},
};

/// From the validated [`Model`], generate every fragment of the expansion. Output depends only on
/// the model and the (fresh) context, so expanding the same site twice yields the same tokens.
pub fn lower(model: Model, ctx: &mut ExpansionContext) -> Vec<Fragment> {
    match model {
        Model::Logger(model) => logger::lower(model),
        Model::LoadableState(model) => loadable::lower(model),
        Model::Observable(model) => observation::lower(model),
        Model::Container(model) => container::lower(model, ctx),
        Model::Mapping(model) => mapping::lower(model),
    }
}

/// Name of the private storage standing in for `property`.
pub fn shadow_ident(property: &Ident) -> Ident {
    format_ident!("_{}", property)
}

/// The four tracked accessors of a property stored in `shadow`.
///
/// `init` writes the storage directly, `get` and `set` go through the registrar, and `modify`
/// lends the storage out between a will-set and did-set notification. The did-set notification
/// is sent by a guard, so it also runs if the closure unwinds.
pub fn tracked_accessors(
    property: &Ident,
    ty: &Type,
    vis: &Visibility,
    shadow: &Ident,
    registrar: &Ident,
) -> AccessorFragment {
    let key = LitStr::new(&property.to_string(), property.span());
    let init = format_ident!("with_{}", property);
    let set = format_ident!("set_{}", property);
    let modify = format_ident!("modify_{}", property);

    AccessorFragment {
        property: property.clone(),
        blocks: vec![
            AccessorBlock {
                kind: AccessorKind::Init,
                item: parse_quote! {
                    #vis fn #init(mut self, value: #ty) -> Self {
                        self.#shadow = value;
                        self
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Get,
                item: parse_quote! {
                    #vis fn #property(&self) -> &#ty {
                        self.#registrar.access(#key);
                        &self.#shadow
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Set,
                item: parse_quote! {
                    #vis fn #set(&mut self, value: #ty) {
                        self.#registrar.mutate(
                            #key,
                            &mut self.#shadow,
                            value,
                            ::reducer_kit::observation::is_identity_equal,
                        );
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Modify,
                item: parse_quote! {
                    #vis fn #modify<R>(&mut self, modify: impl ::core::ops::FnOnce(&mut #ty) -> R) -> R {
                        let _guard = self.#registrar.will_modify(#key);
                        modify(&mut self.#shadow)
                    }
                },
            },
        ],
    }
}
