use syn::{Field, Ident, parse_quote};

use crate::{
    analyse::{ObservableModel, ObservedProperty, PropertyRole},
    fragment::{Fragment, Member, Peer},
    lower::{shadow_ident, tracked_accessors},
    parse::OBSERVATION_ATTR,
};

pub fn lower(model: ObservableModel) -> Vec<Fragment> {
    // Tuple and unit structs have no property that an accessor could stand in for.
    if !model.named {
        return Vec::new();
    }

    let registrar = model.registrar_ident();
    let mut fragments = Vec::new();

    for property in &model.properties {
        if property.role != PropertyRole::Observed {
            continue;
        }

        let shadow = shadow_ident(&property.ident);

        fragments.push(Fragment::Peer(Peer {
            replaces: Some(property.ident.clone()),
            field: shadow_field(property, &shadow),
        }));
        fragments.push(Fragment::Accessor(tracked_accessors(
            &property.ident,
            &property.ty,
            &property.vis,
            &shadow,
            &registrar,
        )));
    }

    if !model.declares_registrar() {
        fragments.push(Fragment::Member(Member::Field(parse_quote! {
            #registrar: ::reducer_kit::observation::ObservationRegistrar
        })));
    }

    fragments.push(Fragment::Member(Member::Associated(constructor(
        &model, &registrar,
    ))));

    let vis = &model.vis;
    fragments.push(Fragment::Member(Member::Associated(parse_quote! {
        /// Registrar receiving this value's reads and writes.
        #vis fn observation_registrar(&self) -> &::reducer_kit::observation::ObservationRegistrar {
            &self.#registrar
        }
    })));

    fragments
}

/// Private storage for `property`. Accessor methods take over its name and visibility.
fn shadow_field(property: &ObservedProperty, shadow: &Ident) -> Field {
    let ty = &property.ty;
    let attrs = property
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident(OBSERVATION_ATTR));

    parse_quote! {
        #(#attrs)*
        #shadow: #ty
    }
}

/// Memberwise `new`, taking every field without a declared default in declaration order. Shadow
/// storage is written directly, so construction never notifies observers.
fn constructor(model: &ObservableModel, registrar: &Ident) -> syn::ImplItem {
    let vis = &model.vis;

    let mut params = Vec::new();
    let mut inits = Vec::new();

    for property in &model.properties {
        let ident = &property.ident;
        let ty = &property.ty;

        let storage = match property.role {
            PropertyRole::Registrar => continue,
            PropertyRole::Observed => shadow_ident(ident),
            PropertyRole::Ignored => ident.clone(),
        };

        match &property.default {
            Some(default) => inits.push(quote::quote!(#storage: #default)),
            None => {
                params.push(quote::quote!(#ident: #ty));
                inits.push(quote::quote!(#storage: #ident));
            }
        }
    }

    parse_quote! {
        #[allow(clippy::too_many_arguments)]
        #vis fn new(#(#params),*) -> Self {
            Self {
                #(#inits,)*
                #registrar: ::core::default::Default::default(),
            }
        }
    }
}
