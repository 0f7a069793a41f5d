use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{DeriveInput, Field, Fields, ImplItem, Item, ItemImpl, ItemStruct};

use crate::{
    diagnostic,
    fragment::{Fragment, Member, Peer},
    parse::OBSERVATION_ATTR,
    registry::Expansion,
};

/// Splice an expansion back into the annotated item.
///
/// If the expansion failed, the item is emitted unchanged beside the errors so that code using
/// it keeps resolving.
pub fn codegen(mut item: Item, expansion: Expansion) -> TokenStream {
    let Expansion {
        kind,
        fragments,
        diagnostics,
    } = expansion;

    if kind.consumes_field_helpers() {
        if let Item::Struct(item_struct) = &mut item {
            strip_field_helpers(item_struct);
        }
    }

    if let Some(error) = diagnostic::into_error(diagnostics) {
        let error = error.into_compile_error();
        return quote!(#item #error);
    }

    match item {
        Item::Struct(item_struct) => splice_struct(item_struct, fragments),
        Item::Impl(item_impl) => splice_impl(item_impl, fragments),
        item => {
            // Validation only lets structs and impl blocks through.
            let trailing = fragments.iter();
            quote!(#item #(#trailing)*)
        }
    }
}

fn splice_struct(mut item_struct: ItemStruct, fragments: Vec<Fragment>) -> TokenStream {
    let mut impl_items = Vec::new();
    let mut trailing = Vec::new();

    for fragment in fragments {
        match fragment {
            Fragment::Peer(peer) => place_peer(&mut item_struct, peer),
            Fragment::Member(Member::Field(field)) => push_field(&mut item_struct, field),
            Fragment::Member(Member::Associated(associated)) => impl_items.push(associated),
            Fragment::Accessor(accessor) => impl_items.extend(
                accessor
                    .blocks
                    .into_iter()
                    .map(|block| ImplItem::Fn(block.item)),
            ),
            Fragment::Member(Member::Item(companion)) => trailing.push(companion.into_token_stream()),
            Fragment::Extension(extension) => trailing.push(extension.into_token_stream()),
        }
    }

    let inherent = (!impl_items.is_empty()).then(|| {
        let ident = &item_struct.ident;
        let (impl_generics, ty_generics, where_clause) = item_struct.generics.split_for_impl();

        quote! {
            impl #impl_generics #ident #ty_generics #where_clause {
                #(#impl_items)*
            }
        }
    });

    quote! {
        #item_struct
        #inherent
        #(#trailing)*
    }
}

fn splice_impl(mut item_impl: ItemImpl, fragments: Vec<Fragment>) -> TokenStream {
    let mut trailing = Vec::new();

    for fragment in fragments {
        match fragment {
            Fragment::Member(Member::Associated(associated)) => item_impl.items.push(associated),
            Fragment::Accessor(accessor) => item_impl.items.extend(
                accessor
                    .blocks
                    .into_iter()
                    .map(|block| ImplItem::Fn(block.item)),
            ),
            // An impl block has no storage.
            Fragment::Peer(_) | Fragment::Member(Member::Field(_)) => {}
            Fragment::Member(Member::Item(companion)) => trailing.push(companion.into_token_stream()),
            Fragment::Extension(extension) => trailing.push(extension.into_token_stream()),
        }
    }

    quote! {
        #item_impl
        #(#trailing)*
    }
}

/// Put `peer` where the field it stands in for was, keeping field order.
fn place_peer(item_struct: &mut ItemStruct, peer: Peer) {
    let Peer { replaces, field } = peer;

    let existing = replaces.and_then(|replaces| {
        item_struct
            .fields
            .iter_mut()
            .find(|existing| existing.ident.as_ref() == Some(&replaces))
    });

    match existing {
        Some(existing) => *existing = field,
        None => push_field(item_struct, field),
    }
}

fn push_field(item_struct: &mut ItemStruct, field: Field) {
    if let Fields::Named(fields) = &mut item_struct.fields {
        fields.named.push(field);
    }
}

fn strip_field_helpers(item_struct: &mut ItemStruct) {
    for field in item_struct.fields.iter_mut() {
        field
            .attrs
            .retain(|attr| !attr.path().is_ident(OBSERVATION_ATTR));
    }
}

/// `#[derive(Sendable)]`: the concurrency-safe capability, checked by the trait's supertraits.
pub fn derive_sendable(input: DeriveInput) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::reducer_kit::Sendable for #ident #ty_generics #where_clause {}
    }
}
