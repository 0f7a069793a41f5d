use quote::format_ident;
use syn::{Type, parse_quote};

use crate::{
    analyse::ContainerModel,
    context::ExpansionContext,
    fragment::{Fragment, Member},
};

pub fn lower(model: ContainerModel, ctx: &mut ExpansionContext) -> Vec<Fragment> {
    let ContainerModel {
        target,
        vis,
        declares_sendable,
    } = model;

    let container = format_ident!("{}Container", target);
    let result: Type = parse_quote!(::core::result::Result);
    let error: Type = parse_quote!(::reducer_kit::cache::CacheError);

    // Names bound inside `live`, kept clear of anything the model might be called.
    let cell = ctx.unique_ident("cell");
    let get_cell = ctx.unique_ident("cell");
    let save_cell = ctx.unique_ident("cell");
    let delete_cell = ctx.unique_ident("cell");

    let mut fragments = vec![
        Fragment::Member(Member::Item(parse_quote! {
            /// Storage operations for a single cached value.
            #[derive(Clone)]
            #vis struct #container {
                #vis get: ::std::sync::Arc<dyn ::core::ops::Fn() -> #result<#target, #error> + ::core::marker::Send + ::core::marker::Sync>,
                #vis save: ::std::sync::Arc<dyn ::core::ops::Fn(#target) -> #result<(), #error> + ::core::marker::Send + ::core::marker::Sync>,
                #vis delete: ::std::sync::Arc<dyn ::core::ops::Fn() -> #result<(), #error> + ::core::marker::Send + ::core::marker::Sync>,
            }
        })),
        Fragment::Member(Member::Item(parse_quote! {
            impl #container {
                #vis fn new(
                    get: impl ::core::ops::Fn() -> #result<#target, #error> + ::core::marker::Send + ::core::marker::Sync + 'static,
                    save: impl ::core::ops::Fn(#target) -> #result<(), #error> + ::core::marker::Send + ::core::marker::Sync + 'static,
                    delete: impl ::core::ops::Fn() -> #result<(), #error> + ::core::marker::Send + ::core::marker::Sync + 'static,
                ) -> Self {
                    Self {
                        get: ::std::sync::Arc::new(get),
                        save: ::std::sync::Arc::new(save),
                        delete: ::std::sync::Arc::new(delete),
                    }
                }

                /// Container backed by one shared in-memory cell. Every operation holds the cell's
                /// lock only while reading or writing it.
                #vis fn live() -> Self {
                    let #cell = ::std::sync::Arc::new(
                        ::reducer_kit::cache::LockIsolated::new(::core::option::Option::<#target>::None),
                    );
                    let #get_cell = ::std::sync::Arc::clone(&#cell);
                    let #save_cell = ::std::sync::Arc::clone(&#cell);
                    let #delete_cell = #cell;

                    Self::new(
                        move || #get_cell.value().ok_or(::reducer_kit::cache::CacheError::NoDataFound),
                        move |model| {
                            #save_cell.set_value(::core::option::Option::Some(model));
                            ::core::result::Result::Ok(())
                        },
                        move || {
                            #delete_cell.set_value(::core::option::Option::None);
                            ::core::result::Result::Ok(())
                        },
                    )
                }
            }
        })),
        Fragment::Member(Member::Item(parse_quote! {
            /// Stand-in that stores nothing: `get` always fails with `NoDataFound`.
            impl ::core::default::Default for #container {
                fn default() -> Self {
                    Self::new(
                        || ::core::result::Result::Err(::reducer_kit::cache::CacheError::NoDataFound),
                        |_| ::core::result::Result::Ok(()),
                        || ::core::result::Result::Ok(()),
                    )
                }
            }
        })),
        Fragment::Extension(parse_quote! {
            impl ::reducer_kit::cache::CacheContainer for #container {
                type Model = #target;

                fn get(&self) -> #result<#target, #error> {
                    (self.get)()
                }

                fn save(&self, model: #target) -> #result<(), #error> {
                    (self.save)(model)
                }

                fn delete(&self) -> #result<(), #error> {
                    (self.delete)()
                }
            }
        }),
    ];

    if !declares_sendable {
        fragments.push(Fragment::Extension(parse_quote! {
            impl ::reducer_kit::Sendable for #target {}
        }));
    }

    fragments
}
