mod analyse;
mod args;
mod codegen;
mod context;
mod diagnostic;
mod fragment;
mod lower;
mod parse;
mod registry;

use proc_macro2::{Span, TokenStream};
use syn::{DeriveInput, Error, Item};

use self::codegen::*;

/// Give a reducer a `REDUCER_LOGGER` that logs every state transition.
///
/// Arguments are spliced into the generated code as written: `subsystem` and `category` must be
/// `&'static str` constants, and `level` a `reducer_kit::logging::Level`.
#[proc_macro_attribute]
pub fn reducer_printer_log(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand_attribute("reducer_printer_log", args, item)
}

/// Add a tracked `loading_state` property, and with `alert = Action` an `error_alert`.
///
/// Must be placed above `#[observable]`, which initialises the new storage.
#[proc_macro_attribute]
pub fn loadable_state(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand_attribute("loadable_state", args, item)
}

/// Replace every field with private storage and accessors that report reads and writes to an
/// observation registrar.
#[proc_macro_attribute]
pub fn observable(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand_attribute("observable", args, item)
}

/// Generate a `<Name>Container` cache holding at most one value of this type.
///
/// The type must implement `Clone`: `live()` hands out copies of the cached value.
#[proc_macro_attribute]
pub fn in_memory_container(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand_attribute("in_memory_container", args, item)
}

/// Implement `from_map` and `mapping` in terms of `map_properties`.
#[proc_macro_attribute]
pub fn easy_mappable(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand_attribute("easy_mappable", args, item)
}

#[proc_macro_derive(Sendable)]
pub fn derive_sendable_marker(ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(ts as DeriveInput);

    derive_sendable(input).into()
}

fn expand_attribute(
    name: &'static str,
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    // Run the inner implementation, and handle `Error` cases.
    match expand_attribute_inner(name, args.into(), item.into()) {
        Ok(ts) => ts,
        Err(e) => e.into_compile_error(),
    }
    .into()
}

/// Glue together each of the different stages of the macro.
fn expand_attribute_inner(
    name: &'static str,
    args: TokenStream,
    item: TokenStream,
) -> Result<TokenStream, Error> {
    let item: Item = syn::parse2(item)?;
    let expansion = registry::expand(name, args, &item)
        .ok_or_else(|| Error::new(Span::call_site(), format!("unknown macro `{name}`")))?;

    Ok(codegen(item, expansion))
}
