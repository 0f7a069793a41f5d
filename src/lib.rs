//! Runtime support for the `reducer_kit` attribute macros.
//!
//! The macros generate plain Rust against the types in this crate:
//!
//! - [`reducer_printer_log`] gives a [`Reducer`] a logger that renders every transition.
//! - [`observable`] and [`loadable_state`] wrap fields in accessors that report to an
//!   [`observation::ObservationRegistrar`].
//! - [`in_memory_container`] generates a [`cache::CacheContainer`] for a model.
//! - [`easy_mappable`] derives the required `from_map` and `mapping` methods of [`Mappable`]
//!   from `map_properties`.
//!
//! Attribute macros must be placed above any `#[derive(..)]`, so that derives see the expanded
//! fields.

pub mod cache;
pub mod logging;
pub mod mapping;
pub mod observation;
mod reducer;
pub mod state;
mod sync;

// Generated code names this crate by its absolute path, including inside this crate's tests.
extern crate self as reducer_kit;

pub use reducer_kit_derive::{
    Sendable, easy_mappable, in_memory_container, loadable_state, observable,
    reducer_printer_log,
};

pub use self::{
    cache::Sendable,
    mapping::Mappable,
    reducer::{PrintChanges, Reducer, ReducerPrinter, print_changes},
};
