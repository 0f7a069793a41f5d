use proc_macro2::TokenStream;
use syn::Item;

use crate::{
    analyse::analyse,
    args::AttributeArgs,
    context::ExpansionContext,
    diagnostic::{Diagnostic, DiagnosticKind},
    fragment::{Fragment, FragmentKind},
    lower::lower,
    parse::Declaration,
};

/// Every macro the engine knows, by the name it is invoked with.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum MacroKind {
    /// `#[reducer_printer_log]`
    ReducerPrinterLog,
    /// `#[loadable_state]`
    LoadableState,
    /// `#[observable]`
    Observable,
    /// `#[in_memory_container]`
    InMemoryContainer,
    /// `#[easy_mappable]`
    EasyMappable,
}

impl MacroKind {
    /// Look a macro up by name.
    pub fn resolve(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Kinds of fragment this macro may produce.
    pub fn capabilities(self) -> &'static [FragmentKind] {
        match self {
            MacroKind::ReducerPrinterLog => &[FragmentKind::Member],
            MacroKind::LoadableState => &[FragmentKind::Accessor, FragmentKind::Peer],
            MacroKind::Observable => &[
                FragmentKind::Member,
                FragmentKind::Accessor,
                FragmentKind::Peer,
            ],
            MacroKind::InMemoryContainer => &[FragmentKind::Member, FragmentKind::Extension],
            MacroKind::EasyMappable => &[FragmentKind::Member],
        }
    }

    /// Whether the macro owns the `#[observation(..)]` field helper, and must remove it.
    pub fn consumes_field_helpers(self) -> bool {
        matches!(self, MacroKind::Observable)
    }

    /// Run the macro over `item` with raw attribute arguments. Arguments that are not a list of
    /// expressions are reported like any other rejected argument.
    pub fn expand_tokens(self, args: TokenStream, item: &Item) -> Expansion {
        match syn::parse2::<AttributeArgs>(args) {
            Ok(args) => self.expand(&args, item),
            Err(error) => {
                let mut ctx = ExpansionContext::new(self.name());
                ctx.diagnose(Diagnostic::new(
                    ctx.macro_name(),
                    DiagnosticKind::InvalidArgument,
                    error.span(),
                    format!("malformed arguments: {error}"),
                ));

                Expansion {
                    kind: self,
                    fragments: Vec::new(),
                    diagnostics: ctx.into_diagnostics(),
                }
            }
        }
    }

    /// Validate `item` and, if every rule passes, synthesise its fragments. A failed validation
    /// produces exactly one diagnostic and no fragments.
    pub fn expand(self, args: &AttributeArgs, item: &Item) -> Expansion {
        let mut ctx = ExpansionContext::new(self.name());

        let fragments = match analyse(self, args, Declaration::from_item(item)) {
            Ok(model) => lower(model, &mut ctx),
            Err(diagnostic) => {
                ctx.diagnose(diagnostic);
                Vec::new()
            }
        };

        Expansion {
            kind: self,
            fragments,
            diagnostics: ctx.into_diagnostics(),
        }
    }
}

/// Result of a single expansion.
pub struct Expansion {
    /// Macro that produced it.
    pub kind: MacroKind,
    pub fragments: Vec<Fragment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Expand the macro called `name` with its raw arguments, or `None` if no such macro exists.
pub fn expand(name: &str, args: TokenStream, item: &Item) -> Option<Expansion> {
    MacroKind::resolve(name).map(|kind| kind.expand_tokens(args, item))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use quote::{ToTokens, format_ident, quote};
    use strum::IntoEnumIterator;
    use syn::parse_quote;

    use super::*;

    fn render(expansion: &Expansion) -> Vec<String> {
        expansion
            .fragments
            .iter()
            .map(|fragment| fragment.to_token_stream().to_string())
            .collect()
    }

    #[test]
    fn resolve_every_name() {
        for kind in MacroKind::iter() {
            assert_eq!(MacroKind::resolve(kind.name()), Some(kind));
        }

        assert_eq!(
            MacroKind::resolve("reducer_printer_log"),
            Some(MacroKind::ReducerPrinterLog)
        );
        assert_eq!(
            MacroKind::resolve("in_memory_container"),
            Some(MacroKind::InMemoryContainer)
        );
        assert_eq!(MacroKind::resolve("observable_state"), None);
    }

    #[test]
    fn unknown_macro() {
        let item: Item = parse_quote!(struct Model;);

        assert!(expand("print_log", TokenStream::new(), &item).is_none());
    }

    #[test]
    fn expand_by_name() {
        let item: Item = parse_quote!(struct Bar { id: u32 });

        let expansion = expand("in_memory_container", TokenStream::new(), &item).unwrap();
        assert_eq!(expansion.kind, MacroKind::InMemoryContainer);
        assert!(expansion.diagnostics.is_empty());
        assert_eq!(
            render(&expansion),
            render(&MacroKind::InMemoryContainer.expand(&AttributeArgs::default(), &item))
        );
    }

    #[test]
    fn failure_yields_one_diagnostic_and_no_fragments() {
        let item: Item = parse_quote!(enum Model { A });

        for kind in MacroKind::iter() {
            let expansion = kind.expand(&AttributeArgs::default(), &item);

            assert!(expansion.fragments.is_empty(), "{kind:?}");
            assert_eq!(expansion.diagnostics.len(), 1, "{kind:?}");
            assert_eq!(
                expansion.diagnostics[0].kind,
                DiagnosticKind::StructuralMismatch
            );
        }
    }

    #[test]
    fn malformed_arguments() {
        let item: Item = parse_quote!(struct Feature;);
        let expansion = MacroKind::ReducerPrinterLog.expand_tokens(quote!(level = ), &item);

        assert!(expansion.fragments.is_empty());
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(
            expansion.diagnostics[0].kind,
            DiagnosticKind::InvalidArgument
        );
    }

    #[test]
    fn fragments_within_capabilities() {
        let cases: [(MacroKind, Item); 5] = [
            (MacroKind::ReducerPrinterLog, parse_quote!(struct Feature;)),
            (
                MacroKind::LoadableState,
                parse_quote! {
                    #[observable]
                    struct State { a: u32 }
                },
            ),
            (MacroKind::Observable, parse_quote!(struct State { a: u32 })),
            (MacroKind::InMemoryContainer, parse_quote!(struct Bar { a: u32 })),
            (
                MacroKind::EasyMappable,
                parse_quote! {
                    impl Mappable for Model {
                        fn map_properties(&mut self, map: &Map) {}
                    }
                },
            ),
        ];

        for (kind, item) in cases {
            let expansion = kind.expand(&AttributeArgs::default(), &item);

            assert!(expansion.diagnostics.is_empty(), "{kind:?}");
            assert!(!expansion.fragments.is_empty(), "{kind:?}");
            for fragment in &expansion.fragments {
                assert!(kind.capabilities().contains(&fragment.kind()), "{kind:?}");
            }
        }
    }

    #[test]
    fn mapping_succeeds_with_zero_diagnostics() {
        let item: Item = parse_quote! {
            impl Mappable for Model {
                fn map_properties(&mut self, map: &Map) {}
            }
        };

        let expansion = MacroKind::EasyMappable.expand(&AttributeArgs::default(), &item);
        assert!(expansion.diagnostics.is_empty());
        assert_eq!(expansion.fragments.len(), 2);
    }

    fn observable_struct(fields: &[(String, bool)]) -> Item {
        let fields = fields.iter().map(|(name, ignored)| {
            let ident = format_ident!("{}", name);
            let helper = ignored.then(|| quote!(#[observation(ignored)]));
            quote!(#helper #ident: u32)
        });

        parse_quote! {
            struct State {
                #(#fields,)*
            }
        }
    }

    fn field_names() -> impl Strategy<Value = Vec<(String, bool)>> {
        prop::collection::btree_map("f_[a-z]{1,6}", any::<bool>(), 0..8)
            .prop_map(|fields| fields.into_iter().collect())
    }

    proptest! {
        #[test]
        fn expansion_is_idempotent(fields in field_names()) {
            let item = observable_struct(&fields);

            let first = MacroKind::Observable.expand(&AttributeArgs::default(), &item);
            let second = MacroKind::Observable.expand(&AttributeArgs::default(), &item);

            prop_assert_eq!(render(&first), render(&second));
        }

        #[test]
        fn one_shadow_per_eligible_property(fields in field_names()) {
            let item = observable_struct(&fields);
            let expansion = MacroKind::Observable.expand(&AttributeArgs::default(), &item);

            let eligible = fields.iter().filter(|(_, ignored)| !ignored).count();
            let count = |kind| expansion.fragments.iter().filter(|fragment| fragment.kind() == kind).count();

            prop_assert!(expansion.diagnostics.is_empty());
            prop_assert_eq!(count(FragmentKind::Peer), eligible);
            prop_assert_eq!(count(FragmentKind::Accessor), eligible);
        }

        #[test]
        fn container_expansion_is_idempotent(name in "Cached[A-Z][a-z]{1,8}") {
            let ident = format_ident!("{}", name);
            let item: Item = parse_quote!(struct #ident { id: u32 });

            let first = MacroKind::InMemoryContainer.expand(&AttributeArgs::default(), &item);
            let second = MacroKind::InMemoryContainer.expand(&AttributeArgs::default(), &item);

            prop_assert_eq!(render(&first), render(&second));
        }
    }
}
