use quote::format_ident;
use syn::{Type, parse_quote};

use crate::{
    analyse::LoggerModel,
    fragment::{Fragment, Member},
};

pub fn lower(model: LoggerModel) -> Vec<Fragment> {
    let LoggerModel {
        target,
        vis,
        subsystem,
        category,
        level,
    } = model;

    let logger = format_ident!("{}ReducerLogger", target);
    let state: Type = parse_quote!(<#target as ::reducer_kit::Reducer>::State);
    let action: Type = parse_quote!(<#target as ::reducer_kit::Reducer>::Action);

    vec![
        Fragment::Member(Member::Item(parse_quote! {
            #[derive(Clone, Copy, Debug)]
            #vis struct #logger {
                handle: ::reducer_kit::logging::LogHandle,
            }
        })),
        Fragment::Member(Member::Item(parse_quote! {
            impl #logger {
                #vis const fn new() -> Self {
                    Self {
                        handle: ::reducer_kit::logging::LogHandle::new(#subsystem, #category),
                    }
                }

                /// Level that [`Self::printer`] logs at.
                #vis fn level(&self) -> ::reducer_kit::logging::Level {
                    #level
                }

                #vis fn log(&self, level: ::reducer_kit::logging::Level, message: &str) {
                    self.handle.log(level, message);
                }

                #vis fn log_debug(&self, message: &str) {
                    self.log(::reducer_kit::logging::Level::DEBUG, message);
                }

                /// Printer logging every state transition at the configured level.
                #vis fn printer(&self) -> ::reducer_kit::ReducerPrinter<#state, #action> {
                    self.printer_at(self.level())
                }

                /// Printer logging every state transition at `level`. Under previews the
                /// transitions are dumped to stdout instead.
                #vis fn printer_at(
                    &self,
                    level: ::reducer_kit::logging::Level,
                ) -> ::reducer_kit::ReducerPrinter<#state, #action> {
                    if ::reducer_kit::logging::is_running_for_previews() {
                        return ::reducer_kit::ReducerPrinter::custom_dump();
                    }

                    let handle = self.handle;
                    ::reducer_kit::ReducerPrinter::new(move |action, old_state, new_state| {
                        handle.log(level, &Self::render_transition(action, old_state, new_state));
                    })
                }

                #vis fn render_transition(
                    action: &#action,
                    old_state: &#state,
                    new_state: &#state,
                ) -> ::std::string::String {
                    ::reducer_kit::logging::render_transition(action, old_state, new_state)
                }
            }
        })),
        Fragment::Member(Member::Associated(parse_quote! {
            #vis const REDUCER_LOGGER: #logger = #logger::new();
        })),
    ]
}

#[cfg(test)]
mod test {
    use quote::ToTokens;
    use syn::{ImplItem, Item, parse_quote};

    use super::*;

    fn model() -> LoggerModel {
        LoggerModel {
            target: parse_quote!(Feature),
            vis: parse_quote!(pub),
            subsystem: parse_quote!("com.app"),
            category: parse_quote!("feature"),
            level: parse_quote!(::reducer_kit::logging::Level::INFO),
        }
    }

    #[test]
    fn companion_named_after_target() {
        let fragments = lower(model());

        let Some(Fragment::Member(Member::Item(Item::Struct(logger)))) = fragments.first() else {
            panic!("expected logger struct");
        };

        assert_eq!(logger.ident, "FeatureReducerLogger");
        assert!(matches!(logger.vis, syn::Visibility::Public(_)));
    }

    #[test]
    fn arguments_spliced_into_handle() {
        let fragments = lower(model());

        let Some(Fragment::Member(Member::Item(item))) = fragments.get(1) else {
            panic!("expected logger impl");
        };

        assert!(
            item.to_token_stream()
                .to_string()
                .contains("LogHandle :: new (\"com.app\" , \"feature\")")
        );
    }

    #[test]
    fn eager_instance() {
        let fragments = lower(model());

        let Some(Fragment::Member(Member::Associated(ImplItem::Const(instance)))) =
            fragments.last()
        else {
            panic!("expected associated const");
        };

        assert_eq!(instance.ident, "REDUCER_LOGGER");
        assert_eq!(
            instance.expr.to_token_stream().to_string(),
            "FeatureReducerLogger :: new ()"
        );
    }

    #[test]
    fn deterministic() {
        let render = |fragments: Vec<Fragment>| {
            fragments
                .iter()
                .map(|fragment| fragment.to_token_stream().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(render(lower(model())), render(lower(model())));
    }
}
