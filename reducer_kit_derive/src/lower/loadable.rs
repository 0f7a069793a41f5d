use quote::format_ident;
use syn::{Ident, LitStr, Type, Visibility, parse_quote};

use crate::{
    analyse::LoadableModel,
    fragment::{AccessorBlock, AccessorFragment, AccessorKind, Fragment, Peer},
    lower::{shadow_ident, tracked_accessors},
};

pub fn lower(model: LoadableModel) -> Vec<Fragment> {
    let LoadableModel {
        vis,
        registrar,
        alert,
        ..
    } = model;

    let loading_state = format_ident!("loading_state");
    let shadow = shadow_ident(&loading_state);
    let ty: Type = parse_quote!(::reducer_kit::state::LoadingState);

    // Shadows are tagged so the pending `#[observable]` leaves them alone, but still
    // initialises them in its constructor.
    let mut fragments = vec![
        Fragment::Peer(Peer {
            replaces: None,
            field: parse_quote! {
                #[observation(ignored, default = ::reducer_kit::state::LoadingState::None)]
                #shadow: #ty
            },
        }),
        Fragment::Accessor(tracked_accessors(
            &loading_state,
            &ty,
            &vis,
            &shadow,
            &registrar,
        )),
    ];

    if let Some(action) = alert {
        fragments.extend(error_alert(&action, &vis, &registrar));
    }

    fragments
}

/// Optional alert presented when loading fails. The storage is a presentation wrapper, exposed
/// both as the wrapped alert and as the wrapper itself.
fn error_alert(action: &Type, vis: &Visibility, registrar: &Ident) -> Vec<Fragment> {
    let property = format_ident!("error_alert");
    let projected = format_ident!("error_alert_presentation");
    let shadow = shadow_ident(&property);
    let key = LitStr::new(&property.to_string(), property.span());

    let alert: Type = parse_quote!(::reducer_kit::state::AlertState<#action>);
    let presentation: Type = parse_quote!(::reducer_kit::state::PresentationState<#alert>);

    let wrapped = AccessorFragment {
        property: property.clone(),
        blocks: vec![
            AccessorBlock {
                kind: AccessorKind::Init,
                item: parse_quote! {
                    #vis fn with_error_alert(mut self, value: ::core::option::Option<#alert>) -> Self {
                        self.#shadow = ::reducer_kit::state::PresentationState::new(value);
                        self
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Get,
                item: parse_quote! {
                    #vis fn error_alert(&self) -> ::core::option::Option<&#alert> {
                        self.#registrar.access(#key);
                        self.#shadow.wrapped_value()
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Set,
                item: parse_quote! {
                    #vis fn set_error_alert(&mut self, value: ::core::option::Option<#alert>) {
                        self.#registrar.mutate(
                            #key,
                            &mut self.#shadow,
                            ::reducer_kit::state::PresentationState::new(value),
                            ::reducer_kit::observation::is_identity_equal,
                        );
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Modify,
                item: parse_quote! {
                    #vis fn modify_error_alert<R>(
                        &mut self,
                        modify: impl ::core::ops::FnOnce(&mut ::core::option::Option<#alert>) -> R,
                    ) -> R {
                        let _guard = self.#registrar.will_modify(#key);
                        modify(self.#shadow.wrapped_value_mut())
                    }
                },
            },
        ],
    };

    let projected_accessors = AccessorFragment {
        property: projected,
        blocks: vec![
            AccessorBlock {
                kind: AccessorKind::Get,
                item: parse_quote! {
                    #vis fn error_alert_presentation(&self) -> &#presentation {
                        self.#registrar.access(#key);
                        &self.#shadow
                    }
                },
            },
            AccessorBlock {
                kind: AccessorKind::Set,
                item: parse_quote! {
                    #vis fn set_error_alert_presentation(&mut self, value: #presentation) {
                        self.#registrar.mutate(
                            #key,
                            &mut self.#shadow,
                            value,
                            ::reducer_kit::observation::is_identity_equal,
                        );
                    }
                },
            },
        ],
    };

    vec![
        Fragment::Peer(Peer {
            replaces: None,
            field: parse_quote! {
                #[observation(ignored, default = ::reducer_kit::state::PresentationState::none())]
                #shadow: #presentation
            },
        }),
        Fragment::Accessor(wrapped),
        Fragment::Accessor(projected_accessors),
    ]
}
