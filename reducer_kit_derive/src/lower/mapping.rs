use syn::parse_quote;

use crate::{
    analyse::MappingModel,
    fragment::{Fragment, Member},
};

/// Both members delegate to the user's `map_properties`.
pub fn lower(model: MappingModel) -> Vec<Fragment> {
    let MappingModel { self_ty, vis } = model;

    vec![
        Fragment::Member(Member::Associated(parse_quote! {
            #vis fn from_map(map: &::reducer_kit::mapping::Map) -> ::core::option::Option<Self> {
                let mut value = <#self_ty as ::core::default::Default>::default();
                ::reducer_kit::Mappable::map_properties(&mut value, map);
                ::core::option::Option::Some(value)
            }
        })),
        Fragment::Member(Member::Associated(parse_quote! {
            #vis fn mapping(&mut self, map: &::reducer_kit::mapping::Map) {
                ::reducer_kit::Mappable::map_properties(self, map);
            }
        })),
    ]
}

#[cfg(test)]
mod test {
    use quote::ToTokens;
    use syn::{ImplItem, Visibility, parse_quote};

    use super::*;

    fn names(fragments: &[Fragment]) -> Vec<String> {
        fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Member(Member::Associated(ImplItem::Fn(item_fn))) => {
                    item_fn.sig.ident.to_string()
                }
                _ => panic!("expected associated function"),
            })
            .collect()
    }

    #[test]
    fn members() {
        let fragments = lower(MappingModel {
            self_ty: parse_quote!(Model),
            vis: Visibility::Inherited,
        });

        assert_eq!(names(&fragments), ["from_map", "mapping"]);
    }

    #[test]
    fn delegates_to_map_properties() {
        let fragments = lower(MappingModel {
            self_ty: parse_quote!(Model),
            vis: Visibility::Inherited,
        });

        for fragment in fragments {
            let Fragment::Member(Member::Associated(ImplItem::Fn(item_fn))) = fragment else {
                panic!("expected associated function");
            };

            assert!(matches!(item_fn.vis, Visibility::Inherited));
            assert!(
                item_fn
                    .block
                    .to_token_stream()
                    .to_string()
                    .contains(":: reducer_kit :: Mappable :: map_properties")
            );
        }
    }
}
