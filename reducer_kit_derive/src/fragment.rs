//! Generated declaration fragments, before they are spliced back into the annotated item.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Field, Ident, ImplItem, ImplItemFn, Item, ItemImpl};

/// Where a fragment is inserted relative to the annotated declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FragmentKind {
    /// New declaration belonging to the annotated type.
    Member,
    /// Accessor methods standing in for a stored property.
    Accessor,
    /// Sibling declaration, such as the private storage behind a property.
    Peer,
    /// Trait implementation adding a conformance.
    Extension,
}

pub enum Fragment {
    Member(Member),
    Accessor(AccessorFragment),
    Peer(Peer),
    Extension(ItemImpl),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Member(_) => FragmentKind::Member,
            Fragment::Accessor(_) => FragmentKind::Accessor,
            Fragment::Peer(_) => FragmentKind::Peer,
            Fragment::Extension(_) => FragmentKind::Extension,
        }
    }
}

impl ToTokens for Fragment {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            Fragment::Member(Member::Item(item)) => item.to_tokens(tokens),
            Fragment::Member(Member::Associated(item)) => item.to_tokens(tokens),
            Fragment::Member(Member::Field(field)) => field.to_tokens(tokens),
            Fragment::Accessor(accessor) => {
                let blocks = accessor.blocks.iter().map(|block| &block.item);
                tokens.extend(quote!(#(#blocks)*));
            }
            Fragment::Peer(peer) => peer.field.to_tokens(tokens),
            Fragment::Extension(item_impl) => item_impl.to_tokens(tokens),
        }
    }
}

pub enum Member {
    /// Companion item emitted beside the annotated declaration. Rust has no nested types, so
    /// generated types live next to their owner.
    Item(Item),
    /// Associated item of the annotated type. Goes into the annotated `impl` block, or a new
    /// inherent `impl` block for structs.
    Associated(ImplItem),
    /// Field appended to the annotated struct.
    Field(Field),
}

/// Accessor blocks generated for one property.
pub struct AccessorFragment {
    pub property: Ident,
    pub blocks: Vec<AccessorBlock>,
}

impl AccessorFragment {
    pub fn block(&self, kind: AccessorKind) -> Option<&ImplItemFn> {
        self.blocks
            .iter()
            .find(|block| block.kind == kind)
            .map(|block| &block.item)
    }
}

pub struct AccessorBlock {
    pub kind: AccessorKind,
    pub item: ImplItemFn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AccessorKind {
    /// Writes the storage directly, bypassing change tracking.
    Init,
    /// Registers a read, then returns the stored value.
    Get,
    /// Registers a write, then commits the new value.
    Set,
    /// Scoped in-place mutation bracketed by will/did notifications.
    Modify,
}

/// Storage declared next to the annotated item.
pub struct Peer {
    /// Field that this storage takes the place of. `None` appends the field.
    pub replaces: Option<Ident>,
    pub field: Field,
}
