use syn::{
    Expr, Ident, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// A single attribute argument, optionally labelled (`label = expr`).
#[derive(Clone)]
pub struct Argument {
    pub label: Option<Ident>,
    pub value: Expr,
}

impl Parse for Argument {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let label = if input.peek(Ident) && input.peek2(Token![=]) && !input.peek2(Token![==]) {
            let label = input.parse()?;
            input.parse::<Token![=]>()?;
            Some(label)
        } else {
            None
        };

        Ok(Self {
            label,
            value: input.parse()?,
        })
    }
}

/// Arguments passed to an attribute macro, in source order.
///
/// Values are kept as expressions and spliced verbatim into generated code. They are only checked
/// for being well-formed expressions, never evaluated.
#[derive(Clone, Default)]
pub struct AttributeArgs {
    args: Vec<Argument>,
}

impl Parse for AttributeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Self {
            args: Punctuated::<Argument, Token![,]>::parse_terminated(input)?
                .into_iter()
                .collect(),
        })
    }
}

impl AttributeArgs {
    /// Value of the first argument carrying `label`. Later duplicates are ignored.
    pub fn get(&self, label: &str) -> Option<&Expr> {
        self.args
            .iter()
            .find(|arg| arg.label.as_ref().is_some_and(|ident| ident == label))
            .map(|arg| &arg.value)
    }

    /// Value of `label`, or `default` when the label is absent.
    pub fn get_or(&self, label: &str, default: Expr) -> Expr {
        self.get(label).cloned().unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
