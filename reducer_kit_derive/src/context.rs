use proc_macro2::Span;
use quote::format_ident;
use syn::Ident;

use crate::diagnostic::Diagnostic;

/// Per-invocation state handed to every stage. Created fresh for each expansion and dropped
/// with it, so nothing carries over between attributed sites.
pub struct ExpansionContext {
    macro_name: &'static str,
    diagnostics: Vec<Diagnostic>,
    next_id: usize,
}

impl ExpansionContext {
    pub fn new(macro_name: &'static str) -> Self {
        Self {
            macro_name,
            diagnostics: Vec::new(),
            next_id: 0,
        }
    }

    pub fn macro_name(&self) -> &'static str {
        self.macro_name
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Identifier that cannot collide with user code. Numbering restarts with every context, so
    /// the same input always yields the same names.
    pub fn unique_ident(&mut self, base: &str) -> Ident {
        let ident = format_ident!("__reducer_kit_{}_{}", base, self.next_id, span = Span::call_site());
        self.next_id += 1;
        ident
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
