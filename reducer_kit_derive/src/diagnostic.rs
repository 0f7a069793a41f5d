use proc_macro2::Span;
use syn::Error;

/// Category of precondition that an expansion failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum DiagnosticKind {
    /// The annotated item is not the kind of declaration the macro expands.
    #[strum(to_string = "structural mismatch")]
    StructuralMismatch,
    /// A capability is missing from the declaration header.
    #[strum(to_string = "missing conformance")]
    MissingConformance,
    /// A required member is absent, or present with the wrong shape.
    #[strum(to_string = "missing required member")]
    MissingRequiredMember,
    /// An attribute argument (or field helper attribute) was rejected.
    #[strum(to_string = "invalid argument")]
    InvalidArgument,
}

/// Literal code that resolves a diagnostic when pasted over the offending declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixIt {
    pub note: String,
    pub code: String,
}

/// An error attached to the node that triggered it.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub macro_name: &'static str,
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
    pub fix: Option<FixIt>,
}

impl Diagnostic {
    pub fn new(
        macro_name: &'static str,
        kind: DiagnosticKind,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            macro_name,
            kind,
            span,
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, note: impl Into<String>, code: impl Into<String>) -> Self {
        self.fix = Some(FixIt {
            note: note.into(),
            code: code.into(),
        });
        self
    }

    /// Full text shown to the user, including the fix-it template.
    pub fn rendered(&self) -> String {
        let mut text = format!("#[{}] {}", self.macro_name, self.message);

        if let Some(fix) = &self.fix {
            text.push_str("\nhelp: ");
            text.push_str(&fix.note);
            text.push('\n');
            text.push_str(&fix.code);
        }

        text
    }

    pub fn into_error(self) -> Error {
        Error::new(self.span, self.rendered())
    }
}

/// Fold every diagnostic into a single [`Error`], so they are all reported at once.
pub fn into_error(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Option<Error> {
    diagnostics
        .into_iter()
        .map(Diagnostic::into_error)
        .reduce(|mut error, next| {
            error.combine(next);
            error
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn render_without_fix() {
        let diagnostic = Diagnostic::new(
            "observable",
            DiagnosticKind::StructuralMismatch,
            Span::call_site(),
            "can only be applied to structs",
        );

        assert_eq!(
            diagnostic.rendered(),
            "#[observable] can only be applied to structs"
        );
    }

    #[test]
    fn render_with_fix() {
        let diagnostic = Diagnostic::new(
            "easy_mappable",
            DiagnosticKind::MissingConformance,
            Span::call_site(),
            "impl block must implement `Mappable`",
        )
        .with_fix("implement `Mappable` in the impl header:", "impl Mappable for Model {");

        assert_eq!(
            diagnostic.rendered(),
            "#[easy_mappable] impl block must implement `Mappable`\nhelp: implement `Mappable` in the impl header:\nimpl Mappable for Model {"
        );
    }

    #[test]
    fn kind_display() {
        assert_eq!(
            DiagnosticKind::MissingRequiredMember.to_string(),
            "missing required member"
        );
    }

    #[test]
    fn combine_errors() {
        let diagnostics = ["first", "second"].map(|message| {
            Diagnostic::new(
                "observable",
                DiagnosticKind::InvalidArgument,
                Span::call_site(),
                message,
            )
        });

        let error = into_error(diagnostics).unwrap();
        assert_eq!(error.into_iter().count(), 2);
    }

    #[test]
    fn no_diagnostics_no_error() {
        assert!(into_error(Vec::new()).is_none());
    }
}
