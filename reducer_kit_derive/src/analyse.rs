use std::collections::HashMap;

use quote::{ToTokens, format_ident};
use syn::{
    Attribute, Expr, Ident, ItemStruct, Type, Visibility, parse_quote,
    spanned::Spanned,
};

use crate::{
    args::AttributeArgs,
    diagnostic::{Diagnostic, DiagnosticKind},
    parse::{
        Declaration, MemberDescriptor, OBSERVATION_ATTR, REGISTRAR_TYPE, property_descriptor,
        type_name,
    },
    registry::MacroKind,
};

/// Check the declaration against the rules of `kind`, in order, and pull out everything the
/// synthesiser needs. The first failing rule ends validation.
pub fn analyse(
    kind: MacroKind,
    args: &AttributeArgs,
    declaration: Declaration,
) -> Result<Model, Diagnostic> {
    Ok(match kind {
        MacroKind::ReducerPrinterLog => Model::Logger(analyse_logger(args, declaration)?),
        MacroKind::LoadableState => Model::LoadableState(analyse_loadable(args, declaration)?),
        MacroKind::Observable => Model::Observable(analyse_observable(args, declaration)?),
        MacroKind::InMemoryContainer => {
            Model::Container(analyse_container(args, declaration)?)
        }
        MacroKind::EasyMappable => Model::Mapping(analyse_mapping(args, declaration)?),
    })
}

/// Facts extracted from a declaration that passed validation.
pub enum Model {
    Logger(LoggerModel),
    LoadableState(LoadableModel),
    Observable(ObservableModel),
    Container(ContainerModel),
    Mapping(MappingModel),
}

pub struct LoggerModel {
    pub target: Ident,
    pub vis: Visibility,
    /// Expressions spliced verbatim into the generated logger.
    pub subsystem: Expr,
    pub category: Expr,
    pub level: Expr,
}

pub struct LoadableModel {
    pub vis: Visibility,
    /// Field holding the observation registrar.
    pub registrar: Ident,
    /// Action type of the error alert, when one was requested.
    pub alert: Option<Type>,
}

pub struct ObservableModel {
    pub vis: Visibility,
    /// `false` for tuple and unit structs, which have nothing to observe.
    pub named: bool,
    pub properties: Vec<ObservedProperty>,
}

impl ObservableModel {
    pub fn declares_registrar(&self) -> bool {
        self.properties
            .iter()
            .any(|property| property.role == PropertyRole::Registrar)
    }

    /// The declared registrar field, or the one the expansion appends.
    pub fn registrar_ident(&self) -> Ident {
        self.properties
            .iter()
            .find(|property| property.role == PropertyRole::Registrar)
            .map(|property| property.ident.clone())
            .unwrap_or_else(default_registrar)
    }
}

#[derive(Clone)]
pub struct ObservedProperty {
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
    pub default: Option<Expr>,
    pub role: PropertyRole,
    pub attrs: Vec<Attribute>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyRole {
    /// Wrapped with tracked accessors.
    Observed,
    /// Left as a plain field.
    Ignored,
    /// The observation registrar itself.
    Registrar,
}

pub struct ContainerModel {
    pub target: Ident,
    pub vis: Visibility,
    /// The concurrency-safe capability is already in the derive list.
    pub declares_sendable: bool,
}

pub struct MappingModel {
    pub self_ty: Type,
    pub vis: Visibility,
}

fn analyse_logger(args: &AttributeArgs, declaration: Declaration) -> Result<LoggerModel, Diagnostic> {
    let kind = MacroKind::ReducerPrinterLog;

    let item_struct = require_struct(kind, declaration)?;
    require_non_generic(kind, declaration)?;
    require_arguments(kind, args, &["subsystem", "category", "level"])?;

    Ok(LoggerModel {
        target: item_struct.ident.clone(),
        vis: generated_visibility(declaration),
        subsystem: args.get_or("subsystem", parse_quote!("default.subsystem")),
        category: args.get_or("category", parse_quote!("default.category")),
        level: args.get_or("level", parse_quote!(::reducer_kit::logging::Level::INFO)),
    })
}

fn analyse_loadable(
    args: &AttributeArgs,
    declaration: Declaration,
) -> Result<LoadableModel, Diagnostic> {
    let kind = MacroKind::LoadableState;

    let item_struct = require_struct(kind, declaration)?;
    if !declaration.has_named_fields() {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            declaration.span(),
            "requires a struct with named fields",
        ));
    }

    if !declaration.has_attribute(MacroKind::Observable.name()) {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::MissingConformance,
            declaration.span(),
            "requires the struct to be observable, with `#[observable]` placed below `#[loadable_state]`",
        )
        .with_fix(
            "add `#[observable]` below this attribute:",
            format!(
                "#[loadable_state]\n#[observable]\n{}",
                struct_header(item_struct)
            ),
        ));
    }

    require_arguments(kind, args, &["alert"])?;
    let alert = args
        .get("alert")
        .map(|expr| {
            syn::parse2::<Type>(expr.to_token_stream()).map_err(|_| {
                Diagnostic::new(
                    kind.name(),
                    DiagnosticKind::InvalidArgument,
                    expr.span(),
                    "`alert` must name the alert's action type",
                )
            })
        })
        .transpose()?;

    let mut generated = vec!["loading_state"];
    if alert.is_some() {
        generated.push("error_alert");
    }

    for field in &item_struct.fields {
        let Some(ident) = &field.ident else {
            continue;
        };

        if let Some(property) = generated
            .iter()
            .find(|property| *ident == **property || *ident == format!("_{property}"))
        {
            return Err(Diagnostic::new(
                kind.name(),
                DiagnosticKind::StructuralMismatch,
                ident.span(),
                format!("field `{ident}` clashes with the generated `{property}` property"),
            ));
        }
    }

    let registrar = item_struct
        .fields
        .iter()
        .find(|field| type_name(&field.ty).is_some_and(|name| name == REGISTRAR_TYPE))
        .and_then(|field| field.ident.clone())
        .unwrap_or_else(default_registrar);

    Ok(LoadableModel {
        vis: generated_visibility(declaration),
        registrar,
        alert,
    })
}

fn analyse_observable(
    args: &AttributeArgs,
    declaration: Declaration,
) -> Result<ObservableModel, Diagnostic> {
    let kind = MacroKind::Observable;

    require_struct(kind, declaration)?;
    require_arguments(kind, args, &[])?;

    let mut properties = Vec::new();
    for member in declaration.members() {
        let MemberDescriptor::Field(field) = member else {
            continue;
        };

        let descriptor = property_descriptor(field).map_err(|error| {
            Diagnostic::new(
                kind.name(),
                DiagnosticKind::InvalidArgument,
                error.span(),
                error.to_string(),
            )
        })?;

        // Unnamed fields cannot be given accessors.
        let Some(descriptor) = descriptor else {
            continue;
        };

        let role = if descriptor.is_registrar() {
            if descriptor.has_annotation(OBSERVATION_ATTR) {
                return Err(Diagnostic::new(
                    kind.name(),
                    DiagnosticKind::InvalidArgument,
                    descriptor.ident.span(),
                    format!(
                        "the registrar field `{}` is never observed, remove `#[{OBSERVATION_ATTR}(..)]`",
                        descriptor.ident
                    ),
                ));
            }

            PropertyRole::Registrar
        } else if descriptor.is_eligible_for_observation() {
            PropertyRole::Observed
        } else {
            PropertyRole::Ignored
        };

        properties.push(ObservedProperty {
            ident: descriptor.ident.clone(),
            ty: descriptor.ty.clone(),
            vis: descriptor.vis.clone(),
            default: descriptor.default,
            role,
            attrs: descriptor.field.attrs.clone(),
        });
    }

    let model = ObservableModel {
        vis: generated_visibility(declaration),
        named: declaration.has_named_fields(),
        properties,
    };
    require_distinct_names(kind, &model)?;

    Ok(model)
}

/// Every generated method and every field left after expansion must have a name of its own, so
/// that a field like `new` is reported here instead of as a duplicate definition.
fn require_distinct_names(kind: MacroKind, model: &ObservableModel) -> Result<(), Diagnostic> {
    if !model.named {
        return Ok(());
    }

    let mut methods: HashMap<String, String> = HashMap::from([
        ("new".to_string(), "the generated constructor".to_string()),
        (
            "observation_registrar".to_string(),
            "the generated registrar getter".to_string(),
        ),
    ]);
    let mut fields: HashMap<String, String> = HashMap::new();

    if !model.declares_registrar() {
        fields.insert(
            default_registrar().to_string(),
            "the generated registrar field".to_string(),
        );
    }

    let clash = |property: &ObservedProperty, generated: &str, existing: &str| {
        Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            property.ident.span(),
            format!(
                "field `{}` generates `{generated}`, which clashes with {existing}; rename the field",
                property.ident
            ),
        )
    };

    for property in &model.properties {
        let ident = &property.ident;

        let storage = match property.role {
            PropertyRole::Observed => format!("_{ident}"),
            PropertyRole::Ignored | PropertyRole::Registrar => ident.to_string(),
        };
        if let Some(existing) = fields.insert(storage.clone(), format!("field `{ident}`")) {
            return Err(clash(property, &storage, &existing));
        }

        if property.role != PropertyRole::Observed {
            continue;
        }

        for method in [
            format!("with_{ident}"),
            ident.to_string(),
            format!("set_{ident}"),
            format!("modify_{ident}"),
        ] {
            if let Some(existing) =
                methods.insert(method.clone(), format!("the accessors of `{ident}`"))
            {
                return Err(clash(property, &format!("fn {method}"), &existing));
            }
        }
    }

    Ok(())
}

fn analyse_container(
    args: &AttributeArgs,
    declaration: Declaration,
) -> Result<ContainerModel, Diagnostic> {
    let kind = MacroKind::InMemoryContainer;

    let item_struct = require_struct(kind, declaration)?;
    require_non_generic(kind, declaration)?;
    require_arguments(kind, args, &[])?;

    Ok(ContainerModel {
        target: item_struct.ident.clone(),
        vis: generated_visibility(declaration),
        declares_sendable: declaration.conforms_to("Sendable"),
    })
}

fn analyse_mapping(
    args: &AttributeArgs,
    declaration: Declaration,
) -> Result<MappingModel, Diagnostic> {
    let kind = MacroKind::EasyMappable;

    let Declaration::Impl(item_impl) = declaration else {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            declaration.span(),
            format!(
                "can only be applied to `impl Mappable for T` blocks, found {}",
                declaration.kind_name()
            ),
        ));
    };

    if declaration.ident().is_none() {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            declaration.span(),
            "can only be applied to impl blocks for named types",
        ));
    }

    require_arguments(kind, args, &[])?;

    if !declaration.conforms_to("Mappable") {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::MissingConformance,
            declaration.span(),
            "impl block must implement `Mappable`",
        )
        .with_fix(
            "implement `Mappable` in the impl header:",
            format!(
                "impl{} Mappable for {} {{",
                tokens_to_source(&item_impl.generics),
                tokens_to_source(&item_impl.self_ty)
            ),
        ));
    }

    let has_map_properties = declaration
        .find_function("map_properties", 1)
        .filter(|function| function.has_receiver)
        .and_then(|function| function.params.first().and_then(|ty| type_name(ty)))
        .is_some_and(|name| name == "Map");

    if !has_map_properties {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::MissingRequiredMember,
            declaration.span(),
            "impl block must define `fn map_properties(&mut self, map: &Map)`",
        )
        .with_fix(
            "add this function to the impl block:",
            "fn map_properties(&mut self, map: &Map) {\n    // your mapping logic here\n}",
        ));
    }

    if let Some(existing) = declaration.members().into_iter().find_map(|member| {
        member
            .ident()
            .filter(|ident| *ident == "from_map" || *ident == "mapping")
    }) {
        return Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            existing.span(),
            format!("`{existing}` is generated from `map_properties`, remove it from the impl block"),
        ));
    }

    Ok(MappingModel {
        self_ty: item_impl.self_ty.as_ref().clone(),
        vis: generated_visibility(declaration),
    })
}

/// Registrar field appended by `#[observable]` when the struct does not declare one.
fn default_registrar() -> Ident {
    format_ident!("_observation_registrar")
}

/// Generated items are `pub` when the declaration is, and private otherwise.
fn generated_visibility(declaration: Declaration) -> Visibility {
    if declaration.is_public() {
        parse_quote!(pub)
    } else {
        Visibility::Inherited
    }
}

/// Shape rule: the declaration must be a struct.
fn require_struct<'a>(
    kind: MacroKind,
    declaration: Declaration<'a>,
) -> Result<&'a ItemStruct, Diagnostic> {
    match declaration {
        Declaration::Struct(item_struct) => Ok(item_struct),
        _ => Err(Diagnostic::new(
            kind.name(),
            DiagnosticKind::StructuralMismatch,
            declaration.span(),
            format!(
                "can only be applied to structs, found {}",
                declaration.kind_name()
            ),
        )),
    }
}

/// Companion types are emitted without generics, so the owner cannot have any.
fn require_non_generic(kind: MacroKind, declaration: Declaration) -> Result<(), Diagnostic> {
    if !declaration.is_generic() {
        return Ok(());
    }

    Err(Diagnostic::new(
        kind.name(),
        DiagnosticKind::StructuralMismatch,
        declaration.span(),
        "cannot be applied to generic structs",
    ))
}

/// Argument rule: every argument must carry one of `labels`.
fn require_arguments(
    kind: MacroKind,
    args: &AttributeArgs,
    labels: &[&str],
) -> Result<(), Diagnostic> {
    let expected = if labels.is_empty() {
        "it takes no arguments".to_string()
    } else {
        format!(
            "expected one of {}",
            labels
                .iter()
                .map(|label| format!("`{label}`"))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    for arg in args.iter() {
        match &arg.label {
            Some(label) if labels.iter().any(|expected| label == expected) => {}
            Some(label) => {
                return Err(Diagnostic::new(
                    kind.name(),
                    DiagnosticKind::InvalidArgument,
                    label.span(),
                    format!("unknown argument `{label}`, {expected}"),
                ));
            }
            None => {
                return Err(Diagnostic::new(
                    kind.name(),
                    DiagnosticKind::InvalidArgument,
                    arg.value.span(),
                    format!("arguments must be written as `label = value`, {expected}"),
                ));
            }
        }
    }

    Ok(())
}

/// Source text of a struct's declaration header, eg `pub struct Model {`.
fn struct_header(item_struct: &ItemStruct) -> String {
    let vis = tokens_to_source(&item_struct.vis);
    let vis = if vis.is_empty() { vis } else { format!("{vis} ") };

    format!(
        "{vis}struct {}{} {{",
        item_struct.ident,
        tokens_to_source(&item_struct.generics)
    )
}

/// Token text with the spacing that `to_string` inserts around punctuation removed.
fn tokens_to_source(tokens: &impl ToTokens) -> String {
    tokens
        .to_token_stream()
        .to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace(" :: ", "::")
        .replace(":: ", "::")
}
