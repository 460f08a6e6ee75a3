use proc_macro2::TokenStream;
use quote::quote;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, DeriveInput, Generics, Ident, Lit, Meta};

use patterns::{Pattern, PatternLibrary, TokenTemplate};

use crate::error::{DeriveError, Result};

const PATTERNS_FILE_ATTR: &str = "patterns_file";
const PATTERNS_INLINE_ATTR: &str = "patterns_inline";

/// Where the notation for a library comes from.
#[derive(Debug, PartialEq)]
enum Source {
    Inline(String),
    /// Resolved against `CARGO_MANIFEST_DIR`.
    File(PathBuf),
}

impl Source {
    fn load(&self) -> Result<PatternLibrary> {
        let notation = match self {
            Source::Inline(s) => s.clone(),
            Source::File(path) => fs::read_to_string(path).map_err(|e| {
                DeriveError::Other(format!(
                    "read patterns file: {}, {}",
                    path.to_string_lossy(),
                    e
                ))
            })?,
        };
        Ok(notation.parse()?)
    }
}

/// Expand the derive, turning any error into a `compile_error!`.
pub fn generate(ast: DeriveInput) -> TokenStream {
    match try_generate(&ast) {
        Ok(ts) => ts,
        Err(e) => {
            let msg = e.to_string();
            quote! {
                compile_error!(#msg);
            }
        }
    }
}

fn try_generate(ast: &DeriveInput) -> Result<TokenStream> {
    let source = source_from_ast(ast)?;
    let library = source.load()?;
    let tracked = match &source {
        Source::File(path) => Some(path.as_path()),
        Source::Inline(_) => None,
    };
    Ok(generate_impl(&ast.ident, &ast.generics, &library, tracked))
}

/// Load the pattern source from a derive attribute.
///
/// There must be exactly 1 attribute specifying the source. The source may
/// either be written inline, or be a path to a notation file.
fn source_from_ast(ast: &DeriveInput) -> Result<Source> {
    let sources: Vec<&Attribute> = ast
        .attrs
        .iter()
        .filter(|attr| {
            attr.path.is_ident(PATTERNS_FILE_ATTR) || attr.path.is_ident(PATTERNS_INLINE_ATTR)
        })
        .collect();

    let source_attr = match sources.len() {
        0 => return Err(DeriveError::MissingPatternSource),
        1 => sources[0],
        _ => return Err(DeriveError::MultiplePatternSources),
    };

    match source_attr.parse_meta()? {
        Meta::NameValue(val) => match val.lit {
            Lit::Str(s) => {
                if val.path.is_ident(PATTERNS_FILE_ATTR) {
                    let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
                    Ok(Source::File(Path::new(&root).join(s.value())))
                } else {
                    Ok(Source::Inline(s.value()))
                }
            }
            _ => Err(DeriveError::Other("attribute not a string".to_owned())),
        },
        _ => Err(DeriveError::Other("attribute not a name value".to_owned())),
    }
}

/// Generate the `PatternSource` implementation. The library is rebuilt from
/// constructors, no notation is parsed at runtime.
///
/// A notation file is pulled in through `include_str!` so that editing it
/// triggers a rebuild.
fn generate_impl(
    name: &Ident,
    generics: &Generics,
    library: &PatternLibrary,
    tracked: Option<&Path>,
) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let gen_patterns: Vec<TokenStream> = library.patterns().iter().map(generate_pattern).collect();
    let gen_tracked = tracked.map(|path| {
        let path = path.to_string_lossy().into_owned();
        quote! {
            const _: &str = include_str!(#path);
        }
    });

    quote! {
        #gen_tracked

        impl #impl_generics patterns::PatternSource for #name #ty_generics #where_clause {
            fn patterns() -> patterns::PatternLibrary {
                patterns::PatternLibrary::new(vec![
                    #( #gen_patterns ),*
                ])
            }
        }
    }
}

fn generate_pattern(pattern: &Pattern) -> TokenStream {
    let templates = pattern.templates().iter().map(generate_template);
    quote! {
        patterns::Pattern::new(vec![ #( #templates ),* ])
    }
}

fn generate_template(template: &TokenTemplate) -> TokenStream {
    match template {
        TokenTemplate::RecursionPoint => quote! {
            patterns::TokenTemplate::RecursionPoint
        },
        TokenTemplate::Literal(tok) => {
            let kind = tok.kind();
            match tok.value() {
                Some(value) => quote! {
                    patterns::TokenTemplate::exact(#kind, #value)
                },
                None => quote! {
                    patterns::TokenTemplate::literal(#kind)
                },
            }
        }
    }
}
