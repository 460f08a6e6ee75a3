//! Proc macro for deriving pattern libraries from pattern notation.
//!
//! ```ignore
//! #[derive(Patterns)]
//! #[patterns_file = "expressions.patterns"]
//! pub struct ExpressionPatterns;
//! ```
//!
//! The notation is parsed at compile time; problems with it are reported as
//! compile errors on the deriving type.

use syn::{parse_macro_input, DeriveInput};

mod error;
mod generate;

#[proc_macro_derive(Patterns, attributes(patterns_file, patterns_inline))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    generate::generate(ast).into()
}
