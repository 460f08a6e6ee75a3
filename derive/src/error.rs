use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, DeriveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    MissingPatternSource,
    MultiplePatternSources,
    Notation(String),
    Other(String),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DeriveError::MissingPatternSource => write!(f, "No pattern source provided"),
            DeriveError::MultiplePatternSources => {
                write!(f, "At most one pattern source can be provided")
            }
            DeriveError::Notation(ref s) => write!(f, "Invalid pattern notation: {}", s),
            DeriveError::Other(ref s) => write!(f, "Derive error: {}", s),
        }
    }
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::Other(format!("syn error: {}", e))
    }
}

impl From<patterns::Error> for DeriveError {
    fn from(e: patterns::Error) -> DeriveError {
        DeriveError::Notation(e.to_string())
    }
}
