//! Schema extraction from parser definitions.
//!
//! This crate turns an existing parser definition into a normalized
//! [`Schema`]. Each supported parser dialect is an adapter implementing
//! [`SchemaSource`] (enumerate the raw action list) and [`ParseEntry`]
//! (consume a reconstructed argument vector):
//!
//! - [`ClapSource`]: walks an existing [`clap::Command`].
//! - [`DefinitionSource`]: reads a declarative JSON/YAML definition document
//!   and builds the equivalent [`clap::Command`].
//!
//! Both share the normalization in [`extract_schema`]: help actions are
//! stripped, declaration order is preserved, version actions become
//! [`ArgumentKind::Display`](argform_core::ArgumentKind::Display) descriptors
//! and sub-parsers nested deeper than one level are rejected.
//!
//! # Example
//!
//! ```
//! use argform_core::ArgumentKind;
//! use argform_extract::{ClapSource, SchemaSource};
//! use clap::{Arg, ArgAction, Command};
//!
//! let command = Command::new("prog")
//!     .arg(Arg::new("verbose").short('v').action(ArgAction::Count))
//!     .arg(Arg::new("infile").help("path to the input file"));
//!
//! let schema = ClapSource::new(command).extract().unwrap();
//! let kinds: Vec<_> = schema.arguments.iter().map(|a| a.kind).collect();
//! assert_eq!(kinds, vec![ArgumentKind::Counting, ArgumentKind::FilePath]);
//! ```

pub mod clap_source;
pub mod definition;
pub mod normalize;
pub mod output;

pub use clap_source::ClapSource;
pub use definition::{DefinitionDocument, DefinitionSource, TransformerRegistry};
pub use normalize::{extract_schema, normalize_argument};
pub use output::{OutputFormat, format_schema};

use argform_core::{RawParser, Schema, SchemaError};

/// A parser definition whose actions can be enumerated.
pub trait SchemaSource {
    /// Enumerates the parser's actions, including help and version actions.
    fn describe(&self) -> Result<RawParser, SchemaError>;

    /// Describes the parser and normalizes the result into a [`Schema`].
    fn extract(&self) -> Result<Schema, SchemaError> {
        extract_schema(self.describe()?)
    }
}

/// The parse entry point of a parser definition.
pub trait ParseEntry {
    /// Parsed result handed back to the caller.
    type Output;
    /// Error reported by the parser; propagated unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parses an argument vector (without the program name).
    fn parse_tokens(&self, tokens: &[String]) -> Result<Self::Output, Self::Error>;

    /// Runs the parser with `token` alone and captures what a
    /// display-and-exit action would have printed, without exiting.
    fn capture_display(&self, token: &str) -> Option<String>;
}
