//! Core schema types, type resolution and argument-vector reconstruction.
//!
//! This crate defines the toolkit-agnostic model behind argform:
//!
//! - [`Schema`]: global arguments plus zero or one level of
//!   [`SubcommandGroup`]s.
//! - [`ArgumentDescriptor`]: one normalized argument with its
//!   [`ArgumentKind`], choices, default and optional [`ValueTransformer`].
//! - [`RawParser`] / [`RawArgument`]: the action list adapters expose, which
//!   [`resolve_kind`] maps to kinds.
//! - [`FormState`]: live field values keyed by [`FieldKey`].
//! - [`serialize`]: turns a form state back into the exact token sequence
//!   the source parser expects.
//!
//! Validation ([`validate_schema`]) catches malformed tokens, duplicates and
//! custom-typed fields without transformers.
//!
//! # Example
//!
//! ```
//! use argform_core::*;
//!
//! let mut schema = Schema::new("prog");
//! schema.arguments.push(
//!     ArgumentDescriptor::option("--verbose", "verbose", ArgumentKind::Flag)
//!         .with_help("Enable verbose output"),
//! );
//! schema.subcommands.push(
//!     SubcommandGroup::new("sub1")
//!         .with_argument(ArgumentDescriptor::positional("sub1_arg", ArgumentKind::Value)),
//! );
//! assert!(validate_schema(&schema).is_empty());
//!
//! let mut state = FormState::from_defaults(&schema);
//! state.set(FieldKey::scoped("sub1", "sub1_arg"), FieldValue::text("x"));
//! state.set(FieldKey::global("verbose"), FieldValue::Bool(true));
//!
//! let argv = serialize(&schema, Some("sub1"), &state).unwrap();
//! assert_eq!(argv, vec!["sub1", "x", "--verbose"]);
//! ```

mod error;
mod raw;
mod resolve;
mod serialize;
mod state;
mod types;
mod validate;

pub use error::{SchemaError, SerializeError};
pub use raw::{PathHint, RawAction, RawArgument, RawParser, RawSubparser};
pub use resolve::{help_heuristic, resolve_kind};
pub use serialize::serialize;
pub use state::{FieldKey, FormState};
pub use types::*;
pub use validate::{ValidationError, validate_schema};
