//! # Supermodel Fields
//!
//! Field codec registry.
//!
//! This crate provides:
//! - The [`FieldHandler`] read/write contract
//! - [`FieldRegistry`], mapping element tags to handlers
//! - Built-in handlers for text, numeric, boolean, choice, collection and
//!   object fields, plus a verbatim [`CustomHandler`](builtin::CustomHandler)

pub mod builtin;
pub mod handler;
pub mod registry;

pub use builtin::{
    BoolHandler, ChoiceHandler, CollectionHandler, CustomHandler, FloatHandler, IntHandler,
    ObjectHandler, TextHandler,
};
pub use handler::{FieldHandler, FnHandler};
pub use registry::{BUILTIN_TAGS, FieldRegistry};
