//! Built-in field handlers.

pub mod attrs;
mod boolean;
mod choice;
mod collection;
mod custom;
mod numeric;
mod object;
mod text;

pub use boolean::BoolHandler;
pub use choice::ChoiceHandler;
pub use collection::CollectionHandler;
pub use custom::CustomHandler;
pub use numeric::{FloatHandler, IntHandler};
pub use object::ObjectHandler;
pub use text::TextHandler;
