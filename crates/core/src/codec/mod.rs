//! Value codec.
//!
//! Converts between domain values and the store's tagged wire format.

mod attribute;
mod error;
mod keys;
mod value;
mod wire;

pub use attribute::{marshal, marshal_item, unmarshal, unmarshal_item, wire_tag};
pub use error::{CodecError, Result};
pub use keys::resolve_keys;
pub use value::{Number, Value, ValueMap};
pub use wire::{Item, WireTag, WireValue};
