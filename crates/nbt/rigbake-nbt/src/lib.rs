//! rigbake-nbt: typed structured-data literals and their textual (SNBT) encoding.
//!
//! The tree is pure data. Rendering is deterministic: compound keys keep insertion order,
//! strings are always quoted and numeric tags carry their type suffix.

pub mod compound;
pub mod list;
pub mod snbt;
pub mod value;

pub use compound::NbtCompound;
pub use list::NbtList;
pub use snbt::{escape_string, quote_key};
pub use value::{Nbt, NbtKind};
