//! Nbt: one node of a structured-data literal tree.

use serde::{Deserialize, Serialize};

use crate::compound::NbtCompound;
use crate::list::NbtList;

/// Coarse tag kind, used to keep list elements homogeneous.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NbtKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    List,
    Compound,
    ByteArray,
    IntArray,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Nbt {
    /// 8-bit integer, rendered with a `b` suffix (booleans are bytes).
    Byte(i8),

    /// 16-bit integer, `s` suffix.
    Short(i16),

    /// 32-bit integer, no suffix.
    Int(i32),

    /// 64-bit integer, `L` suffix.
    Long(i64),

    /// 32-bit float, `f` suffix.
    Float(f32),

    /// 64-bit float, `d` suffix.
    Double(f64),

    /// Quoted string.
    String(String),

    /// Homogeneous ordered list.
    List(NbtList),

    /// Insertion-ordered map.
    Compound(NbtCompound),

    ByteArray(Vec<i8>),

    IntArray(Vec<i32>),
}

impl Nbt {
    #[inline]
    pub fn kind(&self) -> NbtKind {
        match self {
            Nbt::Byte(_) => NbtKind::Byte,
            Nbt::Short(_) => NbtKind::Short,
            Nbt::Int(_) => NbtKind::Int,
            Nbt::Long(_) => NbtKind::Long,
            Nbt::Float(_) => NbtKind::Float,
            Nbt::Double(_) => NbtKind::Double,
            Nbt::String(_) => NbtKind::String,
            Nbt::List(_) => NbtKind::List,
            Nbt::Compound(_) => NbtKind::Compound,
            Nbt::ByteArray(_) => NbtKind::ByteArray,
            Nbt::IntArray(_) => NbtKind::IntArray,
        }
    }

    /// Boolean as the target encodes it (`1b` / `0b`).
    pub fn boolean(v: bool) -> Self {
        Nbt::Byte(i8::from(v))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Nbt::String(s.into())
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Nbt::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&NbtList> {
        match self {
            Nbt::List(l) => Some(l),
            _ => None,
        }
    }

    /// Integer view of any integral tag.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Nbt::Byte(v) => Some(i64::from(*v)),
            Nbt::Short(v) => Some(i64::from(*v)),
            Nbt::Int(v) => Some(i64::from(*v)),
            Nbt::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Nbt::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i8> for Nbt {
    fn from(v: i8) -> Self {
        Nbt::Byte(v)
    }
}

impl From<i16> for Nbt {
    fn from(v: i16) -> Self {
        Nbt::Short(v)
    }
}

impl From<i32> for Nbt {
    fn from(v: i32) -> Self {
        Nbt::Int(v)
    }
}

impl From<i64> for Nbt {
    fn from(v: i64) -> Self {
        Nbt::Long(v)
    }
}

impl From<f32> for Nbt {
    fn from(v: f32) -> Self {
        Nbt::Float(v)
    }
}

impl From<f64> for Nbt {
    fn from(v: f64) -> Self {
        Nbt::Double(v)
    }
}

impl From<bool> for Nbt {
    fn from(v: bool) -> Self {
        Nbt::boolean(v)
    }
}

impl From<&str> for Nbt {
    fn from(v: &str) -> Self {
        Nbt::String(v.to_string())
    }
}

impl From<String> for Nbt {
    fn from(v: String) -> Self {
        Nbt::String(v)
    }
}

impl From<NbtList> for Nbt {
    fn from(v: NbtList) -> Self {
        Nbt::List(v)
    }
}

impl From<NbtCompound> for Nbt {
    fn from(v: NbtCompound) -> Self {
        Nbt::Compound(v)
    }
}
