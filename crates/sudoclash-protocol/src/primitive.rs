//! Primitive codecs: one stateless read/write pair per wire type.
//!
//! A [`FieldKind`] names a wire type; a [`Value`] is what a payload holds.
//! Values are deliberately wider than their wire types (`i64`, `f64`) so an
//! out-of-range number is caught here, at encode time, instead of being
//! silently truncated by a cast somewhere upstream.
//!
//! | Kind    | Width      | Accepted `Value`                    |
//! |---------|------------|-------------------------------------|
//! | `Bool`  | 1          | `Bool`                              |
//! | `Byte`  | 1          | `Int` in `0..=255`                  |
//! | `SByte` | 1          | `Int` in `i8` range                 |
//! | `Short` | 2          | `Int` in `i16` range                |
//! | `Int`   | 4          | `Int` in `i32` range                |
//! | `UInt`  | 4          | `Int` in `u32` range                |
//! | `Float` | 4          | finite `Float` within `f32` range   |
//! | `Str`   | 2 + len    | `Str` of at most 65 535 bytes       |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ByteBuffer, ProtocolError};

/// A wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    Byte,
    SByte,
    Short,
    Int,
    UInt,
    Float,
    Str,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Short => "short",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Str => "string",
        };
        f.write_str(name)
    }
}

/// A field value inside a [`Payload`](crate::Payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Int(v.into())
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(v.into())
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl FieldKind {
    /// Smallest number of bytes this kind can occupy on the wire.
    pub fn min_width(self) -> usize {
        match self {
            Self::Bool | Self::Byte | Self::SByte => 1,
            Self::Short | Self::Str => 2,
            Self::Int | Self::UInt | Self::Float => 4,
        }
    }

    /// Exact number of bytes `value` will occupy when written as this kind.
    pub fn encoded_len(self, value: &Value) -> usize {
        match (self, value) {
            (Self::Str, Value::Str(s)) => 2 + s.len(),
            _ => self.min_width(),
        }
    }

    /// Returns `true` if `value` has the right variant for this kind.
    /// Range is not checked here; [`write`](Self::write) does that.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (
                    Self::Byte | Self::SByte | Self::Short | Self::Int | Self::UInt,
                    Value::Int(_)
                )
                | (Self::Float, Value::Float(_))
                | (Self::Str, Value::Str(_))
        )
    }

    /// Writes `value` at the buffer cursor.
    pub fn write(self, buf: &mut ByteBuffer, value: &Value) -> Result<(), ProtocolError> {
        match (self, value) {
            (Self::Bool, Value::Bool(b)) => buf.write_u8(u8::from(*b), None),
            (Self::Byte, Value::Int(v)) => buf.write_u8(narrow(*v, self)?, None),
            (Self::SByte, Value::Int(v)) => buf.write_i8(narrow(*v, self)?, None),
            (Self::Short, Value::Int(v)) => buf.write_i16(narrow(*v, self)?, None),
            (Self::Int, Value::Int(v)) => buf.write_i32(narrow(*v, self)?, None),
            (Self::UInt, Value::Int(v)) => buf.write_u32(narrow(*v, self)?, None),
            (Self::Float, Value::Float(v)) => {
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(ProtocolError::Encoding(format!(
                        "{v} is outside the float range"
                    )));
                }
                buf.write_f32(*v as f32, None)
            }
            (Self::Str, Value::Str(s)) => buf.write_string(s, None),
            (kind, other) => Err(ProtocolError::Encoding(format!(
                "{other:?} cannot be written as {kind}"
            ))),
        }
    }

    /// Reads one value of this kind at the buffer cursor.
    pub fn read(self, buf: &mut ByteBuffer) -> Result<Value, ProtocolError> {
        let value = match self {
            Self::Bool => match buf.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => {
                    return Err(ProtocolError::Malformed {
                        field: "bool",
                        reason: format!("{other} is not a bool"),
                    });
                }
            },
            Self::Byte => buf.read_u8()?.into(),
            Self::SByte => i64::from(buf.read_i8()?).into(),
            Self::Short => buf.read_i16()?.into(),
            Self::Int => buf.read_i32()?.into(),
            Self::UInt => buf.read_u32()?.into(),
            Self::Float => buf.read_f32()?.into(),
            Self::Str => buf.read_string()?.into(),
        };
        Ok(value)
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, kind: FieldKind) -> Result<T, ProtocolError> {
    T::try_from(value)
        .map_err(|_| ProtocolError::Encoding(format!("{value} does not fit in a {kind}")))
}
