//! Host-side dynamic values and the `ToAson` capability.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ConversionError;
use crate::value::Ason;

/// Capability for host types that know how to describe themselves as ASON.
///
/// Both methods default to `None`, meaning "not offered". The converter
/// calls `to_ason` first and falls back to `to_json`. A returned
/// [`HostValue::String`] is read as an ASON expression, not as a string
/// scalar; any other returned value is converted in turn.
///
/// ```
/// use ason_core::{convert, HostValue, ToAson};
/// use ason_core::error::ConversionError;
///
/// struct Port(u16);
///
/// impl ToAson for Port {
///     fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
///         Some(Ok(HostValue::from(self.0)))
///     }
/// }
///
/// let port = convert(&HostValue::extension(Port(8080))).unwrap();
/// assert_eq!(port.to_string(), "8080");
/// ```
pub trait ToAson: Send + Sync {
    fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
        None
    }

    fn to_json(&self) -> Option<Result<HostValue, ConversionError>> {
        None
    }

    /// Name reported when neither method is offered.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// A value from the host's dynamic type system.
///
/// Mapping keys are themselves host values so that non-string keys and
/// duplicate keys can be expressed; the converter rejects the former and
/// lets the last of the latter win.
#[derive(Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
    List(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    Ason(Ason),
    Extension(Arc<dyn ToAson>),
}

impl HostValue {
    /// Build a mapping from key/value pairs, preserving duplicates.
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<HostValue>,
        V: Into<HostValue>,
    {
        HostValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn extension<T: ToAson + 'static>(value: T) -> Self {
        HostValue::Extension(Arc::new(value))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::String(_) => "str",
            HostValue::List(_) => "list",
            HostValue::Map(_) => "map",
            HostValue::Ason(_) => "ason",
            HostValue::Extension(_) => "extension",
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("Null"),
            HostValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            HostValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            HostValue::Float(x) => f.debug_tuple("Float").field(x).finish(),
            HostValue::String(s) => f.debug_tuple("String").field(s).finish(),
            HostValue::List(items) => f.debug_tuple("List").field(items).finish(),
            HostValue::Map(pairs) => f.debug_tuple("Map").field(pairs).finish(),
            HostValue::Ason(a) => f.debug_tuple("Ason").field(a).finish(),
            HostValue::Extension(ext) => write!(f, "Extension(<{}>)", ext.type_name()),
        }
    }
}

impl From<()> for HostValue {
    fn from(_: ()) -> Self {
        HostValue::Null
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HostValue {
                fn from(value: $t) -> Self {
                    HostValue::Int(i128::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<usize> for HostValue {
    fn from(value: usize) -> Self {
        HostValue::Int(value as i128)
    }
}

impl From<f32> for HostValue {
    fn from(value: f32) -> Self {
        HostValue::Float(f64::from(value))
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Null, Into::into)
    }
}

impl From<Ason> for HostValue {
    fn from(value: Ason) -> Self {
        HostValue::Ason(value)
    }
}

impl From<&Ason> for HostValue {
    fn from(value: &Ason) -> Self {
        HostValue::Ason(value.clone())
    }
}

/// JSON documents map onto host values directly: numbers become `Int`
/// when they are integral and `Float` otherwise.
impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    HostValue::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    HostValue::Int(i128::from(u))
                } else {
                    HostValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => HostValue::String(s),
            Value::Array(items) => HostValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => HostValue::Map(
                map.into_iter()
                    .map(|(k, v)| (HostValue::String(k), v.into()))
                    .collect(),
            ),
        }
    }
}
