//! Host value → ASON value conversion.
//!
//! Dispatch order, first match wins:
//!
//! 1. strings become string scalars
//! 2. booleans and null map onto the shared engine sentinels
//! 3. integers become signed scalars, or unsigned ones when they only fit
//!    as `u64`
//! 4. floats become numeric scalars
//! 5. wrapped values are copied
//! 6. lists become an exactness expression: `U` narrowed by one
//!    `[U, .., item_i, .., U]` term per position
//! 7. mappings start from `{}` and join one `{key: value}` binding per
//!    pair, so a repeated key keeps its last value
//! 8. extension objects delegate through [`ToAson`]; a returned string is
//!    read as an expression, anything else goes round the dispatch again
//!
//! A delegated expression sits one level below the delegate and may only
//! nest as deep as the remaining depth allows.
//!
//! Intermediate values are owned handles, so an error at any step drops the
//! partial accumulator before it propagates.

use log::{debug, trace};

use crate::config::BridgeConfig;
use crate::engine::{self, Handle, Op, ReadError};
use crate::error::ConversionError;
use crate::host::{HostValue, ToAson};
use crate::value::Ason;

/// Recursive converter with configurable limits.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: BridgeConfig,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn convert(&self, value: &HostValue) -> Result<Ason, ConversionError> {
        self.to_handle(value, 0).map(Ason::from_handle)
    }

    pub(crate) fn to_handle(
        &self,
        value: &HostValue,
        depth: usize,
    ) -> Result<Handle, ConversionError> {
        if depth > self.config.max_depth {
            return Err(ConversionError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        match value {
            HostValue::String(s) => Ok(engine::string(s)),
            HostValue::Bool(b) => Ok(engine::boolean(*b)),
            HostValue::Null => Ok(engine::null()),
            HostValue::Int(i) => integer(*i),
            HostValue::Float(f) => Ok(engine::float(*f)),
            HostValue::Ason(a) => Ok(a.handle().clone()),
            HostValue::List(items) => self.list(items, depth),
            HostValue::Map(pairs) => self.map(pairs, depth),
            HostValue::Extension(ext) => self.delegate(ext.as_ref(), depth),
        }
    }

    fn list(&self, items: &[HostValue], depth: usize) -> Result<Handle, ConversionError> {
        if items.is_empty() {
            return Ok(engine::empty_list());
        }
        let mut acc = engine::universe();
        let mut positions = vec![engine::universe(); items.len()];
        for (i, item) in items.iter().enumerate() {
            positions[i] = self.to_handle(item, depth + 1)?;
            let term = engine::list(positions.clone());
            acc = engine::combine_within(Op::Intersect, &acc, &term, self.config.node_limit)?;
            positions[i] = engine::universe();
        }
        Ok(acc)
    }

    fn map(
        &self,
        pairs: &[(HostValue, HostValue)],
        depth: usize,
    ) -> Result<Handle, ConversionError> {
        let mut acc = engine::empty_object();
        for (key, value) in pairs {
            let HostValue::String(key) = key else {
                return Err(ConversionError::KeyTypeError { found: key.kind() });
            };
            let value = self.to_handle(value, depth + 1)?;
            let binding = engine::object([(key.clone(), value)]);
            acc = engine::combine_within(Op::Join, &acc, &binding, self.config.node_limit)?;
        }
        Ok(acc)
    }

    fn delegate(&self, ext: &dyn ToAson, depth: usize) -> Result<Handle, ConversionError> {
        let returned = match ext.to_ason().or_else(|| ext.to_json()) {
            Some(result) => result?,
            None => {
                return Err(ConversionError::NotAsonifiable {
                    type_name: ext.type_name(),
                })
            }
        };
        debug!("{} delegated conversion to a {} value", ext.type_name(), returned.kind());
        match returned {
            HostValue::String(expression) => {
                trace!("reading delegated expression {expression:?}");
                self.read_delegated(&expression, depth + 1)
            }
            other => self.to_handle(&other, depth + 1),
        }
    }

    fn read_delegated(&self, expression: &str, depth: usize) -> Result<Handle, ConversionError> {
        let exceeded = ConversionError::DepthExceeded {
            limit: self.config.max_depth,
        };
        let Some(remaining) = self.config.max_depth.checked_sub(depth) else {
            return Err(exceeded);
        };
        match engine::parse_within(expression, None, self.config.node_limit, remaining) {
            Ok(handle) => Ok(handle),
            Err(ReadError::TooDeep { .. }) => Err(exceeded),
            Err(err) => Err(err.into()),
        }
    }
}

fn integer(value: i128) -> Result<Handle, ConversionError> {
    if let Ok(i) = i64::try_from(value) {
        Ok(engine::int(i))
    } else if let Ok(u) = u64::try_from(value) {
        Ok(engine::uint(u))
    } else {
        Err(ConversionError::NotRepresentable {
            value: value.to_string(),
        })
    }
}

/// Convert with the default limits.
pub fn convert(value: &HostValue) -> Result<Ason, ConversionError> {
    Converter::default().convert(value)
}
