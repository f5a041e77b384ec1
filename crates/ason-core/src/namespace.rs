//! Variable bindings for a single expression read.
//!
//! A [`Namespace`] is filled with [`Namespace::bind`] and consumed by
//! [`Namespace::resolve`], so its bindings are released when that read
//! finishes whether it succeeds or not, and never leak into another read.

use std::collections::HashMap;

use log::{debug, trace};

use crate::convert::Converter;
use crate::engine::{self, Handle, Scope};
use crate::error::{BindError, ParseError};
use crate::host::HostValue;
use crate::value::Ason;

#[derive(Debug, Default)]
pub struct Namespace {
    bindings: HashMap<String, Handle>,
    converter: Converter,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A namespace whose bound values are converted with `converter`.
    pub fn with_converter(converter: Converter) -> Self {
        Self {
            bindings: HashMap::new(),
            converter,
        }
    }

    /// Convert `value` and make it visible as `name`. Rebinding a name
    /// replaces the earlier value.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        value: impl Into<HostValue>,
    ) -> Result<(), BindError> {
        let name = name.into();
        if !engine::is_identifier(&name) {
            return Err(BindError::InvalidName(name));
        }
        let handle = self.converter.to_handle(&value.into(), 0)?;
        trace!("binding '{name}' to {handle:?}");
        self.bindings.insert(name, handle);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Read `expression` with the bound variables in scope, then release
    /// the namespace.
    pub fn resolve(self, expression: &str) -> Result<Ason, ParseError> {
        let config = self.converter.config();
        let result = engine::parse_within(
            expression,
            Some(&self as &dyn Scope),
            config.node_limit,
            config.max_depth,
        );
        debug!("releasing namespace with {} bindings", self.bindings.len());
        Ok(Ason::from_handle(result?))
    }
}

impl Scope for Namespace {
    fn lookup(&self, name: &str) -> Option<Handle> {
        self.bindings.get(name).cloned()
    }
}

/// Bind every pair, then read `expression` against them.
///
/// ```
/// use ason_core::parse_with;
///
/// let value = parse_with("[x, y]", [("x", 1), ("y", 2)]).unwrap();
/// assert_eq!(value.to_string(), "[1, 2]");
/// ```
pub fn parse_with<I, K, V>(expression: &str, bindings: I) -> Result<Ason, ParseError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<HostValue>,
{
    let mut namespace = Namespace::new();
    for (name, value) in bindings {
        namespace.bind(name, value)?;
    }
    namespace.resolve(expression)
}
