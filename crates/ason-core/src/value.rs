//! The host-facing ASON value wrapper.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Not;

use serde_json::{Map, Value};

use crate::compare::{self, CmpOp};
use crate::convert::convert;
use crate::engine::{self, Handle, Number, Op, TypeTag};
use crate::error::{ComparisonError, ConversionError, IterationError, ParseError};
use crate::host::HostValue;
use crate::iter::Iter;

/// An immutable ASON value. Cloning copies the handle; the underlying value
/// is released when the last copy is dropped.
///
/// ```
/// use ason_core::Ason;
///
/// let small = Ason::new(vec![1, 2]).unwrap();
/// let any_pair = Ason::parse("[*, *]").unwrap();
/// assert!(small < any_pair);
/// assert_eq!(small.union(3).unwrap().to_string(), "[1, 2] | 3");
/// ```
#[derive(Clone)]
pub struct Ason {
    handle: Handle,
}

impl Ason {
    /// Convert any host value.
    pub fn new(value: impl Into<HostValue>) -> Result<Self, ConversionError> {
        convert(&value.into())
    }

    /// Read an ASON expression with no variables in scope.
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        Ok(Self::from_handle(engine::parse(expression, None)?))
    }

    pub fn universe() -> Self {
        Self::from_handle(engine::universe())
    }

    pub fn empty() -> Self {
        Self::from_handle(engine::empty())
    }

    pub fn wild() -> Self {
        Self::from_handle(engine::wild())
    }

    pub(crate) fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn into_handle(self) -> Handle {
        self.handle
    }

    pub fn type_tag(&self) -> TypeTag {
        self.handle.type_tag()
    }

    pub fn is_union(&self) -> bool {
        self.type_tag() == TypeTag::Union
    }

    pub fn is_complement(&self) -> bool {
        self.type_tag() == TypeTag::Complement
    }

    pub fn is_universe(&self) -> bool {
        self.type_tag() == TypeTag::Universe
    }

    /// Whether this is the empty set (matches nothing), not an empty container.
    pub fn is_empty(&self) -> bool {
        self.type_tag() == TypeTag::Empty
    }

    pub fn is_wild(&self) -> bool {
        self.type_tag() == TypeTag::Wild
    }

    /// `self | other`. A non-ASON operand is converted first.
    pub fn union(&self, other: impl Into<HostValue>) -> Result<Self, ConversionError> {
        self.operate(Op::Union, other.into())
    }

    /// `self & other`. A non-ASON operand is converted first.
    pub fn intersect(&self, other: impl Into<HostValue>) -> Result<Self, ConversionError> {
        self.operate(Op::Intersect, other.into())
    }

    /// `self : other`. A non-ASON operand is converted first.
    pub fn join(&self, other: impl Into<HostValue>) -> Result<Self, ConversionError> {
        self.operate(Op::Join, other.into())
    }

    fn operate(&self, op: Op, other: HostValue) -> Result<Self, ConversionError> {
        let other = match other {
            HostValue::Ason(other) => other,
            other => convert(&other)?,
        };
        let combined = engine::combine(op, &self.handle, &other.handle)?;
        Ok(Self::from_handle(combined))
    }

    pub fn complement(&self) -> Self {
        Self::from_handle(engine::complement(&self.handle))
    }

    /// Whether every value this matches is also matched by `other`.
    pub fn is_subset_of(&self, other: &Ason) -> bool {
        engine::represented_in(&self.handle, &other.handle)
    }

    pub fn compare(&self, other: impl Into<HostValue>, op: CmpOp) -> Result<bool, ComparisonError> {
        compare::compare_value(self, &other.into(), op)
    }

    pub fn iter(&self) -> Result<Iter, IterationError> {
        Iter::new(self)
    }

    /// Export a ground value (scalars, lists and closed objects of scalars)
    /// as JSON. Returns `None` if the value contains any set operator or
    /// sentinel, or a float JSON cannot hold.
    pub fn to_json(&self) -> Option<Value> {
        handle_to_json(&self.handle)
    }
}

fn handle_to_json(handle: &Handle) -> Option<Value> {
    match handle.type_tag() {
        TypeTag::Null => Some(Value::Null),
        TypeTag::Boolean => engine::as_bool(handle).map(Value::Bool),
        TypeTag::Numeric => match engine::as_number(handle)? {
            Number::Int(i) => Some(Value::from(i)),
            Number::Uint(u) => Some(Value::from(u)),
            Number::Float(f) => match integral(f) {
                Some(i) => Some(Value::from(i)),
                None => serde_json::Number::from_f64(f).map(Value::Number),
            },
        },
        TypeTag::String => engine::as_str(handle).map(|s| Value::String(s.to_owned())),
        TypeTag::List => {
            let mut items = Vec::new();
            let mut cursor = engine::iterate(handle);
            let mut more = cursor.enter();
            while more {
                items.push(handle_to_json(&cursor.value()?)?);
                more = cursor.advance();
            }
            Some(Value::Array(items))
        }
        TypeTag::Object => {
            let mut map = Map::new();
            let mut cursor = engine::iterate(handle);
            let mut more = cursor.enter();
            while more {
                let value = handle_to_json(&cursor.value()?)?;
                map.insert(cursor.key()?.to_owned(), value);
                more = cursor.advance();
            }
            Some(Value::Object(map))
        }
        _ => None,
    }
}

/// `f` as an integer when it is one exactly and fits in `i64`.
fn integral(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it does not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl Not for Ason {
    type Output = Ason;

    fn not(self) -> Ason {
        self.complement()
    }
}

impl Not for &Ason {
    type Output = Ason;

    fn not(self) -> Ason {
        self.complement()
    }
}

/// String scalars render bare, numbers render as integers when they are
/// integral, everything else uses the engine's canonical form.
impl fmt::Display for Ason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = engine::as_str(&self.handle) {
            return f.write_str(s);
        }
        match engine::as_number(&self.handle) {
            Some(Number::Int(i)) => write!(f, "{i}"),
            Some(Number::Uint(u)) => write!(f, "{u}"),
            Some(Number::Float(x)) => match integral(x) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{x}"),
            },
            None => f.write_str(&engine::print(&self.handle)),
        }
    }
}

impl fmt::Debug for Ason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ason({})", engine::print(&self.handle))
    }
}

fn ordering(a: &Handle, b: &Handle) -> Option<Ordering> {
    if engine::structurally_equal(a, b) {
        Some(Ordering::Equal)
    } else if compare::less(a, b) {
        Some(Ordering::Less)
    } else if compare::less(b, a) {
        Some(Ordering::Greater)
    } else {
        None
    }
}

impl PartialEq for Ason {
    fn eq(&self, other: &Ason) -> bool {
        engine::structurally_equal(&self.handle, &other.handle)
    }
}

impl PartialOrd for Ason {
    fn partial_cmp(&self, other: &Ason) -> Option<Ordering> {
        ordering(&self.handle, &other.handle)
    }

    fn lt(&self, other: &Ason) -> bool {
        compare::decide(&self.handle, &other.handle, CmpOp::Lt)
    }

    fn le(&self, other: &Ason) -> bool {
        compare::decide(&self.handle, &other.handle, CmpOp::Le)
    }

    fn gt(&self, other: &Ason) -> bool {
        compare::decide(&self.handle, &other.handle, CmpOp::Gt)
    }

    fn ge(&self, other: &Ason) -> bool {
        compare::decide(&self.handle, &other.handle, CmpOp::Ge)
    }
}

impl PartialEq<HostValue> for Ason {
    fn eq(&self, other: &HostValue) -> bool {
        matches!(compare::compare_value(self, other, CmpOp::Eq), Ok(true))
    }
}

impl PartialOrd<HostValue> for Ason {
    fn partial_cmp(&self, other: &HostValue) -> Option<Ordering> {
        let other = match other {
            HostValue::Ason(other) => other.clone(),
            other => convert(other).ok()?,
        };
        ordering(&self.handle, &other.handle)
    }
}

impl PartialEq<Ason> for HostValue {
    fn eq(&self, other: &Ason) -> bool {
        other == self
    }
}

impl PartialOrd<Ason> for HostValue {
    fn partial_cmp(&self, other: &Ason) -> Option<Ordering> {
        other.partial_cmp(self).map(Ordering::reverse)
    }
}
