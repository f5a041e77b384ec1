//! Partial order over ASON values.
//!
//! Equality is the engine's structural equality. Strict ordering uses native
//! comparison when both sides are strings (bytewise) or both are numbers,
//! and set containment otherwise: `a < b` when `a` is represented in `b`.
//!
//! When the non-ASON operand cannot be converted, `==` is `false`, `!=` is
//! `true`, and the ordering operators fail with
//! [`ComparisonError::Incomparable`].

use crate::convert::convert;
use crate::engine::{self, Handle, TypeTag};
use crate::error::{ComparisonError, ConversionError};
use crate::host::HostValue;
use crate::value::Ason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// The operator that gives the same answer with the operands swapped.
    pub fn transpose(self) -> Self {
        match self {
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Le,
            op => op,
        }
    }
}

/// Compare two host values, at least one of which should be a wrapped
/// [`Ason`]. A non-ASON left operand is swapped to the right and the
/// operator transposed, so `compare(x, a, Lt) == compare(a, x, Gt)`.
pub fn compare(lhs: &HostValue, rhs: &HostValue, op: CmpOp) -> Result<bool, ComparisonError> {
    match (lhs, rhs) {
        (HostValue::Ason(this), other) => compare_value(this, other, op),
        (other, HostValue::Ason(this)) => compare_value(this, other, op.transpose()),
        _ => match convert(lhs) {
            Ok(this) => compare_value(&this, rhs, op),
            Err(err) => unconvertible(op, err),
        },
    }
}

/// Compare a wrapped value against any host value.
pub fn compare_value(this: &Ason, other: &HostValue, op: CmpOp) -> Result<bool, ComparisonError> {
    let other = match other {
        HostValue::Ason(other) => other.clone(),
        other => match convert(other) {
            Ok(converted) => converted,
            Err(err) => return unconvertible(op, err),
        },
    };
    Ok(decide(this.handle(), other.handle(), op))
}

fn unconvertible(op: CmpOp, err: ConversionError) -> Result<bool, ComparisonError> {
    match op {
        CmpOp::Eq => Ok(false),
        CmpOp::Ne => Ok(true),
        _ => Err(ComparisonError::Incomparable(err)),
    }
}

pub(crate) fn decide(a: &Handle, b: &Handle, op: CmpOp) -> bool {
    let equal = engine::structurally_equal(a, b);
    match (op, equal) {
        (CmpOp::Eq, equal) => equal,
        (CmpOp::Ne, equal) => !equal,
        (CmpOp::Le | CmpOp::Ge, true) => true,
        (CmpOp::Lt | CmpOp::Gt, true) => false,
        (CmpOp::Lt | CmpOp::Le, false) => less(a, b),
        (CmpOp::Gt | CmpOp::Ge, false) => less(b, a),
    }
}

/// Strict "less than" for two values already known to differ.
pub(crate) fn less(a: &Handle, b: &Handle) -> bool {
    match (a.type_tag(), b.type_tag()) {
        (TypeTag::String, TypeTag::String) => engine::as_str(a) < engine::as_str(b),
        (TypeTag::Numeric, TypeTag::Numeric) => engine::as_float(a) < engine::as_float(b),
        _ => engine::represented_in(a, b),
    }
}
