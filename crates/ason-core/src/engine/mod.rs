//! ASON engine boundary.
//!
//! Everything the bridge layer needs from the expression engine goes through
//! this module: scalar constructors, the process-wide sentinels, the combine
//! operators, containment and equality checks, structural cursors, the
//! canonical printer and the expression reader.
//!
//! Values are immutable trees behind a [`Handle`]. Cloning a handle is the
//! engine's "copy" (a reference count bump) and dropping it is "release", so
//! a handle is freed exactly once on every exit path, error paths included.
//!
//! # Example
//! ```
//! use ason_core::engine::{self, Op, TypeTag};
//!
//! let one = engine::int(1);
//! let two = engine::int(2);
//! let either = engine::combine(Op::Union, &one, &two).unwrap();
//! assert_eq!(engine::type_tag(&either), TypeTag::Union);
//! assert!(engine::represented_in(&one, &either));
//! assert_eq!(engine::print(&either), "1 | 2");
//! ```

mod algebra;
mod cursor;
mod print;
mod read;

use std::fmt;
use std::sync::Arc;

use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

pub use algebra::{represented_in, structurally_equal};
pub use cursor::Cursor;
pub use print::print;
pub use read::{is_identifier, parse, parse_within, ReadError, Scope};

/// Largest value, in nodes, a combine operation may produce.
pub const DEFAULT_NODE_LIMIT: usize = 1 << 20;

/// Deepest nesting the reader and converter accept.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Discriminant of an ASON value. Never changes for the lifetime of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeTag {
    Null,
    Boolean,
    Numeric,
    String,
    List,
    Object,
    UniversalObject,
    Union,
    Complement,
    Wild,
    Universe,
    Empty,
}

/// Numeric scalar payload. Integers keep their signedness so they print and
/// export without going through a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    fn as_i128(self) -> Option<i128> {
        match self {
            Number::Int(i) => Some(i128::from(i)),
            Number::Uint(u) => Some(i128::from(u)),
            Number::Float(_) => None,
        }
    }

    /// Numeric equality across representations: `1`, `1u` and `1.0` are equal.
    pub(crate) fn same(self, other: Number) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

/// Errors raised by the engine's combine operators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The result would exceed the node budget (unions distributed over
    /// intersections can grow exponentially).
    #[error("value exceeds the engine budget of {limit} nodes")]
    Exhausted { limit: usize },
}

/// Binary combine operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `a | b`
    Union,
    /// `a & b`
    Intersect,
    /// `a : b` (object overlay, list concatenation)
    Join,
}

/// Value tree. Object fields are kept sorted by key with unique keys.
#[derive(Debug)]
pub(crate) enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Handle>),
    Object(Vec<(String, Handle)>),
    OpenObject(Vec<(String, Handle)>),
    Union(Vec<Handle>),
    Complement(Handle),
    Wild,
    Universe,
    Empty,
}

struct Inner {
    node: Node,
    size: usize,
}

/// Owned, reference-counted reference to an immutable ASON value.
#[derive(Clone)]
pub struct Handle(Arc<Inner>);

impl Handle {
    pub(crate) fn new(node: Node) -> Self {
        let children: usize = match &node {
            Node::List(items) | Node::Union(items) => items.iter().map(Handle::size).sum(),
            Node::Object(fields) | Node::OpenObject(fields) => {
                fields.iter().map(|(_, v)| v.size()).sum()
            }
            Node::Complement(inner) => inner.size(),
            _ => 0,
        };
        Handle(Arc::new(Inner {
            node,
            size: 1 + children,
        }))
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0.node
    }

    /// Number of nodes in this value.
    pub fn size(&self) -> usize {
        self.0.size
    }

    /// Whether two handles refer to the very same engine allocation.
    pub fn ptr_eq(a: &Handle, b: &Handle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn type_tag(&self) -> TypeTag {
        match self.node() {
            Node::Null => TypeTag::Null,
            Node::Bool(_) => TypeTag::Boolean,
            Node::Number(_) => TypeTag::Numeric,
            Node::String(_) => TypeTag::String,
            Node::List(_) => TypeTag::List,
            Node::Object(_) => TypeTag::Object,
            Node::OpenObject(_) => TypeTag::UniversalObject,
            Node::Union(_) => TypeTag::Union,
            Node::Complement(_) => TypeTag::Complement,
            Node::Wild => TypeTag::Wild,
            Node::Universe => TypeTag::Universe,
            Node::Empty => TypeTag::Empty,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self))
    }
}

static NULL: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Null));
static TRUE: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Bool(true)));
static FALSE: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Bool(false)));
static WILD: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Wild));
static UNIVERSE: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Universe));
static EMPTY: Lazy<Handle> = Lazy::new(|| Handle::new(Node::Empty));

pub fn null() -> Handle {
    NULL.clone()
}

pub fn boolean(value: bool) -> Handle {
    if value {
        TRUE.clone()
    } else {
        FALSE.clone()
    }
}

/// Matches exactly one arbitrary value.
pub fn wild() -> Handle {
    WILD.clone()
}

/// Matches everything.
pub fn universe() -> Handle {
    UNIVERSE.clone()
}

/// Matches nothing.
pub fn empty() -> Handle {
    EMPTY.clone()
}

pub fn int(value: i64) -> Handle {
    Handle::new(Node::Number(Number::Int(value)))
}

pub fn uint(value: u64) -> Handle {
    Handle::new(Node::Number(Number::Uint(value)))
}

pub fn float(value: f64) -> Handle {
    Handle::new(Node::Number(Number::Float(value)))
}

pub fn string(value: &str) -> Handle {
    Handle::new(Node::String(value.to_owned()))
}

pub fn empty_list() -> Handle {
    Handle::new(Node::List(Vec::new()))
}

pub fn empty_object() -> Handle {
    Handle::new(Node::Object(Vec::new()))
}

/// A list of exactly `items.len()` positions. A position that matches
/// nothing makes the whole list match nothing.
pub fn list(items: Vec<Handle>) -> Handle {
    if items.iter().any(|h| matches!(h.node(), Node::Empty)) {
        return empty();
    }
    Handle::new(Node::List(items))
}

/// A closed object with exactly the given keys. Later duplicates win.
pub fn object(fields: impl IntoIterator<Item = (String, Handle)>) -> Handle {
    build_object(fields, false)
}

/// An object with at least the given keys (`{"k": v, *}`).
pub fn open_object(fields: impl IntoIterator<Item = (String, Handle)>) -> Handle {
    build_object(fields, true)
}

fn build_object(fields: impl IntoIterator<Item = (String, Handle)>, open: bool) -> Handle {
    let sorted = sort_fields(fields);
    if sorted.iter().any(|(_, v)| matches!(v.node(), Node::Empty)) {
        return empty();
    }
    if open {
        Handle::new(Node::OpenObject(sorted))
    } else {
        Handle::new(Node::Object(sorted))
    }
}

pub(crate) fn sort_fields(
    fields: impl IntoIterator<Item = (String, Handle)>,
) -> Vec<(String, Handle)> {
    let mut sorted: Vec<(String, Handle)> = Vec::new();
    for (key, value) in fields {
        match sorted.binary_search_by(|(k, _)| k.as_str().cmp(&key)) {
            Ok(i) => sorted[i].1 = value,
            Err(i) => sorted.insert(i, (key, value)),
        }
    }
    sorted
}

/// Combine two values with the default node budget.
pub fn combine(op: Op, a: &Handle, b: &Handle) -> Result<Handle, EngineError> {
    combine_within(op, a, b, DEFAULT_NODE_LIMIT)
}

/// Combine two values, failing once the result would exceed `limit` nodes.
pub fn combine_within(
    op: Op,
    a: &Handle,
    b: &Handle,
    limit: usize,
) -> Result<Handle, EngineError> {
    let budget = algebra::Budget::new(limit);
    let result = match op {
        Op::Union => algebra::union(a, b, &budget),
        Op::Intersect => algebra::intersect(a, b, &budget),
        Op::Join => algebra::join(a, b, &budget),
    }
    .and_then(|value| budget.check(value));
    if let Err(EngineError::Exhausted { limit }) = &result {
        warn!(
            "{op:?} of {} and {} node values exceeded budget of {limit}",
            a.size(),
            b.size()
        );
    }
    result
}

/// `!a`. Never exceeds a budget the operand fit in by more than one node.
pub fn complement(value: &Handle) -> Handle {
    algebra::complement(value)
}

pub fn type_tag(value: &Handle) -> TypeTag {
    value.type_tag()
}

pub fn as_str(value: &Handle) -> Option<&str> {
    match value.node() {
        Node::String(s) => Some(s),
        _ => None,
    }
}

pub fn as_bool(value: &Handle) -> Option<bool> {
    match value.node() {
        Node::Bool(b) => Some(*b),
        _ => None,
    }
}

pub fn as_number(value: &Handle) -> Option<Number> {
    match value.node() {
        Node::Number(n) => Some(*n),
        _ => None,
    }
}

/// Signed integer view of a numeric scalar, if it has one.
pub fn as_int(value: &Handle) -> Option<i64> {
    match as_number(value)? {
        Number::Int(i) => Some(i),
        Number::Uint(u) => i64::try_from(u).ok(),
        Number::Float(_) => None,
    }
}

pub fn as_float(value: &Handle) -> Option<f64> {
    as_number(value).map(Number::as_f64)
}

/// Start a structural walk over the children of a list, object or union.
/// Any other value yields a cursor with no children.
pub fn iterate(value: &Handle) -> Cursor {
    Cursor::new(value.clone())
}
