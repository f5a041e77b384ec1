//! Set algebra over value trees: union, intersection, join, complement,
//! containment and structural equality.
//!
//! Results are kept in a reduced form so that no intersection or join node
//! ever appears in a value:
//!
//! - **Union** flattens nested unions, drops members subsumed by another
//!   member, and collapses to `U` when any member is `U`.
//! - **Intersection** distributes over unions, reduces equal-length lists
//!   position by position and objects key by key, and collapses mismatched
//!   kinds to `∅`. When a complement is involved and the answer cannot be
//!   decided locally it falls back to `!(!a | c)`.
//! - **Join** overlays objects (right side wins) and concatenates lists.

use log::trace;

use super::{empty, universe, EngineError, Handle, Node, DEFAULT_NODE_LIMIT};

/// Node budget for a single combine call.
pub(crate) struct Budget {
    limit: usize,
}

impl Budget {
    pub(crate) fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub(crate) fn check(&self, value: Handle) -> Result<Handle, EngineError> {
        if value.size() > self.limit {
            Err(EngineError::Exhausted { limit: self.limit })
        } else {
            Ok(value)
        }
    }
}

type Fields = Vec<(String, Handle)>;

pub(crate) fn union(a: &Handle, b: &Handle, budget: &Budget) -> Result<Handle, EngineError> {
    match (a.node(), b.node()) {
        (Node::Empty, _) => return Ok(b.clone()),
        (_, Node::Empty) => return Ok(a.clone()),
        (Node::Universe, _) | (_, Node::Universe) => return Ok(universe()),
        _ => {}
    }
    let mut members = Vec::new();
    for member in alternatives(a).iter().chain(alternatives(b)) {
        push_alternative(&mut members, member, budget);
    }
    build_union(members, budget)
}

fn alternatives(value: &Handle) -> &[Handle] {
    match value.node() {
        Node::Union(members) => members,
        _ => std::slice::from_ref(value),
    }
}

fn push_alternative(members: &mut Vec<Handle>, candidate: &Handle, budget: &Budget) {
    if matches!(candidate.node(), Node::Empty) {
        return;
    }
    if members.iter().any(|m| contained(candidate, m, budget)) {
        return;
    }
    members.retain(|m| !contained(m, candidate, budget));
    members.push(candidate.clone());
}

fn build_union(mut members: Vec<Handle>, budget: &Budget) -> Result<Handle, EngineError> {
    if members.iter().any(|m| matches!(m.node(), Node::Universe)) {
        return Ok(universe());
    }
    match members.len() {
        0 => Ok(empty()),
        1 => Ok(members.remove(0)),
        _ => budget.check(Handle::new(Node::Union(members))),
    }
}

/// Apply `op` to every alternative of `value` and union the pieces.
fn distribute<F>(value: &Handle, mut op: F, budget: &Budget) -> Result<Handle, EngineError>
where
    F: FnMut(&Handle) -> Result<Handle, EngineError>,
{
    let mut members = Vec::new();
    let mut size = 0;
    for alternative in alternatives(value) {
        let piece = op(alternative)?;
        for member in alternatives(&piece) {
            size += member.size();
            if size > budget.limit {
                return Err(EngineError::Exhausted {
                    limit: budget.limit,
                });
            }
            push_alternative(&mut members, member, budget);
        }
    }
    build_union(members, budget)
}

pub(crate) fn intersect(a: &Handle, b: &Handle, budget: &Budget) -> Result<Handle, EngineError> {
    match (a.node(), b.node()) {
        (Node::Empty, _) | (_, Node::Empty) => Ok(empty()),
        (Node::Universe, _) => Ok(b.clone()),
        (_, Node::Universe) => Ok(a.clone()),
        (Node::Union(_), _) => distribute(a, |m| intersect(m, b, budget), budget),
        (_, Node::Union(_)) => distribute(b, |m| intersect(a, m, budget), budget),
        (Node::Wild, _) => Ok(b.clone()),
        (_, Node::Wild) => Ok(a.clone()),
        (Node::Complement(c), Node::Complement(d)) => Ok(complement(&union(c, d, budget)?)),
        (Node::Complement(c), _) => restrict(b, c, budget),
        (_, Node::Complement(c)) => restrict(a, c, budget),
        (Node::List(xs), Node::List(ys)) => {
            if xs.len() != ys.len() {
                return Ok(empty());
            }
            let mut items = Vec::with_capacity(xs.len());
            for (x, y) in xs.iter().zip(ys) {
                let item = intersect(x, y, budget)?;
                if matches!(item.node(), Node::Empty) {
                    return Ok(empty());
                }
                items.push(item);
            }
            budget.check(Handle::new(Node::List(items)))
        }
        (Node::Object(xs), Node::Object(ys)) => {
            if xs.len() != ys.len() || xs.iter().zip(ys).any(|((k, _), (j, _))| k != j) {
                return Ok(empty());
            }
            intersect_fields(xs, ys, false, budget)
        }
        (Node::Object(closed), Node::OpenObject(open))
        | (Node::OpenObject(open), Node::Object(closed)) => {
            if open.iter().any(|(k, _)| field(closed, k).is_none()) {
                return Ok(empty());
            }
            intersect_fields(closed, open, false, budget)
        }
        (Node::OpenObject(xs), Node::OpenObject(ys)) => intersect_fields(xs, ys, true, budget),
        _ => Ok(if scalar_equal(a, b) { a.clone() } else { empty() }),
    }
}

/// Keywise intersection. Keys present on one side only keep that side's value.
fn intersect_fields(
    xs: &Fields,
    ys: &Fields,
    open: bool,
    budget: &Budget,
) -> Result<Handle, EngineError> {
    let mut out: Fields = Vec::with_capacity(xs.len().max(ys.len()));
    for (key, x) in xs {
        let value = match field(ys, key) {
            Some(y) => intersect(x, y, budget)?,
            None => x.clone(),
        };
        if matches!(value.node(), Node::Empty) {
            return Ok(empty());
        }
        out.push((key.clone(), value));
    }
    for (key, y) in ys {
        if field(xs, key).is_none() {
            out.push((key.clone(), y.clone()));
        }
    }
    out.sort_by(|(a, _), (b, _)| a.cmp(b));
    let node = if open {
        Node::OpenObject(out)
    } else {
        Node::Object(out)
    };
    budget.check(Handle::new(node))
}

/// `value & !excluded`
fn restrict(value: &Handle, excluded: &Handle, budget: &Budget) -> Result<Handle, EngineError> {
    if contained(value, excluded, budget) {
        return Ok(empty());
    }
    if is_ground(value) || disjoint(value, excluded, budget) {
        return Ok(value.clone());
    }
    let negated = union(&complement(value), excluded, budget)?;
    Ok(complement(&negated))
}

/// Whether `a & b` is empty. Running out of budget answers `false`, which
/// only ever leaves a containment check unproven or an intersection in its
/// symbolic `!(!a | c)` form.
fn disjoint(a: &Handle, b: &Handle, budget: &Budget) -> bool {
    match intersect(a, b, budget) {
        Ok(meet) => matches!(meet.node(), Node::Empty),
        Err(EngineError::Exhausted { limit }) => {
            trace!("disjointness check gave up at {limit} nodes");
            false
        }
    }
}

pub(crate) fn join(a: &Handle, b: &Handle, budget: &Budget) -> Result<Handle, EngineError> {
    match (a.node(), b.node()) {
        (Node::Empty, _) | (_, Node::Empty) => Ok(empty()),
        (Node::Union(_), _) => distribute(a, |m| join(m, b, budget), budget),
        (_, Node::Union(_)) => distribute(b, |m| join(a, m, budget), budget),
        (Node::List(xs), Node::List(ys)) => {
            let items = xs.iter().chain(ys).cloned().collect();
            budget.check(Handle::new(Node::List(items)))
        }
        (Node::Object(xs), Node::Object(ys)) => overlay(xs, ys, false, budget),
        (Node::Object(xs) | Node::OpenObject(xs), Node::Object(ys) | Node::OpenObject(ys)) => {
            overlay(xs, ys, true, budget)
        }
        _ => Ok(empty()),
    }
}

fn overlay(
    base: &Fields,
    top: &Fields,
    open: bool,
    budget: &Budget,
) -> Result<Handle, EngineError> {
    let merged = super::sort_fields(base.iter().chain(top).cloned());
    let node = if open {
        Node::OpenObject(merged)
    } else {
        Node::Object(merged)
    };
    budget.check(Handle::new(node))
}

pub(crate) fn complement(value: &Handle) -> Handle {
    match value.node() {
        Node::Universe => empty(),
        Node::Empty => universe(),
        Node::Complement(inner) => inner.clone(),
        _ => Handle::new(Node::Complement(value.clone())),
    }
}

/// Whether the set denoted by `a` is contained in the set denoted by `b`.
///
/// Exact for ground values; conservative (may answer `false`) when unions
/// or complements sit on the right-hand side.
pub fn represented_in(a: &Handle, b: &Handle) -> bool {
    contained(a, b, &Budget::new(DEFAULT_NODE_LIMIT))
}

fn contained(a: &Handle, b: &Handle, budget: &Budget) -> bool {
    if Handle::ptr_eq(a, b) {
        return true;
    }
    match (a.node(), b.node()) {
        (Node::Empty, _) | (_, Node::Universe) => true,
        (Node::Universe, _) | (_, Node::Empty) => false,
        (Node::Union(members), _) => members.iter().all(|m| contained(m, b, budget)),
        (_, Node::Wild) => true,
        (_, Node::Union(members)) => members.iter().any(|m| contained(a, m, budget)),
        (Node::Complement(c), Node::Complement(d)) => contained(d, c, budget),
        (_, Node::Complement(c)) => disjoint(a, c, budget),
        (Node::Complement(_), _) | (Node::Wild, _) => false,
        (Node::List(xs), Node::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| contained(x, y, budget))
        }
        (Node::Object(xs), Node::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((k, x), (j, y))| k == j && contained(x, y, budget))
        }
        (Node::Object(xs) | Node::OpenObject(xs), Node::OpenObject(ys)) => ys
            .iter()
            .all(|(k, y)| field(xs, k).is_some_and(|x| contained(x, y, budget))),
        (Node::OpenObject(_), Node::Object(_)) => false,
        _ => scalar_equal(a, b),
    }
}

/// Engine-level structural equality. Union members compare as a set.
pub fn structurally_equal(a: &Handle, b: &Handle) -> bool {
    if Handle::ptr_eq(a, b) {
        return true;
    }
    match (a.node(), b.node()) {
        (Node::List(xs), Node::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structurally_equal(x, y))
        }
        (Node::Object(xs), Node::Object(ys)) | (Node::OpenObject(xs), Node::OpenObject(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((k, x), (j, y))| k == j && structurally_equal(x, y))
        }
        (Node::Union(xs), Node::Union(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|x| ys.iter().any(|y| structurally_equal(x, y)))
                && ys.iter().all(|y| xs.iter().any(|x| structurally_equal(x, y)))
        }
        (Node::Complement(x), Node::Complement(y)) => structurally_equal(x, y),
        (Node::Wild, Node::Wild)
        | (Node::Universe, Node::Universe)
        | (Node::Empty, Node::Empty) => true,
        _ => scalar_equal(a, b),
    }
}

fn scalar_equal(a: &Handle, b: &Handle) -> bool {
    match (a.node(), b.node()) {
        (Node::Null, Node::Null) => true,
        (Node::Bool(x), Node::Bool(y)) => x == y,
        (Node::Number(x), Node::Number(y)) => x.same(*y),
        (Node::String(x), Node::String(y)) => x == y,
        _ => false,
    }
}

/// A ground value denotes exactly one concrete value.
fn is_ground(value: &Handle) -> bool {
    match value.node() {
        Node::Null | Node::Bool(_) | Node::Number(_) | Node::String(_) => true,
        Node::List(items) => items.iter().all(is_ground),
        Node::Object(fields) => fields.iter().all(|(_, v)| is_ground(v)),
        _ => false,
    }
}

fn field<'a>(fields: &'a Fields, key: &str) -> Option<&'a Handle> {
    fields
        .binary_search_by(|(k, _)| k.as_str().cmp(key))
        .ok()
        .map(|i| &fields[i].1)
}
