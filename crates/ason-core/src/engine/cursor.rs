//! Structural walk over the children of a composite value.

use super::{Handle, Node};

/// Position inside a list, object or union. A fresh cursor sits before the
/// first child; [`Cursor::enter`] moves onto it and [`Cursor::advance`]
/// steps to the next sibling.
#[derive(Debug, Clone)]
pub struct Cursor {
    target: Handle,
    pos: Option<usize>,
}

impl Cursor {
    pub(crate) fn new(target: Handle) -> Self {
        Self { target, pos: None }
    }

    fn len(&self) -> usize {
        match self.target.node() {
            Node::List(items) | Node::Union(items) => items.len(),
            Node::Object(fields) | Node::OpenObject(fields) => fields.len(),
            _ => 0,
        }
    }

    /// Descend onto the first child. Returns `false` when there is none.
    pub fn enter(&mut self) -> bool {
        if self.len() == 0 {
            self.pos = None;
            return false;
        }
        self.pos = Some(0);
        true
    }

    /// Step to the next sibling. Returns `false` (and leaves the cursor
    /// unpositioned) when there is none.
    pub fn advance(&mut self) -> bool {
        match self.pos {
            Some(i) if i + 1 < self.len() => {
                self.pos = Some(i + 1);
                true
            }
            _ => {
                self.pos = None;
                false
            }
        }
    }

    /// Copy of the child under the cursor.
    pub fn value(&self) -> Option<Handle> {
        let i = self.pos?;
        match self.target.node() {
            Node::List(items) | Node::Union(items) => items.get(i).cloned(),
            Node::Object(fields) | Node::OpenObject(fields) => {
                fields.get(i).map(|(_, v)| v.clone())
            }
            _ => None,
        }
    }

    /// Key of the child under the cursor, for object children only.
    pub fn key(&self) -> Option<&str> {
        let i = self.pos?;
        match self.target.node() {
            Node::Object(fields) | Node::OpenObject(fields) => {
                fields.get(i).map(|(k, _)| k.as_str())
            }
            _ => None,
        }
    }
}
