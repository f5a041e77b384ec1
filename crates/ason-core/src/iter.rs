//! Lazy iteration over composite ASON values.
//!
//! Lists and unions yield bare values; objects yield `(key, value)` pairs.
//! Children are produced one at a time from an engine cursor and each is an
//! independent copy, so it outlives the iterator.

use std::iter::FusedIterator;

use crate::engine::{self, Cursor, TypeTag};
use crate::error::IterationError;
use crate::value::Ason;

/// One element produced by [`Iter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Value(Ason),
    Pair(String, Ason),
}

impl Item {
    pub fn value(&self) -> &Ason {
        match self {
            Item::Value(v) | Item::Pair(_, v) => v,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Item::Pair(k, _) => Some(k),
            Item::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Ason {
        match self {
            Item::Value(v) | Item::Pair(_, v) => v,
        }
    }
}

/// What each element looks like, fixed when the iterator is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Values,
    Pairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    /// Created, cursor not yet on a child.
    Fresh,
    /// Cursor is on the most recently returned child.
    Entered,
    /// No more children. Terminal.
    Exhausted,
}

#[derive(Debug)]
pub struct Iter {
    cursor: Cursor,
    shape: Shape,
    state: IterState,
}

impl Iter {
    pub fn new(value: &Ason) -> Result<Self, IterationError> {
        let shape = match value.type_tag() {
            TypeTag::Object | TypeTag::UniversalObject => Shape::Pairs,
            TypeTag::List | TypeTag::Union => Shape::Values,
            tag => return Err(IterationError::NotIterable { tag }),
        };
        Ok(Self {
            cursor: engine::iterate(value.handle()),
            shape,
            state: IterState::Fresh,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn state(&self) -> IterState {
        self.state
    }

    fn current(&self) -> Option<Item> {
        let value = Ason::from_handle(self.cursor.value()?);
        match self.shape {
            Shape::Values => Some(Item::Value(value)),
            Shape::Pairs => Some(Item::Pair(self.cursor.key()?.to_owned(), value)),
        }
    }
}

impl Iterator for Iter {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        let moved = match self.state {
            IterState::Fresh => self.cursor.enter(),
            IterState::Entered => self.cursor.advance(),
            IterState::Exhausted => return None,
        };
        if !moved {
            self.state = IterState::Exhausted;
            return None;
        }
        self.state = IterState::Entered;
        let item = self.current();
        if item.is_none() {
            self.state = IterState::Exhausted;
        }
        item
    }
}

impl FusedIterator for Iter {}
