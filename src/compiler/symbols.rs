//! Symbol Table
//!
//! Maps variable names to frame slots. The table is append-only: a name is
//! bound once, on declaration, and keeps its slot for the whole program.
//! Anonymous slots for temporaries are carved from the same counter so the
//! two never overlap.

use crate::compiler::values::{Location, SLOT_SIZE};
use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Variable '{0}' already declared")]
    Redeclared(String),
    #[error("Variable '{0}' not declared")]
    Undeclared(String),
    #[error("Stack frame of {frame_size} bytes is full")]
    FrameExhausted { frame_size: u32 },
}

/// Name-to-slot bindings for one compilation session.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: IndexMap<String, Location>,
    next_offset: i32,
    frame_size: u32,
}

impl SymbolTable {
    /// Creates an empty table whose slots must fit in `frame_size` bytes.
    pub fn new(frame_size: u32) -> Self {
        Self {
            entries: IndexMap::new(),
            next_offset: -SLOT_SIZE,
            frame_size,
        }
    }

    /// Binds `name` to the next free slot.
    pub fn declare(&mut self, name: &str) -> Result<Location, SymbolError> {
        if self.entries.contains_key(name) {
            return Err(SymbolError::Redeclared(name.to_string()));
        }
        let location = self.reserve()?;
        trace!("declared {name} at {location}");
        self.entries.insert(name.to_string(), location);
        Ok(location)
    }

    /// Resolves a declared name. Never mutates the table.
    pub fn lookup(&self, name: &str) -> Result<Location, SymbolError> {
        self.get(name)
            .ok_or_else(|| SymbolError::Undeclared(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<Location> {
        self.entries.get(name).copied()
    }

    /// Allocates a slot that no name is bound to.
    pub fn reserve(&mut self) -> Result<Location, SymbolError> {
        let offset = self.next_offset;
        if offset.unsigned_abs() > self.frame_size {
            return Err(SymbolError::FrameExhausted {
                frame_size: self.frame_size,
            });
        }
        self.next_offset -= SLOT_SIZE;
        Ok(Location(offset))
    }

    /// Declared names with their slots, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Location)> {
        self.entries.iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of the frame handed out so far, temporaries included.
    pub fn frame_bytes(&self) -> u32 {
        (-self.next_offset - SLOT_SIZE).unsigned_abs()
    }
}
