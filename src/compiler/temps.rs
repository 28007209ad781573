//! Temporary Pool
//!
//! A free-list of anonymous frame slots that hold intermediate results. Slots
//! are created lazily through the symbol table and recycled once the value in
//! them has been consumed.

use crate::compiler::symbols::{SymbolError, SymbolTable};
use crate::compiler::values::Location;

#[derive(Debug, Default)]
pub struct TempPool {
    free: Vec<Location>,
    in_use: Vec<Location>,
}

impl TempPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a free slot, growing the frame only when none is free.
    pub fn acquire(&mut self, symbols: &mut SymbolTable) -> Result<Location, SymbolError> {
        let location = match self.free.pop() {
            Some(location) => location,
            None => symbols.reserve()?,
        };
        self.in_use.push(location);
        Ok(location)
    }

    /// Returns a slot to the pool. Releasing a slot that is not in use is a
    /// no-op.
    pub fn release(&mut self, location: Location) {
        if let Some(pos) = self.in_use.iter().position(|l| *l == location) {
            self.in_use.swap_remove(pos);
            self.free.push(location);
        }
    }

    pub fn in_use(&self) -> usize {
        self.in_use.len()
    }

    /// Number of distinct slots the pool has ever created.
    pub fn capacity(&self) -> usize {
        self.free.len() + self.in_use.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_slots_are_reused() {
        let mut symbols = SymbolTable::new(0x100);
        let mut pool = TempPool::new();

        let first = pool.acquire(&mut symbols).unwrap();
        let second = pool.acquire(&mut symbols).unwrap();
        assert_ne!(first, second);
        assert_eq!(pool.in_use(), 2);

        pool.release(first);
        assert_eq!(pool.acquire(&mut symbols).unwrap(), first);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_slot_in_use_is_never_handed_out_twice() {
        let mut symbols = SymbolTable::new(0x100);
        let mut pool = TempPool::new();

        let held = pool.acquire(&mut symbols).unwrap();
        pool.release(held);
        pool.release(held);
        let a = pool.acquire(&mut symbols).unwrap();
        let b = pool.acquire(&mut symbols).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pool_shares_frame_with_variables() {
        let mut symbols = SymbolTable::new(0x100);
        let mut pool = TempPool::new();

        symbols.declare("a").unwrap();
        let temp = pool.acquire(&mut symbols).unwrap();
        assert_eq!(temp, Location(-8));
        assert_eq!(symbols.declare("b").unwrap(), Location(-12));
    }
}
