//! Code Generators Module
//!
//! This module contains the code generation functions for the two kinds of
//! work the compiler does:
//! - `expression`: postfix evaluation into arithmetic on `$t0`/`$t1`
//! - `statement`: declarations, assignments and returns

pub mod expression;
pub mod statement;
