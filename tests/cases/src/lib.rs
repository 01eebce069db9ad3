//! # Election test cases
//!
//! This subproject runs in-process clusters through elections, priority takeovers and
//! partitions, and checks that a single writable primary emerges.

#[macro_use]
extern crate log;
pub mod cases;
mod steps;

pub use self::cases::smoke;
