//! Request and response records exchanged with the cooperative service.
//!
//! These are test-local values: the driver creates them, sends them, and
//! forgets them. Nothing here is persisted.

pub mod poll;
pub mod subject;
pub mod vote;

pub use poll::*;
pub use subject::*;
pub use vote::*;
