//! Transfer engine module
//!
//! Moves funds between two accounts as one atomic unit.
//!
//! # Atomic unit
//!
//! ```text
//! append(PENDING) → debit source → credit destination → COMPLETED
//!                        ↓               ↓ (compensate: re-credit source)
//!                     FAILED          FAILED
//! ```
//!
//! # Safety invariants
//!
//! - Both account locks are held across the unit, acquired in ascending
//!   id order; no lock-order inversion between opposite-direction
//!   transfers.
//! - Lock acquisition is bounded by a timeout; expiry fails the
//!   transaction instead of queueing forever.
//! - Once the source debit lands, the unit runs detached from the caller
//!   until the record is Completed or Failed-with-rollback.

pub mod engine;
pub mod locks;

pub use engine::TransferEngine;
pub use locks::AccountLocks;
