//! Account management module
//!
//! Holds account records and the atomic conditional balance-adjust
//! primitive. Balances are only ever mutated through `adjust_balance`;
//! the transfer engine is its sole caller.

pub mod mem;
pub mod models;
pub mod pg;
pub mod store;

pub use mem::MemAccountStore;
pub use models::{Account, AccountUpdate, NewAccount};
pub use pg::PgAccountStore;
pub use store::AccountStore;
