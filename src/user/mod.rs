//! User management: plain CRUD, no domain logic.

pub mod mem;
pub mod models;
pub mod pg;
pub mod store;

pub use mem::MemUserStore;
pub use models::{NewUser, User, UserUpdate};
pub use pg::PgUserStore;
pub use store::UserStore;
