//! Record models kept in record stores.

pub mod user;

pub use user::{load_users, User};
