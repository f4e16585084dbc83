pub mod board;
pub mod config;
pub mod drag;
pub mod edit;
pub mod id;
pub mod persist;
pub mod reorder;
pub mod search;
pub mod store;
pub mod types;
pub mod view;

pub use board::BoardSession;
pub use store::EntityStore;
