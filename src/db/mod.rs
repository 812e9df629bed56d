pub mod connection;
pub mod schema;
pub mod store;

pub use connection::Database;
