// SQLite module - the file engine provider
//
// - connection: provider, live connection and blocking-task plumbing
// - params: binding parameter descriptors onto rusqlite statements
// - query: reading rows back into result sets

pub mod connection;
pub mod params;
pub mod query;

pub use connection::{SqliteConnection, SqliteProvider};
pub use params::{bind_parameters, param_value_to_sqlite_value};
pub use query::build_result_set;
