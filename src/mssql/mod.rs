// SQL Server module - the only built-in engine with stored procedures
//
// - connection: provider and live client
// - params: binding parameter descriptors onto tiberius queries
// - query: reading result sets back

pub mod connection;
pub mod params;
pub mod query;

pub use connection::{MssqlConnection, MssqlProvider};
pub use query::extract_value;
