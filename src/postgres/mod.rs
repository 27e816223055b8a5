// PostgreSQL module - the networked engine provider
//
// - connection: provider, live client and statement cache
// - params: parameter descriptors as tokio-postgres `ToSql`
// - query: reading rows back into result sets

pub mod connection;
pub mod params;
pub mod query;

pub use connection::{PostgresConnection, PostgresProvider};
pub use query::{build_result_set, postgres_extract_value};
