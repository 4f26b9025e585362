//! WordPress / wpForo adapter. Reads the site's MySQL tables; never writes.

pub mod mapper;
pub mod mysql_source;

pub use mysql_source::MySqlSource;
