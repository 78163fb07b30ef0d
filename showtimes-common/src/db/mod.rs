//! Database access: schema, migrations and the showtime store

pub mod init;
pub mod migrations;
pub mod models;
pub mod showtimes;

pub use init::*;
pub use migrations::*;
pub use models::*;
pub use showtimes::*;
