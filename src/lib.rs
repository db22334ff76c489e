// Library surface shared by the binary and the integration tests.
pub mod app_dirs;
pub mod charlist;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod formatter;
pub mod lesson;
pub mod util;
