pub mod gps;
pub mod handler;
pub mod maps;
