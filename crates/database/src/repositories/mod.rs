pub mod clients;
pub mod memory;
