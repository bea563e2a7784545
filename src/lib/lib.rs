pub mod adapters;
pub mod crypto;
pub mod domain;
pub mod ports;
pub mod resolver;
