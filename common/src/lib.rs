pub mod dtos;
pub mod error;
pub mod extract;
pub mod models;
pub mod persistence;
pub mod util;
pub mod validate;
