pub mod reports;
pub mod root;
pub mod upload;
pub mod validation;
