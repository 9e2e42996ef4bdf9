pub mod access;
pub mod crypto;
pub mod validation;
