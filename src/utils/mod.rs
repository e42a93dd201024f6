pub mod access;
pub mod extract;
pub mod hash;
pub mod jwt;
