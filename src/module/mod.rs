pub mod admin;
pub mod costs;
pub mod identity;
pub mod verification;
