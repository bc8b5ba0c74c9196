pub mod account;
pub mod assets;
pub mod dashboard;
