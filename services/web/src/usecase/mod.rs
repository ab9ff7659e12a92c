pub mod farm;
pub mod horse;
pub mod login;
pub mod profile;
pub mod session;
