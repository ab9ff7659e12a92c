pub mod auth;
pub mod farm;
pub mod health;
pub mod horse;
pub mod profile;
