pub mod farms;
pub mod horses;
pub mod users;
