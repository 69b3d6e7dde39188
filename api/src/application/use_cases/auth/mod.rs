pub mod list_users;
pub mod login;
pub mod me;
pub mod register;
