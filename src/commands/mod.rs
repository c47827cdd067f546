pub mod init;
pub mod locations;
pub mod prompt;
pub mod users;
