mod location;
mod user;

pub use location::Region;
pub use user::{Draft, Field, User};
#[cfg(test)]
pub use user::UserId;
