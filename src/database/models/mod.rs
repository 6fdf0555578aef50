pub mod photo;
pub mod user;
pub mod word;

pub use photo::{Photo, PhotoWithOwner};
pub use user::User;
pub use word::WordWithCreator;
