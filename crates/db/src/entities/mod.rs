//! Database entities.

pub mod crop;
pub mod embedded;
pub mod post;
pub mod product;
pub mod user;

pub use crop::{CropStatus, Entity as Crop};
pub use embedded::{Comment, Review, StoredMedia};
pub use post::Entity as Post;
pub use product::Entity as Product;
pub use user::{Entity as User, UserRole};
