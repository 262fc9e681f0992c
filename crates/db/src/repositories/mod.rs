//! Repositories wrapping database access per entity.

mod crop;
mod post;
mod product;
mod user;

pub use crop::CropRepository;
pub use post::PostRepository;
pub use product::{ProductFilter, ProductRepository};
pub use user::UserRepository;
