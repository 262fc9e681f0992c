//! Business logic services.

pub mod crop;
pub mod event_publisher;
pub mod post;
pub mod product;
pub mod upload;
pub mod user;
pub mod view;

pub use crop::{CreateCropInput, CropService, UpdateCropInput};
pub use event_publisher::{
    BroadcastEvent, EventPublisher, EventPublisherService, RecordingEventPublisher,
};
pub use post::{
    AddCommentInput, CreatePostInput, MAX_POST_IMAGE_BYTES, MAX_POST_IMAGES, PostService,
};
pub use product::{
    AddReviewInput, CreateProductInput, MAX_PRODUCT_FILE_BYTES, MAX_PRODUCT_IMAGES,
    MAX_PRODUCT_VIDEOS, ProductService, UpdateProductInput,
};
pub use upload::{Attachment, AttachmentKind, UploadResolver};
pub use user::UserService;
pub use view::{AuthorSummary, CommentView, CropView, PostView, ProductView, ReviewView};
