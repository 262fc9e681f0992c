//! Merge policy for HTTP responses and pushed events.
//!
//! An entity already in a mounted list is replaced where it stands.
//! An absent entity is prepended only when it is new: a `newPost` or
//! `productAdded` event, or the response to the client's own create.
//! Updates for absent entities are informational and ignored, as is
//! everything addressed to a view that is not mounted.

use tracing::trace;

use crate::event::ServerEvent;
use crate::feed::Feed;
use crate::model::{Post, Product};

/// What a merge did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Prepended,
    Replaced,
    Removed,
    Ignored,
}

impl Merge {
    const fn from_upsert(prepended: bool) -> Self {
        if prepended { Self::Prepended } else { Self::Replaced }
    }

    const fn from_hit(hit: bool, applied: Self) -> Self {
        if hit { applied } else { Self::Ignored }
    }
}

/// A mounted list view. `None` when the view is not on screen.
type View<T> = Option<Feed<T>>;

/// The client's locally held post and product lists.
#[derive(Debug, Clone, Default)]
pub struct LocalState {
    posts: View<Post>,
    products: View<Product>,
}

impl LocalState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the post list, seeded from a server listing.
    pub fn mount_posts(&mut self, posts: Vec<Post>) {
        self.posts = Some(Feed::from_items(posts));
    }

    pub fn unmount_posts(&mut self) {
        self.posts = None;
    }

    /// Show the product list, seeded from a server listing.
    pub fn mount_products(&mut self, products: Vec<Product>) {
        self.products = Some(Feed::from_items(products));
    }

    pub fn unmount_products(&mut self) {
        self.products = None;
    }

    /// Posts on screen, or `None` when the view is not mounted.
    #[must_use]
    pub const fn posts(&self) -> Option<&Feed<Post>> {
        self.posts.as_ref()
    }

    /// Products on screen, or `None` when the view is not mounted.
    #[must_use]
    pub const fn products(&self) -> Option<&Feed<Product>> {
        self.products.as_ref()
    }

    /// Merge the response to this client's own post creation.
    pub fn post_created(&mut self, post: Post) -> Merge {
        self.posts
            .as_mut()
            .map_or(Merge::Ignored, |feed| Merge::from_upsert(feed.upsert(post)))
    }

    /// Merge the response to a like, comment or read of a post.
    pub fn post_updated(&mut self, post: Post) -> Merge {
        self.posts.as_mut().map_or(Merge::Ignored, |feed| {
            Merge::from_hit(feed.replace(post), Merge::Replaced)
        })
    }

    /// Merge the response to this client's own product listing.
    pub fn product_created(&mut self, product: Product) -> Merge {
        self.products.as_mut().map_or(Merge::Ignored, |feed| {
            Merge::from_upsert(feed.upsert(product))
        })
    }

    /// Merge the response to an update or review of a product.
    pub fn product_updated(&mut self, product: Product) -> Merge {
        self.products.as_mut().map_or(Merge::Ignored, |feed| {
            Merge::from_hit(feed.replace(product), Merge::Replaced)
        })
    }

    /// Drop a deleted product. Absent IDs are a no-op.
    pub fn product_deleted(&mut self, product_id: &str) -> Merge {
        self.products.as_mut().map_or(Merge::Ignored, |feed| {
            Merge::from_hit(feed.remove(product_id), Merge::Removed)
        })
    }

    /// Merge a pushed broadcast event.
    pub fn apply(&mut self, event: ServerEvent) -> Merge {
        let merge = match event {
            ServerEvent::NewPost(post) => self.post_created(post),
            ServerEvent::PostLiked { post_id, likes } => self.patch_post(&post_id, |post| {
                post.likes = likes;
            }),
            ServerEvent::PostCommented { post_id, comments } => {
                self.patch_post(&post_id, |post| post.comments = comments)
            }
            ServerEvent::ProductAdded(product) => self.product_created(product),
            ServerEvent::ProductUpdated(product) => self.product_updated(product),
            ServerEvent::ProductDeleted(product_id) => self.product_deleted(&product_id),
        };
        trace!(?merge, "Applied event");
        merge
    }

    fn patch_post(&mut self, post_id: &str, f: impl FnOnce(&mut Post)) -> Merge {
        self.posts.as_mut().map_or(Merge::Ignored, |feed| {
            Merge::from_hit(feed.update_with(post_id, f), Merge::Replaced)
        })
    }
}
