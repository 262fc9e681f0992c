//! Product service.

use chrono::Utc;
use gofarm_common::{AppError, AppResult, IdGenerator};
use gofarm_db::{
    entities::{Review, UserRole, embedded::encode_list, product},
    repositories::{ProductFilter, ProductRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::event_publisher::{BroadcastEvent, EventPublisherService, publish_quietly};
use super::upload::{Attachment, AttachmentKind, UploadResolver, check_limit};
use super::view::{Authors, ProductView, product_user_ids};

/// Maximum number of images attached to a product.
pub const MAX_PRODUCT_IMAGES: usize = 10;

/// Maximum number of videos attached to a product.
pub const MAX_PRODUCT_VIDEOS: usize = 5;

/// Maximum size of a single product image or video.
pub const MAX_PRODUCT_FILE_BYTES: usize = 50 * 1024 * 1024;

const DEFAULT_LIST_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 200;

/// Input for listing a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// Fields a seller may change on an existing product.
///
/// Seller, media, reviews and rating are not patchable.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// Input for reviewing a product.
#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

/// Arithmetic mean of the review ratings, `0.0` without reviews.
#[must_use]
pub fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(total) / reviews.len() as f64
}

fn check_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Product name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Apply a patch, leaving every unspecified column unchanged.
fn apply_patch(
    product: product::Model,
    patch: UpdateProductInput,
) -> AppResult<product::ActiveModel> {
    let mut active: product::ActiveModel = product.into();

    if let Some(name) = patch.name {
        active.name = Set(required_name(&name)?);
    }
    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = patch.price {
        check_price(price)?;
        active.price = Set(price);
    }
    if let Some(category) = patch.category {
        active.category = Set(Some(category));
    }
    active.updated_at = Set(Utc::now().into());

    Ok(active)
}

/// Product service for business logic.
#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    user_repo: UserRepository,
    uploads: UploadResolver,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub const fn new(
        product_repo: ProductRepository,
        user_repo: UserRepository,
        uploads: UploadResolver,
    ) -> Self {
        Self {
            product_repo,
            user_repo,
            uploads,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    async fn view(&self, product: &product::Model) -> AppResult<ProductView> {
        let authors = Authors::load(&self.user_repo, product_user_ids(product)).await?;
        Ok(ProductView::build(product, &authors))
    }

    /// View of a product that is already persisted. Never fails, so the
    /// mutation is still reported and broadcast.
    async fn committed_view(&self, product: &product::Model) -> ProductView {
        let authors = Authors::load_or_unknown(&self.user_repo, product_user_ids(product)).await;
        ProductView::build(product, &authors)
    }

    async fn owned(&self, product_id: &str, requester_id: &str) -> AppResult<product::Model> {
        let product = self.product_repo.get_by_id(product_id).await?;
        if product.seller_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the seller can modify this product".to_string(),
            ));
        }
        Ok(product)
    }

    /// List a product with optional images and videos.
    pub async fn create(
        &self,
        seller_id: &str,
        role: UserRole,
        input: CreateProductInput,
        attachments: Vec<Attachment>,
    ) -> AppResult<ProductView> {
        if !role.can_sell() {
            return Err(AppError::Forbidden(
                "Only farmers and retailers can list products".to_string(),
            ));
        }

        input.validate()?;
        let name = required_name(&input.name)?;
        check_price(input.price)?;

        let image_count = attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Image)
            .count();
        check_limit("images", MAX_PRODUCT_IMAGES, image_count)?;
        check_limit(
            "videos",
            MAX_PRODUCT_VIDEOS,
            attachments.len() - image_count,
        )?;

        let stored = self
            .uploads
            .resolve(seller_id, "products", &attachments, MAX_PRODUCT_FILE_BYTES)
            .await?;

        let (mut images, mut videos) = (Vec::new(), Vec::new());
        for (attachment, media) in attachments.iter().zip(stored.iter().cloned()) {
            match attachment.kind {
                AttachmentKind::Image => images.push(media),
                AttachmentKind::Video => videos.push(media),
            }
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(self.id_gen.generate()),
            seller_id: Set(seller_id.to_string()),
            name: Set(name),
            description: Set(input.description),
            price: Set(input.price),
            category: Set(input.category),
            images: Set(encode_list(&images)),
            videos: Set(encode_list(&videos)),
            reviews: Set(encode_list::<Review>(&[])),
            rating: Set(0.0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = match self.product_repo.create(model).await {
            Ok(created) => created,
            Err(e) => {
                self.uploads.release(&stored).await;
                return Err(e);
            }
        };

        tracing::info!(
            product_id = %created.id,
            seller_id = %seller_id,
            images = images.len(),
            videos = videos.len(),
            "Created product"
        );

        let view = self.committed_view(&created).await;
        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::ProductAdded(view.clone()),
        )
        .await;

        Ok(view)
    }

    /// Get a product by ID.
    pub async fn get(&self, product_id: &str) -> AppResult<ProductView> {
        let product = self.product_repo.get_by_id(product_id).await?;
        self.view(&product).await
    }

    /// List products, newest first.
    pub async fn list(&self, filter: &ProductFilter, limit: Option<u64>) -> AppResult<Vec<ProductView>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let products = self.product_repo.find_filtered(filter, limit).await?;
        self.views(&products).await
    }

    /// Case-insensitive substring search on product names.
    pub async fn search(&self, query: &str) -> AppResult<Vec<ProductView>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }
        let products = self.product_repo.search_by_name(query, MAX_LIST_LIMIT).await?;
        self.views(&products).await
    }

    async fn views(&self, products: &[product::Model]) -> AppResult<Vec<ProductView>> {
        let authors =
            Authors::load(&self.user_repo, products.iter().flat_map(product_user_ids)).await?;
        Ok(products
            .iter()
            .map(|p| ProductView::build(p, &authors))
            .collect())
    }

    /// Update the patchable fields of a product owned by the requester.
    pub async fn update(
        &self,
        product_id: &str,
        requester_id: &str,
        patch: UpdateProductInput,
    ) -> AppResult<ProductView> {
        patch.validate()?;
        let product = self.owned(product_id, requester_id).await?;

        let updated = self.product_repo.update(apply_patch(product, patch)?).await?;
        tracing::info!(product_id = %product_id, "Updated product");

        let view = self.committed_view(&updated).await;
        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::ProductUpdated(view.clone()),
        )
        .await;

        Ok(view)
    }

    /// Delete a product owned by the requester and release its media.
    pub async fn delete(&self, product_id: &str, requester_id: &str) -> AppResult<()> {
        let product = self.owned(product_id, requester_id).await?;

        self.product_repo.delete(product_id).await?;

        let mut media = product.image_list();
        media.extend(product.video_list());
        self.uploads.release(&media).await;

        tracing::info!(product_id = %product_id, released = media.len(), "Deleted product");

        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::ProductDeleted(product_id.to_string()),
        )
        .await;

        Ok(())
    }

    /// Add the user's review and recompute the mean rating.
    ///
    /// A user may review a product once.
    pub async fn add_review(
        &self,
        product_id: &str,
        user_id: &str,
        input: AddReviewInput,
    ) -> AppResult<ProductView> {
        input.validate()?;
        let product = self.product_repo.get_by_id(product_id).await?;

        let mut reviews = product.review_list();
        if reviews.iter().any(|r| r.user == user_id) {
            return Err(AppError::DuplicateReview(
                "You have already reviewed this product".to_string(),
            ));
        }

        reviews.push(Review {
            user: user_id.to_string(),
            rating: input.rating,
            comment: input.comment.trim().to_string(),
            created_at: Utc::now(),
        });
        let rating = mean_rating(&reviews);

        let mut active: product::ActiveModel = product.into();
        active.reviews = Set(encode_list(&reviews));
        active.rating = Set(rating);
        active.updated_at = Set(Utc::now().into());
        let updated = self.product_repo.update(active).await?;

        tracing::debug!(product_id = %product_id, user_id = %user_id, rating, "Added review");

        let view = self.committed_view(&updated).await;
        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::ProductUpdated(view.clone()),
        )
        .await;

        Ok(view)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::RecordingEventPublisher;
    use bytes::Bytes;
    use gofarm_common::MemoryStorage;
    use gofarm_db::entities::{StoredMedia, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_product(id: &str, seller_id: &str) -> product::Model {
        product::Model {
            id: id.to_string(),
            seller_id: seller_id.to_string(),
            name: "Tomatoes".to_string(),
            description: None,
            price: 50.0,
            category: None,
            images: json!([]),
            videos: json!([]),
            reviews: json!([]),
            rating: 0.0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            role,
            token: None,
            avatar_url: None,
            created_at: Utc::now().into(),
        }
    }

    fn review(user: &str, rating: u8) -> Review {
        Review {
            user: user.to_string(),
            rating,
            comment: String::new(),
            created_at: Utc::now(),
        }
    }

    fn attachment(kind: AttachmentKind, name: &str) -> Attachment {
        let content_type = match kind {
            AttachmentKind::Image => "image/png",
            AttachmentKind::Video => "video/mp4",
        };
        Attachment {
            kind,
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from_static(b"media"),
        }
    }

    fn tomatoes() -> CreateProductInput {
        CreateProductInput {
            name: "Tomatoes".to_string(),
            description: None,
            price: 50.0,
            category: None,
        }
    }

    fn service(
        product_db: MockDatabase,
        user_db: MockDatabase,
        storage: &MemoryStorage,
    ) -> (ProductService, RecordingEventPublisher) {
        let mut service = ProductService::new(
            ProductRepository::new(Arc::new(product_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            UploadResolver::new(Arc::new(storage.clone())),
        );
        let recorder = RecordingEventPublisher::new();
        service.set_event_publisher(Arc::new(recorder.clone()));
        (service, recorder)
    }

    #[test]
    fn test_mean_rating() {
        assert_eq!(mean_rating(&[]), 0.0);
        assert_eq!(
            mean_rating(&[review("a", 4), review("b", 5), review("c", 3)]),
            4.0
        );
        assert_eq!(mean_rating(&[review("a", 4), review("b", 5)]), 4.5);
    }

    #[test]
    fn test_apply_patch_leaves_unspecified_fields() {
        let product = create_test_product("p1", "seller");
        let active = apply_patch(
            product,
            UpdateProductInput {
                price: Some(42.0),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(active.price.is_set());
        assert!(active.name.is_unchanged());
        assert!(active.seller_id.is_unchanged());
        assert!(active.images.is_unchanged());
        assert!(active.rating.is_unchanged());
    }

    #[test]
    fn test_apply_patch_rejects_blank_name() {
        let result = apply_patch(
            create_test_product("p1", "seller"),
            UpdateProductInput {
                name: Some("  ".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_product_scenario() {
        let storage = MemoryStorage::new();
        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_product("p1", "seller")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("seller", UserRole::Farmer)]]),
            &storage,
        );

        let view = service
            .create("seller", UserRole::Farmer, tomatoes(), vec![])
            .await
            .unwrap();

        assert_eq!(view.name, "Tomatoes");
        assert!(view.images.is_empty());
        assert_eq!(view.rating, 0.0);
        assert_eq!(view.seller.name, "User seller");
        assert_eq!(recorder.event_names(), vec!["productAdded"]);
    }

    #[tokio::test]
    async fn test_consumer_cannot_create_product() {
        let storage = MemoryStorage::new();
        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let result = service
            .create(
                "buyer",
                UserRole::Consumer,
                tomatoes(),
                vec![attachment(AttachmentKind::Image, "a.png")],
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(storage.upload_attempts().is_empty());
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_create_product_validates_price() {
        let storage = MemoryStorage::new();
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        for price in [-1.0, f64::NAN, f64::INFINITY] {
            let input = CreateProductInput {
                price,
                ..tomatoes()
            };
            let result = service
                .create("seller", UserRole::Retailer, input, vec![])
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{price}");
        }
    }

    #[tokio::test]
    async fn test_create_product_video_limit() {
        let storage = MemoryStorage::new();
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let videos = (0..6)
            .map(|i| attachment(AttachmentKind::Video, &format!("{i}.mp4")))
            .collect();
        let result = service
            .create("seller", UserRole::Farmer, tomatoes(), videos)
            .await;

        assert!(matches!(
            result,
            Err(AppError::AttachmentLimit {
                field: "videos",
                max: 5,
                got: 6
            })
        ));
        assert!(storage.upload_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_delete_releases_all_media() {
        let storage = MemoryStorage::new();
        let (creator, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_product("p1", "seller")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("seller", UserRole::Farmer)]]),
            &storage,
        );

        creator
            .create(
                "seller",
                UserRole::Farmer,
                tomatoes(),
                vec![
                    attachment(AttachmentKind::Image, "a.png"),
                    attachment(AttachmentKind::Video, "b.mp4"),
                    attachment(AttachmentKind::Image, "c.png"),
                ],
            )
            .await
            .unwrap();

        let keys = storage.stored_keys();
        assert_eq!(keys.len(), 3);
        assert!(storage.delete_requests().is_empty());

        let media: Vec<StoredMedia> = keys
            .iter()
            .map(|k| StoredMedia {
                url: format!("/uploads/{k}"),
                filename: k.clone(),
            })
            .collect();
        let mut stored_product = create_test_product("p1", "seller");
        stored_product.images = serde_json::to_value(&media[..2]).unwrap();
        stored_product.videos = serde_json::to_value(&media[2..]).unwrap();

        let (deleter, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_product]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        deleter.delete("p1", "seller").await.unwrap();

        assert!(storage.stored_keys().is_empty());
        assert_eq!(storage.delete_requests().len(), 3);
        assert_eq!(
            recorder.events(),
            vec![BroadcastEvent::ProductDeleted("p1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_tolerates_release_failures() {
        let storage = MemoryStorage::new().failing_deletes();
        let mut product = create_test_product("p1", "seller");
        product.images = json!([{ "url": "/uploads/x.png", "filename": "x.png" }]);

        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[product]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        assert!(service.delete("p1", "seller").await.is_ok());
        assert_eq!(recorder.event_names(), vec!["productDeleted"]);
    }

    #[tokio::test]
    async fn test_second_racing_delete_keeps_media_and_stays_quiet() {
        let storage = MemoryStorage::new();
        let mut product = create_test_product("p1", "seller");
        product.images = json!([{ "url": "/uploads/x.png", "filename": "x.png" }]);

        // The row was read, but another delete removed it first.
        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[product]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let result = service.delete("p1", "seller").await;
        assert!(matches!(result, Err(AppError::ProductNotFound(_))));
        assert!(storage.delete_requests().is_empty());
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_update_still_broadcasts_when_seller_lookup_fails() {
        let storage = MemoryStorage::new();
        let mut updated = create_test_product("p1", "seller");
        updated.price = 42.0;

        // No user result queued: the author lookup errors after the commit.
        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
                [create_test_product("p1", "seller")],
                [updated],
            ]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let view = service
            .update(
                "p1",
                "seller",
                UpdateProductInput {
                    price: Some(42.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.price, 42.0);
        assert_eq!(view.seller.name, "Unknown user");
        assert_eq!(recorder.events(), vec![BroadcastEvent::ProductUpdated(view)]);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_delete_or_update() {
        let storage = MemoryStorage::new();
        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
                [create_test_product("p1", "seller")],
                [create_test_product("p1", "seller")],
            ]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let deleted = service.delete("p1", "intruder").await;
        assert!(matches!(deleted, Err(AppError::Forbidden(_))));

        let updated = service
            .update(
                "p1",
                "intruder",
                UpdateProductInput {
                    price: Some(1.0),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(updated, Err(AppError::Forbidden(_))));
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_update_broadcasts_product() {
        let storage = MemoryStorage::new();
        let mut updated = create_test_product("p1", "seller");
        updated.price = 42.0;

        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
                [create_test_product("p1", "seller")],
                [updated],
            ]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("seller", UserRole::Farmer)]]),
            &storage,
        );

        let view = service
            .update(
                "p1",
                "seller",
                UpdateProductInput {
                    price: Some(42.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.price, 42.0);
        assert_eq!(recorder.event_names(), vec!["productUpdated"]);
    }

    #[tokio::test]
    async fn test_add_review_recomputes_rating() {
        let storage = MemoryStorage::new();
        let mut existing = create_test_product("p1", "seller");
        existing.reviews = json!([review("a", 4), review("b", 5)]);
        existing.rating = 4.5;
        let mut reviewed = existing.clone();
        reviewed.reviews = json!([review("a", 4), review("b", 5), review("c", 3)]);
        reviewed.rating = 4.0;

        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing], [reviewed]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                create_test_user("seller", UserRole::Farmer),
                create_test_user("c", UserRole::Consumer),
            ]]),
            &storage,
        );

        let view = service
            .add_review(
                "p1",
                "c",
                AddReviewInput {
                    rating: 3,
                    comment: "Fresh".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.rating, 4.0);
        assert_eq!(view.reviews.len(), 3);
        assert_eq!(recorder.event_names(), vec!["productUpdated"]);
    }

    #[tokio::test]
    async fn test_add_review_rejects_duplicates_and_bad_ratings() {
        let storage = MemoryStorage::new();
        let mut existing = create_test_product("p1", "seller");
        existing.reviews = json!([review("c", 5)]);

        let (service, recorder) = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        let out_of_range = service
            .add_review(
                "p1",
                "c",
                AddReviewInput {
                    rating: 6,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(out_of_range, Err(AppError::Validation(_))));

        let duplicate = service
            .add_review(
                "p1",
                "c",
                AddReviewInput {
                    rating: 4,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(duplicate, Err(AppError::DuplicateReview(_))));
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let storage = MemoryStorage::new();
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            &storage,
        );

        assert!(matches!(
            service.search("   ").await,
            Err(AppError::Validation(_))
        ));
    }
}
