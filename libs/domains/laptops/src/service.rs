use futures::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::context::CallContext;
use crate::error::{LaptopError, LaptopResult, StoreError};
use crate::models::{Filter, ImageUnit, ImageUpload, Laptop, RatingRequest, RatingSummary};
use crate::repository::{ImageStore, LaptopStore, RatingStore};

/// Largest accepted image, in bytes (inclusive)
pub const MAX_IMAGE_SIZE: usize = 1 << 20;

const MAX_IMAGE_TYPE_LEN: usize = 16;

/// Catalog service: the four call patterns over the three stores
///
/// Transport agnostic. Streams come in as `futures::Stream`s of domain
/// units and results go out through callbacks, so the gRPC layer only
/// converts messages and status codes.
pub struct LaptopService<L, I, R> {
    laptops: Arc<L>,
    images: Arc<I>,
    ratings: Arc<R>,
}

impl<L, I, R> Clone for LaptopService<L, I, R> {
    fn clone(&self) -> Self {
        Self {
            laptops: Arc::clone(&self.laptops),
            images: Arc::clone(&self.images),
            ratings: Arc::clone(&self.ratings),
        }
    }
}

impl<L, I, R> LaptopService<L, I, R>
where
    L: LaptopStore,
    I: ImageStore,
    R: RatingStore,
{
    pub fn new(laptops: L, images: I, ratings: R) -> Self {
        Self::from_shared(Arc::new(laptops), Arc::new(images), Arc::new(ratings))
    }

    /// Build a service over stores the caller keeps handles to
    pub fn from_shared(laptops: Arc<L>, images: Arc<I>, ratings: Arc<R>) -> Self {
        Self {
            laptops,
            images,
            ratings,
        }
    }

    pub fn laptop_store(&self) -> &L {
        &self.laptops
    }

    pub fn image_store(&self) -> &I {
        &self.images
    }

    pub fn rating_store(&self) -> &R {
        &self.ratings
    }

    /// Store a new laptop and return its id
    ///
    /// An empty id is replaced by a fresh UUID; any other id must already
    /// be a valid UUID.
    #[instrument(skip(self, ctx, laptop), fields(laptop_id = %laptop.id))]
    pub fn create_laptop(&self, ctx: &CallContext, mut laptop: Laptop) -> LaptopResult<String> {
        if laptop.id.is_empty() {
            laptop.id = Uuid::new_v4().to_string();
        } else {
            Uuid::parse_str(&laptop.id).map_err(|e| {
                LaptopError::invalid(format!("laptop ID is not a valid UUID: {}", e))
            })?;
        }

        ctx.check()?;

        self.laptops.save(&laptop).map_err(|e| match e {
            StoreError::AlreadyExists(id) => {
                warn!(laptop_id = %id, "Laptop already exists");
                LaptopError::AlreadyExists(id)
            }
            other => {
                error!(laptop_id = %laptop.id, error = %other, "Cannot save laptop");
                LaptopError::internal(format!("cannot save laptop to store: {}", other))
            }
        })?;

        info!(laptop_id = %laptop.id, "Saved laptop");
        Ok(laptop.id)
    }

    /// Copy of a stored laptop, if present
    pub fn find_laptop(&self, id: &str) -> LaptopResult<Option<Laptop>> {
        self.laptops.find(id).map_err(|e| {
            error!(laptop_id = %id, error = %e, "Cannot find laptop");
            LaptopError::internal(format!("cannot find laptop: {}", e))
        })
    }

    /// Pass every laptop matching `filter` to `emit`; returns how many were sent
    ///
    /// Cancellation and deadline keep their own kinds. Every other failure,
    /// including `emit` refusing a laptop, becomes `Internal`.
    #[instrument(skip(self, ctx, emit))]
    pub fn search_laptops<F>(&self, ctx: &CallContext, filter: &Filter, mut emit: F) -> LaptopResult<usize>
    where
        F: FnMut(Laptop) -> LaptopResult<()>,
    {
        let mut sent = 0usize;
        let result = self.laptops.search(ctx, filter, &mut |laptop| {
            let id = laptop.id.clone();
            emit(laptop)?;
            sent += 1;
            debug!(laptop_id = %id, "Sent laptop");
            Ok(())
        });

        match result {
            Ok(()) => {
                info!(sent, "Search completed");
                Ok(sent)
            }
            Err(StoreError::Aborted(err)) if err.is_cancellation() => {
                warn!(sent, error = %err, "Search stopped");
                Err(err)
            }
            Err(other) => {
                error!(sent, error = %other, "Search failed");
                Err(LaptopError::internal(format!("unexpected error: {}", other)))
            }
        }
    }

    /// Receive an image as a stream of units and store it
    ///
    /// The first unit must be `ImageUnit::Info`; the target laptop is looked
    /// up before any chunk is read. `ctx` is checked before each chunk.
    #[instrument(skip(self, ctx, units))]
    pub async fn upload_image<S>(&self, ctx: &CallContext, mut units: S) -> LaptopResult<ImageUpload>
    where
        S: Stream<Item = LaptopResult<ImageUnit>> + Unpin,
    {
        let (laptop_id, image_type) = match units.next().await {
            Some(Ok(ImageUnit::Info {
                laptop_id,
                image_type,
            })) => (laptop_id, image_type),
            Some(Ok(ImageUnit::Chunk(_))) => {
                return Err(log_rejected(LaptopError::invalid(
                    "first upload message must carry image info",
                )));
            }
            Some(Err(e)) => return Err(log_rejected(e)),
            None => {
                return Err(log_rejected(LaptopError::invalid(
                    "upload stream ended before image info",
                )));
            }
        };
        info!(%laptop_id, %image_type, "Receive an upload-image request");

        validate_image_type(&image_type).map_err(log_rejected)?;

        if self.find_laptop(&laptop_id)?.is_none() {
            return Err(log_rejected(LaptopError::invalid(format!(
                "laptop {} doesn't exist",
                laptop_id
            ))));
        }

        let mut data = Vec::new();
        loop {
            ctx.check()?;

            let Some(unit) = units.next().await else {
                break;
            };
            match unit.map_err(log_rejected)? {
                ImageUnit::Chunk(chunk) => {
                    let size = data.len() + chunk.len();
                    if size > MAX_IMAGE_SIZE {
                        return Err(log_rejected(LaptopError::invalid(format!(
                            "image is too large: {} > {}",
                            size, MAX_IMAGE_SIZE
                        ))));
                    }
                    data.extend_from_slice(&chunk);
                }
                ImageUnit::Info { .. } => {
                    return Err(log_rejected(LaptopError::invalid(
                        "image info may only be sent once, as the first message",
                    )));
                }
            }
        }

        // bounded by MAX_IMAGE_SIZE above
        let size = data.len() as u32;
        let id = self
            .images
            .save(&laptop_id, &image_type, data)
            .await
            .map_err(|e| {
                error!(%laptop_id, error = %e, "Cannot save image");
                LaptopError::internal(format!("cannot save image to the store: {}", e))
            })?;

        info!(image_id = %id, size, "Saved image");
        Ok(ImageUpload { id, size })
    }

    /// Apply one score and return the updated aggregate
    #[instrument(skip(self, ctx))]
    pub fn rate_laptop(&self, ctx: &CallContext, laptop_id: &str, score: f64) -> LaptopResult<RatingSummary> {
        ctx.check()?;

        if !score.is_finite() {
            return Err(LaptopError::invalid(format!("score {} is not a finite number", score)));
        }
        if self.find_laptop(laptop_id)?.is_none() {
            return Err(LaptopError::NotFound(format!("laptop {} is not found", laptop_id)));
        }

        let rating = self.ratings.add(laptop_id, score).map_err(|e| {
            error!(%laptop_id, error = %e, "Cannot add rating");
            LaptopError::internal(format!("cannot add rating to the store: {}", e))
        })?;

        debug!(%laptop_id, count = rating.count, sum = rating.sum, "Rating updated");
        Ok(RatingSummary::new(laptop_id, rating))
    }

    /// Rate laptops one request at a time, replying after each
    ///
    /// Requests are handled strictly in arrival order and each reply is
    /// awaited before the next request is read. The first failure ends the
    /// call. Returns the number of ratings applied.
    #[instrument(skip(self, ctx, requests, reply))]
    pub async fn rate_laptops<S, F, Fut>(&self, ctx: &CallContext, mut requests: S, mut reply: F) -> LaptopResult<u32>
    where
        S: Stream<Item = LaptopResult<RatingRequest>> + Unpin,
        F: FnMut(RatingSummary) -> Fut,
        Fut: Future<Output = LaptopResult<()>>,
    {
        let mut processed = 0u32;
        loop {
            ctx.check()?;

            let Some(request) = requests.next().await else {
                break;
            };
            let request = request.map_err(log_rejected)?;
            info!(laptop_id = %request.laptop_id, score = request.score, "Received a rate-laptop request");

            let summary = self
                .rate_laptop(ctx, &request.laptop_id, request.score)
                .map_err(log_rejected)?;
            reply(summary).await.map_err(log_rejected)?;
            processed += 1;
        }

        info!(processed, "Rating stream completed");
        Ok(processed)
    }
}

fn log_rejected(err: LaptopError) -> LaptopError {
    warn!(error = %err, "Request rejected");
    err
}

/// Image types name a file extension, e.g. `.jpg`
///
/// The type becomes part of a file name on disk, so it must stay a plain
/// printable extension.
fn validate_image_type(image_type: &str) -> LaptopResult<()> {
    if image_type.len() > MAX_IMAGE_TYPE_LEN
        || image_type.contains(['/', '\\', ':'])
        || image_type.contains("..")
        || image_type.chars().any(char::is_control)
    {
        return Err(LaptopError::invalid(format!(
            "image type {:?} is not a file extension",
            image_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::memory::InMemoryLaptopStore;
    use crate::models::Rating;
    use crate::repository::{MockImageStore, MockRatingStore};
    use crate::sample;
    use futures::stream;

    /// Laptop store whose every operation fails
    struct BrokenLaptopStore;

    impl LaptopStore for BrokenLaptopStore {
        fn save(&self, _: &Laptop) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }

        fn find(&self, _: &str) -> StoreResult<Option<Laptop>> {
            Err(StoreError::Poisoned)
        }

        fn search(
            &self,
            _: &CallContext,
            _: &Filter,
            _: &mut dyn FnMut(Laptop) -> LaptopResult<()>,
        ) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }

        fn count(&self) -> StoreResult<usize> {
            Err(StoreError::Poisoned)
        }
    }

    fn service_with_laptop(
        images: MockImageStore,
        ratings: MockRatingStore,
    ) -> (LaptopService<InMemoryLaptopStore, MockImageStore, MockRatingStore>, String) {
        let laptops = InMemoryLaptopStore::new();
        let laptop = sample::new_laptop();
        laptops.save(&laptop).unwrap();
        (LaptopService::new(laptops, images, ratings), laptop.id)
    }

    #[test]
    fn test_create_maps_store_failure_to_internal() {
        let service = LaptopService::new(BrokenLaptopStore, MockImageStore::new(), MockRatingStore::new());
        let err = service
            .create_laptop(&CallContext::new(), sample::new_laptop())
            .unwrap_err();
        assert!(matches!(err, LaptopError::Internal(_)));
    }

    #[test]
    fn test_create_checks_context_before_saving() {
        let service = LaptopService::new(
            InMemoryLaptopStore::new(),
            MockImageStore::new(),
            MockRatingStore::new(),
        );
        let ctx = CallContext::new();
        ctx.cancel();

        let err = service.create_laptop(&ctx, sample::new_laptop()).unwrap_err();
        assert_eq!(err, LaptopError::Canceled);
        assert_eq!(service.laptop_store().count().unwrap(), 0);
    }

    #[test]
    fn test_search_store_failure_is_internal() {
        let service = LaptopService::new(BrokenLaptopStore, MockImageStore::new(), MockRatingStore::new());
        let filter = Filter {
            max_price_usd: 5000.0,
            min_cpu_cores: 0,
            min_cpu_ghz: 0.0,
            min_ram: Default::default(),
        };
        let err = service
            .search_laptops(&CallContext::new(), &filter, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, LaptopError::Internal(_)));
    }

    #[tokio::test]
    async fn test_upload_store_failure_is_internal() {
        let mut images = MockImageStore::new();
        images
            .expect_save()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Io(std::io::Error::other("disk full"))));
        let (service, laptop_id) = service_with_laptop(images, MockRatingStore::new());

        let units = stream::iter(vec![
            Ok(ImageUnit::Info {
                laptop_id,
                image_type: ".png".to_string(),
            }),
            Ok(ImageUnit::Chunk(vec![0; 10])),
        ]);
        let err = service.upload_image(&CallContext::new(), units).await.unwrap_err();
        assert!(matches!(err, LaptopError::Internal(msg) if msg.contains("disk full")));
    }

    #[tokio::test]
    async fn test_upload_passes_bytes_to_store() {
        let mut images = MockImageStore::new();
        images
            .expect_save()
            .withf(|_, image_type, data| image_type == ".jpg" && data == &[1, 2, 3, 4, 5])
            .times(1)
            .returning(|_, _, _| Ok("image-1".to_string()));
        let (service, laptop_id) = service_with_laptop(images, MockRatingStore::new());

        let units = stream::iter(vec![
            Ok(ImageUnit::Info {
                laptop_id,
                image_type: ".jpg".to_string(),
            }),
            Ok(ImageUnit::Chunk(vec![1, 2])),
            Ok(ImageUnit::Chunk(vec![3, 4, 5])),
        ]);
        let upload = service.upload_image(&CallContext::new(), units).await.unwrap();
        assert_eq!(upload, ImageUpload { id: "image-1".to_string(), size: 5 });
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_ordering() {
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), MockRatingStore::new());

        let chunk_first = stream::iter(vec![Ok(ImageUnit::Chunk(vec![1]))]);
        let err = service.upload_image(&CallContext::new(), chunk_first).await.unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));

        let empty = stream::iter(Vec::<LaptopResult<ImageUnit>>::new());
        let err = service.upload_image(&CallContext::new(), empty).await.unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));

        let info = ImageUnit::Info {
            laptop_id,
            image_type: ".jpg".to_string(),
        };
        let twice = stream::iter(vec![Ok(info.clone()), Ok(info)]);
        let err = service.upload_image(&CallContext::new(), twice).await.unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_path_like_image_type() {
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), MockRatingStore::new());
        let units = stream::iter(vec![Ok(ImageUnit::Info {
            laptop_id,
            image_type: "/../../etc/passwd".to_string(),
        })]);
        let err = service.upload_image(&CallContext::new(), units).await.unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_upload_receive_error_propagates() {
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), MockRatingStore::new());
        let units = stream::iter(vec![
            Ok(ImageUnit::Info {
                laptop_id,
                image_type: ".jpg".to_string(),
            }),
            Err(LaptopError::Unknown("cannot receive chunk data".to_string())),
        ]);
        let err = service.upload_image(&CallContext::new(), units).await.unwrap_err();
        assert!(matches!(err, LaptopError::Unknown(_)));
    }

    #[test]
    fn test_rate_rejects_non_finite_score() {
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), MockRatingStore::new());
        let err = service
            .rate_laptop(&CallContext::new(), &laptop_id, f64::NAN)
            .unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));
    }

    #[test]
    fn test_rate_store_failure_is_internal() {
        let mut ratings = MockRatingStore::new();
        ratings
            .expect_add()
            .times(1)
            .returning(|_, _| Err(StoreError::Poisoned));
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), ratings);

        let err = service.rate_laptop(&CallContext::new(), &laptop_id, 5.0).unwrap_err();
        assert!(matches!(err, LaptopError::Internal(_)));
    }

    #[tokio::test]
    async fn test_rate_laptops_replies_after_each_request() {
        let mut ratings = MockRatingStore::new();
        let mut seq = mockall::Sequence::new();
        ratings
            .expect_add()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, score| Ok(Rating { count: 1, sum: score }));
        ratings
            .expect_add()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, score| Ok(Rating { count: 2, sum: 8.0 + score }));
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), ratings);

        let requests = stream::iter(vec![
            Ok(RatingRequest {
                laptop_id: laptop_id.clone(),
                score: 8.0,
            }),
            Ok(RatingRequest {
                laptop_id: laptop_id.clone(),
                score: 6.0,
            }),
        ]);

        let mut replies = Vec::new();
        let processed = service
            .rate_laptops(&CallContext::new(), requests, |summary| {
                replies.push(summary);
                async { Ok(()) }
            })
            .await
            .unwrap();

        assert_eq!(processed, 2);
        assert_eq!(replies[0].average_score, 8.0);
        assert_eq!(replies[1].rated_count, 2);
        assert_eq!(replies[1].average_score, 7.0);
    }

    #[tokio::test]
    async fn test_rate_laptops_stops_on_reply_failure() {
        let mut ratings = MockRatingStore::new();
        ratings
            .expect_add()
            .times(1)
            .returning(|_, score| Ok(Rating { count: 1, sum: score }));
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), ratings);

        let requests = stream::iter(vec![
            Ok(RatingRequest {
                laptop_id: laptop_id.clone(),
                score: 1.0,
            }),
            Ok(RatingRequest {
                laptop_id,
                score: 2.0,
            }),
        ]);
        let err = service
            .rate_laptops(&CallContext::new(), requests, |_| async {
                Err(LaptopError::Unknown("cannot send stream response".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LaptopError::Unknown(_)));
    }

    #[test]
    fn test_validate_image_type() {
        assert!(validate_image_type(".jpg").is_ok());
        assert!(validate_image_type("").is_ok());
        assert!(validate_image_type("a/b").is_err());
        assert!(validate_image_type("..").is_err());
        assert!(validate_image_type(&".x".repeat(10)).is_err());
        assert!(validate_image_type(".jp\0g").is_err());
        assert!(validate_image_type(".jpg\n").is_err());
        assert!(validate_image_type("c:.jpg").is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_control_characters_before_store() {
        // no expectations: the store must never be called
        let (service, laptop_id) = service_with_laptop(MockImageStore::new(), MockRatingStore::new());
        let units = stream::iter(vec![
            Ok(ImageUnit::Info {
                laptop_id,
                image_type: ".jp\0g".to_string(),
            }),
            Ok(ImageUnit::Chunk(vec![1, 2, 3])),
        ]);
        let err = service.upload_image(&CallContext::new(), units).await.unwrap_err();
        assert!(matches!(err, LaptopError::InvalidArgument(_)));
    }
}
