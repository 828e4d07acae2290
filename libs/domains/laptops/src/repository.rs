use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::{LaptopResult, StoreResult};
use crate::models::{Filter, Laptop, Rating};

/// Keyed storage for laptop records
///
/// Implementations hand out independent copies: nothing returned by
/// `find` or passed to `emit` aliases stored state.
pub trait LaptopStore: Send + Sync {
    /// Store a copy of `laptop`. Fails with `AlreadyExists` if the id is taken.
    fn save(&self, laptop: &Laptop) -> StoreResult<()>;

    /// Copy of the laptop with this id, `None` if absent
    fn find(&self, id: &str) -> StoreResult<Option<Laptop>>;

    /// Pass a copy of every laptop matching `filter` to `emit`.
    ///
    /// `ctx` is checked before each step; cancellation or an `emit` error
    /// stops the scan with `StoreError::Aborted`.
    fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        emit: &mut dyn FnMut(Laptop) -> LaptopResult<()>,
    ) -> StoreResult<()>;

    /// Number of stored laptops
    fn count(&self) -> StoreResult<usize>;
}

/// Append-only blob store for laptop images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return its generated id
    async fn save(&self, laptop_id: &str, image_type: &str, data: Vec<u8>) -> StoreResult<String>;
}

/// Per-laptop running rating aggregate
#[cfg_attr(test, mockall::automock)]
pub trait RatingStore: Send + Sync {
    /// Fold `score` into the aggregate and return the updated (count, sum)
    fn add(&self, laptop_id: &str, score: f64) -> StoreResult<Rating>;

    /// Current aggregate, `None` if the laptop was never rated
    fn get(&self, laptop_id: &str) -> StoreResult<Option<Rating>>;
}
