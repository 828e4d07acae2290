use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::StoreResult;
use crate::models::Rating;
use crate::repository::RatingStore;

/// Rating aggregates with one lock per laptop
///
/// The map lock is held only to find or create a laptop's cell; the score
/// update happens under that cell's own mutex, so ratings for different
/// laptops never wait on each other.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    ratings: RwLock<HashMap<String, Arc<Mutex<Rating>>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, laptop_id: &str) -> StoreResult<Arc<Mutex<Rating>>> {
        if let Some(cell) = self.ratings.read()?.get(laptop_id) {
            return Ok(Arc::clone(cell));
        }
        let mut ratings = self.ratings.write()?;
        Ok(Arc::clone(ratings.entry(laptop_id.to_string()).or_default()))
    }
}

impl RatingStore for InMemoryRatingStore {
    fn add(&self, laptop_id: &str, score: f64) -> StoreResult<Rating> {
        let cell = self.cell(laptop_id)?;
        let mut rating = cell.lock()?;
        rating.count += 1;
        rating.sum += score;
        Ok(*rating)
    }

    fn get(&self, laptop_id: &str) -> StoreResult<Option<Rating>> {
        let cell = match self.ratings.read()?.get(laptop_id) {
            Some(cell) => Arc::clone(cell),
            None => return Ok(None),
        };
        let rating = *cell.lock()?;
        Ok(Some(rating))
    }
}
