//! Laptops Domain
//!
//! The laptop catalog: record value, stores and the service behind the
//! four pcbook call patterns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  LaptopService   │  ← Create / Search / UploadImage / Rate
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   Store traits   │  ← LaptopStore, ImageStore, RatingStore
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │     Models       │  ← Laptop, Filter, Rating, ...
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use domain_laptops::{
//!     CallContext, InMemoryImageStore, InMemoryLaptopStore, InMemoryRatingStore, LaptopService,
//!     sample,
//! };
//!
//! let service = LaptopService::new(
//!     InMemoryLaptopStore::new(),
//!     InMemoryImageStore::new(),
//!     InMemoryRatingStore::new(),
//! );
//!
//! let ctx = CallContext::new();
//! let id = service.create_laptop(&ctx, sample::new_laptop()).unwrap();
//! assert!(service.find_laptop(&id).unwrap().is_some());
//! ```

pub mod context;
pub mod conversions;
pub mod error;
pub mod image_store;
pub mod memory;
pub mod models;
pub mod rating_store;
pub mod repository;
pub mod sample;
pub mod serializer;
pub mod service;

// Re-export commonly used types
pub use context::CallContext;
pub use error::{LaptopError, LaptopResult, StoreError, StoreResult};
pub use image_store::{DiskImageStore, InMemoryImageStore, StoredImage};
pub use memory::InMemoryLaptopStore;
pub use models::{
    Cpu, Filter, Gpu, Image, ImageUnit, ImageUpload, Keyboard, KeyboardLayout, Laptop, Memory,
    MemoryUnit, Panel, Rating, RatingRequest, RatingSummary, Resolution, Screen, Storage,
    StorageDriver,
};
pub use rating_store::InMemoryRatingStore;
pub use repository::{ImageStore, LaptopStore, RatingStore};
pub use service::{LaptopService, MAX_IMAGE_SIZE};
