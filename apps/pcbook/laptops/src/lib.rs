//! pcbook laptop catalog gRPC server
//!
//! Serves `LaptopService` (create, search, image upload and rating) next to
//! the standard `grpc.health.v1.Health` service.

pub mod server;
pub mod service;

pub use server::{run, serve};
pub use service::LaptopServiceImpl;
