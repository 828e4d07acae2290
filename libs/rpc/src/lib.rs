//! Protobuf contract for the pcbook laptop catalog.
//!
//! Messages and tonic stubs are generated from `proto/laptop.proto` at build
//! time (see `build.rs`).

pub mod pcbook {
    tonic::include_proto!("pcbook");

    /// Fully qualified name of the laptop service, as used by health checks.
    pub const LAPTOP_SERVICE_NAME: &str = "pcbook.LaptopService";
}

pub use pcbook::*;
