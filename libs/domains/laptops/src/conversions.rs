//! Laptop-specific proto ↔ domain conversions
//!
//! Domain → proto conversions are infallible. Proto → domain conversions
//! return `String` errors for malformed input; the transport layer turns
//! those into `INVALID_ARGUMENT` via `grpc_client::ToTonicResult`.
//!
//! Generic conversions (UUIDs, timestamps) are re-exported from grpc_client::conversions.

use rpc::keyboard::Layout;
use rpc::memory::Unit;
use rpc::screen::Panel as ProtoPanel;
use rpc::storage::Driver;
use rpc::upload_image_request::Data;

use crate::models::{
    Cpu, Filter, Gpu, ImageUnit, ImageUpload, Keyboard, KeyboardLayout, Laptop, Memory,
    MemoryUnit, Panel, RatingRequest, RatingSummary, Resolution, Screen, Storage, StorageDriver,
};

pub use grpc_client::conversions::*;

// ============================================================================
// Enum Conversions
// ============================================================================

impl From<MemoryUnit> for i32 {
    fn from(unit: MemoryUnit) -> Self {
        let unit = match unit {
            MemoryUnit::Bit => Unit::Bit,
            MemoryUnit::Byte => Unit::Byte,
            MemoryUnit::Kilobyte => Unit::Kilobyte,
            MemoryUnit::Megabyte => Unit::Megabyte,
            MemoryUnit::Gigabyte => Unit::Gigabyte,
            MemoryUnit::Terabyte => Unit::Terabyte,
        };
        unit as i32
    }
}

impl TryFrom<i32> for MemoryUnit {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match Unit::try_from(value) {
            Ok(Unit::Bit) => Ok(MemoryUnit::Bit),
            Ok(Unit::Byte) => Ok(MemoryUnit::Byte),
            Ok(Unit::Kilobyte) => Ok(MemoryUnit::Kilobyte),
            Ok(Unit::Megabyte) => Ok(MemoryUnit::Megabyte),
            Ok(Unit::Gigabyte) => Ok(MemoryUnit::Gigabyte),
            Ok(Unit::Terabyte) => Ok(MemoryUnit::Terabyte),
            Ok(Unit::Unknown) | Err(_) => Err(format!("Invalid memory unit: {}", value)),
        }
    }
}

impl From<StorageDriver> for i32 {
    fn from(driver: StorageDriver) -> Self {
        match driver {
            StorageDriver::Hdd => Driver::Hdd as i32,
            StorageDriver::Ssd => Driver::Ssd as i32,
        }
    }
}

impl TryFrom<i32> for StorageDriver {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match Driver::try_from(value) {
            Ok(Driver::Hdd) => Ok(StorageDriver::Hdd),
            Ok(Driver::Ssd) => Ok(StorageDriver::Ssd),
            Ok(Driver::Unknown) | Err(_) => Err(format!("Invalid storage driver: {}", value)),
        }
    }
}

impl From<Panel> for i32 {
    fn from(panel: Panel) -> Self {
        match panel {
            Panel::Ips => ProtoPanel::Ips as i32,
            Panel::Oled => ProtoPanel::Oled as i32,
        }
    }
}

impl TryFrom<i32> for Panel {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match ProtoPanel::try_from(value) {
            Ok(ProtoPanel::Ips) => Ok(Panel::Ips),
            Ok(ProtoPanel::Oled) => Ok(Panel::Oled),
            Ok(ProtoPanel::Unknown) | Err(_) => Err(format!("Invalid screen panel: {}", value)),
        }
    }
}

impl From<KeyboardLayout> for i32 {
    fn from(layout: KeyboardLayout) -> Self {
        match layout {
            KeyboardLayout::Qwerty => Layout::Qwerty as i32,
            KeyboardLayout::Qwertz => Layout::Qwertz as i32,
            KeyboardLayout::Azerty => Layout::Azerty as i32,
        }
    }
}

impl TryFrom<i32> for KeyboardLayout {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match Layout::try_from(value) {
            Ok(Layout::Qwerty) => Ok(KeyboardLayout::Qwerty),
            Ok(Layout::Qwertz) => Ok(KeyboardLayout::Qwertz),
            Ok(Layout::Azerty) => Ok(KeyboardLayout::Azerty),
            Ok(Layout::Unknown) | Err(_) => Err(format!("Invalid keyboard layout: {}", value)),
        }
    }
}

// ============================================================================
// Component Conversions
// ============================================================================

impl From<Memory> for rpc::Memory {
    fn from(memory: Memory) -> Self {
        rpc::Memory {
            value: memory.value,
            unit: memory.unit.into(),
        }
    }
}

impl TryFrom<rpc::Memory> for Memory {
    type Error = String;

    fn try_from(memory: rpc::Memory) -> Result<Self, Self::Error> {
        Ok(Memory::new(memory.value, memory.unit.try_into()?))
    }
}

fn required_memory(memory: Option<rpc::Memory>, field: &str) -> Result<Memory, String> {
    memory
        .ok_or_else(|| format!("{} is required", field))?
        .try_into()
}

impl From<Cpu> for rpc::Cpu {
    fn from(cpu: Cpu) -> Self {
        rpc::Cpu {
            brand: cpu.brand,
            name: cpu.name,
            number_cores: cpu.number_cores,
            number_threads: cpu.number_threads,
            min_ghz: cpu.min_ghz,
            max_ghz: cpu.max_ghz,
        }
    }
}

impl From<rpc::Cpu> for Cpu {
    fn from(cpu: rpc::Cpu) -> Self {
        Cpu {
            brand: cpu.brand,
            name: cpu.name,
            number_cores: cpu.number_cores,
            number_threads: cpu.number_threads,
            min_ghz: cpu.min_ghz,
            max_ghz: cpu.max_ghz,
        }
    }
}

impl From<Gpu> for rpc::Gpu {
    fn from(gpu: Gpu) -> Self {
        rpc::Gpu {
            brand: gpu.brand,
            name: gpu.name,
            min_ghz: gpu.min_ghz,
            max_ghz: gpu.max_ghz,
            memory: Some(gpu.memory.into()),
        }
    }
}

impl TryFrom<rpc::Gpu> for Gpu {
    type Error = String;

    fn try_from(gpu: rpc::Gpu) -> Result<Self, Self::Error> {
        Ok(Gpu {
            memory: required_memory(gpu.memory, "gpu memory")?,
            brand: gpu.brand,
            name: gpu.name,
            min_ghz: gpu.min_ghz,
            max_ghz: gpu.max_ghz,
        })
    }
}

impl From<Storage> for rpc::Storage {
    fn from(storage: Storage) -> Self {
        rpc::Storage {
            driver: storage.driver.into(),
            memory: Some(storage.memory.into()),
        }
    }
}

impl TryFrom<rpc::Storage> for Storage {
    type Error = String;

    fn try_from(storage: rpc::Storage) -> Result<Self, Self::Error> {
        Ok(Storage {
            driver: storage.driver.try_into()?,
            memory: required_memory(storage.memory, "storage memory")?,
        })
    }
}

impl From<Screen> for rpc::Screen {
    fn from(screen: Screen) -> Self {
        rpc::Screen {
            size_inch: screen.size_inch,
            resolution: Some(rpc::screen::Resolution {
                width: screen.resolution.width,
                height: screen.resolution.height,
            }),
            panel: screen.panel.into(),
            multitouch: screen.multitouch,
        }
    }
}

impl TryFrom<rpc::Screen> for Screen {
    type Error = String;

    fn try_from(screen: rpc::Screen) -> Result<Self, Self::Error> {
        let resolution = screen
            .resolution
            .map(|r| Resolution {
                width: r.width,
                height: r.height,
            })
            .unwrap_or_default();
        Ok(Screen {
            size_inch: screen.size_inch,
            resolution,
            panel: screen.panel.try_into()?,
            multitouch: screen.multitouch,
        })
    }
}

impl From<Keyboard> for rpc::Keyboard {
    fn from(keyboard: Keyboard) -> Self {
        rpc::Keyboard {
            layout: keyboard.layout.into(),
            backlit: keyboard.backlit,
        }
    }
}

impl TryFrom<rpc::Keyboard> for Keyboard {
    type Error = String;

    fn try_from(keyboard: rpc::Keyboard) -> Result<Self, Self::Error> {
        Ok(Keyboard {
            layout: keyboard.layout.try_into()?,
            backlit: keyboard.backlit,
        })
    }
}

// ============================================================================
// Laptop & Filter
// ============================================================================

impl From<Laptop> for rpc::Laptop {
    fn from(laptop: Laptop) -> Self {
        rpc::Laptop {
            id: laptop.id,
            brand: laptop.brand,
            name: laptop.name,
            cpu: Some(laptop.cpu.into()),
            ram: Some(laptop.ram.into()),
            gpus: laptop.gpus.into_iter().map(Into::into).collect(),
            storages: laptop.storages.into_iter().map(Into::into).collect(),
            screen: laptop.screen.map(Into::into),
            keyboard: laptop.keyboard.map(Into::into),
            weight_kg: laptop.weight_kg,
            price_usd: laptop.price_usd,
            release_year: laptop.release_year,
            updated_at: datetime_to_timestamp(laptop.updated_at),
        }
    }
}

impl TryFrom<rpc::Laptop> for Laptop {
    type Error = String;

    fn try_from(laptop: rpc::Laptop) -> Result<Self, Self::Error> {
        let cpu = laptop.cpu.ok_or_else(|| "laptop cpu is required".to_string())?;
        let gpus = laptop
            .gpus
            .into_iter()
            .map(Gpu::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let storages = laptop
            .storages
            .into_iter()
            .map(Storage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Laptop {
            id: laptop.id,
            brand: laptop.brand,
            name: laptop.name,
            cpu: cpu.into(),
            ram: required_memory(laptop.ram, "laptop ram")?,
            gpus,
            storages,
            screen: laptop.screen.map(Screen::try_from).transpose()?,
            keyboard: laptop.keyboard.map(Keyboard::try_from).transpose()?,
            weight_kg: laptop.weight_kg,
            price_usd: laptop.price_usd,
            release_year: laptop.release_year,
            updated_at: timestamp_to_datetime(laptop.updated_at),
        })
    }
}

impl From<Filter> for rpc::Filter {
    fn from(filter: Filter) -> Self {
        rpc::Filter {
            max_price_usd: filter.max_price_usd,
            min_cpu_cores: filter.min_cpu_cores,
            min_cpu_ghz: filter.min_cpu_ghz,
            min_ram: Some(filter.min_ram.into()),
        }
    }
}

impl TryFrom<rpc::Filter> for Filter {
    type Error = String;

    /// A missing `min_ram` means no memory requirement.
    fn try_from(filter: rpc::Filter) -> Result<Self, Self::Error> {
        Ok(Filter {
            max_price_usd: filter.max_price_usd,
            min_cpu_cores: filter.min_cpu_cores,
            min_cpu_ghz: filter.min_cpu_ghz,
            min_ram: filter
                .min_ram
                .map(Memory::try_from)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

// ============================================================================
// Streaming units
// ============================================================================

impl TryFrom<rpc::UploadImageRequest> for ImageUnit {
    type Error = String;

    fn try_from(request: rpc::UploadImageRequest) -> Result<Self, Self::Error> {
        match request.data {
            Some(Data::Info(info)) => Ok(ImageUnit::Info {
                laptop_id: info.laptop_id,
                image_type: info.image_type,
            }),
            Some(Data::ChunkData(chunk)) => Ok(ImageUnit::Chunk(chunk)),
            None => Err("upload message carries neither image info nor chunk data".to_string()),
        }
    }
}

impl From<ImageUnit> for rpc::UploadImageRequest {
    fn from(unit: ImageUnit) -> Self {
        let data = match unit {
            ImageUnit::Info {
                laptop_id,
                image_type,
            } => Data::Info(rpc::ImageInfo {
                laptop_id,
                image_type,
            }),
            ImageUnit::Chunk(chunk) => Data::ChunkData(chunk),
        };
        rpc::UploadImageRequest { data: Some(data) }
    }
}

impl From<ImageUpload> for rpc::UploadImageResponse {
    fn from(upload: ImageUpload) -> Self {
        rpc::UploadImageResponse {
            id: upload.id,
            size: upload.size,
        }
    }
}

impl From<rpc::RateLaptopRequest> for RatingRequest {
    fn from(request: rpc::RateLaptopRequest) -> Self {
        RatingRequest {
            laptop_id: request.laptop_id,
            score: request.score,
        }
    }
}

impl From<RatingSummary> for rpc::RateLaptopResponse {
    fn from(summary: RatingSummary) -> Self {
        rpc::RateLaptopResponse {
            laptop_id: summary.laptop_id,
            rated_count: summary.rated_count,
            average_score: summary.average_score,
        }
    }
}
