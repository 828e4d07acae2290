use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Memory size units, ordered from smallest to largest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MemoryUnit {
    Bit,
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
}

impl MemoryUnit {
    /// Number of bits in one unit (binary multiples)
    pub fn bits(self) -> u64 {
        match self {
            MemoryUnit::Bit => 1,
            MemoryUnit::Byte => 8,
            MemoryUnit::Kilobyte => 8 << 10,
            MemoryUnit::Megabyte => 8 << 20,
            MemoryUnit::Gigabyte => 8 << 30,
            MemoryUnit::Terabyte => 8 << 40,
        }
    }
}

/// A memory quantity: magnitude plus unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub value: u64,
    pub unit: MemoryUnit,
}

impl Memory {
    pub fn new(value: u64, unit: MemoryUnit) -> Self {
        Self { value, unit }
    }

    /// Size normalised to bits. Saturates at `u64::MAX`.
    pub fn to_bits(&self) -> u64 {
        self.value.saturating_mul(self.unit.bits())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(0, MemoryUnit::Bit)
    }
}

impl std::fmt::Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpu {
    pub brand: String,
    pub name: String,
    pub number_cores: u32,
    pub number_threads: u32,
    pub min_ghz: f64,
    pub max_ghz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gpu {
    pub brand: String,
    pub name: String,
    pub min_ghz: f64,
    pub max_ghz: f64,
    pub memory: Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageDriver {
    Hdd,
    Ssd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub driver: StorageDriver,
    pub memory: Memory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Panel {
    Ips,
    Oled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub size_inch: f32,
    pub resolution: Resolution,
    pub panel: Panel,
    pub multitouch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum KeyboardLayout {
    Qwerty,
    Qwertz,
    Azerty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub layout: KeyboardLayout,
    pub backlit: bool,
}

/// Laptop entity - the catalog record
///
/// Every component is an owned value, so `clone()` is a full deep copy and
/// no two clones share mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laptop {
    /// UUID string; empty until assigned at creation
    #[serde(default)]
    pub id: String,
    pub brand: String,
    pub name: String,
    pub cpu: Cpu,
    pub ram: Memory,
    #[serde(default)]
    pub gpus: Vec<Gpu>,
    #[serde(default)]
    pub storages: Vec<Storage>,
    pub screen: Option<Screen>,
    pub keyboard: Option<Keyboard>,
    pub weight_kg: f64,
    pub price_usd: f64,
    pub release_year: u32,
    pub updated_at: DateTime<Utc>,
}

/// Search predicate over laptops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub max_price_usd: f64,
    pub min_cpu_cores: u32,
    pub min_cpu_ghz: f64,
    pub min_ram: Memory,
}

impl Filter {
    /// Price at most the maximum, cores and base clock at least the minimum,
    /// RAM at least the minimum once both are expressed in bits.
    pub fn matches(&self, laptop: &Laptop) -> bool {
        laptop.price_usd <= self.max_price_usd
            && laptop.cpu.number_cores >= self.min_cpu_cores
            && laptop.cpu.min_ghz >= self.min_cpu_ghz
            && laptop.ram.to_bits() >= self.min_ram.to_bits()
    }
}

/// A stored image blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub laptop_id: String,
    pub image_type: String,
    pub data: Vec<u8>,
}

/// One unit of an image upload stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUnit {
    Info {
        laptop_id: String,
        image_type: String,
    },
    Chunk(Vec<u8>),
}

/// Result of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub id: String,
    pub size: u32,
}

/// Running rating aggregate for one laptop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rating {
    pub count: u32,
    pub sum: f64,
}

impl Rating {
    /// Average score; 0 before the first rating
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// A single score submitted for a laptop
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRequest {
    pub laptop_id: String,
    pub score: f64,
}

/// Aggregate reported back after each score
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    pub laptop_id: String,
    pub rated_count: u32,
    pub average_score: f64,
}

impl RatingSummary {
    pub fn new(laptop_id: impl Into<String>, rating: Rating) -> Self {
        Self {
            laptop_id: laptop_id.into(),
            rated_count: rating.count,
            average_score: rating.average(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn laptop(price: f64, cores: u32, ghz: f64, ram: Memory) -> Laptop {
        Laptop {
            id: String::new(),
            brand: "Dell".to_string(),
            name: "XPS".to_string(),
            cpu: Cpu {
                brand: "Intel".to_string(),
                name: "Core i7".to_string(),
                number_cores: cores,
                number_threads: cores * 2,
                min_ghz: ghz,
                max_ghz: ghz + 1.0,
            },
            ram,
            gpus: vec![],
            storages: vec![],
            screen: None,
            keyboard: None,
            weight_kg: 1.5,
            price_usd: price,
            release_year: 2019,
            updated_at: Utc::now(),
        }
    }

    fn filter() -> Filter {
        Filter {
            max_price_usd: 3000.0,
            min_cpu_cores: 4,
            min_cpu_ghz: 2.5,
            min_ram: Memory::new(8, MemoryUnit::Gigabyte),
        }
    }

    #[test]
    fn test_unit_bits() {
        assert_eq!(Memory::new(1, MemoryUnit::Byte).to_bits(), 8);
        assert_eq!(Memory::new(1, MemoryUnit::Kilobyte).to_bits(), 8 * 1024);
        assert_eq!(
            Memory::new(8192, MemoryUnit::Megabyte).to_bits(),
            Memory::new(8, MemoryUnit::Gigabyte).to_bits()
        );
    }

    #[test]
    fn test_to_bits_saturates() {
        assert_eq!(Memory::new(u64::MAX, MemoryUnit::Terabyte).to_bits(), u64::MAX);
    }

    #[test]
    fn test_filter_boundaries_are_inclusive() {
        let exact = laptop(3000.0, 4, 2.5, Memory::new(8, MemoryUnit::Gigabyte));
        assert!(filter().matches(&exact));
    }

    #[test]
    fn test_filter_rejects_each_predicate() {
        let ram = Memory::new(16, MemoryUnit::Gigabyte);
        assert!(!filter().matches(&laptop(3000.01, 8, 3.0, ram)));
        assert!(!filter().matches(&laptop(2000.0, 2, 3.0, ram)));
        assert!(!filter().matches(&laptop(2000.0, 8, 2.4, ram)));
        assert!(!filter().matches(&laptop(2000.0, 8, 3.0, Memory::new(4096, MemoryUnit::Megabyte))));
    }

    #[test]
    fn test_filter_compares_ram_across_units() {
        let l = laptop(2000.0, 8, 3.0, Memory::new(8192, MemoryUnit::Megabyte));
        assert!(filter().matches(&l));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = laptop(2000.0, 8, 3.0, Memory::new(8, MemoryUnit::Gigabyte));
        let mut copy = original.clone();
        copy.cpu.name.push_str(" (modified)");
        copy.gpus.push(Gpu {
            brand: "AMD".to_string(),
            name: "RX 580".to_string(),
            min_ghz: 1.1,
            max_ghz: 1.3,
            memory: Memory::new(4, MemoryUnit::Gigabyte),
        });
        assert_ne!(original, copy);
        assert_eq!(original.cpu.name, "Core i7");
        assert!(original.gpus.is_empty());
    }

    #[test]
    fn test_rating_average() {
        assert_eq!(Rating::default().average(), 0.0);
        let rating = Rating { count: 4, sum: 30.0 };
        assert_eq!(rating.average(), 7.5);
        assert_eq!(RatingSummary::new("id", rating).rated_count, 4);
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!(MemoryUnit::Gigabyte.to_string(), "gigabyte");
        assert_eq!(MemoryUnit::from_str("megabyte").unwrap(), MemoryUnit::Megabyte);
        assert_eq!(KeyboardLayout::Qwertz.to_string(), "QWERTZ");
        assert_eq!(Memory::new(16, MemoryUnit::Gigabyte).to_string(), "16 gigabyte");
    }
}
