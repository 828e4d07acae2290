//! Random laptop generator for demo traffic and tests.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Cpu, Gpu, Keyboard, KeyboardLayout, Laptop, Memory, MemoryUnit, Panel, Resolution, Screen,
    Storage, StorageDriver,
};

fn random_pick<'a>(choices: &[&'a str]) -> &'a str {
    choices[rand::random_range(0..choices.len())]
}

fn random_f64(min: f64, max: f64) -> f64 {
    if min >= max {
        return min;
    }
    rand::random_range(min..max)
}

pub fn new_keyboard() -> Keyboard {
    let layout = match rand::random_range(0..3) {
        0 => KeyboardLayout::Qwerty,
        1 => KeyboardLayout::Qwertz,
        _ => KeyboardLayout::Azerty,
    };
    Keyboard {
        layout,
        backlit: rand::random_bool(0.5),
    }
}

pub fn new_cpu() -> Cpu {
    let brand = random_pick(&["Intel", "AMD"]);
    let name = if brand == "Intel" {
        random_pick(&[
            "Xeon E-2286M",
            "Core i9-9980HK",
            "Core i7-9750H",
            "Core i5-9400F",
            "Core i3-1005G1",
        ])
    } else {
        random_pick(&[
            "Ryzen 7 PRO 2700U",
            "Ryzen 5 PRO 3500U",
            "Ryzen 3 PRO 3200GE",
        ])
    };

    let number_cores: u32 = rand::random_range(2..=8);
    let number_threads: u32 = rand::random_range(number_cores..=12);
    let min_ghz = random_f64(2.0, 3.5);
    let max_ghz = random_f64(min_ghz, 5.0);

    Cpu {
        brand: brand.to_string(),
        name: name.to_string(),
        number_cores,
        number_threads,
        min_ghz,
        max_ghz,
    }
}

pub fn new_gpu() -> Gpu {
    let brand = random_pick(&["NVIDIA", "AMD"]);
    let name = if brand == "NVIDIA" {
        random_pick(&["RTX 2060", "RTX 2070", "GTX 1660-Ti", "GTX 1070"])
    } else {
        random_pick(&["RX 590", "RX 580", "RX 5700-XT", "RX Vega-56"])
    };
    let min_ghz = random_f64(1.0, 1.5);
    let max_ghz = random_f64(min_ghz, 2.0);

    Gpu {
        brand: brand.to_string(),
        name: name.to_string(),
        min_ghz,
        max_ghz,
        memory: Memory::new(rand::random_range(2..=6), MemoryUnit::Gigabyte),
    }
}

pub fn new_ram() -> Memory {
    Memory::new(rand::random_range(4..=64), MemoryUnit::Gigabyte)
}

pub fn new_ssd() -> Storage {
    Storage {
        driver: StorageDriver::Ssd,
        memory: Memory::new(rand::random_range(128..=1024), MemoryUnit::Gigabyte),
    }
}

pub fn new_hdd() -> Storage {
    Storage {
        driver: StorageDriver::Hdd,
        memory: Memory::new(rand::random_range(1..=6), MemoryUnit::Terabyte),
    }
}

pub fn new_screen() -> Screen {
    // 16:9 resolutions from 1080p up to 8K
    let height: u32 = rand::random_range(1080..=4320);
    let width = height * 16 / 9;
    let panel = if rand::random_bool(0.5) {
        Panel::Ips
    } else {
        Panel::Oled
    };

    Screen {
        size_inch: rand::random_range(13.0f32..17.0),
        resolution: Resolution { width, height },
        panel,
        multitouch: rand::random_bool(0.5),
    }
}

/// A structurally valid laptop with a fresh id
pub fn new_laptop() -> Laptop {
    let brand = random_pick(&["Apple", "Dell", "Lenovo"]);
    let name = match brand {
        "Apple" => random_pick(&["Macbook Air", "Macbook Pro"]),
        "Dell" => random_pick(&["Latitude", "Vostro", "XPS", "Alienware"]),
        _ => random_pick(&["Thinkpad X1", "Thinkpad P1", "Thinkpad P53"]),
    };

    Laptop {
        id: Uuid::new_v4().to_string(),
        brand: brand.to_string(),
        name: name.to_string(),
        cpu: new_cpu(),
        ram: new_ram(),
        gpus: vec![new_gpu()],
        storages: vec![new_ssd(), new_hdd()],
        screen: Some(new_screen()),
        keyboard: Some(new_keyboard()),
        weight_kg: random_f64(1.0, 3.0),
        price_usd: random_f64(1500.0, 3500.0),
        release_year: rand::random_range(2015..=2019),
        updated_at: Utc::now(),
    }
}

/// Integer score between 1 and 10
pub fn random_laptop_score() -> f64 {
    f64::from(rand::random_range(1u32..=10))
}
