use std::path::Path;

use clap::Args;
use domain_laptops::{Filter, ImageUnit, Memory, MemoryUnit, sample, serializer};
use eyre::{Result, WrapErr, eyre};
use grpc_client::ChannelConfig;
use rpc::laptop_service_client::LaptopServiceClient;
use rpc::{CreateLaptopRequest, RateLaptopRequest, SearchLaptopRequest, UploadImageRequest};
use tokio_stream::StreamExt;
use tonic::transport::Channel;
use tonic::Code;
use tracing::{info, warn};

/// Bytes per upload message
pub const CHUNK_SIZE: usize = 1024;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Sample laptops to create before searching
    #[arg(long, default_value_t = 10)]
    pub seed: usize,

    #[arg(long, default_value_t = 3000.0)]
    pub max_price: f64,

    #[arg(long, default_value_t = 4)]
    pub min_cores: u32,

    #[arg(long, default_value_t = 2.5)]
    pub min_ghz: f64,

    #[arg(long, default_value_t = 8)]
    pub min_ram_gb: u64,
}

impl SearchArgs {
    pub fn filter(&self) -> Filter {
        Filter {
            max_price_usd: self.max_price,
            min_cpu_cores: self.min_cores,
            min_cpu_ghz: self.min_ghz,
            min_ram: Memory::new(self.min_ram_gb, MemoryUnit::Gigabyte),
        }
    }
}

/// Laptop service client that puts the channel's call deadline on every call
pub struct LaptopClient {
    inner: LaptopServiceClient<Channel>,
    config: ChannelConfig,
}

impl LaptopClient {
    pub fn new(inner: LaptopServiceClient<Channel>, config: ChannelConfig) -> Self {
        Self { inner, config }
    }

    /// Create one sample laptop and return its id
    ///
    /// A duplicate id is logged and not treated as a failure.
    pub async fn create_sample(&mut self) -> Result<String> {
        let laptop = sample::new_laptop();
        let id = laptop.id.clone();
        let request = self.config.request(CreateLaptopRequest {
            laptop: Some(laptop.into()),
        });

        match self.inner.create_laptop(request).await {
            Ok(response) => {
                let id = response.into_inner().id;
                info!(laptop_id = %id, "Created laptop");
                Ok(id)
            }
            Err(status) if status.code() == Code::AlreadyExists => {
                warn!(laptop_id = %id, "Laptop already exists");
                Ok(id)
            }
            Err(status) => Err(eyre!("cannot create laptop: {}", status)),
        }
    }

    /// Stream laptops matching `filter`, returning how many arrived
    pub async fn search(&mut self, filter: Filter) -> Result<usize> {
        info!(?filter, "Searching laptops");
        let request = self.config.request(SearchLaptopRequest {
            filter: Some(filter.into()),
        });
        let mut stream = self
            .inner
            .search_laptop(request)
            .await
            .wrap_err("cannot search laptop")?
            .into_inner();

        let mut found = 0;
        while let Some(response) = stream.next().await {
            let response = response.wrap_err("cannot receive response")?;
            let Some(laptop) = response.laptop else {
                continue;
            };
            found += 1;
            let cpu = laptop.cpu.unwrap_or_default();
            let ram = laptop.ram.unwrap_or_default();
            info!(
                laptop_id = %laptop.id,
                brand = %laptop.brand,
                name = %laptop.name,
                cpu_cores = cpu.number_cores,
                cpu_min_ghz = cpu.min_ghz,
                cpu_max_ghz = cpu.max_ghz,
                ram = ram.value,
                ram_unit = ?rpc::memory::Unit::try_from(ram.unit).unwrap_or_default(),
                price_usd = laptop.price_usd,
                "Found laptop"
            );
        }

        info!(found, "Search finished");
        Ok(found)
    }

    /// Upload `path` for `laptop_id` in `CHUNK_SIZE` pieces
    pub async fn upload_image(&mut self, laptop_id: &str, path: &Path) -> Result<(String, u32)> {
        let data = tokio::fs::read(path)
            .await
            .wrap_err_with(|| format!("cannot read image file {}", path.display()))?;
        let messages = upload_messages(laptop_id, &image_type(path), &data);
        info!(%laptop_id, chunks = messages.len() - 1, "Uploading image");

        let request = self.config.request(tokio_stream::iter(messages));
        let response = self
            .inner
            .upload_image(request)
            .await
            .wrap_err("cannot upload image")?
            .into_inner();

        info!(image_id = %response.id, size = response.size, "Image uploaded");
        Ok((response.id, response.size))
    }

    /// Send one random score per laptop on a single stream
    pub async fn rate_random(&mut self, laptop_ids: &[String]) -> Result<()> {
        let requests: Vec<RateLaptopRequest> = laptop_ids
            .iter()
            .map(|id| RateLaptopRequest {
                laptop_id: id.clone(),
                score: sample::random_laptop_score(),
            })
            .collect();
        for request in &requests {
            info!(laptop_id = %request.laptop_id, score = request.score, "Sending rating");
        }

        let request = self.config.request(tokio_stream::iter(requests));
        let mut replies = self
            .inner
            .rate_laptop(request)
            .await
            .wrap_err("cannot rate laptop")?
            .into_inner();

        while let Some(reply) = replies.next().await {
            let reply = reply.wrap_err("cannot receive stream response")?;
            info!(
                laptop_id = %reply.laptop_id,
                rated_count = reply.rated_count,
                average_score = reply.average_score,
                "Received rating"
            );
        }
        Ok(())
    }
}

/// Write one sample laptop as protobuf and/or JSON
///
/// With no paths the JSON form goes to stdout.
pub fn write_sample(binary: Option<&Path>, json: Option<&Path>) -> Result<()> {
    let laptop = sample::new_laptop();

    if let Some(path) = binary {
        serializer::write_binary_file(&laptop, path)?;
        info!(laptop_id = %laptop.id, path = %path.display(), "Wrote binary laptop");
    }
    if let Some(path) = json {
        serializer::write_json_file(&laptop, path)?;
        info!(laptop_id = %laptop.id, path = %path.display(), "Wrote JSON laptop");
    }
    if binary.is_none() && json.is_none() {
        println!("{}", serializer::laptop_to_json(&laptop)?);
    }
    Ok(())
}

/// File extension with its dot, e.g. `.jpg`; empty when there is none
fn image_type(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn upload_messages(laptop_id: &str, image_type: &str, data: &[u8]) -> Vec<UploadImageRequest> {
    let info = ImageUnit::Info {
        laptop_id: laptop_id.to_string(),
        image_type: image_type.to_string(),
    };
    std::iter::once(info)
        .chain(data.chunks(CHUNK_SIZE).map(|chunk| ImageUnit::Chunk(chunk.to_vec())))
        .map(UploadImageRequest::from)
        .collect()
}
