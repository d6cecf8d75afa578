use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub blob: BlobConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlobConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL used to compose public derivative URLs.
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            api_key: None,
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "google/gemini-2.5-flash-preview".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_image_pixels: u64,
    pub max_fetch_bytes: usize,
    pub fetch_timeout_secs: u64,
    pub min_confidence_for_assignment: f64,
    pub vision_check_lower_bound: f64,
    pub vision_check_upper_bound: f64,
    pub vision_sample_rate: f64,
    pub bucket_gc_interval_secs: u64,
    /// When true, the dedup path only assigns the existing image if it was
    /// classified as a front. The default mirrors the original behavior of
    /// assigning whatever the digest matched.
    pub verify_side_on_dedup: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_image_pixels: 20_000_000,
            max_fetch_bytes: 25 * 1024 * 1024,
            fetch_timeout_secs: 30,
            min_confidence_for_assignment: 0.85,
            vision_check_lower_bound: 0.6,
            vision_check_upper_bound: 0.9,
            vision_sample_rate: crate::vision::DEFAULT_SAMPLE_RATE,
            bucket_gc_interval_secs: 60,
            verify_side_on_dedup: false,
        }
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_path = Path::new(path);
    let config_text =
        fs::read_to_string(config_path).context(format!("Failed to read config file: {}", path))?;

    let mut config: Config = config::Config::builder()
        .add_source(config::File::from_str(
            &config_text,
            config::FileFormat::Toml,
        ))
        .build()?
        .try_deserialize()?;

    // Apply environment variable overrides
    if let Ok(api_key) = std::env::var("OPENROUTER_API_KEY") {
        config.vision.api_key = Some(api_key);
    }

    if let Ok(url) = std::env::var("CATALOG_URL") {
        config.catalog.url = url;
    }

    Ok(config)
}
