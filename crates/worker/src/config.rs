use driveline_pipeline::vin::DEFAULT_VPIC_BASE_URL;

/// Worker configuration loaded from environment variables.
///
/// Requires a Gemini API key and one storage backend; everything else
/// has defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Gemini API key, sent on every oracle request.
    pub gemini_api_key: String,
    /// Gemini API origin.
    pub gemini_base_url: String,
    /// Model for analysis-grade prompts.
    pub gemini_pro_model: String,
    /// Cheaper model for bounded-output sweeps.
    pub gemini_flash_model: String,
    /// S3 bucket for blobs. Ignored when `storage_root` is set.
    pub s3_bucket: Option<String>,
    /// Local directory serving as the blob store instead of S3.
    pub storage_root: Option<String>,
    /// Transitions claimed per dispatcher poll.
    pub feed_batch_size: i64,
    /// Seconds before an unacked transition claim expires.
    pub feed_visibility_timeout_secs: f64,
    /// vPIC service root for VIN decoding.
    pub vin_api_base: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Default                                     |
    /// |--------------------------------|---------------------------------------------|
    /// | `GEMINI_API_KEY`               | required                                    |
    /// | `GEMINI_BASE_URL`              | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_PRO_MODEL`             | `gemini-2.5-pro`                            |
    /// | `GEMINI_FLASH_MODEL`           | `gemini-2.5-flash`                          |
    /// | `S3_BUCKET`                    | unset                                       |
    /// | `STORAGE_ROOT`                 | unset                                       |
    /// | `FEED_BATCH_SIZE`              | `10`                                        |
    /// | `FEED_VISIBILITY_TIMEOUT_SECS` | `300`                                       |
    /// | `VIN_API_BASE`                 | `https://vpic.nhtsa.dot.gov`                |
    pub fn from_env() -> Self {
        let gemini_api_key =
            std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");

        let gemini_base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into());

        let gemini_pro_model =
            std::env::var("GEMINI_PRO_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".into());

        let gemini_flash_model =
            std::env::var("GEMINI_FLASH_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

        let s3_bucket = std::env::var("S3_BUCKET").ok().filter(|s| !s.is_empty());

        let storage_root = std::env::var("STORAGE_ROOT").ok().filter(|s| !s.is_empty());

        let feed_batch_size: i64 = std::env::var("FEED_BATCH_SIZE")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("FEED_BATCH_SIZE must be a valid i64");

        let feed_visibility_timeout_secs: f64 = std::env::var("FEED_VISIBILITY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("FEED_VISIBILITY_TIMEOUT_SECS must be a valid f64");

        let vin_api_base =
            std::env::var("VIN_API_BASE").unwrap_or_else(|_| DEFAULT_VPIC_BASE_URL.into());

        Self {
            gemini_api_key,
            gemini_base_url,
            gemini_pro_model,
            gemini_flash_model,
            s3_bucket,
            storage_root,
            feed_batch_size,
            feed_visibility_timeout_secs,
            vin_api_base,
        }
    }
}
