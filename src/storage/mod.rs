//! Durable design hosting
//!
//! Uploads design artwork to Cloudflare R2 so the mockup-generation service can
//! fetch it by URL. R2 is S3-compatible, so we use the AWS SDK.

mod r2;

pub use r2::{design_key, R2AssetHost, R2Error};
