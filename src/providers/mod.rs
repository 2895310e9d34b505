//! External collaborator integration
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │  EditingSession  │
//!                 └────────┬─────────┘
//!                          │
//!      ┌───────────────────┼────────────────────┐
//!      │                   │                    │
//! ┌────┴─────────┐   ┌─────┴──────┐   ┌─────────┴───────┐
//! │CatalogLookup │   │ AssetHost  │   │ MockupGenerator │
//! │  (Printful)  │   │    (R2)    │   │     (HTTP)      │
//! └──────────────┘   └────────────┘   └─────────────────┘
//! ```

pub mod traits;
pub mod http_client;
pub mod mockup_service;
pub mod printful;

pub use traits::{
    AssetHost,
    CatalogLookup,
    GeneratedMockup,
    GenerationRequest,
    GenerationResponse,
    MockupGenerator,
    ProviderCredentials,
    ProviderError,
    ProviderResult,
    Unconfigured,
};
pub use http_client::RateLimitedClient;
pub use mockup_service::HttpMockupService;
pub use printful::PrintfulCatalog;
