//! Core services for greenrack-catalog

pub mod apply;
pub mod batch_upload;
pub mod matcher;
pub mod pos_client;

pub use apply::ApplyPipeline;
pub use batch_upload::UploadPipeline;
pub use matcher::RuleMatcher;
pub use pos_client::{PosClient, PosError, ProductImageSink, ProductQuery};
