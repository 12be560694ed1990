//! HTTP API handlers for greenrack-catalog

pub mod apply;
pub mod descriptions;
pub mod health;
pub mod images;
pub mod matching;
pub mod products;
pub mod repository;

pub use apply::{apply_images, upload_batch};
pub use descriptions::set_description;
pub use health::health;
pub use images::{remove_product_image, set_product_image};
pub use matching::match_products;
pub use products::{get_categories, get_products, get_strains};
pub use repository::{
    create_image, create_rule, delete_image, delete_rule, get_image_data, list_images,
};
