pub mod app_config;
pub mod media_store;
pub mod product_repo;

pub use app_config::Config;
pub use media_store::FsMediaStore;
pub use product_repo::InMemoryProductRepository;
