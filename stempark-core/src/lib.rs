pub mod product;
pub mod repository;
pub mod service;

pub use product::{NewProduct, Product};
pub use repository::{MediaStore, ProductRepository, StoreError};
pub use service::{ServiceError, VariantService};

pub type ServiceResult<T> = Result<T, ServiceError>;
