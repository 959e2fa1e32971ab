mod pagination;
mod repository;
mod store;

pub use pagination::*;
pub use repository::*;
pub use store::*;
