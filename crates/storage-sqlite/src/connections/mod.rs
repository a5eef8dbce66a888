pub mod model;
pub mod repository;

pub use model::AdConnectionDB;
pub use repository::AdConnectionRepository;
