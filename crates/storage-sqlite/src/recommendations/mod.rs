pub mod model;
pub mod repository;

pub use model::RecommendationDB;
pub use repository::RecommendationRepository;
