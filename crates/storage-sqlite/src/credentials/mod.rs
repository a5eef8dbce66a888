pub mod model;
pub mod repository;

pub use model::CompanyOAuthAppDB;
pub use repository::CompanyOAuthAppRepository;
