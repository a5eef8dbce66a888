//! Company-scoped OAuth application credentials.
//!
//! Each company registers its own OAuth app per ad platform; sync and
//! authorization flows resolve credentials through this module.

pub mod credentials_model;
pub mod credentials_service;
pub mod credentials_traits;

pub use credentials_model::{CompanyOAuthApp, NewCompanyOAuthApp};
pub use credentials_service::CredentialsService;
pub use credentials_traits::{CompanyOAuthAppRepositoryTrait, CredentialsServiceTrait};
