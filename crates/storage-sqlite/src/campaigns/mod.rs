pub mod model;
pub mod repository;

pub use model::{CampaignDB, CreativeDB, MetricsRecordDB};
pub use repository::CampaignRepository;
