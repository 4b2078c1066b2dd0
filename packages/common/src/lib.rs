pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod intake;
pub mod item;
pub mod record;
pub mod render;
pub mod session;
pub mod store;
pub mod validator;

pub use analysis::{AnalysisClient, AnalysisError, AnalysisResult, ResultCategory};
pub use item::{ItemId, ItemStatus, UploadItem};
pub use session::Session;
pub use store::{ItemStore, Settled, StoreError};
pub use validator::{UploadPolicy, ValidationError};
