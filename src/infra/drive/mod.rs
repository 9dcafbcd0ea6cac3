pub mod download_store;
pub mod drive_api_client;
pub mod service_account;

pub use download_store::LocalDownloadStore;
pub use drive_api_client::DriveApiClient;
pub use service_account::ServiceAccountAuth;
