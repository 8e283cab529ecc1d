pub mod builder;
pub mod dbs;
pub mod error;
pub mod http;
pub mod merge;
pub mod models;
pub mod trait_client;

pub use builder::HttpPersistenceClientBuilder;
pub use dbs::json_file::JsonFileStore;
pub use error::{PersistError, Result};
pub use http::client::HttpPersistenceClient;
pub use merge::apply_patch;
pub use models::{MeetingPatch, Record, StoreData};
pub use trait_client::PersistenceClient;
