pub mod config;
pub mod download;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod prompt;
pub mod query;
pub mod resolve;
pub mod response;
pub mod subdl;

pub use error::SubdlError;
