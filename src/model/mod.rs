pub mod comment;
pub mod config;
pub mod forest;

pub use comment::*;
pub use config::*;
pub use forest::*;
