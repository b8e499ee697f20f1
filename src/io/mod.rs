pub mod config_io;
pub mod lock;
pub mod ocs;
pub mod session;
pub mod store;
pub mod transport;
