pub mod automation;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod io;
pub mod paths;
pub mod project;
pub mod provider;
pub mod rca;
pub mod requirements;
pub mod session_log;
pub mod test_report;
pub mod user;

pub use error::{Result, WorkroomError};
