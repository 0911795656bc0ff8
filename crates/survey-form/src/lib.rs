#![allow(missing_docs)]

pub mod backend;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod deliver;
pub mod logging;

pub use backend::FileBackend;
pub use cli::{Cli, Commands};
pub use cmd::{GlobalArgs, Session};
pub use config::SurveyConfig;
pub use deliver::FsDeliverer;
