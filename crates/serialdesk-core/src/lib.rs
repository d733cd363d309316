//! serialdesk core: serial-number models, the page surface and the form
//! assistant that drives it.

pub mod assistant;
pub mod config;
pub mod error;
pub mod models;
pub mod page;

pub use assistant::{Effect, FormAssistant, FormEvent, LookupOutcome, Ticket};
pub use config::{AppConfig, BackendConfig, FormConfig, LogConfig};
pub use error::{ExitCode, Result, SerialDeskError};
pub use models::*;
pub use page::{MemoryPage, Page, PageUrl};
