//! serialdesk client: HTTP access to the serial-number backend and the
//! async runner that executes form assistant effects.

pub mod backend;
pub mod error;
pub mod http;
pub mod runner;

pub use backend::{HttpSerialBackend, SerialBackend};
pub use error::{ClientError, Result};
pub use http::JsonClient;
pub use runner::FormRunner;
