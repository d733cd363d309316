pub mod details;
pub mod suggestion;

pub use details::*;
pub use suggestion::*;
