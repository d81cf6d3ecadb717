pub mod check;
pub mod payload;
pub mod service_error;

pub use check::*;
pub use payload::*;
pub use service_error::*;
