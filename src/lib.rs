mod error;
mod narration;
mod report;
mod runner;
mod trial;

pub use error::*;
pub use narration::*;
pub use report::*;
pub use runner::*;
pub use trial::*;
pub use uuid::Uuid;
