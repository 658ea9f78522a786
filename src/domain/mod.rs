mod classify;
mod record;
mod tools;
mod types;

pub use classify::*;
pub use record::*;
pub use tools::*;
pub use types::*;
