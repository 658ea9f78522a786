mod locate;
mod tail;
mod watch;

pub use locate::*;
pub use tail::*;
pub use watch::*;
