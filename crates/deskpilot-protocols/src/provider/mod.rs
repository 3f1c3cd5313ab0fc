//! Action provider protocol definitions.
//!
//! A provider turns a user request plus screen context into a list of
//! validated actions. Variants range from direct cloud APIs to a local
//! inference daemon and the native automation host.

mod context;
mod descriptor;
mod prompt;
mod traits;

pub use context::*;
pub use descriptor::*;
pub use prompt::*;
pub use traits::*;
