//! Build driver for the `.au` dialect: input classification, the
//! cross-file dependency solver, the incremental rebuild planner, the CLI
//! surface, and the thin toolchain wrapper. Consumes `au-translate`'s
//! per-file translation records; never the other way around.

pub mod cli;
pub mod driver;
pub mod error;
pub mod fs_classify;
pub mod planner;
pub mod resources;
pub mod solver;
pub mod toolchain;

pub use error::{BuildError, Result};
