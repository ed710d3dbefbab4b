//! Source-to-source translation core for the `.au` dialect.
//!
//! Pure pipeline: given source lines, produces header/body text, a C#
//! façade, and the symbol metadata the cross-file solver and build
//! planner (`au-build`) consume. Performs no I/O and spawns no
//! subprocesses — those are `au-build`'s job.

pub mod assembler;
pub mod csharp;
pub mod directives;
pub mod error;
pub mod lexical;
pub mod members;
pub mod signatures;
pub mod source_file;
pub mod struct_enum;
pub mod translator;
pub mod types;

pub use error::{Result, TranslateError};
pub use source_file::{SourceFile, SourceFileId};
pub use translator::TranslationContext;
