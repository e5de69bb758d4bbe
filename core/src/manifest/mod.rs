pub mod entry;
pub mod parser;

pub use entry::{Directive, Manifest, Step, Target, Tool};
pub use parser::{ManifestError, ManifestParser, ParseError, ParseErrorKind};
