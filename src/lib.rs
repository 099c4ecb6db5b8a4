pub mod ast;
pub mod error;
pub mod export;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod section;
pub mod serializer;
pub mod sync;
pub mod config;

pub use ast::{Value, ValueKind};
pub use error::XclError;
pub use config::Xcl;
pub use parser::{Diagnostic, DiagnosticKind};
pub use resolver::DELIMITER;
pub use section::Section;
pub use sync::SharedSection;
