//! Loading tables from delimited files and workbooks, and writing them back.

mod parser;
mod source;
mod workbook;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use writer::{TableWriter, WriterConfig};
