pub mod offsets;
pub mod scanner;
pub mod source;
pub mod stream;

pub use offsets::OffsetTable;
pub use scanner::{scan, scan_parallel, scan_with_progress};
pub use source::{read_lines, SourceFile};
pub use stream::{Token, TokenStream};
