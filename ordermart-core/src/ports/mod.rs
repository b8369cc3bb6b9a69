pub mod table_io;

pub use table_io::{TableSink, TableSource};
