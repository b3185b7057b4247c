//! Record model shared by drivers, indexes and tables

mod error;
mod row;
mod schema;
mod value;

pub use error::{RecordError, RecordResult};
pub use row::{Row, RowKey};
pub use schema::{Column, FormatOptions, SchemaDescriptor, unique_column_name};
pub use value::{DataType, Value};
