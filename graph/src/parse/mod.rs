pub mod record;

pub use record::{parse_records, Record, SEPARATOR};
