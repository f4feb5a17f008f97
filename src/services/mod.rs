pub mod image_binder;
pub mod record_parser;
pub mod report_writer;

pub use image_binder::ImageBinder;
pub use record_parser::{BatchParse, PastSchedule, RecordParser};
pub use report_writer::ReportWriter;
