pub mod assignment;
pub mod broadcast;
pub mod outcome;

pub use assignment::{BindingPreview, ImageAssignment};
pub use broadcast::{BroadcastRecordBatch, BroadcastRequest, Field, FieldSet};
pub use outcome::{ScheduleOutcome, ScheduleReport, Stage};
