pub mod recorder;
pub mod timing;

pub use recorder::{format_elapsed, InFlight, RequestRecorder, UNMATCHED_PATH};
pub use timing::{record_request, PROCESS_TIME_HEADER};
