pub mod course_trace;
pub mod run_summary;
