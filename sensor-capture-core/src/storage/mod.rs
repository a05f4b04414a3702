pub mod append_sink;
pub mod report_log;
