pub mod capability_broker;
pub mod lifecycle_delegate;
pub mod output_sink;
