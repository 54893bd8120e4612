pub mod es_target;
pub mod jsx_runtime;
pub mod output_format;
pub mod platform;
