pub mod hook_end_args;
pub mod hook_load_args;
pub mod hook_load_output;
pub mod hook_resolve_args;
pub mod hook_resolve_output;
