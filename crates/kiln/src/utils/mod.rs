pub mod asset_filename;
pub mod chunk;
pub mod load_source;
pub mod normalize_options;
pub mod renamer;
pub mod render_ecma_module;
pub mod resolve_id;
