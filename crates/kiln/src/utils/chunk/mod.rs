pub mod deconflict_chunk_symbols;
pub mod finalize_chunks;
pub mod render_chunk_exports;
pub mod render_chunk_imports;
pub mod runtime_helpers;
pub mod validate_options_for_multi_chunk_output;
