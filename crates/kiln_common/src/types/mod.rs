pub mod chunk_kind;
pub mod entry_point;
pub mod exports_kind;
pub mod import_kind;
pub mod import_record;
pub mod instantiated_chunk;
pub mod metafile;
pub mod module_id;
pub mod module_status;
pub mod named_export;
pub mod named_import;
pub mod namespace_alias;
pub mod output;
pub mod output_asset;
pub mod output_chunk;
pub mod package_json;
pub mod raw_idx;
pub mod resolved_id;
pub mod side_effects;
pub mod stmt_info;
pub mod symbol_ref;
pub mod symbol_ref_db;
pub mod wrap_kind;
