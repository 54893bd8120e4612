pub mod cross_chunk_import_item;
pub mod preliminary_filename;
