mod bundler_options;
mod chunk;
mod module;
mod module_loader;
mod types;

pub use kiln_ecmascript::{ESTarget, ImportRecordMeta, JsxOptions, JsxRuntime};

pub use crate::{
  bundler_options::{
    filename_template::FilenameTemplate, input_item::InputItem, module_type::ModuleType,
    normalized_bundler_options::NormalizedBundlerOptions, output_format::OutputFormat,
    platform::Platform, BundlerOptions,
  },
  chunk::{
    types::{cross_chunk_import_item::CrossChunkImportItem, preliminary_filename::PreliminaryFilename},
    Chunk,
  },
  module::{
    external_module::ExternalModule,
    normal_module::{NormalModule, NormalModuleMeta},
    Module,
  },
  module_loader::{task_result::NormalModuleTaskResult, ModuleLoaderMsg},
  types::{
    chunk_kind::ChunkKind,
    entry_point::{EntryPoint, EntryPointKind},
    exports_kind::ExportsKind,
    import_kind::ImportKind,
    import_record::{ImportRecord, RawImportRecord, ResolvedImportRecord},
    instantiated_chunk::{InstantiatedChunk, InstantiationKind, StrOrBytes},
    metafile::{Metafile, MetafileImport, MetafileInput, MetafileOutput, MetafileOutputInput},
    module_id::ModuleId,
    module_status::ModuleStatus,
    named_export::LocalExport,
    named_import::{NamedImport, Specifier},
    namespace_alias::NamespaceAlias,
    output::Output,
    output_asset::OutputAsset,
    output_chunk::OutputChunk,
    package_json::{PackageJson, SideEffects as PackageSideEffects},
    raw_idx::{AssetIdx, ChunkIdx, ImportRecordIdx, ModuleIdx, StmtInfoIdx, SymbolId},
    resolved_id::ResolvedId,
    side_effects,
    stmt_info::{StmtInfo, StmtInfos},
    symbol_ref::SymbolRef,
    symbol_ref_db::{SymbolRefDataClassic, SymbolRefDb, SymbolRefDbForModule},
    wrap_kind::WrapKind,
  },
};
