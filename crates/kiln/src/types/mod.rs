pub mod bundle_output;
pub mod chunk_graph;
pub mod generator;
pub mod linking_metadata;
pub mod transform_cache;

use std::sync::Arc;

use kiln_common::{AssetIdx, InstantiatedChunk, Module, ModuleIdx, NormalizedBundlerOptions};
use kiln_resolver::Resolver;
use oxc_index::IndexVec;

pub type IndexModules = IndexVec<ModuleIdx, Module>;
pub type IndexInstantiatedChunks = IndexVec<AssetIdx, InstantiatedChunk>;

pub type SharedResolver = Arc<Resolver>;
pub type SharedOptions = Arc<NormalizedBundlerOptions>;
