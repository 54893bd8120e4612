use std::sync::Arc;

use arcstr::ArcStr;
use dashmap::DashMap;
use kiln_common::ModuleType;
use kiln_ecmascript::EcmaAst;

/// The part of a module that only depends on its own source: the transformed and scanned code.
#[derive(Debug, Clone)]
pub struct CachedTransform {
  pub original_source: ArcStr,
  pub module_type: ModuleType,
  pub ecma: Arc<EcmaAst>,
  pub css_source: Option<ArcStr>,
  pub asset_source: Option<Arc<[u8]>>,
}

/// Keyed by module id. Kept by a build context between rebuilds.
pub type TransformCache = DashMap<ArcStr, CachedTransform>;

pub type SharedTransformCache = Arc<TransformCache>;
