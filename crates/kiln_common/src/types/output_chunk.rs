use arcstr::ArcStr;

use crate::ModuleId;

#[derive(Debug, Clone)]
pub struct OutputChunk {
  // PreRenderedChunk
  pub name: ArcStr,
  pub is_entry: bool,
  pub is_dynamic_entry: bool,
  pub facade_module_id: Option<ModuleId>,
  /// Contributing modules in execution order.
  pub module_ids: Vec<ModuleId>,
  pub exports: Vec<ArcStr>,

  // RenderedChunk
  pub filename: ArcStr,
  pub imports: Vec<ArcStr>,
  pub dynamic_imports: Vec<ArcStr>,

  // OutputChunk
  pub code: String,
  pub sourcemap_filename: Option<ArcStr>,
  pub preliminary_filename: String,
}
