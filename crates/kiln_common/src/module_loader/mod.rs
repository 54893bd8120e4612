pub mod task_result;

use kiln_error::BuildDiagnostic;

use crate::ModuleIdx;

use self::task_result::NormalModuleTaskResult;

pub enum ModuleLoaderMsg {
  NormalModuleDone(NormalModuleTaskResult),
  BuildErrors { module_idx: ModuleIdx, errors: Vec<BuildDiagnostic> },
}
