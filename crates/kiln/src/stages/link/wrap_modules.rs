use kiln_common::{Module, WrapKind};
use kiln_utils::concat_string;

use super::LinkStage;

impl LinkStage<'_> {
  /// Gives every wrapped module its `require_<name>` symbol.
  pub(crate) fn wrap_modules(&mut self) {
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      let meta = &mut self.metadata[module.idx];
      if meta.wrap_kind != WrapKind::Cjs {
        continue;
      }
      let wrapper_ref = self
        .symbols
        .create_facade_root_symbol_ref(module.idx, &concat_string!("require_", module.repr_name));
      meta.wrapper_ref = Some(wrapper_ref);
    }
  }
}
