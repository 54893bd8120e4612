use kiln_common::{ImportKind, Module, StmtInfos};

use crate::{
  stages::generate::scope_hoisting::ScopeHoistingFinalizer, types::generator::GenerateContext,
};

/// Runs a wrapped module on the first call and returns its `module.exports` from then on.
const COMMON_JS: &str = "var __commonJS = (cb, mod) => function __require() {
  return mod || (0, cb[Object.keys(cb)[0]])((mod = { exports: {} }).exports, mod), mod.exports;
};";

/// Turns whatever `require()` returns into something that looks like an esm namespace.
const TO_ESM: &str = "var __toESM = (mod) => (mod && mod.__esModule ? mod : \
  Object.assign(Object.create(null), mod, { default: mod }));";

/// Restores the `name` of a function or class that was renamed in the bundle.
const NAME: &str = "var __name = (target, value) => \
  Object.defineProperty(target, \"name\", { value, configurable: true });";

/// Names of the helpers. No symbol of a chunk may take them.
pub const RUNTIME_HELPER_NAMES: [&str; 3] = ["__commonJS", "__toESM", "__name"];

/// The helpers a chunk calls. They are emitted at the top of the chunk, in every format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeHelpers {
  pub common_js: bool,
  pub to_esm: bool,
  pub name: bool,
}

impl RuntimeHelpers {
  pub fn collect(ctx: &GenerateContext<'_>) -> Self {
    let link_output = ctx.link_output;
    let mut helpers = Self {
      // `import { a } from "external"` reads `a` off `__toESM(require("external"))`.
      to_esm: !ctx.options.format.keep_esm_import_export_syntax()
        && ctx
          .chunk
          .imports_from_external_modules
          .iter()
          .any(|(_, named_imports)| !named_imports.is_empty()),
      ..Self::default()
    };

    for module in ctx.renderable_ecma_modules() {
      let meta = &link_output.metadata[module.idx];
      if meta.wrapper_ref.is_some()
        && module.stmt_infos[StmtInfos::NAMESPACE_STMT_IDX].is_included
      {
        helpers.common_js = true;
      }

      for rec in &module.import_records {
        if !module.stmt_infos[rec.related_stmt_info_idx].is_included {
          continue;
        }
        let Module::Normal(importee) = &link_output.module_table[rec.resolved_module()] else {
          continue;
        };
        if link_output.metadata[importee.idx].wrapper_ref.is_none() {
          continue;
        }
        let binds_namespace = match rec.kind {
          ImportKind::Import => module
            .stmt_infos
            .declared_stmts_by_symbol(&rec.namespace_ref)
            .contains(&rec.related_stmt_info_idx),
          ImportKind::DynamicImport => !ctx.options.splitting,
          ImportKind::Require | ImportKind::EntryPoint => false,
        };
        helpers.to_esm |= binds_namespace;
      }

      if ctx.options.keep_names {
        let finalizer = ScopeHoistingFinalizer { ctx, module };
        helpers.name |= module.ecma.scanned.stmts.iter().enumerate().any(|(stmt_idx, _)| {
          module.stmt_infos[StmtInfos::stmt_info_idx_of(stmt_idx)].is_included
            && finalizer.renamed_values(stmt_idx).next().is_some()
        });
      }
    }

    helpers
  }

  pub fn render(self) -> Option<String> {
    let helpers = [(self.common_js, COMMON_JS), (self.to_esm, TO_ESM), (self.name, NAME)]
      .into_iter()
      .filter_map(|(needed, code)| needed.then_some(code))
      .collect::<Vec<_>>();
    (!helpers.is_empty()).then(|| helpers.join("\n"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_only_needed_helpers_in_a_fixed_order() {
    assert_eq!(RuntimeHelpers::default().render(), None);
    let code = RuntimeHelpers { common_js: true, to_esm: false, name: true }.render().unwrap();
    assert!(code.starts_with("var __commonJS = "));
    assert!(code.ends_with("configurable: true });"));
    assert!(!code.contains("__toESM"));
  }
}
