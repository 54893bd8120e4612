/// Tracks whether the top-level statement being scanned does anything observable when it runs,
/// beyond declaring bindings.
///
/// Code inside function bodies and instance field initializers does not run at module
/// evaluation, so it never counts.
#[derive(Debug, Default)]
pub(crate) struct SideEffectDetector {
  function_depth: u32,
  has_side_effects: bool,
}

impl SideEffectDetector {
  pub fn enter_function(&mut self) {
    self.function_depth += 1;
  }

  pub fn leave_function(&mut self) {
    self.function_depth = self.function_depth.saturating_sub(1);
  }

  pub fn is_module_evaluation(&self) -> bool {
    self.function_depth == 0
  }

  pub fn mark(&mut self) {
    if self.is_module_evaluation() {
      self.has_side_effects = true;
    }
  }

  pub fn take(&mut self) -> bool {
    std::mem::take(&mut self.has_side_effects)
  }
}

/// Whether the code right before `start` is a `/* @__PURE__ */` or `/* #__PURE__ */` comment.
pub(crate) fn has_pure_annotation(source: &str, start: u32) -> bool {
  let before = source[..start as usize].trim_end();
  let Some(body) = before.strip_suffix("*/") else { return false };
  body.rfind("/*").is_some_and(|open| {
    matches!(body[open + 2..].trim(), "@__PURE__" | "#__PURE__")
  })
}

#[test]
fn pure_annotations() {
  let source = "/* @__PURE__ */ foo(); /*#__PURE__*/\nbar(); /* other */ baz();";
  assert!(has_pure_annotation(source, 16));
  assert!(has_pure_annotation(source, 37));
  assert!(!has_pure_annotation(source, 56));
  assert!(!has_pure_annotation(source, 0));
}
