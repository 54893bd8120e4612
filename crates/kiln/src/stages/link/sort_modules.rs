use kiln_common::{Module, ModuleIdx};
use kiln_error::BuildDiagnostic;
use oxc_index::IndexVec;

use super::LinkStage;

impl LinkStage<'_> {
  /// Orders modules so that every module comes after the modules it imports or requires.
  ///
  /// The walk starts at the entries and follows `import` and `require()` in source order.
  /// Modules that import each other form a cycle: its members keep the order the walk found them
  /// in, so the first one discovered runs first. Each cycle is reported once.
  pub(crate) fn sort_modules(&mut self) {
    let dependencies = self
      .module_table
      .iter()
      .map(|module| {
        module
          .import_records()
          .iter()
          .filter(|rec| rec.kind.is_eager())
          .map(|rec| rec.resolved_module())
          .collect::<Vec<_>>()
      })
      .collect::<IndexVec<ModuleIdx, _>>();
    let roots = self.entry_points.iter().map(|entry| entry.id).collect::<Vec<_>>();
    let components = strongly_connected(&dependencies, &roots);

    let mut sorted_modules = Vec::with_capacity(self.module_table.len());
    for (exec_order, id) in (0u32..).zip(components.iter().flatten().copied()) {
      let module = &mut self.module_table[id];
      module.set_exec_order(exec_order);
      if let Module::Normal(module) = module {
        tracing::trace!(module = %module.stable_id, exec_order, "sorted");
        sorted_modules.push(id);
      }
    }

    for component in &components {
      let is_cycle = match component.as_slice() {
        [single] => dependencies[*single].contains(single),
        _ => true,
      };
      if !is_cycle {
        continue;
      }
      let paths = component
        .iter()
        .chain(component.first())
        .map(|id| self.module_table[*id].stable_id().to_string())
        .collect::<Vec<_>>();
      self.warnings.push(BuildDiagnostic::CircularDependency { paths });
    }

    self.sorted_modules = sorted_modules;
  }
}

#[derive(Debug, Clone, Copy)]
struct Visit {
  /// Preorder number, the order the walk discovers modules in.
  discovered: u32,
  lowlink: u32,
  on_stack: bool,
}

/// Tarjan's algorithm without recursion. Components come out dependencies first, the members of
/// each one in discovery order.
fn strongly_connected(
  dependencies: &IndexVec<ModuleIdx, Vec<ModuleIdx>>,
  roots: &[ModuleIdx],
) -> Vec<Vec<ModuleIdx>> {
  let mut visits: IndexVec<ModuleIdx, Option<Visit>> =
    oxc_index::index_vec![None; dependencies.len()];
  let mut next_discovered = 0;
  let mut component_stack = vec![];
  // A module and the position of the next dependency to look at.
  let mut walk_stack: Vec<(ModuleIdx, usize)> = vec![];
  let mut components = vec![];

  let mut discover = |id: ModuleIdx,
                      visits: &mut IndexVec<ModuleIdx, Option<Visit>>,
                      component_stack: &mut Vec<ModuleIdx>,
                      walk_stack: &mut Vec<(ModuleIdx, usize)>| {
    visits[id] =
      Some(Visit { discovered: next_discovered, lowlink: next_discovered, on_stack: true });
    next_discovered += 1;
    component_stack.push(id);
    walk_stack.push((id, 0));
  };

  for &root in roots {
    if visits[root].is_some() {
      continue;
    }
    discover(root, &mut visits, &mut component_stack, &mut walk_stack);

    while let Some(&(id, position)) = walk_stack.last() {
      if let Some(&dependency) = dependencies[id].get(position) {
        if let Some(top) = walk_stack.last_mut() {
          top.1 += 1;
        }
        match visits[dependency] {
          None => discover(dependency, &mut visits, &mut component_stack, &mut walk_stack),
          Some(Visit { discovered, on_stack: true, .. }) => {
            if let Some(visit) = visits[id].as_mut() {
              visit.lowlink = visit.lowlink.min(discovered);
            }
          }
          Some(_) => {}
        }
        continue;
      }

      walk_stack.pop();
      let Some(visit) = visits[id] else { continue };
      if let Some(&(parent, _)) = walk_stack.last() {
        if let Some(parent_visit) = visits[parent].as_mut() {
          parent_visit.lowlink = parent_visit.lowlink.min(visit.lowlink);
        }
      }
      if visit.lowlink != visit.discovered {
        continue;
      }
      let mut component = vec![];
      while let Some(member) = component_stack.pop() {
        if let Some(member_visit) = visits[member].as_mut() {
          member_visit.on_stack = false;
        }
        component.push(member);
        if member == id {
          break;
        }
      }
      // Popped last discovered first.
      component.reverse();
      components.push(component);
    }
  }

  components
}

#[cfg(test)]
mod tests {
  use kiln_common::ModuleIdx;
  use oxc_index::{Idx, IndexVec};

  fn components(edges: &[&[usize]]) -> Vec<Vec<usize>> {
    let dependencies = edges
      .iter()
      .map(|deps| deps.iter().map(|d| ModuleIdx::from_usize(*d)).collect::<Vec<_>>())
      .collect::<IndexVec<ModuleIdx, _>>();
    super::strongly_connected(&dependencies, &[ModuleIdx::from_usize(0)])
      .into_iter()
      .map(|component| component.into_iter().map(ModuleIdx::index).collect())
      .collect()
  }

  #[test]
  fn cycle_members_keep_discovery_order() {
    // main -> a -> b -> a
    assert_eq!(components(&[&[1], &[2], &[1]]), vec![vec![1, 2], vec![0]]);
  }

  #[test]
  fn dependencies_come_first() {
    // main -> (a, b), a -> shared, b -> shared
    assert_eq!(components(&[&[1, 2], &[3], &[3], &[]]), vec![vec![3], vec![1], vec![2], vec![0]]);
  }

  #[test]
  fn unreachable_modules_are_left_out() {
    assert_eq!(components(&[&[], &[0]]), vec![vec![0]]);
  }
}
