use std::collections::HashMap;

use crate::stats::ModuleInfo;

/// Number of modules reported in `ModuleStats::top_modules`.
pub const TOP_MODULES: usize = 10;

/// Return the `limit` largest modules, largest first.
///
/// Modules of equal size are ordered by ascending path so the ranking is
/// stable across runs.
pub fn rank(size_by_module: &HashMap<String, u64>, limit: usize) -> Vec<ModuleInfo> {
    let mut modules: Vec<ModuleInfo> = size_by_module
        .iter()
        .map(|(path, &size)| ModuleInfo {
            path: path.clone(),
            size,
        })
        .collect();

    modules.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    modules.truncate(limit);
    modules
}
