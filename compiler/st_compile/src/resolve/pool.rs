use std::sync::Arc;

use st_ir::Name;
use st_object::{NameScope, Pool, SmalltalkClass};

use super::BindingScope;
use crate::NameBinding;

/// Pools imported by a class, searched in import order.
pub struct PoolScope {
    pools: Vec<Arc<Pool>>,
}

impl PoolScope {
    pub fn new(pools: Vec<Arc<Pool>>) -> Self {
        PoolScope { pools }
    }

    /// The pools `class` imports, as currently bound in `scope`. Imports
    /// that no longer name a pool are skipped.
    pub fn imported_by(scope: &NameScope, class: &SmalltalkClass) -> Self {
        PoolScope::new(
            class
                .imported_pools
                .iter()
                .filter_map(|&name| scope.get_pool(name))
                .collect(),
        )
    }
}

impl BindingScope for PoolScope {
    fn resolve(&self, name: Name) -> Option<NameBinding> {
        self.pools.iter().find_map(|pool| {
            pool.variable(name).map(|binding| {
                if binding.is_writable() {
                    NameBinding::PoolVariable(Arc::clone(binding))
                } else {
                    NameBinding::PoolConstant(Arc::clone(binding))
                }
            })
        })
    }
}
