use st_diagnostic::ErrorCode;
use st_ir::{Name, StringInterner};
use st_object::{GlobalBinding, NameScope};

use super::BindingScope;
use crate::NameBinding;

/// Classes, global variables and global constants of a name scope.
pub struct GlobalScope<'a> {
    scope: &'a NameScope,
    interner: &'a StringInterner,
}

impl<'a> GlobalScope<'a> {
    pub fn new(scope: &'a NameScope, interner: &'a StringInterner) -> Self {
        GlobalScope { scope, interner }
    }
}

impl BindingScope for GlobalScope<'_> {
    fn resolve(&self, name: Name) -> Option<NameBinding> {
        let binding = match self.scope.get_global_binding(name)? {
            GlobalBinding::Class(_) => NameBinding::Class(name),
            GlobalBinding::Variable(binding) => NameBinding::GlobalVariable(binding),
            GlobalBinding::Constant(binding) => NameBinding::GlobalConstant(binding),
            GlobalBinding::Pool(_) => NameBinding::error(
                ErrorCode::E2007,
                format!(
                    "`{}` is a pool, not a value",
                    self.interner.lookup(name)
                ),
            ),
        };
        Some(binding)
    }
}
