use st_diagnostic::ErrorCode;
use st_ir::{Name, WellKnownNames};

use super::BindingScope;
use crate::{NameBinding, SpecialBinding};

/// Pseudo-variables, bound according to the compilation context.
pub struct ReservedScope {
    names: WellKnownNames,
    self_binding: NameBinding,
    super_binding: NameBinding,
}

impl ReservedScope {
    fn new(names: &WellKnownNames, self_binding: NameBinding, super_binding: NameBinding) -> Self {
        ReservedScope {
            names: *names,
            self_binding,
            super_binding,
        }
    }

    fn receiver_super(has_superclass: bool) -> NameBinding {
        if has_superclass {
            NameBinding::Special(SpecialBinding::Super)
        } else {
            NameBinding::error(
                ErrorCode::E2004,
                "`super` is not available in a class without a superclass",
            )
        }
    }

    pub fn for_instance_method(names: &WellKnownNames, has_superclass: bool) -> Self {
        Self::new(
            names,
            NameBinding::Special(SpecialBinding::SelfRef),
            Self::receiver_super(has_superclass),
        )
    }

    pub fn for_class_method(names: &WellKnownNames, has_superclass: bool) -> Self {
        Self::for_instance_method(names, has_superclass)
    }

    /// Program, global and pool-variable initializers have no receiver.
    pub fn for_initializer(names: &WellKnownNames) -> Self {
        Self::new(
            names,
            NameBinding::error(
                ErrorCode::E2004,
                "`self` is only available in class initializers",
            ),
            NameBinding::error(ErrorCode::E2004, "`super` is not available in initializers"),
        )
    }

    /// `self` is the class being initialized; `super` is still unavailable.
    pub fn for_class_initializer(names: &WellKnownNames) -> Self {
        Self::new(
            names,
            NameBinding::Special(SpecialBinding::SelfRef),
            NameBinding::error(ErrorCode::E2004, "`super` is not available in initializers"),
        )
    }

    pub fn declares(&self, name: Name) -> bool {
        self.names.is_reserved(name)
    }
}

impl BindingScope for ReservedScope {
    fn resolve(&self, name: Name) -> Option<NameBinding> {
        let n = &self.names;
        let binding = if name == n.self_ {
            self.self_binding.clone()
        } else if name == n.super_ {
            self.super_binding.clone()
        } else if name == n.true_ {
            NameBinding::Special(SpecialBinding::True)
        } else if name == n.false_ {
            NameBinding::Special(SpecialBinding::False)
        } else if name == n.nil {
            NameBinding::Special(SpecialBinding::Nil)
        } else if name == n.this_context {
            NameBinding::error(ErrorCode::E2004, "`thisContext` is not supported")
        } else {
            return None;
        };
        Some(binding)
    }
}
