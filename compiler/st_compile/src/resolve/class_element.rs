use std::sync::Arc;

use st_ir::{MethodSide, Name};
use st_object::{NameScope, SmalltalkClass, ValueBinding};

use super::BindingScope;
use crate::NameBinding;

/// Variables declared by a class and its superclasses.
///
/// Instance-side code sees instance variables, class-side code sees
/// class-instance variables, and both see class variables. Class
/// variables are found by walking the superclass chain from the class
/// itself, so a subclass resolves to the *same* binding as its superclass.
pub struct ClassElementScope<'a> {
    scope: &'a NameScope,
    class: Arc<SmalltalkClass>,
    side: MethodSide,
}

impl<'a> ClassElementScope<'a> {
    pub fn new(scope: &'a NameScope, class: Arc<SmalltalkClass>, side: MethodSide) -> Self {
        ClassElementScope { scope, class, side }
    }

    fn class_variable(&self, name: Name) -> Option<Arc<ValueBinding>> {
        if let Some(binding) = self.class.class_variables.get(&name) {
            return Some(Arc::clone(binding));
        }
        let superclass = self.class.superclass?;
        self.scope
            .superclass_chain(superclass)
            .find_map(|class| class.class_variables.get(&name).cloned())
    }
}

impl BindingScope for ClassElementScope<'_> {
    fn resolve(&self, name: Name) -> Option<NameBinding> {
        let slot = match self.side {
            MethodSide::Instance => self
                .class
                .layout
                .instance_index(name)
                .map(|index| NameBinding::InstanceVariable { index }),
            MethodSide::Class => self
                .class
                .layout
                .class_instance_index(name)
                .map(|index| NameBinding::ClassInstanceVariable { index }),
        };
        slot.or_else(|| self.class_variable(name).map(NameBinding::ClassVariable))
    }
}
