use smallvec::SmallVec;
use st_ir::Name;

use super::BindingScope;
use crate::{LocalKind, NameBinding};

type Layer = SmallVec<[(Name, LocalKind); 8]>;

/// Arguments and temporaries, one layer per method/initializer/block.
///
/// Inner layers shadow outer ones. Within a layer, arguments come first,
/// and a name's slot index is its declaration position.
#[derive(Default)]
pub struct LocalScope {
    layers: Vec<Layer>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer(&mut self) {
        self.layers.push(Layer::new());
    }

    pub fn pop_layer(&mut self) {
        self.layers.pop();
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Whether the innermost layer already declares `name`.
    pub fn declares_in_current_layer(&self, name: Name) -> bool {
        self.layers
            .last()
            .is_some_and(|layer| layer.iter().any(|&(n, _)| n == name))
    }

    /// Declare `name` in the innermost layer and return its slot index.
    pub fn declare(&mut self, name: Name, kind: LocalKind) -> usize {
        if self.layers.is_empty() {
            self.push_layer();
        }
        let layer_index = self.layers.len() - 1;
        let layer = &mut self.layers[layer_index];
        layer.push((name, kind));
        layer.len() - 1
    }
}

impl BindingScope for LocalScope {
    fn resolve(&self, name: Name) -> Option<NameBinding> {
        self.layers
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, layer)| {
                layer
                    .iter()
                    .rposition(|&(n, _)| n == name)
                    .map(|index| NameBinding::Local {
                        depth,
                        index,
                        kind: layer[index].1,
                    })
            })
    }
}
