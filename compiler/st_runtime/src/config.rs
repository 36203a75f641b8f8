//! Runtime configuration.

use st_compile::InstallOptions;

/// Names no definition may bind, besides the pseudo-variables the
/// compiler already reserves.
const DEFAULT_PROTECTED: &[&str] = &["self", "super", "true", "false", "nil", "thisContext", "Smalltalk"];

/// Knobs for a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Names the global scope refuses to define.
    pub protected_names: Vec<String>,
    /// Options handed to every install.
    pub install: InstallOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            protected_names: DEFAULT_PROTECTED.iter().map(|&name| name.to_owned()).collect(),
            install: InstallOptions::default(),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_protected_name(mut self, name: impl Into<String>) -> Self {
        self.protected_names.push(name.into());
        self
    }

    #[must_use]
    pub fn with_install_options(mut self, install: InstallOptions) -> Self {
        self.install = install;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_protect_pseudo_variables_and_smalltalk() {
        let config = RuntimeConfig::default();
        for name in ["self", "thisContext", "Smalltalk"] {
            assert!(config.protected_names.iter().any(|n| n == name), "{name}");
        }
        assert!(config.install.recompile);
        assert!(!config.install.include_internal_annotations);
    }
}
