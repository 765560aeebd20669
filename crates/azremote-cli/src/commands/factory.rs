//! Picks the tree implementation serving a scheme.

use azremote_core::config::RemoteConfig;
use azremote_core::{Scheme, Tree, TreeError};

/// Create the tree for `scheme` from `config`.
///
/// Supported schemes:
/// - `azure` (compile with the `azure` feature, on by default)
#[allow(unused_variables)]
pub fn create_tree(scheme: Scheme, config: &RemoteConfig) -> Result<Box<dyn Tree>, TreeError> {
    match scheme {
        #[cfg(feature = "azure")]
        Scheme::Azure => Ok(Box::new(azremote_azure::AzureTree::new(config)?)),

        #[cfg(not(feature = "azure"))]
        Scheme::Azure => Err(TreeError::MissingFeature {
            scheme: scheme.to_string(),
            feature: "azure",
        }),

        other => Err(TreeError::NotSupported(format!(
            "no remote tree available for `{other}://` paths"
        ))),
    }
}
