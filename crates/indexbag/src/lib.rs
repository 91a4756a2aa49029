//! ## Crate layout
//! - `core`: container, indices, keys, identities, and observability.
//!
//! The `prelude` module carries the domain vocabulary needed to build a
//! container and attach indices to it; errors and metrics stay one level
//! down under their own modules.

pub use indexbag_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Re-exports
//

pub use indexbag_core::{
    MAX_INDEX_NAME_LEN,
    container::Container,
    error::{AddError, ErrorClass, IndexError, VerifyError},
    obs,
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        container::Container,
        identity::{IndexLabel, IndexName, ValueId},
        index::{IndexMaintenance as _, NonUniqueIndex, NonUniqueView, UniqueIndex, UniqueView},
        key::{Key, KeyKind, ScalarKey as _},
    };
}
