//! Object identifiers.
//!
//! New identifiers are derived from a content seed with UUID v5, so patching the
//! same export twice produces the same identifiers. Collisions with existing
//! objects are resolved by re-seeding with a counter.

use crate::value::Dict;
use std::fmt;
use uuid::Uuid;

const NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_8e1a_93d2_4b7e_a1c4_2d9e_6b3f_7a10);

macro_rules! object_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

object_id!(
    /// A `PBXNativeTarget`, `PBXAggregateTarget`, `PBXLegacyTarget`, or the
    /// `PBXProject` itself (for project-level build settings).
    TargetId
);
object_id!(
    /// A `PBXFileReference`.
    FileRefId
);
object_id!(
    /// A `PBXBuildFile` attaching a file reference to a build phase.
    BuildFileId
);

/// 24 uppercase hex characters, unique within `objects`.
pub(crate) fn generate_id(objects: &Dict, seed: &str) -> String {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            seed.to_string()
        } else {
            format!("{seed}#{attempt}")
        };
        let uuid = Uuid::new_v5(&NAMESPACE, name.as_bytes());
        let id = uuid.simple().to_string()[..24].to_ascii_uppercase();
        if !objects.contains_key(&id) {
            return id;
        }
        attempt += 1;
    }
}
