//! Opaque index newtypes.
//!
//! Graph entities are stored in flat vectors and referenced by position.
//! [`define_id!`](crate::define_id) wraps a `u32` position in a distinct type so
//! DFG operations and MRRG nodes cannot be mixed up.

/// Defines a `Copy` index newtype over `u32` with `from_raw`/`as_raw`/`index`
/// accessors, ordering, `Display`, and serde support.
///
/// The invoking crate must depend on `serde` with the `derive` feature.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize`, for indexing side tables.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
