//! Common macro for implementing remote handle wrapper types.
//!
//! Remote handles are unsigned integers minted by the asset store. They are
//! opaque to the client: no arithmetic, only comparison and display.

macro_rules! impl_remote_handle {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub const fn new(raw: u64) -> Self {
                    Self(raw)
                }

                pub const fn get(self) -> u64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u64> for $name {
                fn from(raw: u64) -> Self {
                    Self(raw)
                }
            }

            impl From<$name> for u64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )*
    };
}

pub(crate) use impl_remote_handle;
