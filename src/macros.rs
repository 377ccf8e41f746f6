/// Defines an error newtype around an `ErrorKind` enum.  The kind is reported
/// as the `source()` of the newtype, so the message given in `#[error]` shows
/// up first and the detail follows in the cause chain.
macro_rules! delegate_impl_error_error_kind {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($kind:ty);
    ) => {
        #[derive(Debug, thiserror::Error)]
        $(#[$attr])*
        $vis struct $name(#[source] $kind);

        impl $name {
            #[allow(dead_code)]
            $vis fn kind(&self) -> &$kind {
                &self.0
            }
        }

        impl From<$kind> for $name {
            fn from(kind: $kind) -> $name {
                $name(kind)
            }
        }
    };
}
