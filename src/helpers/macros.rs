//! Helper macros used internally.

/// Generates a [`From`] implementation that converts a type to another by going through an
/// intermediate type.
///
/// Useful when an error type can be converted to our [`Error`](crate::Error) type only through
/// another error type that already has a [`From`] implementation (usually generated by
/// `thiserror`'s `#[from]`).
///
/// # Examples
///
/// ```ignore
/// use pokemon_manager::forward_from;
///
/// // Generates `impl From<diesel_async::pooled_connection::PoolError> for Error`,
/// // which converts to `deadpool`'s `PoolError` first.
/// forward_from!(diesel_async::pooled_connection::PoolError => PoolError => Error);
/// ```
#[macro_export]
macro_rules! forward_from {
    ( $from_ty:ty => $intermediate_ty:ty => $to_ty:ty ) => {
        impl ::core::convert::From<$from_ty> for $to_ty {
            fn from(value: $from_ty) -> Self {
                ::core::convert::Into::<$intermediate_ty>::into(value).into()
            }
        }
    };
}
