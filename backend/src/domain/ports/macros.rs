//! Generates port error enums with `snake_case` constructors.
//!
//! Each variant becomes a `thiserror` variant with the given message, a
//! constructor named after the variant (fields accept `impl Into<_>`), and an
//! arm of `kind()`, a stable label for structured log fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant [] [] $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Variant name in `snake_case`, for log fields.
            #[must_use]
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant { .. } => ::paste::paste! { stringify!([<$variant:snake>]) },
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum UploadPortError {
            Rejected => "upload rejected",
            Write { asset: String, message: String } => "write {asset}: {message}",
            TooMany { limit: usize } => "at most {limit} files",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        let err = UploadPortError::rejected();
        assert_eq!(err, UploadPortError::Rejected);
        assert_eq!(err.to_string(), "upload rejected");
    }

    #[test]
    fn field_constructors_convert_arguments() {
        let err = UploadPortError::write("product-1.png", String::from("disk full"));
        assert_eq!(err.to_string(), "write product-1.png: disk full");
        assert_eq!(UploadPortError::too_many(5_usize).to_string(), "at most 5 files");
    }

    #[test]
    fn kind_is_the_snake_case_variant_name() {
        assert_eq!(UploadPortError::rejected().kind(), "rejected");
        assert_eq!(UploadPortError::too_many(5_usize).kind(), "too_many");
        assert_eq!(UploadPortError::write("a", "b").kind(), "write");
    }
}
