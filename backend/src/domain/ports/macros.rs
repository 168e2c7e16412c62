//! Defines helper macros for generating domain port error enums.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
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
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum BookingPortError {
            Unavailable => "booking backend unavailable",
            Rejected { reason: String } => "booking rejected: {reason}",
            Throttled { retry_after_secs: u32 } => "retry in {retry_after_secs}s",
            Partial { reason: String, stored: u32 } => "partial: {reason} ({stored} stored)",
        }
    }

    #[rstest]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(BookingPortError::unavailable(), BookingPortError::Unavailable);
        assert_eq!(
            BookingPortError::unavailable().to_string(),
            "booking backend unavailable"
        );
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = BookingPortError::rejected("card declined");
        assert_eq!(err.to_string(), "booking rejected: card declined");
    }

    #[rstest]
    fn mixed_fields_keep_their_types() {
        assert_eq!(BookingPortError::throttled(30_u32).to_string(), "retry in 30s");
        assert_eq!(
            BookingPortError::partial("timeout", 2_u32).to_string(),
            "partial: timeout (2 stored)"
        );
    }
}
