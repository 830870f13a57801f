//! Macro for declaring phase enums.

/// Generate a phase enum together with its [`State`](crate::core::State)
/// implementation.
///
/// Phases are small tags, so the generated enum is always `Copy`, `Eq` and
/// `Hash`. The `initial:` variant becomes its `Default`. `ALL` lists every
/// variant in declaration order, and `Display` prints the phase name.
///
/// # Example
///
/// ```
/// use reelpath::core::State;
/// use reelpath::phase_enum;
///
/// phase_enum! {
///     pub enum Lamp {
///         Off,
///         Warming,
///         On,
///         Burnt,
///     }
///     initial: Off
///     final: [Burnt]
///     error: [Burnt]
/// }
///
/// assert_eq!(Lamp::default(), Lamp::Off);
/// assert_eq!(Lamp::Warming.name(), "Warming");
/// assert_eq!(Lamp::ALL.len(), 4);
/// assert!(Lamp::Burnt.is_error());
/// ```
#[macro_export]
macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
        initial: $initial:ident
        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$initial
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                let finals: &[Self] = &[$($(Self::$final),*)?];
                finals.contains(self)
            }

            fn is_error(&self) -> bool {
                let errors: &[Self] = &[$($(Self::$error),*)?];
                errors.contains(self)
            }
        }
    };
}
