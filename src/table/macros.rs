//! Macro for declaring sequence tables.

/// Build a validated [`SequenceTable`](crate::table::SequenceTable) from a
/// compact declaration.
///
/// Each entry is `node: media => popup`. Use `_` for a node without media and
/// leave out `=> popup` for a dead end. Evaluates to
/// `Result<SequenceTable, BuildError>`.
///
/// # Example
///
/// ```
/// use reelpath::sequence_table;
///
/// let table = sequence_table! {
///     popups: [popup1, popup2];
///     walk1: "assets/videos/walk1.mp4" => popup1,
///     walk2: "assets/videos/walk2.mp4" => popup2,
///     reverse1: _ => popup1,
///     outro: "assets/videos/outro.mp4",
/// }
/// .unwrap();
///
/// assert_eq!(table.len(), 4);
/// assert!(table.get("reverse1").unwrap().is_instant());
/// assert!(table.get("outro").unwrap().is_dead_end());
/// ```
#[macro_export]
macro_rules! sequence_table {
    (@media $node:expr, _) => {
        $node
    };
    (@media $node:expr, $media:literal) => {
        $node.with_media($media)
    };
    (
        popups: [$($popup:ident),* $(,)?];
        $(
            $id:ident : $media:tt $(=> $next:ident)?
        ),* $(,)?
    ) => {
        $crate::table::SequenceTableBuilder::new()
            $(.popup(stringify!($popup)))*
            $(
                .add_node(
                    $crate::sequence_table!(
                        @media $crate::table::SequenceNode::new(stringify!($id)), $media
                    )
                    $(.with_popup(stringify!($next)))?
                )
            )*
            .build()
    };
}

#[cfg(test)]
mod tests {
    use crate::table::{BuildError, PopupId};

    #[test]
    fn sequence_table_macro_builds_nodes() {
        let table = sequence_table! {
            popups: [popup1];
            walk1: "walk1.mp4" => popup1,
            reverse1: _ => popup1,
        }
        .unwrap();

        let walk1 = table.get("walk1").unwrap();
        assert_eq!(walk1.media.as_ref().map(|m| m.as_str()), Some("walk1.mp4"));
        assert_eq!(walk1.on_complete_popup, Some(PopupId::new("popup1")));
        assert!(table.get("reverse1").unwrap().is_instant());
    }

    #[test]
    fn sequence_table_macro_validates() {
        let result = sequence_table! {
            popups: [];
            walk1: "walk1.mp4" => popup1,
        };

        assert!(matches!(result, Err(BuildError::Violations(_))));
    }
}
