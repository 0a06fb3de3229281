/// Helper macro to create a [`Tree`] by appending leaves in order
///
/// ```rust
/// # use smirk::*;
/// let tree: Tree<32> = smirk! {
///   // the element is converted using Element::from
///   123,
///   Element::new(234),
/// };
///
/// assert_eq!(tree.index_of(Element::new(123)), Some(0));
/// assert_eq!(tree.index_of(Element::new(234)), Some(1));
/// assert_eq!(tree.index_of(Element::new(345)), None);
/// ```
///
/// Panics if a leaf is not canonical, or the tree is full
///
/// [`Tree`]: crate::Tree
#[macro_export]
macro_rules! smirk {
    (@append $tree:ident;) => {};
    (@append $tree:ident; $e:literal $(, $($rest:tt)*)?) => {
        $tree.append($crate::Element::new($e)).unwrap();
        $( $crate::smirk!(@append $tree; $($rest)*); )?
    };
    (@append $tree:ident; $e:expr $(, $($rest:tt)*)?) => {
        $tree.append($crate::Element::from($e)).unwrap();
        $( $crate::smirk!(@append $tree; $($rest)*); )?
    };
    { $($t:tt)* } => {{
        #[allow(unused_mut)]
        let mut tree = $crate::Tree::new();
        $crate::smirk!(@append tree; $($t)*);
        tree
    }};
}

/// Helper macro to create an [`Element`]
///
/// [`Element`]: crate::Element
#[macro_export]
macro_rules! element {
    ($e:literal) => {{
        $crate::Element::new($e)
    }};
    ($e:expr) => {{
        $crate::Element::from($e)
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Element, Tree};

    type T = Tree<32>;

    #[test]
    fn basic_syntax_test() {
        let _t: T = smirk! {};
        let _t: T = smirk! { 1 };
        let _t: T = smirk! { 1, };
        let _t: T = smirk! { 1, 2 };
        let _t: T = smirk! { 1, 2, };

        let element = Element::new(1);
        let _t: T = smirk! { element };
        let _t: T = smirk! { element, Element::new(2) };
    }

    #[test]
    fn leaves_are_appended_in_order() {
        let tree: T = smirk! { 3, 2, 1 };
        let leaves: Vec<_> = tree.leaves().collect();

        assert_eq!(leaves, [3, 2, 1].map(Element::new));
    }
}
