use ::proptest::{
    arbitrary::StrategyFor,
    collection::{vec, VecStrategy},
    prelude::*,
    strategy::Map,
};

use crate::{Element, Tree};

const MAX_ARBITRARY_LEAVES: usize = 32;

impl<const DEPTH: usize> Arbitrary for Tree<DEPTH> {
    type Parameters = ();
    type Strategy = Map<VecStrategy<StrategyFor<Element>>, fn(Vec<Element>) -> Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        let max_leaves = usize::try_from(Self::capacity())
            .unwrap_or(usize::MAX)
            .min(MAX_ARBITRARY_LEAVES);

        vec(any::<Element>(), 0..=max_leaves).prop_map(|mut leaves| {
            for leaf in &mut leaves {
                leaf.canonicalize();
            }

            Tree::from_leaves(leaves).unwrap()
        })
    }
}
