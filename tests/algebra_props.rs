//! Property tests for the selector algebra and traversal policy.
//!
//! Chains are generated as a list of layers, outermost first. Each layer is
//! either a plain message wrapper or a lift into one of a small pool of
//! named classes, optionally shadowing.

use causeway::chain::causes_of;
use causeway::selector::{and, and_c, not, or, or_c};
use causeway::wrap;
use causeway::{Class, Lifter, Selector, SharedError, Traversal, TraversalOption};
use proptest::prelude::*;

const POOL: usize = 3;

#[derive(Debug, Clone, Copy)]
enum Layer {
    Plain,
    Classed { class: usize, shadow: bool },
}

// -- Strategy helpers --

fn arb_layer() -> impl Strategy<Value = Layer> {
    prop_oneof![
        Just(Layer::Plain),
        (0..POOL, any::<bool>()).prop_map(|(class, shadow)| Layer::Classed { class, shadow }),
    ]
}

fn arb_layers() -> impl Strategy<Value = Vec<Layer>> {
    prop::collection::vec(arb_layer(), 0..8)
}

fn class_name(class: usize) -> String {
    format!("c{}", class)
}

fn build(layers: &[Layer]) -> SharedError {
    layers
        .iter()
        .rev()
        .fold(wrap::new("leaf"), |err, layer| match *layer {
            Layer::Plain => wrap::with_message(err, "ctx"),
            Layer::Classed { class, shadow: false } => Class::named(class_name(class)).lift(err),
            Layer::Classed { class, shadow: true } => {
                Class::named_shadow(class_name(class)).lift(err)
            }
        })
}

/// Indices kept by lens then depth over a sequence of `len` elements.
fn model_cutoff(len: usize, lens: usize, depth: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = if lens >= len { len - 1 } else { lens };
    let end = if depth != 0 && len - start > depth {
        start + depth + 1
    } else {
        len
    };
    (start..end).collect()
}

fn model_class_query(layers: &[Layer], target: usize, lens: usize, depth: usize) -> bool {
    let classed: Vec<(usize, bool)> = layers
        .iter()
        .filter_map(|layer| match *layer {
            Layer::Classed { class, shadow } => Some((class, shadow)),
            Layer::Plain => None,
        })
        .collect();

    for i in model_cutoff(classed.len(), lens, depth) {
        let (class, shadow) = classed[i];
        if class == target {
            return true;
        }
        if shadow {
            return false;
        }
    }
    false
}

proptest! {
    #[test]
    fn class_query_follows_lens_depth_and_shadow(
        layers in arb_layers(),
        target in 0..POOL,
        lens in 0usize..6,
        depth in 0usize..6,
    ) {
        let err = build(&layers);
        let class = Class::named(class_name(target));
        let options = [TraversalOption::Lens(lens), TraversalOption::Depth(depth)];
        prop_assert_eq!(
            class.is_in_with(&err, &options),
            model_class_query(&layers, target, lens, depth)
        );
    }

    #[test]
    fn causes_cutoff_matches_model(
        layers in arb_layers(),
        lens in 0usize..12,
        depth in 0usize..12,
    ) {
        let err = build(&layers);
        let traversal = Traversal::new().with_lens(lens).with_depth(depth);
        let kept = causes_of(&err, traversal);

        // every layer adds one node on top of the leaf
        let expected = model_cutoff(layers.len() + 1, lens, depth);
        prop_assert!(!kept.is_empty());
        prop_assert_eq!(kept.len(), expected.len());
    }

    #[test]
    fn double_negation_is_identity(
        layers in arb_layers(),
        target in 0..POOL,
        lens in 0usize..4,
    ) {
        let err = build(&layers);
        let class = Class::named(class_name(target));
        let options = [TraversalOption::Lens(lens)];
        prop_assert_eq!(
            not(not(class.clone())).is_in_with(&err, &options),
            class.is_in_with(&err, &options)
        );
    }

    #[test]
    fn conjunction_and_disjunction_fold_membership(
        layers in arb_layers(),
        a in 0..POOL,
        b in 0..POOL,
    ) {
        let err = build(&layers);
        let a = Class::named(class_name(a));
        let b = Class::named(class_name(b));
        let in_a = a.is_in(&err);
        let in_b = b.is_in(&err);
        let pair = || [a.clone().shared(), b.clone().shared()];

        prop_assert_eq!(and(pair()).is_in(&err), in_a && in_b);
        prop_assert_eq!(or(pair()).is_in(&err), in_a || in_b);
        prop_assert_eq!(and_c(pair()).is_in(&err), in_a && in_b);
        prop_assert_eq!(or_c(pair()).is_in(&err), in_a || in_b);
    }
}
