use proptest::prelude::*;
use stempark_catalog::{
    level_labels_from, reconstruct_tree, Currency, FieldUpdate, LeafData, VariantDefaults, VariantNode, VariantTree,
};

const LABELS: [&str; 3] = ["Color", "Size", "Material"];

fn leaf_data() -> impl Strategy<Value = LeafData> {
    ("[A-Z]{2}-[0-9]{3}", 0u32..500, 0u32..20, "[0-9]{1,4}").prop_map(
        |(sku, stock, threshold, price)| {
            let mut data = LeafData::seeded(&VariantDefaults::default());
            data.sku = sku;
            data.inventory.stock = stock;
            data.inventory.low_stock_threshold = threshold;
            let inr = Currency::new("INR").unwrap();
            if let Some(entry) = data.pricing.get_mut(&inr) {
                entry.original_price = price;
            }
            data
        },
    )
}

#[derive(Debug, Clone)]
enum Shape {
    Leaf(LeafData),
    Branch(Vec<VariantNode>),
}

/// A leaf, or a branch while more than one level remains
fn shape(levels: u32) -> BoxedStrategy<Shape> {
    let leaf = leaf_data().prop_map(Shape::Leaf);
    if levels <= 1 {
        return leaf.boxed();
    }
    prop_oneof![leaf, siblings(levels - 1).prop_map(Shape::Branch)].boxed()
}

/// Sibling lists with distinct, non-empty names, at most `levels` deep
fn siblings(levels: u32) -> BoxedStrategy<Vec<VariantNode>> {
    prop::collection::btree_set("[A-Za-z]{1,6}", 1..4)
        .prop_flat_map(move |names| {
            let n = names.len();
            (Just(names), prop::collection::vec(shape(levels), n))
        })
        .prop_map(|(names, shapes)| {
            names
                .into_iter()
                .zip(shapes)
                .map(|(name, shape)| match shape {
                    Shape::Leaf(data) => VariantNode::leaf(name, data),
                    Shape::Branch(kids) => VariantNode::branch(name, kids),
                })
                .collect()
        })
        .boxed()
}

/// Level labels that may stop short of the tree depth or contain blanks
fn level_labels() -> impl Strategy<Value = Vec<String>> {
    (
        0..=LABELS.len(),
        prop::collection::vec(prop::bool::weighted(0.25), LABELS.len()),
    )
        .prop_map(|(keep, blanks)| {
            LABELS[..keep]
                .iter()
                .zip(blanks)
                .map(|(label, blank)| if blank { String::new() } else { label.to_string() })
                .collect()
        })
}

fn tree() -> impl Strategy<Value = VariantTree> {
    (1u32..=3, level_labels()).prop_flat_map(|(depth, labels)| {
        siblings(depth).prop_map(move |nodes| VariantTree::from_nodes(labels.clone(), nodes))
    })
}

proptest! {
    #[test]
    fn reconstruct_inverts_flatten(tree in tree()) {
        let rebuilt = reconstruct_tree(&tree.flatten(), &tree.level_labels);
        prop_assert!(rebuilt.is_equivalent(&tree));
    }

    #[test]
    fn derived_labels_reload_every_variant(tree in tree()) {
        let flat = tree.flatten();
        let rebuilt = reconstruct_tree(&flat, &level_labels_from(&flat));
        prop_assert_eq!(rebuilt.leaf_count(), tree.leaf_count());
        prop_assert_eq!(rebuilt.flatten(), flat);
    }

    #[test]
    fn flatten_is_deterministic(tree in tree()) {
        let first = tree.flatten();
        prop_assert_eq!(first.len(), tree.leaf_count());
        prop_assert_eq!(first, tree.flatten());
    }

    #[test]
    fn updates_leave_previous_tree_intact(tree in tree(), pick in any::<prop::sample::Index>(), stock in 0u32..1000) {
        let before = tree.flatten();
        let leaves = tree.leaves();
        let (path, _) = &leaves[pick.index(leaves.len())];

        let updated = tree.update_node_deep(path, FieldUpdate::Stock(stock)).unwrap();

        prop_assert_eq!(&tree.flatten(), &before);
        let changed = updated.get(path).unwrap().leaf_data().unwrap();
        prop_assert_eq!(changed.inventory.stock, stock);
    }
}
