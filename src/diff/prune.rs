use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::diff::keys::{CoreField, FieldKey, FIXED_FORMAT_FIELDS};
use crate::diff::pair::DiffPair;
use crate::types::Header;

/// One column of the diff table: optionally bound to a `FieldKey` (a leaf
/// that produces cells) and optionally owning ordered child columns (a
/// group, e.g. a sample column owning its per-FORMAT-field sub-columns).
#[derive(Debug, Clone)]
pub struct ColumnNode {
    pub label: String,
    pub key: Option<FieldKey>,
    pub children: Vec<ColumnNode>,
}

impl ColumnNode {
    pub fn leaf<S: Into<String>>(label: S, key: FieldKey) -> Self {
        Self {
            label: label.into(),
            key: Some(key),
            children: vec![],
        }
    }

    pub fn group<S: Into<String>>(label: S, children: Vec<ColumnNode>) -> Self {
        Self {
            label: label.into(),
            key: None,
            children,
        }
    }
}

/// The default column tree for a header: a Position group (Chrom, Start),
/// the remaining core columns, one column per declared INFO line, then one
/// group per sample owning the fixed six FORMAT columns followed by the
/// declared FORMAT lines.
pub fn column_tree(header: &Header) -> Vec<ColumnNode> {
    let mut tree = vec![ColumnNode::group(
        "Position",
        vec![
            ColumnNode::leaf("Chrom", FieldKey::Core(CoreField::Chrom)),
            ColumnNode::leaf("Start", FieldKey::Core(CoreField::Start)),
        ],
    )];
    for core in [
        CoreField::Id,
        CoreField::Ref,
        CoreField::Alt,
        CoreField::Qual,
        CoreField::Filter,
    ] {
        tree.push(ColumnNode::leaf(core.to_string(), FieldKey::Core(core)));
    }
    for id in header.info().keys() {
        tree.push(ColumnNode::leaf(id.as_str(), FieldKey::info(id.as_str())));
    }
    for sample in header.samples() {
        let mut fields: IndexSet<&str> = FIXED_FORMAT_FIELDS.iter().copied().collect();
        fields.extend(header.format().keys().map(String::as_str));
        let children = fields
            .into_iter()
            .map(|field| ColumnNode::leaf(field, FieldKey::format(sample.as_str(), field)))
            .collect();
        tree.push(ColumnNode::group(sample.as_str(), children));
    }
    tree
}

/// Visibility of every keyed column, one fresh map per pruning pass.
/// Keys absent from the map count as visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityMap {
    flags: IndexMap<FieldKey, bool>,
}

impl VisibilityMap {
    pub fn is_visible(&self, key: &FieldKey) -> bool {
        self.flags.get(key).copied().unwrap_or(true)
    }

    pub fn hidden_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.flags
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(key, _)| key)
    }

    /// Effective visibility of a whole node: a keyed node reads its own
    /// flag, a keyless group is visible while any of its children are.
    pub fn group_visible(&self, node: &ColumnNode) -> bool {
        match &node.key {
            Some(key) => self.is_visible(key),
            None => node.children.iter().any(|child| self.group_visible(child)),
        }
    }
}

/// Scan the materialized pair collection and compute a fresh visibility map:
/// a keyed column is hidden iff its value is empty on every pair (zero pairs
/// counts as all-empty). Columns `previous` already hides are never
/// re-evaluated, and a hidden node's descendants are carried forward rather
/// than re-scanned, so pruning is monotonic across passes. Keyless groups
/// own no cells and are never hidden by the scan itself.
///
/// A full O(pairs × keys) pass; re-run it whenever the pair collection
/// changes, e.g. when the mismatching-only filter flips.
pub fn prune_columns(
    tree: &[ColumnNode],
    pairs: &[DiffPair],
    previous: Option<&VisibilityMap>,
) -> VisibilityMap {
    let mut map = VisibilityMap::default();
    for node in tree {
        scan_node(node, pairs, previous, &mut map);
    }
    map
}

fn scan_node(
    node: &ColumnNode,
    pairs: &[DiffPair],
    previous: Option<&VisibilityMap>,
    map: &mut VisibilityMap,
) {
    let mut node_visible = true;
    if let Some(key) = &node.key {
        let previously_hidden = previous.map_or(false, |prev| !prev.is_visible(key));
        let visible = if previously_hidden {
            false
        } else {
            let all_empty = pairs.iter().all(|pair| pair.value(key).is_empty());
            if all_empty {
                debug!("{} is empty", node.label);
            }
            !all_empty
        };
        map.flags.insert(key.clone(), visible);
        node_visible = visible;
    }
    if node_visible {
        for child in &node.children {
            scan_node(child, pairs, previous, map);
        }
    } else {
        carry_forward(&node.children, previous, map);
    }
}

fn carry_forward(
    children: &[ColumnNode],
    previous: Option<&VisibilityMap>,
    map: &mut VisibilityMap,
) {
    for child in children {
        if let Some(key) = &child.key {
            let visible = previous.map_or(false, |prev| prev.is_visible(key));
            map.flags.insert(key.clone(), visible);
        }
        carry_forward(&child.children, previous, map);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diff::pairer::PositionMatchingPairs;
    use crate::parser;
    use itertools::Itertools;

    fn header() -> Header {
        parser::header(&[
            "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">".to_owned(),
            "##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">".to_owned(),
            "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">".to_owned(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1".to_owned(),
        ])
        .unwrap()
    }

    fn pairs(lines: &[&str]) -> Vec<DiffPair> {
        let records = lines
            .iter()
            .map(|line| parser::record_line(line, "test", &["S1".to_owned()]).unwrap())
            .collect_vec();
        PositionMatchingPairs::new(records.into_iter().map(Ok))
            .map(Result::unwrap)
            .collect_vec()
    }

    #[test]
    fn test_never_populated_info_field_is_hidden() {
        let pairs = pairs(&[
            "1\t100\t.\tA\tG\t.\t.\tAF=0.5\tGT\t0/1",
            "1\t200\t.\tC\tT\t.\t.\tAF=0.1\tGT\t1/1",
        ]);
        let map = prune_columns(&column_tree(&header()), &pairs, None);
        assert!(!map.is_visible(&FieldKey::info("DP")));
        assert!(map.is_visible(&FieldKey::info("AF")));
        assert!(map.is_visible(&FieldKey::format("S1", "GT")));
        assert!(!map.is_visible(&FieldKey::format("S1", "PL")));
    }

    #[test]
    fn test_zero_pairs_hides_every_keyed_column() {
        let tree = column_tree(&header());
        let map = prune_columns(&tree, &[], None);
        assert!(!map.is_visible(&FieldKey::Core(CoreField::Chrom)));
        assert!(!map.is_visible(&FieldKey::info("DP")));
        // keyless groups derive visibility from their children
        assert!(!map.group_visible(&tree[0]));
    }

    #[test]
    fn test_idempotent_for_same_collection() {
        let pairs = pairs(&["1\t100\t.\tA\tG\t.\t.\tDP=3\tGT\t0/1"]);
        let tree = column_tree(&header());
        assert_eq!(
            prune_columns(&tree, &pairs, None),
            prune_columns(&tree, &pairs, None)
        );
    }

    #[test]
    fn test_previously_hidden_stays_hidden() {
        let tree = column_tree(&header());
        let empty = pairs(&["1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/1"]);
        let first = prune_columns(&tree, &empty, None);
        assert!(!first.is_visible(&FieldKey::info("DP")));
        // the re-scan sees a pair that would show DP, but the node is
        // already hidden and is not re-evaluated
        let with_dp = pairs(&["1\t100\t.\tA\tG\t.\t.\tDP=7\tGT\t0/1"]);
        let second = prune_columns(&tree, &with_dp, Some(&first));
        assert!(!second.is_visible(&FieldKey::info("DP")));
    }

    #[test]
    fn test_shrinking_the_collection_only_hides_more() {
        let all = pairs(&[
            "1\t100\t.\tA\tG\t.\t.\tDP=3\tGT\t0/1",
            "1\t200\t.\tC\tT\t.\t.\tAF=0.5\tGT\t1/1",
        ]);
        let tree = column_tree(&header());
        let unfiltered = prune_columns(&tree, &all, None);
        let filtered = prune_columns(&tree, &all[..1], Some(&unfiltered));
        for key in unfiltered.hidden_keys() {
            assert!(!filtered.is_visible(key));
        }
        // AF only lived on the dropped pair, so the subset hides it too
        assert!(unfiltered.is_visible(&FieldKey::info("AF")));
        assert!(!filtered.is_visible(&FieldKey::info("AF")));
    }

    #[test]
    fn test_fresh_scan_of_subset_may_resurface_keys() {
        // without carrying the previous map, a key hidden only because the
        // kept pairs were empty can become visible again; this is the
        // documented exception to strict monotonicity
        let all = pairs(&[
            "1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t200\t.\tC\tT\t.\t.\tDP=3\tGT\t1/1",
        ]);
        let tree = column_tree(&header());
        let without_dp = prune_columns(&tree, &all[..1], None);
        assert!(!without_dp.is_visible(&FieldKey::info("DP")));
        let with_dp = prune_columns(&tree, &all, None);
        assert!(with_dp.is_visible(&FieldKey::info("DP")));
    }
}
