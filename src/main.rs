use anyhow::{bail, Result};
use itertools::Itertools;

use vcf_diff::diff::{column_tree, ColumnNode, DiffView, PairFilter, VisibilityMap};
use vcf_diff::encoder::VcfEncoder;
use vcf_diff::feed::MultiSourceFeed;

fn main() -> Result<()> {
    env_logger::init();
    let args = std::env::args().collect_vec();
    let only_differences = args.iter().any(|a| a == "--only-differences");
    let paths = args[1..]
        .iter()
        .filter(|a| !a.starts_with("--"))
        .collect_vec();
    if paths.len() != 2 {
        bail!("usage: vcf-diff <left.vcf> <right.vcf> [--only-differences]");
    }

    let feed = MultiSourceFeed::from_paths(&[
        ("left".to_owned(), paths[0].as_str()),
        ("right".to_owned(), paths[1].as_str()),
    ])?;
    let header = feed.header_rc();
    let mut view = DiffView::materialize(feed, VcfEncoder::new(header.clone()))?;
    if only_differences {
        view.set_filter(PairFilter::MismatchingOnly);
    }

    let tree = column_tree(&header);
    let visibility = view.prune(&tree, None)?;

    let mut keys = Vec::new();
    collect_visible(&tree, &visibility, &mut keys);
    println!("{}", keys.iter().map(|key| key.label()).join("\t"));
    for pair in view.selected_pairs()? {
        let row = keys
            .iter()
            .map(|key| {
                let value = pair.value(key);
                if value.differs() {
                    format!(
                        "{}|{}",
                        value.left().as_deref().unwrap_or("-"),
                        value.right().as_deref().unwrap_or("-")
                    )
                } else {
                    value.left().clone().unwrap_or_default()
                }
            })
            .join("\t");
        println!("{}", row);
    }
    Ok(())
}

fn collect_visible(
    nodes: &[ColumnNode],
    visibility: &VisibilityMap,
    out: &mut Vec<vcf_diff::FieldKey>,
) {
    for node in nodes {
        if !visibility.group_visible(node) {
            continue;
        }
        if let Some(key) = &node.key {
            out.push(key.clone());
        }
        collect_visible(&node.children, visibility, out);
    }
}
