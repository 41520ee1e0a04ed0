//! The Resource Deduplicator.
//!
//! Members are grouped by tag. Within a group, every attribute pair carried
//! by two or more members is a candidate; pairs with identical coverage are
//! bundled and promoted together. The best-ranked candidate becomes a named
//! style, its attributes leave the covered members, and the search repeats
//! until nothing qualifies. A member covered twice references the newer,
//! narrower style, which inherits from the older one through `parent`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use weft_types::{NodeId, ResourceName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DedupConfig {
    pub enabled: bool,
    /// Attributes that stay on their node no matter how often they repeat.
    pub excluded_attributes: Vec<String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded_attributes: vec![
                "android:id".to_string(),
                "android:text".to_string(),
                "android:src".to_string(),
            ],
        }
    }
}

/// One node's finalized attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupMember {
    pub id: NodeId,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub name: ResourceName,
    pub parent: Option<ResourceName>,
    /// Sorted by attribute name.
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupResult {
    /// In promotion order; a parent always precedes its children.
    pub styles: Vec<StyleEntry>,
    /// The most specific style of every covered node.
    pub assignments: BTreeMap<NodeId, ResourceName>,
    /// Attribute names to delete from each covered node.
    pub removals: BTreeMap<NodeId, Vec<String>>,
}

impl DedupResult {
    pub fn style(&self, name: &str) -> Option<&StyleEntry> {
        self.styles.iter().find(|s| s.name.as_str() == name)
    }

    /// The style and its ancestors, most specific first.
    pub fn chain(&self, name: &str) -> Vec<&StyleEntry> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut current = self.style(name);
        while let Some(style) = current {
            if !seen.insert(style.name.as_str()) {
                break;
            }
            out.push(style);
            current = style.parent.as_ref().and_then(|p| self.style(p.as_str()));
        }
        out
    }

    /// Looks an attribute up through the parent chain.
    pub fn resolve(&self, name: &str, attribute: &str) -> Option<&str> {
        self.chain(name).into_iter().find_map(|style| {
            style
                .attributes
                .iter()
                .find(|(k, _)| k == attribute)
                .map(|(_, v)| v.as_str())
        })
    }
}

#[derive(Debug)]
struct Candidate {
    coverage: BTreeSet<NodeId>,
    attributes: Vec<(String, String)>,
}

impl Candidate {
    /// Coverage desc, bundle size desc, first covered id, then attributes.
    fn rank(&self, other: &Candidate) -> Ordering {
        other
            .coverage
            .len()
            .cmp(&self.coverage.len())
            .then(other.attributes.len().cmp(&self.attributes.len()))
            .then(self.coverage.first().cmp(&other.coverage.first()))
            .then(self.attributes.cmp(&other.attributes))
    }
}

type Tips = BTreeMap<NodeId, Option<ResourceName>>;

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Pure over its input: the same members always produce the same names
    /// and chains.
    pub fn run(&self, members: &[DedupMember]) -> DedupResult {
        let mut result = DedupResult::default();
        if !self.config.enabled {
            return result;
        }
        let mut groups: BTreeMap<&str, Vec<&DedupMember>> = BTreeMap::new();
        for member in members {
            groups.entry(member.tag.as_str()).or_default().push(member);
        }
        let mut taken = HashSet::new();
        for (tag, mut group) in groups {
            group.sort_by_key(|m| m.id);
            self.run_group(tag, &group, &mut taken, &mut result);
        }
        debug!(
            "Promoted {} style(s) covering {} node(s)",
            result.styles.len(),
            result.assignments.len()
        );
        result
    }

    fn is_excluded(&self, attribute: &str) -> bool {
        attribute == "style" || self.config.excluded_attributes.iter().any(|a| a == attribute)
    }

    fn run_group(
        &self,
        tag: &str,
        group: &[&DedupMember],
        taken: &mut HashSet<String>,
        result: &mut DedupResult,
    ) {
        let mut remaining: BTreeMap<NodeId, BTreeMap<String, String>> = group
            .iter()
            .map(|m| {
                let attrs = m
                    .attributes
                    .iter()
                    .filter(|(k, _)| !self.is_excluded(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (m.id, attrs)
            })
            .collect();
        let mut tips: Tips = group.iter().map(|m| (m.id, None)).collect();
        let base = style_base(tag);
        let mut counter = 0usize;

        while let Some(candidate) = best_candidate(&remaining, &tips, group.len()) {
            let name = next_name(&base, &mut counter, taken);
            let parent = candidate
                .coverage
                .first()
                .and_then(|id| tips.get(id).cloned().flatten());
            for id in &candidate.coverage {
                if let Some(attrs) = remaining.get_mut(id) {
                    for (key, _) in &candidate.attributes {
                        attrs.remove(key);
                    }
                }
                result
                    .removals
                    .entry(*id)
                    .or_default()
                    .extend(candidate.attributes.iter().map(|(k, _)| k.clone()));
                tips.insert(*id, Some(name.clone()));
            }
            debug!(
                "Style {} ({} attribute(s)) covers {} {} node(s)",
                name,
                candidate.attributes.len(),
                candidate.coverage.len(),
                tag
            );
            result.styles.push(StyleEntry {
                name,
                parent,
                attributes: candidate.attributes,
            });
        }

        for (id, tip) in tips {
            if let Some(tip) = tip {
                result.assignments.insert(id, tip);
            }
        }
    }
}

fn best_candidate(
    remaining: &BTreeMap<NodeId, BTreeMap<String, String>>,
    tips: &Tips,
    group_size: usize,
) -> Option<Candidate> {
    let mut coverage: BTreeMap<(&str, &str), BTreeSet<NodeId>> = BTreeMap::new();
    for (id, attrs) in remaining {
        for (k, v) in attrs {
            coverage.entry((k.as_str(), v.as_str())).or_default().insert(*id);
        }
    }

    // Pairs seen on a single node never leave it.
    let mut bundles: BTreeMap<BTreeSet<NodeId>, Vec<(String, String)>> = BTreeMap::new();
    for ((k, v), ids) in coverage {
        if ids.len() > 1 {
            bundles
                .entry(ids)
                .or_default()
                .push((k.to_string(), v.to_string()));
        }
    }

    bundles
        .into_iter()
        .filter_map(|(ids, attributes)| {
            let coverage = shared_tip_partition(ids, tips);
            qualifies(coverage.len(), attributes.len(), group_size).then_some(Candidate {
                coverage,
                attributes,
            })
        })
        .min_by(|a, b| a.rank(b))
}

/// Single-attribute matches on two nodes stay inline unless they span the
/// whole group.
fn qualifies(coverage: usize, attributes: usize, group_size: usize) -> bool {
    coverage > 2 || (coverage > 1 && attributes > 1) || (coverage == group_size && group_size > 1)
}

/// A style has one parent, so its members must currently share a tip. Keeps
/// the largest such subset, preferring the one holding the smallest id.
fn shared_tip_partition(ids: BTreeSet<NodeId>, tips: &Tips) -> BTreeSet<NodeId> {
    let mut parts: Vec<(Option<&ResourceName>, BTreeSet<NodeId>)> = Vec::new();
    for id in ids {
        let tip = tips.get(&id).and_then(Option::as_ref);
        match parts.iter_mut().find(|(t, _)| *t == tip) {
            Some((_, set)) => {
                set.insert(id);
            }
            None => parts.push((tip, BTreeSet::from([id]))),
        }
    }
    parts
        .into_iter()
        .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.1.first().cmp(&a.1.first())))
        .map(|(_, set)| set)
        .unwrap_or_default()
}

fn style_base(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        Some(_) => format!("Style_{}", cleaned),
        None => "Style".to_string(),
    }
}

fn next_name(base: &str, counter: &mut usize, taken: &mut HashSet<String>) -> ResourceName {
    loop {
        let candidate = if *counter == 0 {
            base.to_string()
        } else {
            format!("{}_{}", base, counter)
        };
        *counter += 1;
        if taken.insert(candidate.clone()) {
            return ResourceName::new(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u32, tag: &str, attrs: &[(&str, &str)]) -> DedupMember {
        DedupMember {
            id: NodeId::new(id),
            tag: tag.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn text_views() -> Vec<DedupMember> {
        (0..5)
            .map(|i| {
                let text = format!("@string/line_{}", i);
                member(
                    i,
                    "TextView",
                    &[
                        ("android:fontFamily", "@string/font_roboto"),
                        ("android:textSize", "@dimen/dimen_14sp"),
                        ("android:textColor", "@color/black"),
                        ("android:text", text.as_str()),
                    ],
                )
            })
            .collect()
    }

    #[test]
    fn test_shared_attributes_promote_as_one_style() {
        let result = Deduplicator::default().run(&text_views());

        assert_eq!(result.styles.len(), 1);
        let style = &result.styles[0];
        assert_eq!(style.name.as_str(), "TextView");
        assert_eq!(style.parent, None);
        assert_eq!(
            style.attributes.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            vec!["android:fontFamily", "android:textColor", "android:textSize"]
        );
        assert_eq!(result.assignments.len(), 5);
        for removed in result.removals.values() {
            assert!(!removed.contains(&"android:text".to_string()));
            assert_eq!(removed.len(), 3);
        }
    }

    #[test]
    fn test_deduplication_is_deterministic() {
        let members = text_views();
        let dedup = Deduplicator::default();
        assert_eq!(dedup.run(&members), dedup.run(&members));
    }

    #[test]
    fn test_pair_of_single_attribute_stays_inline() {
        let members = vec![
            member(0, "View", &[("android:alpha", "0.5")]),
            member(1, "View", &[("android:alpha", "0.5")]),
            member(2, "View", &[("android:alpha", "0.7")]),
        ];
        let result = Deduplicator::default().run(&members);
        assert!(result.styles.is_empty());
        assert!(result.removals.is_empty());
    }

    #[test]
    fn test_whole_group_of_two_promotes_single_attribute() {
        let members = vec![
            member(0, "View", &[("android:alpha", "0.5")]),
            member(1, "View", &[("android:alpha", "0.5")]),
        ];
        let result = Deduplicator::default().run(&members);
        assert_eq!(result.styles.len(), 1);
    }

    #[test]
    fn test_nested_coverage_chains_through_parent() {
        let members = vec![
            member(0, "Button", &[("a", "1"), ("b", "2")]),
            member(1, "Button", &[("a", "1"), ("b", "2")]),
            member(2, "Button", &[("a", "1"), ("b", "2")]),
            member(3, "Button", &[("a", "1"), ("b", "9")]),
        ];
        let result = Deduplicator::default().run(&members);

        assert_eq!(result.styles.len(), 2);
        let outer = &result.styles[0];
        let inner = &result.styles[1];
        assert_eq!(outer.name.as_str(), "Button");
        assert_eq!(outer.attributes, vec![("a".to_string(), "1".to_string())]);
        assert_eq!(inner.name.as_str(), "Button_1");
        assert_eq!(inner.parent.as_ref().map(|p| p.as_str()), Some("Button"));
        assert_eq!(inner.attributes, vec![("b".to_string(), "2".to_string())]);

        assert_eq!(result.assignments[&NodeId::new(0)].as_str(), "Button_1");
        assert_eq!(result.assignments[&NodeId::new(3)].as_str(), "Button");
        assert_eq!(result.resolve("Button_1", "a"), Some("1"));
    }

    #[test]
    fn test_tags_are_named_separately() {
        let mut members = text_views();
        members.extend((10..13).map(|i| member(i, "Button", &[("android:textColor", "@color/red")])));
        let result = Deduplicator::default().run(&members);
        let names: Vec<&str> = result.styles.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Button", "TextView"]);
    }

    #[test]
    fn test_disabled_config_promotes_nothing() {
        let dedup = Deduplicator::new(DedupConfig {
            enabled: false,
            ..DedupConfig::default()
        });
        assert_eq!(dedup.run(&text_views()), DedupResult::default());
    }
}
