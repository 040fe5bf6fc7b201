//! Set algebra over exactly three companies' topic sets: the seven Venn
//! regions (three exclusive, three pairwise, one common), pairwise disjoint
//! with union equal to the union of the inputs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::TopicSet;

/// Region labels follow venn3 membership notation: one digit per company in
/// input order, 1 = inside that company's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Region {
    #[serde(rename = "100")]
    OnlyA,
    #[serde(rename = "010")]
    OnlyB,
    #[serde(rename = "001")]
    OnlyC,
    #[serde(rename = "110")]
    AB,
    #[serde(rename = "011")]
    BC,
    #[serde(rename = "101")]
    AC,
    #[serde(rename = "111")]
    Common,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::OnlyA,
        Region::OnlyB,
        Region::OnlyC,
        Region::AB,
        Region::BC,
        Region::AC,
        Region::Common,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Region::OnlyA => "100",
            Region::OnlyB => "010",
            Region::OnlyC => "001",
            Region::AB => "110",
            Region::BC => "011",
            Region::AC => "101",
            Region::Common => "111",
        }
    }

    /// Human label built from the three company names in input order.
    pub fn label(&self, names: [&str; 3]) -> String {
        match self {
            Region::OnlyA => format!("Only {}", names[0]),
            Region::OnlyB => format!("Only {}", names[1]),
            Region::OnlyC => format!("Only {}", names[2]),
            Region::AB => format!("{} ∩ {}", names[0], names[1]),
            Region::BC => format!("{} ∩ {}", names[1], names[2]),
            Region::AC => format!("{} ∩ {}", names[0], names[2]),
            Region::Common => "All three".to_string(),
        }
    }
}

pub fn compute_regions(a: &TopicSet, b: &TopicSet, c: &TopicSet) -> BTreeMap<Region, TopicSet> {
    let minus = |x: &TopicSet, y: &TopicSet, z: &TopicSet| -> TopicSet {
        x.iter()
            .filter(|t| !y.contains(*t) && !z.contains(*t))
            .cloned()
            .collect()
    };
    let pair = |x: &TopicSet, y: &TopicSet, z: &TopicSet| -> TopicSet {
        x.iter()
            .filter(|t| y.contains(*t) && !z.contains(*t))
            .cloned()
            .collect()
    };
    let common: TopicSet = a
        .iter()
        .filter(|t| b.contains(*t) && c.contains(*t))
        .cloned()
        .collect();

    let mut out = BTreeMap::new();
    out.insert(Region::OnlyA, minus(a, b, c));
    out.insert(Region::OnlyB, minus(b, a, c));
    out.insert(Region::OnlyC, minus(c, a, b));
    out.insert(Region::AB, pair(a, b, c));
    out.insert(Region::BC, pair(b, c, a));
    out.insert(Region::AC, pair(a, c, b));
    out.insert(Region::Common, common);
    out
}

/// Rendering view of one region: full member count plus a bounded preview.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    pub region: Region,
    pub label: String,
    pub len: usize,
    pub preview: Vec<String>,
    pub topics: Vec<String>,
}

pub fn summarize_regions(
    regions: &BTreeMap<Region, TopicSet>,
    names: [&str; 3],
    preview_len: usize,
) -> Vec<RegionSummary> {
    Region::ALL
        .iter()
        .map(|r| {
            let topics: Vec<String> = regions.get(r).into_iter().flatten().cloned().collect();
            RegionSummary {
                region: *r,
                label: r.label(names),
                len: topics.len(),
                preview: topics.iter().take(preview_len).cloned().collect(),
                topics,
            }
        })
        .collect()
}
