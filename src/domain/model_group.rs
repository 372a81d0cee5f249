// Model group domain model
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::GroupStoreError;

pub type GroupId = u32;

/// Statistic that can be overlaid for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatValue {
    Mean,
    Median,
    Derivative,
    Percentile,
}

impl StatValue {
    pub const ALL: [StatValue; 4] = [
        StatValue::Mean,
        StatValue::Median,
        StatValue::Derivative,
        StatValue::Percentile,
    ];

    pub const TAGS: &'static [&'static str] = &["mean", "median", "derivative", "percentile"];

    pub fn tag(self) -> &'static str {
        match self {
            StatValue::Mean => "mean",
            StatValue::Median => "median",
            StatValue::Derivative => "derivative",
            StatValue::Percentile => "percentile",
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for StatValue {
    type Err = GroupStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatValue::ALL
            .into_iter()
            .find(|sv| sv.tag() == s)
            .ok_or_else(|| GroupStoreError::InvalidStatValue {
                value: s.to_string(),
                expected: StatValue::TAGS,
            })
    }
}

/// Display and statistic-inclusion settings of one model inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// `None` defers to the colour supplied by the data service. The field
    /// must be present even when null.
    #[serde(deserialize_with = "present_or_null")]
    pub color: Option<String>,
    pub is_visible: bool,
    pub mean: bool,
    pub median: bool,
    pub derivative: bool,
    pub percentile: bool,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl Default for Model {
    fn default() -> Self {
        Self {
            color: None,
            is_visible: true,
            mean: true,
            median: true,
            derivative: true,
            percentile: true,
        }
    }
}

impl Model {
    pub fn includes(&self, stat: StatValue) -> bool {
        match stat {
            StatValue::Mean => self.mean,
            StatValue::Median => self.median,
            StatValue::Derivative => self.derivative,
            StatValue::Percentile => self.percentile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelGroup {
    pub id: GroupId,
    pub name: String,
    pub model_list: Vec<String>,
    pub models: BTreeMap<String, Model>,
    pub is_visible: bool,
    pub visible_statistical_values: BTreeMap<StatValue, bool>,
}

impl ModelGroup {
    /// Fresh group whose models all start from the default template.
    pub fn new(id: GroupId, name: String, model_list: &[String]) -> Self {
        let mut group = Self {
            id,
            name,
            model_list: Vec::with_capacity(model_list.len()),
            models: BTreeMap::new(),
            is_visible: true,
            visible_statistical_values: StatValue::ALL.into_iter().map(|sv| (sv, true)).collect(),
        };
        for model in model_list {
            group.add_model(model);
        }
        group
    }

    /// Appends `model` with default settings unless it is already present.
    pub fn add_model(&mut self, model: &str) -> bool {
        if self.models.contains_key(model) {
            return false;
        }
        self.model_list.push(model.to_string());
        self.models.insert(model.to_string(), Model::default());
        true
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn shows_statistic(&self, stat: StatValue) -> bool {
        self.visible_statistical_values.get(&stat).copied().unwrap_or(false)
    }
}

/// All groups, owned exclusively by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStoreState {
    pub id_counter: GroupId,
    pub group_ids: Vec<GroupId>,
    pub groups: BTreeMap<GroupId, ModelGroup>,
}

impl GroupStoreState {
    /// Groups in `group_ids` order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelGroup> {
        self.group_ids.iter().filter_map(|id| self.groups.get(id))
    }
}
