// Domain errors - contract violations surfaced synchronously to callers
use thiserror::Error;

use super::model_group::GroupId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticsError {
    #[error("cannot compute statistics over an empty sequence")]
    EmptyInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupStoreError {
    #[error("tried to access \"{group_id}\" which is not a valid group")]
    UnknownGroup { group_id: GroupId },

    #[error("\"{value}\" is not a valid statistical value ({})", .expected.join("|"))]
    InvalidStatValue {
        value: String,
        expected: &'static [&'static str],
    },

    #[error("no properties supplied for model \"{model}\" of group {group_id}")]
    MissingModelProperties { group_id: GroupId, model: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a plot for \"{tag}\" is currently not supported")]
pub struct UnsupportedPlotType {
    pub tag: String,
}
