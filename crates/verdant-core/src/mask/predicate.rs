use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdantError};
use crate::mask::flags::{FlagKind, FlagVocabulary};

/// The state a flag must be in for a cell to pass.
///
/// Boolean flags take `true` / `false`, categorical flags take one of the
/// vocabulary's labels. In TOML the two are written as `snow = false` and
/// `cloud_state = "clear"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredValue {
    Flag(bool),
    Label(String),
}

/// One requirement: the named flag must hold the required value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagRequirement {
    pub flag: String,
    pub value: RequiredValue,
}

impl FlagRequirement {
    pub fn boolean(flag: &str, value: bool) -> Self {
        Self {
            flag: flag.to_string(),
            value: RequiredValue::Flag(value),
        }
    }

    pub fn label(flag: &str, label: &str) -> Self {
        Self {
            flag: flag.to_string(),
            value: RequiredValue::Label(label.to_string()),
        }
    }
}

/// A conjunction of flag requirements.
///
/// A cell passes only when every requirement holds; an empty set passes
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateSet {
    pub requirements: Vec<FlagRequirement>,
}

impl PredicateSet {
    pub fn new(requirements: Vec<FlagRequirement>) -> Self {
        Self { requirements }
    }

    /// The conventional clear-sky screen for optical imagery: observed,
    /// cloud-free, shadow-free, snow-free and unsaturated.
    pub fn clear_sky() -> Self {
        Self::new(vec![
            FlagRequirement::label("valid", "valid"),
            FlagRequirement::label("cloud_state", "clear"),
            FlagRequirement::boolean("cloud_shadow", false),
            FlagRequirement::boolean("snow", false),
            FlagRequirement::boolean("saturation", false),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Resolves every requirement against a vocabulary up front, so that
    /// typos fail before any pixels are touched.
    pub(crate) fn compile(&self, vocabulary: &FlagVocabulary) -> Result<CompiledPredicates> {
        let mut checks = Vec::with_capacity(self.requirements.len());
        for req in &self.requirements {
            let def = vocabulary
                .get(&req.flag)
                .ok_or_else(|| VerdantError::UnknownFlag(req.flag.clone()))?;
            let required = match (&def.kind, &req.value) {
                (FlagKind::Boolean, RequiredValue::Flag(state)) => u16::from(*state),
                (FlagKind::Boolean, RequiredValue::Label(label)) => {
                    return Err(VerdantError::UnknownLabel {
                        flag: req.flag.clone(),
                        label: label.clone(),
                    });
                }
                (FlagKind::Categorical(labels), RequiredValue::Label(label)) => {
                    match labels.iter().position(|l| l == label) {
                        Some(value) => value as u16,
                        None => {
                            return Err(VerdantError::UnknownLabel {
                                flag: req.flag.clone(),
                                label: label.clone(),
                            });
                        }
                    }
                }
                (FlagKind::Categorical(_), RequiredValue::Flag(_)) => {
                    return Err(VerdantError::BooleanFlagExpected(req.flag.clone()));
                }
            };
            checks.push(CompiledCheck {
                offset: def.offset,
                mask: (1 << def.width) - 1,
                required,
            });
        }
        Ok(CompiledPredicates { checks })
    }
}

struct CompiledCheck {
    offset: u8,
    mask: u16,
    required: u16,
}

/// Predicates resolved to raw bit comparisons against one vocabulary.
pub(crate) struct CompiledPredicates {
    checks: Vec<CompiledCheck>,
}

impl CompiledPredicates {
    pub(crate) fn matches(&self, word: u16) -> bool {
        self.checks
            .iter()
            .all(|c| (word >> c.offset) & c.mask == c.required)
    }
}
