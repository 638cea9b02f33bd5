use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::breakpoint::Breakpoint;

/// Page-wide design tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokens {
    pub primary_color: String,
    pub text_color: String,
    pub bg_color: String,
    #[serde(serialize_with = "crate::number::serialize")]
    pub card_radius: f64,
    #[serde(default, serialize_with = "crate::number::serialize_map")]
    pub font_scale: BTreeMap<Breakpoint, f64>,
}

impl DesignTokens {
    /// Font scale for a breakpoint, 1.0 when unset
    pub fn font_scale_for(&self, breakpoint: Breakpoint) -> f64 {
        self.font_scale.get(&breakpoint).copied().unwrap_or(1.0)
    }
}

impl Default for DesignTokens {
    fn default() -> Self {
        Self {
            primary_color: "#0d6efd".to_string(),
            text_color: "#212529".to_string(),
            bg_color: "#f8f9fa".to_string(),
            card_radius: 12.0,
            font_scale: Breakpoint::ALL.into_iter().map(|bp| (bp, 1.0)).collect(),
        }
    }
}
