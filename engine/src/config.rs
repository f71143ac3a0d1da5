// ═══════════════════════════════════════════════════════════════════════
// Rules configuration — the policy knobs the game variants disagree on
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Neighborhood;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// GPA every session starts with.
    pub gpa_baseline: u32,
    /// Optional hard cap on GPA. `None` leaves it uncapped.
    pub gpa_ceiling: Option<u32>,
    /// `gpa + roll` must reach this to pass the exam.
    pub exam_pass_threshold: u32,
    /// How long resolved effects stay on display. Pure base-effect cards
    /// display for twice this.
    pub panel_transition_ms: u64,
    /// Delay between showing a move roll and offering the direction.
    pub reveal_ms: u64,
    /// Fixed spawn neighborhood; `None` picks uniformly at random.
    pub spawn: Option<Neighborhood>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            gpa_baseline: 2,
            gpa_ceiling: None,
            exam_pass_threshold: 10,
            panel_transition_ms: 3000,
            reveal_ms: 2000,
            spawn: None,
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exam_pass_threshold == 0 {
            return Err(ConfigError::InvalidRules("exam_pass_threshold must be positive".into()));
        }
        if let Some(ceiling) = self.gpa_ceiling {
            if ceiling < self.gpa_baseline {
                return Err(ConfigError::InvalidRules(format!(
                    "gpa_ceiling {ceiling} is below gpa_baseline {}",
                    self.gpa_baseline
                )));
            }
        }
        if self.panel_transition_ms == 0 || self.reveal_ms == 0 {
            return Err(ConfigError::InvalidRules("display durations must be positive".into()));
        }
        Ok(())
    }

    /// Duration a pure base-effect card stays on the effects panel.
    pub fn base_card_display_ms(&self) -> u64 {
        self.panel_transition_ms.saturating_mul(2)
    }

    pub fn from_json(text: &str) -> Result<RulesConfig, ConfigError> {
        let rules: RulesConfig = serde_json::from_str(text)
            .map_err(|e| ConfigError::InvalidRules(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }
}
