use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Quick suggestion tags offered next to the description field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuickSuggestion {
    #[serde(rename = "High Protein")]
    HighProtein,
    #[serde(rename = "Low Carb")]
    LowCarb,
    #[serde(rename = "Vegetarian")]
    Vegetarian,
    #[serde(rename = "Quick & Easy")]
    QuickAndEasy,
}

impl QuickSuggestion {
    pub const ALL: [QuickSuggestion; 4] = [
        QuickSuggestion::HighProtein,
        QuickSuggestion::LowCarb,
        QuickSuggestion::Vegetarian,
        QuickSuggestion::QuickAndEasy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuickSuggestion::HighProtein => "High Protein",
            QuickSuggestion::LowCarb => "Low Carb",
            QuickSuggestion::Vegetarian => "Vegetarian",
            QuickSuggestion::QuickAndEasy => "Quick & Easy",
        }
    }
}

impl fmt::Display for QuickSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target macro overrides, each left to the service when unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTargets {
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fats: Option<String>,
    pub calories: Option<String>,
}

/// Wire form of the macro overrides; unset values are sent as ""
#[derive(Debug, Clone, Serialize)]
pub struct MacroFields {
    pub protein: String,
    pub carbs: String,
    pub fats: String,
    pub calories: String,
}

impl From<&MacroTargets> for MacroFields {
    fn from(targets: &MacroTargets) -> Self {
        let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();
        Self {
            protein: field(&targets.protein),
            carbs: field(&targets.carbs),
            fats: field(&targets.fats),
            calories: field(&targets.calories),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationStatus {
    Idle,
    Submitting,
    Succeeded,
    LimitExceeded,
    Failed,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Succeeded | GenerationStatus::LimitExceeded | GenerationStatus::Failed
        )
    }
}

/// One user-initiated generation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: Uuid,
    pub description: String,
    pub include_custom_macros: bool,
    pub macros: MacroTargets,
    pub quick_suggestions: BTreeSet<QuickSuggestion>,
    status: GenerationStatus,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            include_custom_macros: false,
            macros: MacroTargets::default(),
            quick_suggestions: BTreeSet::new(),
            status: GenerationStatus::Idle,
        }
    }

    pub fn with_macros(mut self, macros: MacroTargets) -> Self {
        self.include_custom_macros = true;
        self.macros = macros;
        self
    }

    pub fn with_suggestion(mut self, suggestion: QuickSuggestion) -> Self {
        self.quick_suggestions.insert(suggestion);
        self
    }

    /// Select the tag, or deselect it if already selected
    pub fn toggle_suggestion(&mut self, suggestion: QuickSuggestion) {
        if !self.quick_suggestions.remove(&suggestion) {
            self.quick_suggestions.insert(suggestion);
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.description.trim().is_empty()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub(crate) fn begin(&mut self) {
        self.status = GenerationStatus::Submitting;
    }

    pub(crate) fn finish(&mut self, status: GenerationStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
    }

    pub fn to_payload(&self) -> GenerationPayload {
        GenerationPayload {
            prompt: self.description.trim().to_string(),
            include_custom_macros: self.include_custom_macros,
            quick_suggestions: self
                .quick_suggestions
                .iter()
                .map(|s| s.label().to_string())
                .collect(),
            macros: MacroFields::from(&self.macros),
        }
    }
}

/// POST body sent to the generation endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub prompt: String,
    pub include_custom_macros: bool,
    pub quick_suggestions: Vec<String>,
    pub macros: MacroFields,
}

/// Decoded meal returned by the service. The schema belongs to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedMeal(pub Value);

impl GeneratedMeal {
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("meal_name")
            .or_else(|| self.0.get("name"))
            .and_then(Value::as_str)
    }
}

/// Result of one `generate` call, tagged for a UI bridge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GenerationOutcome {
    Succeeded { meal: GeneratedMeal },
    LimitExceeded,
    InvalidInput,
    Failed { message: String },
}

impl GenerationOutcome {
    pub fn status(&self) -> Option<GenerationStatus> {
        match self {
            GenerationOutcome::Succeeded { .. } => Some(GenerationStatus::Succeeded),
            GenerationOutcome::LimitExceeded => Some(GenerationStatus::LimitExceeded),
            GenerationOutcome::Failed { .. } => Some(GenerationStatus::Failed),
            GenerationOutcome::InvalidInput => None,
        }
    }
}
