//! Recipe records as returned by the remote search service.
//!
//! The service speaks with the column names of its dataset (`Recipe_title`,
//! `Protein (g)`, ...) and is loose about numeric types: the same field can
//! arrive as a number, a numeric string or `null`. Everything here reads
//! those fields tolerantly and exposes plain `f64` accessors where absent
//! values count as zero.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Protein above this many grams earns the high-protein badge.
pub const HIGH_PROTEIN_GRAMS: f64 = 25.0;
/// Protein at or above this many grams earns the medium badge.
pub const MEDIUM_PROTEIN_GRAMS: f64 = 15.0;
/// Calories above this are flagged.
pub const HIGH_CALORIES: f64 = 600.0;
/// Shown for records whose title is missing or not a string.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "Recipe_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(rename = "Recipe_title", default = "untitled", deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(rename = "Calories", default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(rename = "Protein (g)", default, deserialize_with = "lenient_number")]
    pub protein: Option<f64>,
    #[serde(rename = "Region", default, deserialize_with = "lenient_string")]
    pub region: Option<String>,
    #[serde(rename = "Score", default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(rename = "Matched_Entities", default)]
    pub entities: Option<MatchedEntities>,
}

/// Metadata the service extracted for a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedEntities {
    #[serde(rename = "CUISINE", default, deserialize_with = "one_or_many")]
    pub cuisine: Vec<String>,
    #[serde(rename = "DIET", default, deserialize_with = "lenient_string")]
    pub diet: Option<String>,
    #[serde(rename = "FLAVOR", default, deserialize_with = "one_or_many")]
    pub flavor: Vec<String>,
    #[serde(rename = "METHOD_PREFERENCE", default, deserialize_with = "one_or_many")]
    pub method_preference: Vec<String>,
    #[serde(rename = "METHOD_AVOID", default, deserialize_with = "one_or_many")]
    pub method_avoid: Vec<String>,
    #[serde(rename = "PROTEIN_GOAL", default, deserialize_with = "lenient_string")]
    pub protein_goal: Option<String>,
    #[serde(rename = "CALORIE_LIMIT", default, deserialize_with = "lenient_number")]
    pub calorie_limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProteinBadge {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieBadge {
    High,
    Normal,
}

/// One label/value line of the recipe detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

impl DetailRow {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

impl Recipe {
    pub fn protein(&self) -> f64 {
        self.protein.unwrap_or(0.0)
    }

    pub fn calories(&self) -> f64 {
        self.calories.unwrap_or(0.0)
    }

    pub fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn region_label(&self) -> &str {
        match self.region.as_deref() {
            Some(region) if !region.trim().is_empty() => region,
            _ => "Global",
        }
    }

    pub fn protein_badge(&self) -> ProteinBadge {
        let protein = self.protein();
        if protein > HIGH_PROTEIN_GRAMS {
            ProteinBadge::High
        } else if protein >= MEDIUM_PROTEIN_GRAMS {
            ProteinBadge::Medium
        } else {
            ProteinBadge::Low
        }
    }

    pub fn calorie_badge(&self) -> CalorieBadge {
        if self.calories() > HIGH_CALORIES {
            CalorieBadge::High
        } else {
            CalorieBadge::Normal
        }
    }

    /// Rows shown in the detail modal, in display order. Empty values are left out.
    pub fn detail_rows(&self) -> Vec<DetailRow> {
        let mut rows = vec![
            DetailRow::new("Region", self.region_label()),
            DetailRow::new("Calories", format!("{} kcal", format_amount(self.calories()))),
            DetailRow::new("Protein", format!("{} g", format_amount(self.protein()))),
            DetailRow::new("Score", format!("{:.1}", self.score())),
        ];

        let Some(entities) = &self.entities else {
            return rows;
        };

        let mut push = |label: &str, value: String| {
            if !value.trim().is_empty() {
                rows.push(DetailRow::new(label, value));
            }
        };
        push("Cuisine", entities.cuisine.join(", "));
        push(
            "Diet",
            entities.diet.clone().unwrap_or_else(|| "Standard".to_string()),
        );
        push("Flavors", entities.flavor.join(", "));
        push("Cooking Methods", entities.method_preference.join(", "));
        push("Methods Avoided", entities.method_avoid.join(", "));
        push("Protein Goal", entities.protein_goal.clone().unwrap_or_default());
        push(
            "Calorie Limit",
            entities
                .calorie_limit
                .map(|limit| format!("<{}", format_amount(limit)))
                .unwrap_or_default(),
        );
        rows
    }
}

/// Post-search filters applied to the displayed results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeFilter {
    pub min_protein: f64,
    pub max_calories: f64,
}

impl Default for RecipeFilter {
    fn default() -> Self {
        Self {
            min_protein: 0.0,
            max_calories: 2000.0,
        }
    }
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        recipe.protein() >= self.min_protein && recipe.calories() <= self.max_calories
    }

    pub fn apply(&self, recipes: &[Recipe]) -> Vec<Recipe> {
        recipes.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Formats a quantity without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn number_from_value(value: Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(number_from_value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn untitled() -> String {
    UNTITLED.to_string()
}

fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(untitled))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => vec![s],
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
