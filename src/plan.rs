//! Meal plan generation from a list of search results.
//!
//! A plan is built in two steps. The result list is first ordered
//! according to the chosen [`PlanFocus`], then dealt out round-robin into
//! `days x meals` slots. When there are fewer recipes than slots the list
//! is recycled from the start.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::recipe::Recipe;

/// Largest number of days a plan may span.
pub const MAX_DAYS: usize = 14;

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Goal that decides how results are ordered before they are dealt out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFocus {
    #[default]
    Balanced,
    HighProtein,
    LowCalorie,
    WeightLoss,
    MuscleGain,
}

impl PlanFocus {
    pub const ALL: [PlanFocus; 5] = [
        PlanFocus::Balanced,
        PlanFocus::HighProtein,
        PlanFocus::LowCalorie,
        PlanFocus::WeightLoss,
        PlanFocus::MuscleGain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlanFocus::Balanced => "Balanced",
            PlanFocus::HighProtein => "High Protein",
            PlanFocus::LowCalorie => "Low Calorie",
            PlanFocus::WeightLoss => "Weight Loss",
            PlanFocus::MuscleGain => "Muscle Gain",
        }
    }
}

impl fmt::Display for PlanFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlanFocus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlanFocus::ALL
            .into_iter()
            .find(|focus| focus.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidPlan(format!("unknown plan focus '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealKind {
    pub fn label(self) -> &'static str {
        match self {
            MealKind::Breakfast => "Breakfast",
            MealKind::Lunch => "Lunch",
            MealKind::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MealsPerDay {
    Two,
    #[default]
    Three,
}

impl MealsPerDay {
    pub fn meals(self) -> &'static [MealKind] {
        match self {
            MealsPerDay::Two => &[MealKind::Lunch, MealKind::Dinner],
            MealsPerDay::Three => &[MealKind::Breakfast, MealKind::Lunch, MealKind::Dinner],
        }
    }

    pub fn count(self) -> usize {
        self.meals().len()
    }
}

impl TryFrom<u32> for MealsPerDay {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(MealsPerDay::Two),
            3 => Ok(MealsPerDay::Three),
            other => Err(Error::InvalidPlan(format!(
                "meals per day must be 2 or 3, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanOptions {
    pub days: usize,
    pub meals_per_day: MealsPerDay,
    pub focus: PlanFocus,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            days: 5,
            meals_per_day: MealsPerDay::Three,
            focus: PlanFocus::Balanced,
        }
    }
}

impl PlanOptions {
    pub fn slots(&self) -> usize {
        self.days * self.meals_per_day.count()
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(Error::InvalidPlan(format!(
                "days must be between 1 and {MAX_DAYS}, got {}",
                self.days
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealSlot {
    pub meal: MealKind,
    pub recipe: Recipe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub label: String,
    pub meals: Vec<MealSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealPlan {
    pub days: Vec<PlanDay>,
}

impl MealPlan {
    pub fn slots(&self) -> impl Iterator<Item = &MealSlot> {
        self.days.iter().flat_map(|day| day.meals.iter())
    }
}

/// Label for the zero-based day index. Weekdays cycle from Monday; later
/// weeks carry their number so labels stay unique.
pub fn day_label(index: usize) -> String {
    let name = DAY_NAMES[index % DAY_NAMES.len()];
    match index / DAY_NAMES.len() {
        0 => name.to_string(),
        week => format!("{name} (week {})", week + 1),
    }
}

/// Returns the recipes in the order the plan should consume them.
///
/// High protein sorts by protein descending and low calorie by calories
/// ascending; both sorts are stable. Every other focus shuffles.
pub fn order_recipes(recipes: &[Recipe], focus: PlanFocus, rng: &mut fastrand::Rng) -> Vec<Recipe> {
    let mut ordered = recipes.to_vec();
    match focus {
        PlanFocus::HighProtein => ordered.sort_by(|a, b| b.protein().total_cmp(&a.protein())),
        PlanFocus::LowCalorie => ordered.sort_by(|a, b| a.calories().total_cmp(&b.calories())),
        PlanFocus::Balanced | PlanFocus::WeightLoss | PlanFocus::MuscleGain => {
            rng.shuffle(&mut ordered)
        }
    }
    ordered
}

/// Deals `ordered` into the plan grid, recycling by modulo index.
pub fn build_plan(ordered: &[Recipe], options: &PlanOptions) -> Result<MealPlan> {
    options.validate()?;
    if ordered.is_empty() {
        return Err(Error::NoRecipes);
    }

    let mut next = 0;
    let days = (0..options.days)
        .map(|day| {
            let meals = options
                .meals_per_day
                .meals()
                .iter()
                .map(|&meal| {
                    let recipe = ordered[next % ordered.len()].clone();
                    next += 1;
                    MealSlot { meal, recipe }
                })
                .collect();
            PlanDay {
                label: day_label(day),
                meals,
            }
        })
        .collect();

    Ok(MealPlan { days })
}

pub fn generate_plan(
    recipes: &[Recipe],
    options: &PlanOptions,
    rng: &mut fastrand::Rng,
) -> Result<MealPlan> {
    let ordered = order_recipes(recipes, options.focus, rng);
    let plan = build_plan(&ordered, options)?;
    tracing::debug!(
        recipes = recipes.len(),
        days = options.days,
        slots = options.slots(),
        focus = %options.focus,
        "generated meal plan"
    );
    Ok(plan)
}
