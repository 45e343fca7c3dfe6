//! The Foodoscope screen: search bar, result cards, detail modal and the
//! meal plan generator, wired onto [`AppState`] elements.
//!
//! Handlers registered on the elements only forward to methods on
//! [`FoodoscopeApp`]; slow work (HTTP searches) is spawned onto the runtime
//! so the WebSocket reader is never blocked.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{DietQuery, RecipeClient};
use crate::error::Error;
use crate::plan::{self, MAX_DAYS, MealPlan, MealsPerDay, PlanFocus, PlanOptions};
use crate::recipe::{Recipe, RecipeFilter};
use crate::ui::{AppState, PlanDayView, RecipeCard, UiElement};

/// Page layout; every `ui-*` element id below appears in it.
pub const LAYOUT_HTML: &str = include_str!("layout.html");

pub mod ids {
    pub const QUERY: &str = "query";
    pub const SEARCH: &str = "search";
    pub const CLEAR: &str = "clear";
    pub const STATUS: &str = "status";
    pub const EXAMPLES: [&str; 3] = ["example-1", "example-2", "example-3"];
    pub const TOP_K: &str = "top-k";
    pub const MIN_PROTEIN: &str = "min-protein";
    pub const MAX_CALORIES: &str = "max-calories";
    pub const RESULTS: &str = "results";
    pub const DETAIL: &str = "detail";
    pub const DETAIL_CLOSE: &str = "detail-close";
    pub const PLAN_DAYS: &str = "plan-days";
    pub const MEALS_TWO: &str = "meals-2";
    pub const MEALS_THREE: &str = "meals-3";
    pub const PLAN_FOCUS: &str = "plan-focus";
    pub const GENERATE: &str = "generate";
    pub const PLAN: &str = "plan";
    pub const PLAN_CUISINE: &str = "plan-cuisine";
    pub const PLAN_DIET: &str = "plan-diet";
    pub const PLAN_SEARCH: &str = "plan-search";
}

const EXAMPLE_QUERIES: [(&str, &str); 3] = [
    ("Keto Indian High Protein", "Keto Indian High Protein"),
    ("Mediterranean under 500 kcal", "Mediterranean diet under 500 kcal"),
    ("Grilled Chicken (No Fried)", "Grilled Chicken dishes, no fried food"),
];

const DIET_OPTIONS: [&str; 5] = ["None", "Vegetarian", "Vegan", "Keto", "Paleo"];

/// Range of the "Results to Analyze" slider.
pub const MIN_TOP_K: usize = 5;
pub const MAX_TOP_K: usize = 50;
const TOP_K_STEP: f64 = 5.0;

const SEARCH_LABEL: &str = "Search";
const SEARCHING_LABEL: &str = "Thinking...";
const PLAN_SEARCH_LABEL: &str = "Create My Plan";
const PLAN_SEARCHING_LABEL: &str = "Generating Plan...";
const SEARCH_BUTTONS: [(&str, &str); 2] = [
    (ids::SEARCH, SEARCH_LABEL),
    (ids::PLAN_SEARCH, PLAN_SEARCH_LABEL),
];

pub const MSG_READY: &str = "Type what you crave and press Search.";
pub const MSG_SEARCH_FAILED: &str = "Failed to fetch recipes. Ensure backend is running!";
pub const MSG_NEED_RECIPES: &str = "Search for recipes first!";
pub const MSG_FILTERED_OUT: &str = "Matches found, but filters hid them all. Reset filters!";
pub const MSG_NO_PLAN_RECIPES: &str = "No recipes found for these criteria. Try broader terms!";
pub const MSG_NO_RESULTS: &str = "No recipes found matching your exact criteria. Try valid constraints!";
pub const MSG_PLAN_FAILED: &str = "Error generating plan.";
pub const MSG_BUSY: &str = "A search is already running, please wait.";

/// Search sizes and randomness for one app instance.
pub struct AppSettings {
    pub top_k: usize,
    pub plan_top_k: usize,
    pub rng: fastrand::Rng,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            top_k: 20,
            plan_top_k: 30,
            rng: fastrand::Rng::new(),
        }
    }
}

struct Session {
    query: String,
    recipes: Vec<Recipe>,
    visible: Vec<Recipe>,
    filter: RecipeFilter,
    options: PlanOptions,
    diet_query: DietQuery,
    rng: fastrand::Rng,
    top_k: usize,
    searching: bool,
    /// Bumped by [`FoodoscopeApp::clear`]; searches started under an older
    /// generation discard their response.
    generation: u64,
}

#[derive(Clone)]
pub struct FoodoscopeApp {
    state: AppState,
    client: RecipeClient,
    session: Arc<Mutex<Session>>,
    plan_top_k: usize,
}

impl FoodoscopeApp {
    /// Creates the app and registers every element of [`LAYOUT_HTML`] on `state`.
    pub fn new(state: AppState, client: RecipeClient, settings: AppSettings) -> Self {
        let session = Session {
            query: String::new(),
            recipes: Vec::new(),
            visible: Vec::new(),
            filter: RecipeFilter::default(),
            options: PlanOptions::default(),
            diet_query: DietQuery {
                diet: "None".to_string(),
                ..DietQuery::default()
            },
            rng: settings.rng,
            top_k: settings.top_k.clamp(MIN_TOP_K, MAX_TOP_K),
            searching: false,
            generation: 0,
        };
        let app = Self {
            state,
            client,
            session: Arc::new(Mutex::new(session)),
            plan_top_k: settings.plan_top_k,
        };
        app.install();
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(&self) {
        let state = &self.state;
        let session = self.session();

        let app = self.clone();
        let submit = self.clone();
        state.add_element(UiElement::Input {
            id: ids::QUERY.to_string(),
            value: String::new(),
            placeholder: "e.g. High protein spicy Indian food...".to_string(),
            on_input: Some(Arc::new(move |value: &str| app.set_query(value))),
            on_submit: Some(Arc::new(move || submit.spawn_search())),
        });

        let app = self.clone();
        state.add_element(button(ids::SEARCH, SEARCH_LABEL, move || app.spawn_search()));

        for (id, (label, query)) in ids::EXAMPLES.into_iter().zip(EXAMPLE_QUERIES) {
            let app = self.clone();
            state.add_element(button(id, label, move || {
                app.use_example(query);
                app.spawn_search();
            }));
        }

        let app = self.clone();
        state.add_element(button(ids::CLEAR, "Clear Results", move || app.clear()));

        state.add_element(UiElement::Text {
            id: ids::STATUS.to_string(),
            text: MSG_READY.to_string(),
        });

        let app = self.clone();
        state.add_element(UiElement::Slider {
            id: ids::TOP_K.to_string(),
            value: session.top_k as f64,
            min: MIN_TOP_K as f64,
            max: MAX_TOP_K as f64,
            step: Some(TOP_K_STEP),
            on_change: Some(Arc::new(move |value| app.set_top_k(value))),
        });

        let app = self.clone();
        state.add_element(UiElement::Slider {
            id: ids::MIN_PROTEIN.to_string(),
            value: session.filter.min_protein,
            min: 0.0,
            max: 100.0,
            step: Some(1.0),
            on_change: Some(Arc::new(move |value| app.set_min_protein(value))),
        });

        let app = self.clone();
        state.add_element(UiElement::Slider {
            id: ids::MAX_CALORIES.to_string(),
            value: session.filter.max_calories,
            min: 100.0,
            max: 2000.0,
            step: Some(50.0),
            on_change: Some(Arc::new(move |value| app.set_max_calories(value))),
        });

        let app = self.clone();
        state.add_element(UiElement::RecipeGrid {
            id: ids::RESULTS.to_string(),
            cards: Vec::new(),
            on_pick: Some(Arc::new(move |index| app.open_detail(index))),
        });

        state.add_element(UiElement::Modal {
            id: ids::DETAIL.to_string(),
            open: false,
            title: String::new(),
            rows: Vec::new(),
        });

        let app = self.clone();
        state.add_element(button(ids::DETAIL_CLOSE, "Close", move || app.close_detail()));

        let app = self.clone();
        state.add_element(UiElement::NumberInput {
            id: ids::PLAN_DAYS.to_string(),
            value: session.options.days as f64,
            min: Some(1.0),
            max: Some(MAX_DAYS as f64),
            step: Some(1.0),
            on_change: Some(Arc::new(move |value| app.set_days(value))),
        });

        for (id, meals) in [(ids::MEALS_TWO, MealsPerDay::Two), (ids::MEALS_THREE, MealsPerDay::Three)] {
            let app = self.clone();
            state.add_element(UiElement::Radio {
                id: id.to_string(),
                name: "meals-per-day".to_string(),
                value: meals.count().to_string(),
                checked: session.options.meals_per_day == meals,
                on_change: Some(Arc::new(move |checked| {
                    if checked {
                        app.set_meals_per_day(meals);
                    }
                })),
            });
        }

        let app = self.clone();
        state.add_element(UiElement::Select {
            id: ids::PLAN_FOCUS.to_string(),
            options: PlanFocus::ALL.iter().map(|f| f.label().to_string()).collect(),
            value: session.options.focus.label().to_string(),
            on_change: Some(Arc::new(move |value: &str| app.set_focus(value))),
        });

        let app = self.clone();
        state.add_element(button(ids::GENERATE, "Generate Plan", move || app.generate_plan()));

        state.add_element(UiElement::PlanGrid {
            id: ids::PLAN.to_string(),
            days: Vec::new(),
        });

        let app = self.clone();
        state.add_element(UiElement::Input {
            id: ids::PLAN_CUISINE.to_string(),
            value: String::new(),
            placeholder: "e.g. Indian, Mexican, Italian".to_string(),
            on_input: Some(Arc::new(move |value: &str| {
                app.session().diet_query.cuisine = value.to_string();
            })),
            on_submit: None,
        });

        let app = self.clone();
        state.add_element(UiElement::Select {
            id: ids::PLAN_DIET.to_string(),
            options: DIET_OPTIONS.iter().map(|d| d.to_string()).collect(),
            value: session.diet_query.diet.clone(),
            on_change: Some(Arc::new(move |value: &str| {
                app.session().diet_query.diet = value.to_string();
            })),
        });

        let app = self.clone();
        state.add_element(button(ids::PLAN_SEARCH, PLAN_SEARCH_LABEL, move || {
            app.spawn_plan_search()
        }));
    }

    pub fn set_query(&self, query: &str) {
        self.session().query = query.to_string();
    }

    fn use_example(&self, query: &str) {
        self.set_query(query);
        self.state.modify_element(ids::QUERY, |element| {
            if let UiElement::Input { value, .. } = element {
                *value = query.to_string();
            }
        });
    }

    fn spawn_search(&self) {
        let app = self.clone();
        tokio::spawn(async move { app.search().await });
    }

    fn spawn_plan_search(&self) {
        let app = self.clone();
        tokio::spawn(async move { app.plan_search().await });
    }

    /// Marks a search as running and locks both search buttons. Returns the
    /// session generation the search belongs to, or `None` when another
    /// search is still in flight.
    fn begin_search(&self, button_id: &str, busy_label: &str) -> Option<u64> {
        let generation = {
            let mut session = self.session();
            if session.searching {
                None
            } else {
                session.searching = true;
                Some(session.generation)
            }
        };
        let Some(generation) = generation else {
            self.state.set_text(ids::STATUS, MSG_BUSY);
            return None;
        };
        for (id, label) in SEARCH_BUTTONS {
            let label = if id == button_id { busy_label } else { label };
            set_button(&self.state, id, label, true);
        }
        Some(generation)
    }

    /// Unlocks the search buttons. Returns `false`, touching nothing, when
    /// the page was cleared after the search started.
    fn finish_search(&self, generation: u64) -> bool {
        {
            let mut session = self.session();
            if session.generation != generation {
                return false;
            }
            session.searching = false;
        }
        self.reset_search_buttons();
        true
    }

    fn reset_search_buttons(&self) {
        for (id, label) in SEARCH_BUTTONS {
            set_button(&self.state, id, label, false);
        }
    }

    /// Runs the search bar query. A blank query does nothing.
    pub async fn search(&self) {
        let (query, top_k) = {
            let session = self.session();
            (session.query.trim().to_string(), session.top_k)
        };
        if query.is_empty() {
            return;
        }
        let Some(generation) = self.begin_search(ids::SEARCH, SEARCHING_LABEL) else {
            return;
        };

        let result = self.client.search(&query, top_k).await;
        if !self.finish_search(generation) {
            tracing::debug!(%query, "dropping results of a cleared search");
            return;
        }

        match result {
            Ok(recipes) => self.show_results(recipes),
            Err(err) => {
                tracing::error!(%err, %query, "recipe search failed");
                self.state.set_text(ids::STATUS, MSG_SEARCH_FAILED);
            }
        }
    }

    /// Searches with the planner form and builds a plan straight from what
    /// comes back, regardless of the result filters.
    pub async fn plan_search(&self) {
        let query = {
            let mut session = self.session();
            session.diet_query.goal = session.options.focus.label().to_string();
            session.diet_query.to_query()
        };
        let Some(generation) = self.begin_search(ids::PLAN_SEARCH, PLAN_SEARCHING_LABEL) else {
            return;
        };

        let result = self.client.search(&query, self.plan_top_k).await;
        if !self.finish_search(generation) {
            tracing::debug!(%query, "dropping results of a cleared planner search");
            return;
        }

        match result {
            Ok(recipes) if recipes.is_empty() => {
                self.state.set_text(ids::STATUS, MSG_NO_PLAN_RECIPES);
            }
            Ok(recipes) => {
                self.show_results(recipes.clone());
                self.generate_plan_from(&recipes);
            }
            Err(err) => {
                tracing::error!(%err, %query, "planner search failed");
                self.state.set_text(ids::STATUS, MSG_PLAN_FAILED);
            }
        }
    }

    /// Stores a fresh result list, dropping any plan built from the previous one.
    pub fn show_results(&self, recipes: Vec<Recipe>) {
        self.session().recipes = recipes;
        self.set_plan(Vec::new());
        self.refresh_results();
    }

    fn refresh_results(&self) {
        let (cards, total, shown) = {
            let mut session = self.session();
            session.visible = session.filter.apply(&session.recipes);
            let cards: Vec<RecipeCard> = session
                .visible
                .iter()
                .enumerate()
                .map(|(index, recipe)| RecipeCard::new(index, recipe))
                .collect();
            (cards, session.recipes.len(), session.visible.len())
        };

        self.state.modify_element(ids::RESULTS, |element| {
            if let UiElement::RecipeGrid { cards: current, .. } = element {
                *current = cards;
            }
        });

        let status = match (total, shown) {
            (0, _) => MSG_NO_RESULTS.to_string(),
            (_, 0) => MSG_FILTERED_OUT.to_string(),
            (total, shown) if shown < total => format!("Found {total} Recipes ({shown} shown)"),
            (total, _) => format!("Found {total} Recipes"),
        };
        self.state.set_text(ids::STATUS, status);
    }

    /// Sets how many results the search bar asks for.
    pub fn set_top_k(&self, value: f64) {
        let top_k = (value.round().max(0.0) as usize).clamp(MIN_TOP_K, MAX_TOP_K);
        self.session().top_k = top_k;
        self.state.modify_element(ids::TOP_K, |element| {
            if let UiElement::Slider { value, .. } = element {
                *value = top_k as f64;
            }
        });
    }

    pub fn set_min_protein(&self, value: f64) {
        self.session().filter.min_protein = value.max(0.0);
        self.refresh_results();
    }

    pub fn set_max_calories(&self, value: f64) {
        self.session().filter.max_calories = value.max(0.0);
        self.refresh_results();
    }

    pub fn open_detail(&self, index: usize) {
        let Some(recipe) = self.session().visible.get(index).cloned() else {
            tracing::debug!(index, "detail requested for a card that is gone");
            return;
        };
        self.state.modify_element(ids::DETAIL, |element| {
            if let UiElement::Modal {
                open, title, rows, ..
            } = element
            {
                *open = true;
                *title = recipe.title.clone();
                *rows = recipe.detail_rows();
            }
        });
    }

    pub fn close_detail(&self) {
        self.state.modify_element(ids::DETAIL, |element| {
            if let UiElement::Modal { open, .. } = element {
                *open = false;
            }
        });
    }

    pub fn set_days(&self, value: f64) {
        let days = (value.round().max(1.0) as usize).min(MAX_DAYS);
        self.session().options.days = days;
        self.state.modify_element(ids::PLAN_DAYS, |element| {
            if let UiElement::NumberInput { value, .. } = element {
                *value = days as f64;
            }
        });
    }

    pub fn set_meals_per_day(&self, meals: MealsPerDay) {
        self.session().options.meals_per_day = meals;
        for (id, option) in [(ids::MEALS_TWO, MealsPerDay::Two), (ids::MEALS_THREE, MealsPerDay::Three)] {
            self.state.modify_element(id, |element| {
                if let UiElement::Radio { checked, .. } = element {
                    *checked = option == meals;
                }
            });
        }
    }

    pub fn set_focus(&self, label: &str) {
        match label.parse::<PlanFocus>() {
            Ok(focus) => self.session().options.focus = focus,
            Err(err) => tracing::warn!(%err, "ignoring focus change"),
        }
    }

    /// Builds a plan from the currently shown results.
    pub fn generate_plan(&self) {
        let outcome = {
            let mut session = self.session();
            let Session {
                recipes,
                visible,
                options,
                rng,
                ..
            } = &mut *session;
            if visible.is_empty() && !recipes.is_empty() {
                Err(Error::InvalidPlan(MSG_FILTERED_OUT.to_string()))
            } else {
                plan::generate_plan(visible, options, rng)
            }
        };
        self.show_plan(outcome);
    }

    fn generate_plan_from(&self, recipes: &[Recipe]) {
        let outcome = {
            let mut session = self.session();
            let Session { options, rng, .. } = &mut *session;
            plan::generate_plan(recipes, options, rng)
        };
        self.show_plan(outcome);
    }

    fn show_plan(&self, outcome: crate::Result<MealPlan>) {
        match outcome {
            Ok(plan) => {
                let days: Vec<PlanDayView> = plan.days.iter().map(PlanDayView::from).collect();
                let message = format!("Generated a {}-day plan.", days.len());
                self.set_plan(days);
                self.state.set_text(ids::STATUS, message);
            }
            Err(Error::NoRecipes) => self.state.set_text(ids::STATUS, MSG_NEED_RECIPES),
            Err(Error::InvalidPlan(reason)) => self.state.set_text(ids::STATUS, reason),
            Err(err) => {
                tracing::error!(%err, "plan generation failed");
                self.state.set_text(ids::STATUS, err.to_string());
            }
        }
    }

    fn set_plan(&self, days: Vec<PlanDayView>) {
        self.state.modify_element(ids::PLAN, |element| {
            if let UiElement::PlanGrid { days: current, .. } = element {
                *current = days;
            }
        });
    }

    /// Drops results, plan and query and returns the page to its initial
    /// state. A search still in flight is abandoned.
    pub fn clear(&self) {
        {
            let mut session = self.session();
            session.query.clear();
            session.recipes.clear();
            session.visible.clear();
            session.searching = false;
            session.generation += 1;
        }
        self.reset_search_buttons();
        self.state.modify_element(ids::QUERY, |element| {
            if let UiElement::Input { value, .. } = element {
                value.clear();
            }
        });
        self.state.modify_element(ids::RESULTS, |element| {
            if let UiElement::RecipeGrid { cards, .. } = element {
                cards.clear();
            }
        });
        self.set_plan(Vec::new());
        self.close_detail();
        self.state.set_text(ids::STATUS, MSG_READY);
    }
}

fn button(id: &str, text: &str, on_click: impl Fn() + Send + Sync + 'static) -> UiElement {
    UiElement::Button {
        id: id.to_string(),
        text: text.to_string(),
        disabled: false,
        on_click: Some(Arc::new(on_click)),
    }
}

fn set_button(state: &AppState, id: &str, label: &str, busy: bool) {
    state.modify_element(id, |element| {
        if let UiElement::Button { text, disabled, .. } = element {
            *text = label.to_string();
            *disabled = busy;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use axum::{Json, Router, routing::post};
    use serde_json::{Value, json};
    use std::time::Duration;

    type Requests = Arc<Mutex<Vec<Value>>>;

    /// Stub that records every request body and answers with `recipes`
    /// after `delay`.
    async fn start_recording_stub(recipes: Value, delay: Duration) -> (String, Requests) {
        let requests = Requests::default();
        let seen = requests.clone();
        let router = Router::new().route(
            "/search",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                let recipes = recipes.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    tokio::time::sleep(delay).await;
                    Json(json!({ "recipes": recipes }))
                }
            }),
        );
        (start_stub(router).await, requests)
    }

    async fn wait_until(what: &str, condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {}", what);
    }

    fn click(app: &FoodoscopeApp, id: &str) {
        match app.state().element(id) {
            Some(UiElement::Button {
                on_click: Some(handler),
                ..
            }) => handler(),
            other => panic!("no clickable button {}: {:?}", id, other),
        }
    }

    fn button_state(app: &FoodoscopeApp, id: &str) -> (String, bool) {
        match app.state().element(id) {
            Some(UiElement::Button { text, disabled, .. }) => (text, disabled),
            other => panic!("button {} missing: {:?}", id, other),
        }
    }

    async fn start_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let port = listener.local_addr().expect("Failed to get address").port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://127.0.0.1:{}", port)
    }

    async fn three_recipes() -> Json<Value> {
        Json(json!({
            "recipes": [
                {"Recipe_title": "Chana Masala", "Calories": 380, "Protein (g)": 19, "Region": "Indian Subcontinent", "Score": 10},
                {"Recipe_title": "Grilled Paneer", "Calories": 520, "Protein (g)": 32, "Score": 8},
                {"Recipe_title": "Cucumber Raita", "Calories": 90, "Protein (g)": 4, "Score": 3}
            ]
        }))
    }

    fn app_for(base_url: String) -> FoodoscopeApp {
        let client = RecipeClient::new(ClientConfig {
            base_url,
            ..ClientConfig::default()
        })
        .unwrap();
        let settings = AppSettings {
            rng: fastrand::Rng::with_seed(11),
            ..AppSettings::default()
        };
        FoodoscopeApp::new(AppState::new(), client, settings)
    }

    fn status(app: &FoodoscopeApp) -> String {
        match app.state().element(ids::STATUS) {
            Some(UiElement::Text { text, .. }) => text,
            other => panic!("status element missing: {:?}", other),
        }
    }

    fn cards(app: &FoodoscopeApp) -> Vec<RecipeCard> {
        match app.state().element(ids::RESULTS) {
            Some(UiElement::RecipeGrid { cards, .. }) => cards,
            other => panic!("results element missing: {:?}", other),
        }
    }

    fn plan_days(app: &FoodoscopeApp) -> Vec<PlanDayView> {
        match app.state().element(ids::PLAN) {
            Some(UiElement::PlanGrid { days, .. }) => days,
            other => panic!("plan element missing: {:?}", other),
        }
    }

    fn recipe(title: &str, protein: f64, calories: f64) -> Recipe {
        Recipe {
            title: title.to_string(),
            protein: Some(protein),
            calories: Some(calories),
            ..Recipe::default()
        }
    }

    #[test]
    fn test_layout_mentions_every_element() {
        let app = app_for("http://127.0.0.1:9".to_string());
        for element in app.state().get_all_elements() {
            let needle = format!(r#"id="{}""#, element.id());
            assert!(LAYOUT_HTML.contains(&needle), "layout is missing {}", element.id());
        }
    }

    #[tokio::test]
    async fn test_search_shows_cards() {
        let base = start_stub(Router::new().route("/search", post(three_recipes))).await;
        let app = app_for(base);

        app.set_query("spicy indian");
        app.search().await;

        let shown = cards(&app);
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[0].title, "Chana Masala");
        assert_eq!(shown[1].region, "Global");
        assert_eq!(status(&app), "Found 3 Recipes");
        assert!(matches!(
            app.state().element(ids::SEARCH),
            Some(UiElement::Button { disabled: false, text, .. }) if text == "Search"
        ));
    }

    #[tokio::test]
    async fn test_blank_query_does_nothing() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.set_query("   ");
        app.search().await;
        assert_eq!(status(&app), MSG_READY);
    }

    #[tokio::test]
    async fn test_search_failure_reports_backend() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.set_query("keto");
        app.search().await;
        assert_eq!(status(&app), MSG_SEARCH_FAILED);
    }

    #[test]
    fn test_filters_hide_cards() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.show_results(vec![recipe("lean", 30.0, 400.0), recipe("light", 5.0, 150.0)]);

        app.set_min_protein(20.0);
        assert_eq!(cards(&app).len(), 1);
        assert_eq!(status(&app), "Found 2 Recipes (1 shown)");

        app.set_max_calories(300.0);
        assert!(cards(&app).is_empty());
        assert_eq!(status(&app), MSG_FILTERED_OUT);

        app.generate_plan();
        assert_eq!(status(&app), MSG_FILTERED_OUT);
        assert!(plan_days(&app).is_empty());
    }

    #[test]
    fn test_generate_plan_requires_results() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.generate_plan();
        assert_eq!(status(&app), MSG_NEED_RECIPES);
    }

    #[test]
    fn test_generate_plan_fills_grid() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.show_results(vec![
            recipe("dal", 18.0, 320.0),
            recipe("chicken", 42.0, 510.0),
        ]);
        app.set_days(4.0);
        app.set_meals_per_day(MealsPerDay::Two);
        app.set_focus("High Protein");

        app.generate_plan();

        let days = plan_days(&app);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].label, "Monday");
        assert_eq!(days[0].meals[0].meal, "Lunch");
        assert_eq!(days[0].meals[0].title, "chicken");
        assert_eq!(days[0].meals[1].title, "dal");
        assert_eq!(status(&app), "Generated a 4-day plan.");
        assert!(matches!(
            app.state().element(ids::MEALS_THREE),
            Some(UiElement::Radio { checked: false, .. })
        ));
    }

    #[test]
    fn test_days_are_clamped() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.set_days(40.0);
        assert!(matches!(
            app.state().element(ids::PLAN_DAYS),
            Some(UiElement::NumberInput { value, .. }) if value == MAX_DAYS as f64
        ));
        app.set_days(-3.0);
        assert!(matches!(
            app.state().element(ids::PLAN_DAYS),
            Some(UiElement::NumberInput { value, .. }) if value == 1.0
        ));
    }

    #[test]
    fn test_new_results_drop_old_plan() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.show_results(vec![recipe("dal", 18.0, 320.0)]);
        app.generate_plan();
        assert!(!plan_days(&app).is_empty());

        app.show_results(vec![recipe("tofu", 24.0, 280.0)]);
        assert!(plan_days(&app).is_empty());
    }

    #[test]
    fn test_detail_modal_opens_and_closes() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.show_results(vec![recipe("dal", 18.0, 320.0)]);

        app.open_detail(0);
        match app.state().element(ids::DETAIL) {
            Some(UiElement::Modal { open, title, rows, .. }) => {
                assert!(open);
                assert_eq!(title, "dal");
                assert_eq!(rows[1].value, "320 kcal");
            }
            other => panic!("unexpected detail element {:?}", other),
        }

        app.open_detail(7);
        app.close_detail();
        assert!(matches!(
            app.state().element(ids::DETAIL),
            Some(UiElement::Modal { open: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_plan_search_builds_plan() {
        let base = start_stub(Router::new().route("/search", post(three_recipes))).await;
        let app = app_for(base);
        app.set_days(2.0);

        app.plan_search().await;

        assert_eq!(cards(&app).len(), 3);
        let days = plan_days(&app);
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].meals.len(), 3);
    }

    #[tokio::test]
    async fn test_plan_search_empty_result() {
        let router = Router::new().route("/search", post(|| async { Json(json!({"recipes": []})) }));
        let base = start_stub(router).await;
        let app = app_for(base);

        app.plan_search().await;

        assert_eq!(status(&app), MSG_NO_PLAN_RECIPES);
        assert!(plan_days(&app).is_empty());
    }

    #[test]
    fn test_clear_resets_page() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.use_example(EXAMPLE_QUERIES[0].1);
        app.show_results(vec![recipe("dal", 18.0, 320.0)]);
        app.generate_plan();

        app.clear();

        assert!(cards(&app).is_empty());
        assert!(plan_days(&app).is_empty());
        assert_eq!(status(&app), MSG_READY);
        assert!(matches!(
            app.state().element(ids::QUERY),
            Some(UiElement::Input { value, .. }) if value.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_search_with_no_matches() {
        let router = Router::new().route("/search", post(|| async { Json(json!({"recipes": []})) }));
        let base = start_stub(router).await;
        let app = app_for(base);

        app.set_query("deep fried ice");
        app.search().await;

        assert_eq!(status(&app), MSG_NO_RESULTS);
        assert!(cards(&app).is_empty());
    }

    #[tokio::test]
    async fn test_untitled_record_keeps_the_rest() {
        let (base, _) = start_recording_stub(
            json!([
                {"Recipe_title": "Dal", "Protein (g)": 18, "Calories": 320},
                {"Recipe_title": null, "Protein (g)": 6, "Calories": 150}
            ]),
            Duration::ZERO,
        )
        .await;
        let app = app_for(base);

        app.set_query("lentils");
        app.search().await;

        let shown = cards(&app);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].title, crate::recipe::UNTITLED);
        assert_eq!(status(&app), "Found 2 Recipes");
    }

    #[tokio::test]
    async fn test_top_k_slider_sets_request_size() {
        let (base, requests) = start_recording_stub(json!([]), Duration::ZERO).await;
        let app = app_for(base);

        match app.state().element(ids::TOP_K) {
            Some(UiElement::Slider {
                value,
                min,
                max,
                on_change: Some(handler),
                ..
            }) => {
                assert_eq!((value, min, max), (20.0, 5.0, 50.0));
                handler(35.0);
            }
            other => panic!("top-k slider missing: {:?}", other),
        }
        app.set_query("paneer");
        app.search().await;

        app.set_top_k(80.0);
        app.search().await;

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0]["top_k"], json!(35));
        assert_eq!(requests[1]["top_k"], json!(MAX_TOP_K));
    }

    #[tokio::test]
    async fn test_search_locks_both_buttons() {
        let (base, _) = start_recording_stub(
            json!([{"Recipe_title": "Dal", "Protein (g)": 18}]),
            Duration::from_millis(300),
        )
        .await;
        let app = app_for(base);
        app.set_query("dal");

        let running = tokio::spawn({
            let app = app.clone();
            async move { app.search().await }
        });
        wait_until("search to start", || button_state(&app, ids::SEARCH).1).await;

        assert_eq!(button_state(&app, ids::SEARCH), (SEARCHING_LABEL.to_string(), true));
        assert_eq!(
            button_state(&app, ids::PLAN_SEARCH),
            (PLAN_SEARCH_LABEL.to_string(), true)
        );

        app.plan_search().await;
        assert_eq!(status(&app), MSG_BUSY);

        running.await.unwrap();
        assert_eq!(button_state(&app, ids::SEARCH), (SEARCH_LABEL.to_string(), false));
        assert_eq!(
            button_state(&app, ids::PLAN_SEARCH),
            (PLAN_SEARCH_LABEL.to_string(), false)
        );
        assert_eq!(status(&app), "Found 1 Recipes");
    }

    #[tokio::test]
    async fn test_clear_discards_search_in_flight() {
        let (base, _) = start_recording_stub(
            json!([{"Recipe_title": "Dal", "Protein (g)": 18}]),
            Duration::from_millis(300),
        )
        .await;
        let app = app_for(base);
        app.set_query("dal");

        let running = tokio::spawn({
            let app = app.clone();
            async move { app.search().await }
        });
        wait_until("search to start", || button_state(&app, ids::SEARCH).1).await;

        app.clear();
        assert_eq!(button_state(&app, ids::SEARCH), (SEARCH_LABEL.to_string(), false));

        running.await.unwrap();
        assert!(cards(&app).is_empty());
        assert_eq!(status(&app), MSG_READY);
    }

    #[tokio::test]
    async fn test_example_button_fills_query_and_searches() {
        let (base, requests) = start_recording_stub(
            json!([{"Recipe_title": "Keto Paneer", "Protein (g)": 30}]),
            Duration::ZERO,
        )
        .await;
        let app = app_for(base);

        click(&app, ids::EXAMPLES[0]);
        wait_until("example results", || cards(&app).len() == 1).await;

        let expected = EXAMPLE_QUERIES[0].1;
        assert!(matches!(
            app.state().element(ids::QUERY),
            Some(UiElement::Input { value, .. }) if value == expected
        ));
        assert_eq!(requests.lock().unwrap()[0]["query"], json!(expected));
    }

    #[tokio::test]
    async fn test_plan_search_ignores_result_filters() {
        let (base, _) = start_recording_stub(
            json!([
                {"Recipe_title": "Dal", "Protein (g)": 18, "Calories": 320},
                {"Recipe_title": "Salad", "Protein (g)": 6, "Calories": 150}
            ]),
            Duration::ZERO,
        )
        .await;
        let app = app_for(base);
        app.set_min_protein(50.0);
        app.set_days(2.0);

        app.plan_search().await;

        assert!(cards(&app).is_empty());
        let days = plan_days(&app);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].meals.len(), 3);
        assert_eq!(status(&app), "Generated a 2-day plan.");
    }

    #[tokio::test]
    async fn test_plan_search_failure() {
        let app = app_for("http://127.0.0.1:9".to_string());
        app.plan_search().await;
        assert_eq!(status(&app), MSG_PLAN_FAILED);
        assert_eq!(
            button_state(&app, ids::PLAN_SEARCH),
            (PLAN_SEARCH_LABEL.to_string(), false)
        );
    }
}
