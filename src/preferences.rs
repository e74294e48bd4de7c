//! Deterministic diet-type, cuisine and language adjustments applied to a plan
//! on the offline path.
//!
//! Diet and cuisine adjustments are ordered rule tables. For every meal slot of
//! every day the first rule whose pattern occurs in the meal name fires, and no
//! further rule of that table is tried against the rewritten meal. The passes
//! run in a fixed order: diet type, cuisine, language.

use tracing::debug;

use crate::models::{Cuisine, DailyPlan, DietPlan, DietType, Language, Meal, MealSlot, UserPreferences};

/// Which days a rule is allowed to touch, by zero-based index in the week.
#[derive(Debug, Clone, Copy)]
pub enum DayFilter {
    Every,
    EvenIndex,
}

impl DayFilter {
    fn admits(&self, index: usize) -> bool {
        match self {
            DayFilter::Every => true,
            DayFilter::EvenIndex => index % 2 == 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TagEdit {
    Keep,
    Append(&'static str),
    Replace(&'static [&'static str]),
}

/// A fixed substitute meal. Nutrition figures are only written when the
/// target meal already carries nutritional info.
#[derive(Debug, Clone, Copy)]
pub struct MealPatch {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub tags: TagEdit,
    pub protein: Option<&'static str>,
    pub vitamin_d: Option<&'static str>,
}

impl MealPatch {
    const fn named(name: &'static str) -> Self {
        Self {
            name,
            description: None,
            tags: TagEdit::Keep,
            protein: None,
            vitamin_d: None,
        }
    }

    fn apply(&self, meal: &mut Meal) {
        meal.name = self.name.to_string();
        if let Some(description) = self.description {
            meal.description = description.to_string();
        }
        match self.tags {
            TagEdit::Keep => {}
            TagEdit::Append(tag) => meal.tags.push(tag.to_string()),
            TagEdit::Replace(tags) => meal.tags = tags.iter().map(|t| t.to_string()).collect(),
        }
        if let Some(info) = meal.nutritional_info.as_mut() {
            if let Some(protein) = self.protein {
                info.protein = protein.to_string();
            }
            if let Some(vitamin_d) = self.vitamin_d {
                info.vitamin_d = vitamin_d.to_string();
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RuleAction {
    /// Swap the whole meal for a fixed substitute.
    Replace(MealPatch),
    /// Rewrite the first occurrence of `from` in the meal name.
    Rename { from: &'static str, to: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct MealRule {
    pub slot: MealSlot,
    pub days: DayFilter,
    /// Matches when any pattern is a substring of the meal name. When empty, a
    /// `Rename` matches on its `from` text and a `Replace` matches every meal.
    pub patterns: &'static [&'static str],
    pub action: RuleAction,
}

impl MealRule {
    fn matches(&self, index: usize, meal: &Meal) -> bool {
        if !self.days.admits(index) {
            return false;
        }
        match (self.patterns, self.action) {
            ([], RuleAction::Rename { from, .. }) => meal.name.contains(from),
            ([], RuleAction::Replace(_)) => true,
            (patterns, _) => patterns.iter().any(|p| meal.name.contains(p)),
        }
    }

    fn apply(&self, meal: &mut Meal) {
        match self.action {
            RuleAction::Replace(patch) => patch.apply(meal),
            RuleAction::Rename { from, to } => meal.name = meal.name.replacen(from, to, 1),
        }
    }
}

const fn replace(slot: MealSlot, patterns: &'static [&'static str], patch: MealPatch) -> MealRule {
    MealRule {
        slot,
        days: DayFilter::Every,
        patterns,
        action: RuleAction::Replace(patch),
    }
}

const fn rename_to(slot: MealSlot, pattern: &'static [&'static str], name: &'static str) -> MealRule {
    replace(slot, pattern, MealPatch::named(name))
}

const fn rename(slot: MealSlot, from: &'static str, to: &'static str) -> MealRule {
    MealRule {
        slot,
        days: DayFilter::Every,
        patterns: &[],
        action: RuleAction::Rename { from, to },
    }
}

const CHICKEN_CURRY: MealPatch = MealPatch {
    name: "Chicken Curry (Low Oil)",
    description: Some("Lean chicken breast cooked with liver-friendly spices."),
    tags: TagEdit::Append("High Protein"),
    protein: Some("28g"),
    vitamin_d: None,
};

const EGG_CURRY: MealPatch = MealPatch {
    name: "Egg Curry",
    description: Some("Boiled eggs in tomato gravy."),
    tags: TagEdit::Keep,
    protein: Some("14g"),
    vitamin_d: None,
};

const GRILLED_FISH: MealPatch = MealPatch {
    name: "Grilled Fish",
    description: Some("Fish rich in Omega-3, good for liver and heart."),
    tags: TagEdit::Keep,
    protein: Some("24g"),
    vitamin_d: Some("200 IU"),
};

const MASALA_OMELETTE: MealPatch = MealPatch {
    name: "Masala Omelette (2 Whites, 1 Yolk)",
    description: Some("With spinach and onions for Iron boost."),
    tags: TagEdit::Replace(&["Protein", "Iron"]),
    protein: Some("14g"),
    vitamin_d: None,
};

const EGG_BHURJI: MealPatch = MealPatch {
    name: "Egg Bhurji & Chapati",
    description: Some("Scrambled eggs with liver-detox veggies like capsicum."),
    tags: TagEdit::Replace(&["Protein"]),
    protein: Some("16g"),
    vitamin_d: None,
};

const TOFU_BHURJI: MealPatch = MealPatch {
    name: "Tofu Bhurji with Spinach",
    description: Some("Crumbled tofu scrambled with spinach and turmeric. Plant protein with iron."),
    tags: TagEdit::Replace(&["Vegan", "Protein", "Iron"]),
    protein: Some("16g"),
    vitamin_d: None,
};

const NON_VEG_RULES: &[MealRule] = &[
    replace(MealSlot::Lunch, &["Paneer"], CHICKEN_CURRY),
    replace(MealSlot::Lunch, &["Soya"], EGG_CURRY),
    replace(MealSlot::Dinner, &["Tofu", "Paneer"], GRILLED_FISH),
];

const EGGETARIAN_RULES: &[MealRule] = &[
    MealRule {
        slot: MealSlot::Breakfast,
        days: DayFilter::EvenIndex,
        patterns: &[],
        action: RuleAction::Replace(MASALA_OMELETTE),
    },
    replace(MealSlot::Lunch, &["Paneer", "Soya"], EGG_BHURJI),
];

const VEGAN_RULES: &[MealRule] = &[
    replace(MealSlot::Breakfast, &["Egg", "Omelette"], TOFU_BHURJI),
    rename(MealSlot::Breakfast, "Paneer", "Tofu"),
    rename(MealSlot::Lunch, "Paneer", "Tofu"),
    rename(MealSlot::Lunch, "Curd", "Soy Curd"),
    rename(MealSlot::Dinner, "Grilled Fish / ", ""),
    rename(MealSlot::Dinner, "Paneer", "Tofu"),
];

const SOUTH_INDIAN_RULES: &[MealRule] = &[
    rename_to(MealSlot::Breakfast, &["Cheela"], "Pesarattu (Green Moong Dosa)"),
    rename_to(MealSlot::Breakfast, &["Poha"], "Lemon Sevai (Rice Noodles)"),
    rename_to(MealSlot::Breakfast, &["Paratha"], "Vegetable Uthappam"),
    rename_to(MealSlot::Breakfast, &["Oats"], "Oats Upma"),
    rename(MealSlot::Lunch, "Roti", "Rice"),
    rename_to(MealSlot::Lunch, &["Rajma"], "Black Eyed Peas (Karamani) Curry"),
    rename_to(MealSlot::Lunch, &["Khichdi"], "Pongal (Millet based)"),
    rename(MealSlot::Dinner, "Sabzi", "Poriyal"),
];

const NORTH_INDIAN_RULES: &[MealRule] = &[
    rename_to(MealSlot::Breakfast, &["Idli", "Dosa"], "Moong Dal Cheela with Mint Chutney"),
    rename_to(MealSlot::Breakfast, &["Upma"], "Vegetable Dalia"),
    rename(MealSlot::Lunch, "Sambar", "Dal Tadka"),
    rename_to(MealSlot::Lunch, &["Drumstick"], "Palak Chole"),
    rename(MealSlot::Dinner, "Thoran", "Sabzi"),
    rename_to(MealSlot::Dinner, &["Upma"], "Vegetable Dalia Khichdi"),
];

const EAST_INDIAN_RULES: &[MealRule] = &[
    rename_to(MealSlot::Breakfast, &["Poha"], "Chirer Pulao"),
    rename_to(MealSlot::Breakfast, &["Cheela"], "Moong Dal Chilla with Greens"),
    rename(MealSlot::Lunch, "Roti", "Rice"),
    rename_to(MealSlot::Lunch, &["Khichdi"], "Bhoger Khichuri"),
    rename(MealSlot::Dinner, "Sabzi", "Chorchori"),
    rename(MealSlot::Dinner, "Thoran", "Bhaja"),
];

const WEST_INDIAN_RULES: &[MealRule] = &[
    rename_to(MealSlot::Breakfast, &["Idli", "Dosa"], "Kanda Poha"),
    rename_to(MealSlot::Breakfast, &["Cheela"], "Thalipeeth"),
    rename_to(MealSlot::Lunch, &["Khichdi"], "Masale Bhaat"),
    rename(MealSlot::Lunch, "Roti", "Bhakri"),
    rename(MealSlot::Dinner, "Sabzi", "Bhaji"),
    rename(MealSlot::Dinner, "Thoran", "Bhaji"),
];

const GUJARATI_RULES: &[MealRule] = &[
    rename_to(MealSlot::Breakfast, &["Cheela"], "Methi Thepla"),
    rename_to(MealSlot::Breakfast, &["Idli"], "Khaman Dhokla"),
    rename_to(MealSlot::Breakfast, &["Poha"], "Bataka Poha"),
    rename_to(MealSlot::Lunch, &["Khichdi"], "Gujarati Khichdi with Kadhi"),
    rename(MealSlot::Lunch, "Roti", "Rotli"),
    rename(MealSlot::Dinner, "Sabzi", "Shaak"),
    rename(MealSlot::Dinner, "Thoran", "Shaak"),
];

pub fn diet_rules(diet_type: DietType) -> &'static [MealRule] {
    match diet_type {
        DietType::Veg => &[],
        DietType::NonVeg => NON_VEG_RULES,
        DietType::Eggetarian => EGGETARIAN_RULES,
        DietType::Vegan => VEGAN_RULES,
    }
}

pub fn cuisine_rules(cuisine: Cuisine) -> &'static [MealRule] {
    match cuisine {
        Cuisine::Mixed => &[],
        Cuisine::SouthIndian => SOUTH_INDIAN_RULES,
        Cuisine::NorthIndian => NORTH_INDIAN_RULES,
        Cuisine::EastIndian => EAST_INDIAN_RULES,
        Cuisine::WestIndian => WEST_INDIAN_RULES,
        Cuisine::Gujarati => GUJARATI_RULES,
    }
}

/// Applies `rules` to every day. Returns how many meal slots were rewritten.
pub fn apply_rules(plan: &mut DietPlan, rules: &[MealRule]) -> usize {
    let mut changed = 0;
    for (index, day) in plan.weekly_plan.iter_mut().enumerate() {
        changed += apply_rules_to_day(index, day, rules);
    }
    changed
}

fn apply_rules_to_day(index: usize, day: &mut DailyPlan, rules: &[MealRule]) -> usize {
    let mut changed = 0;
    for slot in MealSlot::ALL {
        let meal = day.meal_mut(slot);
        for rule in rules.iter().filter(|rule| rule.slot == slot) {
            if rule.matches(index, meal) {
                rule.apply(meal);
                changed += 1;
                break;
            }
        }
    }
    changed
}

pub fn apply_diet_type(plan: &mut DietPlan, diet_type: DietType) -> usize {
    let changed = apply_rules(plan, diet_rules(diet_type));
    debug!(%diet_type, changed, "Applied diet type rules");
    changed
}

pub fn apply_cuisine(plan: &mut DietPlan, cuisine: Cuisine) -> usize {
    let changed = apply_rules(plan, cuisine_rules(cuisine));
    debug!(%cuisine, changed, "Applied cuisine rules");
    changed
}

// --- Mock translation ---

const TAMIL: &[(&str, &str)] = &[
    ("Monday", "Thingal"), ("Tuesday", "Sevvai"), ("Wednesday", "Budhan"), ("Thursday", "Vyazhan"),
    ("Friday", "Velli"), ("Saturday", "Sani"), ("Sunday", "Nyayiru"),
    ("Breakfast", "Kaalai Unavu"), ("Lunch", "Madhiya Unavu"), ("Dinner", "Iravu Unavu"), ("Snacks", "Sitrundi"),
    ("Spinach", "Keerai"), ("Rice", "Saadham"), ("Curd", "Thayir"), ("Fish", "Meen"), ("Egg", "Muttai"),
    ("Sambar", "Sambar"), ("Rasam", "Rasam"), ("Idli", "Idli"), ("Dosa", "Dosai"),
];

const HINDI: &[(&str, &str)] = &[
    ("Monday", "Somvaar"), ("Tuesday", "Mangalvaar"), ("Wednesday", "Budhvaar"), ("Thursday", "Guruvaar"),
    ("Friday", "Shukravaar"), ("Saturday", "Shanivaar"), ("Sunday", "Ravivaar"),
    ("Breakfast", "Naashta"), ("Lunch", "Dopahar ka Khana"), ("Dinner", "Raat ka Khana"), ("Snacks", "Naashta"),
    ("Spinach", "Palak"), ("Rice", "Chawal"), ("Curd", "Dahi"), ("Fish", "Machli"), ("Egg", "Anda"),
];

const TELUGU: &[(&str, &str)] = &[
    ("Breakfast", "Alpaharam"), ("Lunch", "Madhyahna Bhojanam"), ("Dinner", "Ratri Bhojanam"),
];

const MALAYALAM: &[(&str, &str)] = &[
    ("Breakfast", "Prathal"), ("Lunch", "Ucha Bhakshanam"), ("Dinner", "Athazham"),
];

const KANNADA: &[(&str, &str)] = &[
    ("Breakfast", "Thindi"), ("Lunch", "Oota"), ("Dinner", "Oota"),
];

pub fn dictionary(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::English => &[],
        Language::Tamil => TAMIL,
        Language::Hindi => HINDI,
        Language::Telugu => TELUGU,
        Language::Malayalam => MALAYALAM,
        Language::Kannada => KANNADA,
    }
}

pub fn translate_term(language: Language, term: &str) -> Option<&'static str> {
    dictionary(language)
        .iter()
        .find(|(english, _)| *english == term)
        .map(|(_, translated)| *translated)
}

pub fn translation_marker(language: Language) -> String {
    format!(" (Translated to {language} for demo purposes)")
}

/// Appends transliterated day names, e.g. "Monday" becomes "Monday (Thingal)",
/// and marks the overview as translated. English and languages without a
/// dictionary leave the plan untouched.
pub fn apply_language(plan: &mut DietPlan, language: Language) {
    if dictionary(language).is_empty() {
        return;
    }
    for day in plan.weekly_plan.iter_mut() {
        if let Some(translated) = translate_term(language, &day.day) {
            day.day = format!("{} ({})", day.day, translated);
        }
    }
    plan.overview.push_str(&translation_marker(language));
    debug!(%language, "Applied mock translation");
}

/// Runs the diet-type, cuisine and language passes in that order.
/// Mutates `plan` in place; clone first to keep the input.
pub fn apply_preferences(plan: &mut DietPlan, prefs: &UserPreferences) {
    apply_diet_type(plan, prefs.diet_type);
    apply_cuisine(plan, prefs.cuisine);
    apply_language(plan, prefs.language);
}
