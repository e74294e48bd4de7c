use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomarkerStatus {
    Normal,
    High,
    Low,
    #[serde(rename = "Critical High")]
    CriticalHigh,
    #[serde(rename = "Critical Low")]
    CriticalLow,
}

impl BiomarkerStatus {
    pub fn is_critical(&self) -> bool {
        matches!(self, BiomarkerStatus::CriticalHigh | BiomarkerStatus::CriticalLow)
    }

    pub fn needs_attention(&self) -> bool {
        !matches!(self, BiomarkerStatus::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BiomarkerStatus::Normal => "Normal",
            BiomarkerStatus::High => "High",
            BiomarkerStatus::Low => "Low",
            BiomarkerStatus::CriticalHigh => "Critical High",
            BiomarkerStatus::CriticalLow => "Critical Low",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomarkerCategory {
    Glycemic,
    Lipid,
    Thyroid,
    Vitamin,
    Liver,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Biomarker {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub range: String,
    pub status: BiomarkerStatus,
    pub category: BiomarkerCategory,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub lab_name: String,
    #[serde(default)]
    pub biomarkers: Vec<Biomarker>,
    #[serde(default)]
    pub summary: String,
    /// 0-100, where 100 is healthiest. A reply without one is rejected.
    pub risk_score: f64,
}

/// Free-form magnitudes such as "12g" or "120 IU"; never parsed numerically.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(default, deserialize_with = "magnitude")]
    pub protein: String,
    #[serde(default, deserialize_with = "magnitude")]
    pub fiber: String,
    #[serde(default, deserialize_with = "magnitude")]
    pub iron: String,
    #[serde(default, deserialize_with = "magnitude")]
    pub vitamin_d: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default, deserialize_with = "or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "or_default")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub nutritional_info: Option<NutritionalInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyPlan {
    pub day: String,
    pub focus: String,
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    pub snacks: Vec<Meal>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub item: String,
    #[serde(default, deserialize_with = "or_default")]
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub overview: String,
    pub weekly_plan: Vec<DailyPlan>,
    pub shopping_list: Vec<ShoppingItem>,
}

/// The three fixed meals of a day. Snacks are a list and handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl DailyPlan {
    pub fn meal(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn meal_mut(&mut self, slot: MealSlot) -> &mut Meal {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }
}

// --- Preferences ---

macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            // Accepts the display label in any case, with '-' '_' and ' ' treated alike.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_label(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        let options: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{}', expected one of: {}", stringify!($name), s, options.join(", "))
                    })
            }
        }
    };
}

fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

labelled_enum!(DietType {
    Veg => "Veg",
    NonVeg => "Non-Veg",
    Eggetarian => "Eggetarian",
    Vegan => "Vegan",
});

labelled_enum!(Cuisine {
    NorthIndian => "North Indian",
    SouthIndian => "South Indian",
    EastIndian => "East Indian",
    WestIndian => "West Indian",
    Gujarati => "Gujarati",
    Mixed => "Mixed",
});

labelled_enum!(Language {
    English => "English",
    Tamil => "Tamil",
    Malayalam => "Malayalam",
    Telugu => "Telugu",
    Kannada => "Kannada",
    Hindi => "Hindi",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub diet_type: DietType,
    pub cuisine: Cuisine,
    pub language: Language,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            diet_type: DietType::Veg,
            cuisine: Cuisine::Mixed,
            language: Language::English,
        }
    }
}

// --- Partial shapes returned by the AI ---
//
// Every field is optional and a wrong-typed value is read as absent, so one bad
// field never discards its siblings.

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialDailyPlan {
    #[serde(default, deserialize_with = "lenient")]
    pub day: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub focus: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub breakfast: Option<Meal>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub lunch: Option<Meal>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub dinner: Option<Meal>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub snacks: Option<Vec<Option<Meal>>>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialDietPlan {
    #[serde(default, deserialize_with = "lenient")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub weekly_plan: Option<Vec<Option<PartialDailyPlan>>>,
    /// Malformed entries are dropped; the rest of the list is kept.
    #[serde(default, deserialize_with = "lenient_list")]
    pub shopping_list: Option<Vec<ShoppingItem>>,
}

impl From<DietPlan> for PartialDietPlan {
    fn from(plan: DietPlan) -> Self {
        Self {
            overview: Some(plan.overview),
            weekly_plan: Some(
                plan.weekly_plan
                    .into_iter()
                    .map(|day| {
                        Some(PartialDailyPlan {
                            day: Some(day.day),
                            focus: Some(day.focus),
                            breakfast: Some(day.breakfast),
                            lunch: Some(day.lunch),
                            dinner: Some(day.dinner),
                            snacks: Some(day.snacks.into_iter().map(Some).collect()),
                        })
                    })
                    .collect(),
            ),
            shopping_list: Some(plan.shopping_list),
        }
    }
}

/// Reads a value as `Some(T)` when it has the expected shape, otherwise `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for struct-shaped fields. Only JSON objects are read, so
/// an array is never taken as a positional struct.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(object_or_none(Value::deserialize(deserializer)?))
}

fn object_or_none<T: DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Per-element [`lenient_object`], so one malformed entry keeps its index.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().map(object_or_none).collect())),
        _ => Ok(None),
    }
}

/// Keeps the well-formed objects of an array and drops the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(object_or_none).collect())),
        _ => Ok(None),
    }
}

/// Null or a wrong-typed value reads as the field's default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Nutrient amounts are text; a bare number is kept as its decimal form.
fn magnitude<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
