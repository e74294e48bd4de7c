//! Reference report and meal plan used whenever the AI path is unavailable or
//! returns unusable data.
//!
//! Both values are built once per process and never handed out by reference:
//! [`fallback_plan`] and [`fallback_report`] return owned deep copies so callers
//! can mutate freely.

use std::sync::LazyLock;

use crate::models::{
    Biomarker, BiomarkerCategory, BiomarkerStatus, DailyPlan, DietPlan, Meal, NutritionalInfo,
    ReportDocument, ShoppingItem,
};

static FALLBACK_PLAN: LazyLock<DietPlan> = LazyLock::new(build_plan);
static FALLBACK_REPORT: LazyLock<ReportDocument> = LazyLock::new(build_report);

pub const FALLBACK_OVERVIEW: &str = "This 7-day personalized plan focuses on correcting Anemia (Iron/Hb) and supporting Liver function (elevated GGT/SGOT). We've included iron-rich foods (Leafy greens, dates) paired with Vitamin C for absorption, and liver-friendly antioxidants while ensuring adequate Vitamin D intake.";

pub fn fallback_plan() -> DietPlan {
    FALLBACK_PLAN.clone()
}

pub fn fallback_report() -> ReportDocument {
    FALLBACK_REPORT.clone()
}

fn meal(name: &str, description: &str, tags: &[&str], nutrition: [&str; 4]) -> Meal {
    let [protein, fiber, iron, vitamin_d] = nutrition;
    Meal {
        name: name.to_string(),
        description: description.to_string(),
        calories: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        nutritional_info: Some(NutritionalInfo {
            protein: protein.to_string(),
            fiber: fiber.to_string(),
            iron: iron.to_string(),
            vitamin_d: vitamin_d.to_string(),
        }),
    }
}

fn day(day: &str, focus: &str, breakfast: Meal, lunch: Meal, dinner: Meal, snack: Meal) -> DailyPlan {
    DailyPlan {
        day: day.to_string(),
        focus: focus.to_string(),
        breakfast,
        lunch,
        dinner,
        snacks: vec![snack],
    }
}

fn build_plan() -> DietPlan {
    let weekly_plan = vec![
        day(
            "Monday",
            "Liver Detox & Iron Boost",
            meal("Spinach & Moong Dal Cheela", "Green gram pancakes with spinach (Iron) and ginger (Liver support).", &["Iron Rich", "Liver Friendly"], ["14g", "8g", "4.5mg", "0 IU"]),
            meal("Brown Rice with Methi Dal", "Fenugreek leaves (Iron/Calcium) cooked with lentils. Served with curd.", &["High Fiber", "Calcium"], ["12g", "9g", "3.8mg", "2 IU"]),
            meal("Grilled Fish / Tofu Tikka", "Lean protein with minimal oil. Avoids deep frying to protect liver.", &["Protein", "Light"], ["22g", "2g", "1.5mg", "120 IU"]),
            meal("Citrus Fruit Salad", "Orange and pomegranate to boost Iron absorption.", &["Vitamin C"], ["2g", "4g", "0.8mg", "0 IU"]),
        ),
        day(
            "Tuesday",
            "Vitamin D & Calcium",
            meal("Ragi Malt (Porridge)", "Finger millet porridge made with milk/buttermilk. High in Calcium.", &["Calcium", "Bone Health"], ["8g", "6g", "2.1mg", "40 IU"]),
            meal("Mushroom Matar Masala", "Mushrooms (Vitamin D) and peas with roti. Less oil.", &["Vitamin D", "Veg"], ["10g", "7g", "2.5mg", "15 IU"]),
            meal("Papaya & Sprout Salad", "Light dinner to ease liver load. Papaya contains digestive enzymes.", &["Digestion", "Light"], ["9g", "5g", "1.2mg", "0 IU"]),
            meal("Fortified Milk + Walnuts", "Omega-3s for liver inflammation.", &["Omega-3"], ["8g", "2g", "0.5mg", "100 IU"]),
        ),
        day(
            "Wednesday",
            "Hemoglobin Builder",
            meal("Poha with Peanuts & Lemon", "Flattened rice with veggies. Lemon juice (Vit C) is crucial for Iron.", &["Iron Absorption"], ["6g", "3g", "2.8mg", "0 IU"]),
            meal("Amaranth (Rajgira) Roti & Curd", "Amaranth is a superfood for Iron and Calcium.", &["Superfood", "Iron"], ["11g", "8g", "5.2mg", "5 IU"]),
            meal("Bottle Gourd (Lauki) Sabzi", "Easy to digest, excellent for liver recovery.", &["Liver Support", "Hydrating"], ["4g", "5g", "1.0mg", "0 IU"]),
            meal("Dates & Pumpkin Seeds", "Iron powerhouse snack.", &["Iron", "Zinc"], ["5g", "3g", "3.5mg", "0 IU"]),
        ),
        day(
            "Thursday",
            "Liver Recovery",
            meal("Oats with Berries", "Antioxidant-rich breakfast to reduce oxidative stress on the liver.", &["Antioxidants"], ["6g", "5g", "1.8mg", "0 IU"]),
            meal("Khichdi with Mixed Veggies", "Comfort food. Easy to digest, complete protein profile.", &["Gut Health"], ["10g", "4g", "2.2mg", "0 IU"]),
            meal("Beetroot Thoran", "South Indian style beetroot stir fry. Beetroot supports liver detox.", &["Detox", "Fiber"], ["3g", "4g", "1.9mg", "0 IU"]),
            meal("Roasted Makhana", "Low fat, high mineral snack.", &["Light"], ["3g", "1g", "0.5mg", "0 IU"]),
        ),
        day(
            "Friday",
            "Energy & Vitality",
            meal("Besan Chilla with Paneer", "Gram flour pancakes with grated cottage cheese (Calcium).", &["Protein", "Calcium"], ["18g", "6g", "3.2mg", "10 IU"]),
            meal("Soya Chunk Curry & Rice", "Soya is good for liver and provides protein.", &["Protein"], ["24g", "7g", "6.0mg", "0 IU"]),
            meal("Clear Vegetable Soup", "Broccoli, carrots, and beans. Light and vitamin-rich.", &["Vitamin D"], ["3g", "3g", "1.1mg", "0 IU"]),
            meal("Guava", "Highest Vitamin C content to help Iron absorption.", &["Immunity"], ["2g", "5g", "0.3mg", "0 IU"]),
        ),
        day(
            "Saturday",
            "Gut-Liver Axis",
            meal("Idli with Sambar", "Fermented food (Idli) is good for gut health.", &["Probiotic"], ["8g", "4g", "1.5mg", "0 IU"]),
            meal("Drumstick (Moringa) Curry", "Moringa leaves/pods are incredibly rich in Iron and Calcium.", &["Superfood", "Iron"], ["8g", "6g", "4.8mg", "0 IU"]),
            meal("Quinoa Upma", "Lighter grain alternative to wheat.", &["Gluten Free"], ["8g", "5g", "2.8mg", "0 IU"]),
            meal("Buttermilk with Jeera", "Cooling and digestive.", &["Probiotic"], ["4g", "0g", "0.1mg", "20 IU"]),
        ),
        day(
            "Sunday",
            "Rest & Repair",
            meal("Egg White Omelette / Paneer Bhurji", "High biological value protein. Skip yolks if cholesterol is concern (though yours is normal).", &["Protein"], ["20g", "1g", "1.2mg", "15 IU"]),
            meal("Lemon Rice & Chickpeas", "Iron-rich chickpeas with Vitamin C rich lemon rice.", &["Iron Combo"], ["14g", "9g", "4.5mg", "0 IU"]),
            meal("Pumpkin Soup & Toast", "Pumpkin is rich in Vitamin A and easy on the liver.", &["Light"], ["4g", "3g", "0.8mg", "0 IU"]),
            meal("Almonds (Soaked)", "Easier to digest.", &["Healthy Fats"], ["6g", "3g", "1.0mg", "0 IU"]),
        ),
    ];

    let shopping_list = [
        ("Spinach (Palak)", "Vegetables"),
        ("Beetroot", "Vegetables"),
        ("Drumstick / Moringa", "Vegetables"),
        ("Dates", "Dry Fruits"),
        ("Walnuts", "Dry Fruits"),
        ("Ragi Flour", "Grains"),
        ("Citrus Fruits (Orange/Lemon)", "Fruits"),
    ]
    .into_iter()
    .map(|(item, category)| ShoppingItem {
        item: item.to_string(),
        category: category.to_string(),
    })
    .collect();

    DietPlan {
        overview: FALLBACK_OVERVIEW.to_string(),
        weekly_plan,
        shopping_list,
    }
}

fn biomarker(
    name: &str,
    value: f64,
    unit: &str,
    range: &str,
    status: BiomarkerStatus,
    category: BiomarkerCategory,
    explanation: &str,
) -> Biomarker {
    Biomarker {
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        range: range.to_string(),
        status,
        category,
        explanation: explanation.to_string(),
    }
}

fn build_report() -> ReportDocument {
    use BiomarkerCategory::*;
    use BiomarkerStatus::*;

    ReportDocument {
        patient_name: "Mr K Ramesh (39Y/M)".to_string(),
        date: "14 Sep, 2025".to_string(),
        lab_name: "Thyrocare Technologies".to_string(),
        risk_score: 58.0,
        summary: "DEMO MODE: Report indicates Anemia (Low Iron/Hb), Vitamin D deficiency, and elevated Liver Enzymes.".to_string(),
        biomarkers: vec![
            biomarker("HbA1c", 4.5, "%", "< 5.7", Normal, Glycemic, "Long-term blood sugar is within excellent range."),
            biomarker("Avg Blood Glucose", 82.0, "mg/dL", "90 - 120", Low, Glycemic, "Slightly lower than average estimated glucose."),
            biomarker("Total Cholesterol", 96.0, "mg/dL", "< 200", Normal, Lipid, "Total cholesterol is well within range."),
            biomarker("Vitamin B-12", 1631.0, "pg/mL", "197 - 771", CriticalHigh, Vitamin, "Significantly elevated B12 levels."),
            biomarker("25-OH Vitamin D", 23.1, "ng/mL", "30 - 100", Low, Vitamin, "Indicates Vitamin D insufficiency/deficiency."),
            biomarker("GGT", 68.91, "U/L", "< 55", High, Liver, "Elevated GGT suggests liver stress or bile duct issues."),
            biomarker("Hemoglobin", 12.5, "g/dL", "13.0 - 17.0", Low, Other, "Below normal range for adult male, indicating mild anemia."),
        ],
    }
}
