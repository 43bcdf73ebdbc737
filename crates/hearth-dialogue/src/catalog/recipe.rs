//! Generic cooking schema.

use crate::schema::{FieldSpec, GracePolicy, Rule, Schema};

const BRIEF: &str = "You are a professional chef who writes clear home recipes. \
Create one recipe that fits the cook's answers, never using an ingredient they \
asked to avoid. Reply with a single JSON object with the keys: recipe_name, \
description, servings, total_time, ingredients (list of {name, quantity}), \
equipment, steps (list of strings), tips.";

/// Strips leading "include"/"with"/... so only the ingredient list remains.
const INCLUDE_PREFIX: &str = r"^\s*(?:(?:include|including|with|using|use|add)\s+)+(.+?)\s*$";
const AVOID_PREFIX: &str =
    r"^\s*(?:(?:avoid|avoiding|without|no|exclude|excluding|skip)\s+)+(.+?)\s*$";

pub fn recipe_schema() -> Schema {
    let fields = vec![
        FieldSpec::new(
            "experience",
            "What is your cooking experience? (beginner, intermediate, expert)",
            "beginner",
        )
        .rule(Rule::keywords(
            &["beginner", "novice", "newbie", "first time", "new to"],
            "beginner",
        ))
        .rule(Rule::keywords(
            &["intermediate", "some experience", "home cook"],
            "intermediate",
        ))
        .rule(Rule::keywords(
            &["expert", "advanced", "professional", "experienced", "chef"],
            "expert",
        )),
        FieldSpec::new(
            "dish_type",
            "What type of dish are you making? (starter, main, dessert, snack)",
            "main course",
        )
        .rule(Rule::keywords(&["starter", "appetizer", "antipasto"], "starter"))
        .rule(Rule::keywords(
            &["main", "main course", "entree", "dinner", "lunch"],
            "main course",
        ))
        .rule(Rule::keywords(&["dessert", "pudding", "cake", "sweet"], "dessert"))
        .rule(Rule::keywords(&["snack", "finger food"], "snack"))
        .rule(Rule::keywords(&["side", "side dish"], "side dish"))
        .rule(Rule::keywords(&["soup", "stew"], "soup"))
        .rule(Rule::keywords(&["salad"], "salad"))
        .rule(Rule::keywords(&["breakfast", "brunch"], "breakfast")),
        FieldSpec::new(
            "cuisine",
            "What cuisine style would you like? (Italian, Indian, Mexican…)",
            "any",
        )
        .rule(Rule::keywords(&["italian"], "Italian"))
        .rule(Rule::keywords(&["indian"], "Indian"))
        .rule(Rule::keywords(&["mexican"], "Mexican"))
        .rule(Rule::keywords(&["chinese"], "Chinese"))
        .rule(Rule::keywords(&["japanese"], "Japanese"))
        .rule(Rule::keywords(&["thai"], "Thai"))
        .rule(Rule::keywords(&["french"], "French"))
        .rule(Rule::keywords(&["greek"], "Greek"))
        .rule(Rule::keywords(&["spanish"], "Spanish"))
        .rule(Rule::keywords(&["korean"], "Korean"))
        .rule(Rule::keywords(&["middle eastern", "lebanese"], "Middle Eastern"))
        .rule(Rule::keywords(&["mediterranean"], "Mediterranean"))
        .rule(Rule::keywords(&["any", "surprise me", "anything"], "any")),
        FieldSpec::new(
            "include_ingredients",
            "Any ingredients you'd like me to include?",
            "chef's choice",
        )
        .rule(Rule::pattern(INCLUDE_PREFIX, "{1}"))
        .cue(r"\b(?:include|including|using|add)\s+([^,.;]+)"),
        FieldSpec::new(
            "avoid_ingredients",
            "Any ingredients you'd like me to avoid?",
            "none",
        )
        .rule(Rule::pattern(AVOID_PREFIX, "{1}"))
        .cue(r"\b(?:avoid|avoiding|without|exclude|excluding|allergic to)\s+([^,.;]+)"),
        FieldSpec::new(
            "equipment",
            "What cooking equipment do you have? (oven, stove, grill…)",
            "oven, stovetop",
        )
        .many()
        .rule(Rule::keywords(&["oven"], "oven"))
        .rule(Rule::keywords(
            &["stovetop", "stove", "hob", "cooktop"],
            "stovetop",
        ))
        .rule(Rule::keywords(&["grill", "bbq", "barbecue"], "grill"))
        .rule(Rule::keywords(&["microwave"], "microwave"))
        .rule(Rule::keywords(&["air fryer", "airfryer"], "air fryer"))
        .rule(Rule::keywords(&["slow cooker", "crockpot", "crock pot"], "slow cooker"))
        .rule(Rule::keywords(
            &["pressure cooker", "instant pot", "instapot"],
            "pressure cooker",
        ))
        .rule(Rule::keywords(&["blender", "food processor"], "blender")),
        FieldSpec::new(
            "time_available",
            "How much time do you have for cooking? (30 min, 1h, 2h+)",
            "1h",
        )
        .rule(Rule::pattern(r"(\d{1,2})\s*(?:h|hr|hrs|hour|hours)\b", "{1}h"))
        .rule(Rule::pattern(r"(\d{1,3})\s*(?:min|mins|minutes)\b", "{1} min"))
        .rule(Rule::keywords(&["half an hour", "quick", "fast"], "30 min"))
        .rule(Rule::keywords(&["an hour", "one hour"], "1h"))
        .rule(Rule::keywords(
            &["plenty of time", "all day", "no rush", "all afternoon"],
            "plenty of time",
        )),
        FieldSpec::new("servings", "How many servings do you need?", "2")
            .rule(Rule::pattern(r"^\s*(\d{1,3})\s*$", "{1}"))
            .rule(Rule::pattern(
                r"(\d{1,3})\s*(?:servings?|people|persons|portions|guests|adults)\b",
                "{1}",
            ))
            .rule(Rule::pattern(r"\b(?:serves|feeds)\s+(\d{1,3})\b", "{1}"))
            .rule(Rule::keywords(&["just me", "myself", "one person"], "1"))
            .rule(Rule::keywords(&["couple", "two of us", "for two"], "2"))
            .rule(Rule::keywords(&["family"], "4")),
        FieldSpec::new(
            "dietary",
            "Any dietary preferences? (vegetarian, vegan, keto, gluten-free)",
            "none",
        )
        .rule(Rule::keywords(&["vegan", "plant-based", "plant based"], "vegan"))
        .rule(Rule::keywords(&["vegetarian", "veggie"], "vegetarian"))
        .rule(Rule::keywords(&["pescatarian"], "pescatarian"))
        .rule(Rule::keywords(&["keto", "ketogenic"], "keto"))
        .rule(Rule::keywords(&["low-carb", "low carb"], "low-carb"))
        .rule(Rule::keywords(
            &["gluten-free", "gluten free", "celiac", "coeliac"],
            "gluten-free",
        ))
        .rule(Rule::keywords(
            &["dairy-free", "dairy free", "lactose"],
            "dairy-free",
        ))
        .rule(Rule::keywords(&["halal"], "halal"))
        .rule(Rule::keywords(&["kosher"], "kosher"))
        .rule(Rule::keywords(
            &["none", "no restrictions", "no preferences", "anything goes"],
            "none",
        )),
        FieldSpec::new(
            "special_goal",
            "Do you have any special goals? (healthy, gourmet, quick, special occasion)",
            "none",
        )
        .optional()
        .rule(Rule::keywords(
            &["healthy", "light", "low calorie", "low-calorie"],
            "healthy",
        ))
        .rule(Rule::keywords(
            &["gourmet", "fancy", "impress", "restaurant"],
            "gourmet",
        ))
        .rule(Rule::keywords(&["quick and easy", "easy", "simple"], "quick and easy"))
        .rule(Rule::keywords(
            &["special occasion", "party", "birthday", "anniversary", "date night", "holiday"],
            "special occasion",
        ))
        .rule(Rule::keywords(&["budget", "cheap", "budget-friendly"], "budget-friendly")),
        FieldSpec::new(
            "format",
            "How would you like the recipe format? (step-by-step, compact, mixed)",
            "step-by-step",
        )
        .rule(Rule::keywords(
            &["step-by-step", "step by step", "detailed"],
            "step-by-step",
        ))
        .rule(Rule::keywords(&["compact", "schematic", "concise"], "compact"))
        .rule(Rule::keywords(&["mixed", "both"], "mixed")),
    ];

    Schema::new("recipe", "recipe", fields, BRIEF)
        .expect("built-in recipe schema is well formed")
        .with_grace(GracePolicy::new(Some(2)))
}
