//! Bread-making schema.

use crate::schema::{FieldSpec, GracePolicy, Rule, Schema};

const BRIEF: &str = "You are an experienced artisan baker who teaches home bakers. \
Write a complete home bread recipe tailored to the baker's answers. \
When the equipment includes the Tentazione Max oven, give settings for it. \
Reply with a single JSON object with the keys: title, summary, ingredients \
(list of {name, quantity, baker_percentage}), equipment, schedule \
(list of {step, duration, temperature}), instructions (list of strings), tips.";

pub fn bread_schema() -> Schema {
    let fields = vec![
        FieldSpec::new(
            "experience",
            "What is your baking experience? (beginner, intermediate, expert)",
            "beginner",
        )
        .rule(Rule::keywords(
            &["beginner", "novice", "newbie", "first time", "never baked", "new to"],
            "beginner",
        ))
        .rule(Rule::keywords(
            &["intermediate", "some experience", "occasionally", "home baker"],
            "intermediate",
        ))
        .rule(Rule::keywords(
            &["expert", "advanced", "professional", "experienced", "pro"],
            "expert",
        )),
        FieldSpec::new(
            "bread_type",
            "What type of bread would you like? (rustic, whole wheat, baguette, focaccia, sandwich loaf, rolls, etc.)",
            "rustic",
        )
        .rule(Rule::keywords(&["focaccia"], "focaccia"))
        .rule(Rule::keywords(&["baguette", "baguettes", "french stick"], "baguette"))
        .rule(Rule::keywords(&["ciabatta"], "ciabatta"))
        .rule(Rule::keywords(&["rolls", "buns", "dinner rolls"], "rolls"))
        .rule(Rule::keywords(&["sandwich", "pan bread", "tin loaf"], "sandwich loaf"))
        .rule(Rule::keywords(&["rye", "pumpernickel"], "rye"))
        .rule(Rule::keywords(&["sourdough"], "sourdough"))
        .rule(Rule::keywords(&["rustic", "country", "boule", "pagnotta"], "rustic"))
        .rule(Rule::keywords(
            &["whole wheat", "wholemeal", "whole grain", "wholegrain"],
            "whole wheat",
        )),
        FieldSpec::new(
            "flours",
            "What flours do you have available? (all-purpose/00, bread/0, whole wheat, manitoba, multigrain, mixes)",
            "all-purpose/00",
        )
        .many()
        .rule(Rule::keywords(
            &["all-purpose", "all purpose", "00", "plain flour", "ap flour"],
            "all-purpose/00",
        ))
        .rule(Rule::keywords(
            &["bread/0", "bread flour", "type 0", "strong flour"],
            "bread/0",
        ))
        .rule(Rule::keywords(
            &["whole wheat", "wholemeal", "whole grain", "wholegrain", "integrale"],
            "whole wheat",
        ))
        .rule(Rule::keywords(&["manitoba"], "manitoba"))
        .rule(Rule::keywords(&["multigrain", "multi-grain"], "multigrain"))
        .rule(Rule::keywords(&["rye"], "rye"))
        .rule(Rule::keywords(&["spelt"], "spelt"))
        .rule(Rule::keywords(&["semolina"], "semolina"))
        .rule(Rule::keywords(&["mix", "mixes", "blend"], "flour mix")),
        FieldSpec::new(
            "leavening",
            "What type of yeast/leavening will you use? (fresh yeast, dry yeast, sourdough starter, liquid starter, none)",
            "dry yeast",
        )
        .rule(Rule::keywords(
            &["no yeast", "unleavened", "without yeast", "no leavening"],
            "none",
        ))
        .rule(Rule::keywords(
            &["fresh yeast", "cake yeast", "compressed yeast"],
            "fresh yeast",
        ))
        .rule(Rule::keywords(
            &["dry yeast", "dried yeast", "instant yeast", "active dry", "yeast"],
            "dry yeast",
        ))
        .rule(Rule::keywords(
            &["liquid starter", "liquid levain", "liquid"],
            "liquid starter",
        ))
        .rule(Rule::keywords(
            &["sourdough", "starter", "levain", "lievito madre", "mother dough"],
            "sourdough starter",
        )),
        FieldSpec::new(
            "equipment",
            "What equipment do you have? (hand kneading, stand mixer, static oven, convection oven, baking stone, Dutch oven, etc.)",
            "static oven",
        )
        .many()
        .rule(Rule::keywords(
            &["hand kneading", "by hand", "knead by hand", "hands"],
            "hand kneading",
        ))
        .rule(Rule::keywords(
            &["stand mixer", "mixer", "kitchenaid", "kitchen aid"],
            "stand mixer",
        ))
        .rule(Rule::keywords(
            &["static oven", "conventional oven", "electric oven", "gas oven"],
            "static oven",
        ))
        .rule(Rule::keywords(
            &["convection", "fan oven", "fan-assisted"],
            "convection oven",
        ))
        .rule(Rule::keywords(
            &["baking stone", "pizza stone", "baking steel", "stone"],
            "baking stone",
        ))
        .rule(Rule::keywords(
            &["dutch oven", "cast iron pot", "cocotte"],
            "dutch oven",
        ))
        .rule(Rule::keywords(&["bread machine"], "bread machine"))
        .rule(Rule::keywords(&["tentazione"], "Tentazione Max oven")),
        FieldSpec::new(
            "fermentation_time",
            "How much total fermentation/proofing time do you have? (a few hours, 12h, 24h, 48h)",
            "12h",
        )
        .rule(Rule::pattern(r"(\d{1,3})\s*(?:h|hr|hrs|hour|hours)\b", "{1}h"))
        .rule(Rule::keywords(
            &["few hours", "couple of hours", "same day", "quick"],
            "a few hours",
        ))
        .rule(Rule::keywords(&["overnight"], "12h"))
        .rule(Rule::keywords(&["one day", "a day", "1 day", "full day"], "24h"))
        .rule(Rule::keywords(&["two days", "2 days", "weekend"], "48h")),
        FieldSpec::new(
            "room_temperature",
            "What's the approximate room temperature (°C or °F) if known?",
            "20°C",
        )
        .rule(Rule::pattern(
            r"(-?\d{1,3})\s*(?:°|º|degrees?)?\s*(?:c|celsius)\b",
            "{1}°C",
        ))
        .rule(Rule::pattern(
            r"(-?\d{1,3})\s*(?:°|º|degrees?)?\s*(?:f|fahrenheit)\b",
            "{1}°F",
        ))
        .rule(Rule::pattern(r"^\s*(\d{1,2})\s*$", "{1}°C"))
        .rule(Rule::keywords(&["cold kitchen", "cool kitchen"], "18°C"))
        .rule(Rule::keywords(&["warm kitchen", "hot kitchen"], "26°C")),
        FieldSpec::new(
            "final_amount",
            "Desired final amount (total weight or number of loaves/rolls)?",
            "1 loaf",
        )
        .rule(Rule::pattern(r"\b(?:1|one|a|single)\s+loaf\b", "1 loaf"))
        .rule(Rule::pattern(r"(\d{1,3})\s*loa(?:f|ves)\b", "{1} loaves"))
        .rule(Rule::keywords(&["two loaves"], "2 loaves"))
        .rule(Rule::keywords(&["three loaves"], "3 loaves"))
        .rule(Rule::pattern(r"(\d{1,3})\s*(?:rolls|buns|pieces)\b", "{1} rolls"))
        .rule(Rule::pattern(
            r"(\d{1,2}(?:[.,]\d{1,2})?)\s*(?:kg|kilos?|kilograms?)\b",
            "{1} kg",
        ))
        .rule(Rule::pattern(r"(\d{2,5})\s*(?:g|gr|grams?)\b", "{1} g")),
        FieldSpec::new("dietary", "Any dietary restrictions or preferences?", "none")
            .rule(Rule::keywords(&["vegan", "plant-based", "plant based"], "vegan"))
            .rule(Rule::keywords(&["vegetarian"], "vegetarian"))
            .rule(Rule::keywords(
                &["gluten-free", "gluten free", "celiac", "coeliac", "no gluten"],
                "gluten-free",
            ))
            .rule(Rule::keywords(
                &["low-salt", "low salt", "low sodium", "no salt"],
                "low-salt",
            ))
            .rule(Rule::keywords(
                &["dairy-free", "dairy free", "lactose", "no dairy"],
                "dairy-free",
            ))
            .rule(Rule::keywords(
                &["none", "no restrictions", "no preferences", "nothing special"],
                "none",
            )),
        FieldSpec::new(
            "format",
            "Which recipe format would you like? (step-by-step detailed, compact and schematic, mixed)",
            "step-by-step detailed",
        )
        .rule(Rule::keywords(
            &["step-by-step", "step by step", "detailed"],
            "step-by-step detailed",
        ))
        .rule(Rule::keywords(&["compact", "schematic", "concise"], "compact and schematic"))
        .rule(Rule::keywords(&["mixed", "both"], "mixed")),
    ];

    Schema::new("bread", "bread", fields, BRIEF)
        .expect("built-in bread schema is well formed")
        .with_grace(GracePolicy::new(Some(2)))
}
