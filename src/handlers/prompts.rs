//! Fixed instructions sent to the vision model, one per use case.

pub const PANTRY_PROMPT: &str = r#"From this pantry image, identify all usable ingredients and generate multiple recipes. Each recipe should use the ingredients that are likely to spoil first. For each recipe, break it down into clear and detailed steps, including exact measurements, cooking methods and timing. Return the result as a valid JSON object shaped like this:

{
  "Recipe Name 1": {
    "Step 1": "instruction...",
    "Step 2": "instruction..."
  },
  "Recipe Name 2": {
    "Step 1": "instruction...",
    "Step 2": "instruction..."
  }
}

Do not include any explanation or extra text, only the JSON object."#;

pub const FRESHNESS_PROMPT: &str = r#"From this image, identify all visible perishable food items and estimate how many whole days each one has left before it spoils. Return a valid JSON object keyed by ingredient name, shaped like this:

{
  "Ingredient Name": {
    "days_left": 3,
    "confidence": 80,
    "observation": "short note on what you see (color, texture, packaging)"
  }
}

"days_left" must be an integer (use 0 or a negative number if the item has already spoiled). "confidence" is a number from 0 to 100. Do not include any explanation or extra text, only the JSON object."#;

pub const ATTRACTION_PROMPT: &str = r#"Analyze this image and identify if it shows a known tourist attraction.
If it is a tourist attraction, provide the following details as a JSON object:
{
    "name": "Official name of the attraction",
    "location": "City and country where it is located",
    "type": "Type of attraction (e.g. historical site, museum, natural wonder)",
    "year_built": "When it was built or discovered",
    "historical_significance": "Brief history and why it is significant",
    "architectural_style": "If applicable, the architectural style",
    "interesting_facts": ["Array", "of", "interesting", "facts"],
    "recognition": "Any UNESCO or other recognition it has received",
    "visitor_information": "Typical visitor numbers or best times to visit"
}

If the image does not contain a recognizable tourist attraction, return exactly:
{
    "error": "No recognized tourist attraction in the image"
}"#;
