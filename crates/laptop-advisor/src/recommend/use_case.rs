use super::constraints::ConstraintSet;

/// Preset constraints for a named use case, or `None` for an unknown name.
pub fn preset(use_case: &str) -> Option<ConstraintSet> {
    let text = |value: &str| Some(value.to_string());
    let preset = match use_case.trim().to_lowercase().as_str() {
        "gaming" => ConstraintSet {
            processor_type: text("intel"),
            min_memory: text("16gb"),
            ..ConstraintSet::default()
        },
        "business" => ConstraintSet {
            brand: text("lenovo"),
            min_rating: Some(4.0),
            ..ConstraintSet::default()
        },
        "student" => ConstraintSet {
            max_price: Some(1000.0),
            min_rating: Some(3.5),
            ..ConstraintSet::default()
        },
        "creative" => ConstraintSet {
            min_memory: text("16gb"),
            storage_type: text("ssd"),
            ..ConstraintSet::default()
        },
        "portable" => ConstraintSet::with_brand("lenovo"),
        _ => return None,
    };
    Some(preset)
}
