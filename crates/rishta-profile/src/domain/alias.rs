//! Field Alias Resolver
//!
//! Bridges human-readable schema labels to the backend's field keys.

/// Backend key of the free-text relative surnames list
pub const RELATIVE_SURNAMES_KEY: &str = "relativeSurnames";

/// Static label -> backend key table
const ALIAS_TABLE: &[(&str, &str)] = &[
    ("Full Name", "name"),
    ("Date of Birth", "dob"),
    ("Gender", "gender"),
    ("Height", "height"),
    ("Weight", "weight"),
    ("Marital Status", "maritalStatus"),
    ("Religion", "religion"),
    ("Caste", "caste"),
    ("Sub Caste", "subCaste"),
    ("Gotra", "gotra"),
    ("Manglik", "manglik"),
    ("Mother Tongue", "motherTongue"),
    ("Diet", "diet"),
    ("Highest Education", "education"),
    ("Occupation", "occupation"),
    ("Annual Income", "annualIncome"),
    ("Email", "email"),
    ("Phone Number", "phone"),
    ("City", "city"),
    ("State", "state"),
    ("Country", "country"),
    ("About Me", "aboutMe"),
    ("Father's Name", "fatherName"),
    ("Father's Occupation", "fatherOccupation"),
    ("Mother's Name", "motherName"),
    ("Mother's Occupation", "motherOccupation"),
    ("Number of Siblings", "siblings"),
    ("Family Type", "familyType"),
    ("Relative Surnames", RELATIVE_SURNAMES_KEY),
    ("Hobbies", "hobbies"),
    ("Partner Age Range", "partnerAgeRange"),
    ("Partner Religion", "partnerReligion"),
];

/// Lowercase and strip everything that is not an ASCII letter or digit
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Look up the backend key for a label. Exact match on the normalized text.
pub fn resolve_alias(label: &str) -> Option<&'static str> {
    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }
    ALIAS_TABLE
        .iter()
        .find(|(alias, _)| normalize_label(alias) == wanted)
        .map(|(_, key)| *key)
}

/// Backend key for a label, falling back to the field's own name on a miss
pub fn resolve_or<'a>(label: &str, fallback: &'a str) -> &'a str {
    resolve_alias(label).unwrap_or(fallback)
}
