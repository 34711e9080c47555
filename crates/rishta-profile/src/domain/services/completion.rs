//! Completion Calculator
//!
//! Per-section and overall fill ratios for the profile form. Pure and cheap
//! enough to rerun after every edit.

use serde::Serialize;

use crate::domain::aggregates::{PhotoSlots, PHOTO_SLOT_COUNT};
use crate::domain::schema::SectionDefinition;
use crate::domain::value_objects::WorkingFormState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCompletion {
    pub id: String,
    pub label: String,
    pub filled: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub overall: u8,
    pub sections: Vec<SectionCompletion>,
}

impl CompletionReport {
    pub fn is_complete(&self) -> bool {
        self.overall == 100
    }

    pub fn section(&self, id: &str) -> Option<&SectionCompletion> {
        self.sections.iter().find(|section| section.id == id)
    }
}

pub struct CompletionCalculator;

impl CompletionCalculator {
    /// Compute completion for every section and overall.
    ///
    /// The photos section counts uploaded slots for its own percentage and
    /// contributes a single unit to the overall total, filled once any photo
    /// is present.
    pub fn calculate(
        sections: &[SectionDefinition],
        state: &WorkingFormState,
        photos: &PhotoSlots,
    ) -> CompletionReport {
        let mut filled_units = 0usize;
        let mut total_units = 0usize;

        let sections = sections
            .iter()
            .map(|section| {
                let (filled, total) = if section.is_photos() {
                    total_units += 1;
                    if photos.has_any() {
                        filled_units += 1;
                    }
                    (photos.uploaded(), PHOTO_SLOT_COUNT)
                } else {
                    let filled = section
                        .fields
                        .iter()
                        .filter(|field| state.is_filled(&field.name))
                        .count();
                    let total = section.fields.len();
                    filled_units += filled;
                    total_units += total;
                    (filled, total)
                };

                SectionCompletion {
                    id: section.id.clone(),
                    label: section.label.clone(),
                    filled,
                    total,
                    percent: percent(filled, total),
                }
            })
            .collect();

        CompletionReport {
            overall: percent(filled_units, total_units),
            sections,
        }
    }
}

/// `filled / total` as a whole percentage, halves rounded up; 0 when `total` is 0
pub fn percent(filled: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let filled = filled.min(total);
    let rounded = (filled * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldDefinition, FieldKind};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn text(name: &str) -> FieldDefinition {
        FieldDefinition::new(name, name, FieldKind::Text)
    }

    fn schema() -> Vec<SectionDefinition> {
        vec![
            SectionDefinition::new(
                "basic",
                "Basic",
                vec![
                    FieldDefinition::new("fullName", "Full Name", FieldKind::Text).required(),
                    FieldDefinition::new("dob", "Date of Birth", FieldKind::Date).required(),
                ],
            ),
            SectionDefinition::new("family", "Family", vec![text("fatherName"), text("motherName"), text("siblings")]),
            SectionDefinition::new("photos", "Photos", vec![]),
        ]
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_basic_section_scenario() {
        let state: WorkingFormState =
            [("fullName", json!("Asha Rao")), ("dob", json!("1995-04-12"))].into_iter().collect();
        let report = CompletionCalculator::calculate(&schema(), &state, &PhotoSlots::new());
        assert_eq!(report.section("basic").unwrap().percent, 100);
        assert_eq!(report.section("family").unwrap().percent, 0);
        // 2 of 6 units: 2 basic + 3 family + 1 photo
        assert_eq!(report.overall, 33);
    }

    #[test]
    fn test_empty_state_is_zero() {
        let report = CompletionCalculator::calculate(&schema(), &WorkingFormState::new(), &PhotoSlots::new());
        assert_eq!(report.overall, 0);
        assert!(report.sections.iter().all(|s| s.percent == 0));
    }

    #[test]
    fn test_everything_filled_is_complete() {
        let state: WorkingFormState = [
            ("fullName", json!("Asha Rao")),
            ("dob", json!("1995-04-12")),
            ("fatherName", json!("Vijay")),
            ("motherName", json!("Sunita")),
            ("siblings", json!(0)),
        ]
        .into_iter()
        .collect();
        let mut photos = PhotoSlots::new();
        photos.set_photo(1, "https://img/1.jpg").unwrap();

        let report = CompletionCalculator::calculate(&schema(), &state, &photos);
        assert!(report.is_complete());
        assert_eq!(report.section("photos").unwrap().percent, 25);
    }

    #[test]
    fn test_photo_section_counts_slots() {
        let mut photos = PhotoSlots::new();
        photos.set_photo(2, "b").unwrap();
        photos.set_photo(3, "c").unwrap();
        photos.set_photo(4, "d").unwrap();
        let report = CompletionCalculator::calculate(&schema(), &WorkingFormState::new(), &photos);
        assert_eq!(report.section("photos").unwrap().percent, 75);
        assert_eq!(report.overall, percent(1, 6));
    }

    #[test]
    fn test_false_and_zero_count_as_answers() {
        let schema = vec![SectionDefinition::new(
            "habits",
            "Habits",
            vec![
                FieldDefinition::new("smokes", "Smokes", FieldKind::Checkbox),
                FieldDefinition::new("siblings", "Siblings", FieldKind::Number),
                text("hobbies"),
                text("aboutMe"),
            ],
        )];
        let state: WorkingFormState = [
            ("smokes", json!(false)),
            ("siblings", json!(0)),
            ("hobbies", json!(["  ", ""])),
            ("aboutMe", Value::Null),
        ]
        .into_iter()
        .collect();

        let report = CompletionCalculator::calculate(&schema, &state, &PhotoSlots::new());
        assert_eq!(report.section("habits").unwrap().filled, 2);
        assert_eq!(report.overall, 50);
    }

    #[test]
    fn test_empty_section_is_zero_not_error() {
        let schema = vec![SectionDefinition::new("misc", "Misc", vec![])];
        let report = CompletionCalculator::calculate(&schema, &WorkingFormState::new(), &PhotoSlots::new());
        assert_eq!(report.section("misc").unwrap().percent, 0);
        assert_eq!(report.overall, 0);
    }

    proptest! {
        #[test]
        fn prop_filling_a_field_never_lowers_completion(
            filled in proptest::collection::vec(any::<bool>(), 5),
            pick in 0usize..5,
            with_photo in any::<bool>(),
        ) {
            let names = ["fullName", "dob", "fatherName", "motherName", "siblings"];
            let mut state: WorkingFormState = names
                .iter()
                .zip(&filled)
                .filter(|(_, filled)| **filled)
                .map(|(name, _)| (*name, json!("x")))
                .collect();
            let mut photos = PhotoSlots::new();
            if with_photo {
                photos.set_photo(3, "c").unwrap();
            }

            let before = CompletionCalculator::calculate(&schema(), &state, &photos).overall;
            state.set(names[pick], json!("filled"));
            let after = CompletionCalculator::calculate(&schema(), &state, &photos).overall;
            prop_assert!(after >= before);
        }
    }
}
