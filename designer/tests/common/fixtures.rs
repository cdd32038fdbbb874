//! Form fixtures shared by the integration tests

use shared::{Amenity, Budget, FormFieldsPatch, Priority, RoomPatch, Scenario};

pub struct TestFixtures;

impl TestFixtures {
    /// A complete set of scalar fields for a renovation project
    pub fn renovation_fields() -> FormFieldsPatch {
        FormFieldsPatch {
            scenario: Some(Scenario::HomeRenovation),
            style: Some("Craftsman".to_string()),
            budget: Some(Budget::MidRange),
            priority: Some(Priority::Function),
            square_footage: Some(Some(2200)),
            amenities: Some([Amenity::HomeOffice, Amenity::Garden].into_iter().collect()),
            requirements: Some("Keep the original fireplace".to_string()),
        }
    }

    pub fn room(name: &str, size: Option<f64>) -> RoomPatch {
        RoomPatch {
            name: Some(name.to_string()),
            size: Some(size),
            notes: None,
        }
    }

    pub fn design_text() -> String {
        "# Craftsman Renovation\n\n## Layout\nKitchen opens to the dining area.".to_string()
    }
}
