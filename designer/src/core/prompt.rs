//! Prompt and image query construction from a form snapshot

use shared::FormSnapshot;

/// Build the markdown-oriented design prompt. Rooms appear in list order.
pub fn build_design_prompt(snapshot: &FormSnapshot) -> String {
    let size = snapshot
        .square_footage
        .map(|sqft| format!("{sqft} sq ft"))
        .unwrap_or_else(|| "Unspecified".to_string());

    let rooms = if snapshot.rooms.is_empty() {
        "    - None specified".to_string()
    } else {
        snapshot
            .rooms
            .iter()
            .enumerate()
            .map(|(i, room)| {
                let name = if room.name.trim().is_empty() {
                    format!("Room {}", i + 1)
                } else {
                    room.name.trim().to_string()
                };
                let mut line = format!("    - {name}");
                if let Some(size) = room.size {
                    line.push_str(&format!(" ({size} sq ft)"));
                }
                if !room.notes.trim().is_empty() {
                    line.push_str(&format!(": {}", room.notes.trim()));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Create a detailed custom home design plan for a {scenario} project with:
    - Style: {style}
    - Size: {size}
    - Budget: {budget}
    - Priority: {priority}
    - Rooms ({room_count}):
{rooms}
    - Preferences: {preferences}

    Include:
    1. Design concept overview
    2. Layout with room sizes
    3. Furniture recommendations
    4. Materials and finishes
    5. Style-specific tips

    Format in Markdown with clear headings.",
        scenario = snapshot.scenario,
        style = snapshot.style.trim(),
        budget = snapshot.budget,
        priority = snapshot.priority,
        room_count = snapshot.rooms.len(),
        preferences = preferences(snapshot),
    )
}

/// Free-text preferences line: extras and amenities, or "None"
fn preferences(snapshot: &FormSnapshot) -> String {
    let mut parts = Vec::new();
    if !snapshot.requirements.trim().is_empty() {
        parts.push(format!("Extras: {}", snapshot.requirements.trim()));
    }
    if !snapshot.amenities.is_empty() {
        let amenities: Vec<String> = snapshot.amenities.iter().map(|a| a.to_string()).collect();
        parts.push(format!("Amenities: {}", amenities.join(", ")));
    }

    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(", ")
    }
}

/// Image search query from the style and scenario fields
pub fn build_image_query(snapshot: &FormSnapshot) -> String {
    let style = snapshot.style.trim().to_lowercase();
    let subject = match snapshot.scenario {
        shared::Scenario::HomeRenovation => "home interior renovation",
        shared::Scenario::RealEstateDevelopment => "modern house exterior",
        shared::Scenario::ArchitecturalFirm => "architecture house design",
    };

    if style.is_empty() {
        subject.to_string()
    } else {
        format!("{style} {subject}")
    }
}
