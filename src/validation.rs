//! Input validation for conference scheduling problems.
//!
//! Checks structural integrity of entities against the available rooms and
//! timeslots before optimization. Detects:
//! - Duplicate entity IDs
//! - Duplicate parts of the same multi-part entity
//! - Room requests and timeslot restrictions pointing at missing resources
//! - Entities with no admissible timeslot
//! - More entities than grid cells

use crate::models::{Entity, Resources};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateEntity,
    /// Two entities share base title and part number.
    DuplicatePart,
    /// An entity requests a room that doesn't exist.
    InvalidRoomReference,
    /// An entity is restricted to a timeslot that doesn't exist.
    InvalidTimeslotReference,
    /// No timeslot is both allowed and large enough for the entity.
    NoValidTimeslot,
    /// The grid cannot hold all entities.
    InsufficientCells,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Timeslots an entity may occupy: its explicit restriction (if any)
/// intersected with the timeslots that fit its size.
pub fn admissible_timeslots(entity: &Entity, resources: &Resources) -> Vec<usize> {
    (0..resources.nslots())
        .filter(|&s| resources.timeslots[s].talk_capacity >= entity.size)
        .filter(|s| {
            entity
                .timeslots
                .as_ref()
                .map_or(true, |allowed| allowed.contains(s))
        })
        .collect()
}

/// Validates the entities of a session-scheduling problem.
///
/// Checks:
/// 1. No duplicate entity IDs
/// 2. No duplicate (title, part) pairs
/// 3. All room requests point to existing rooms
/// 4. All timeslot restrictions point to existing timeslots
/// 5. Every entity has at least one admissible timeslot
/// 6. The timeslot × room grid has a cell for every entity
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(entities: &[Entity], resources: &Resources) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    let mut parts = HashSet::new();
    for e in entities {
        if !ids.insert(e.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateEntity,
                format!("Duplicate entity ID: {}", e.id),
            ));
        }
        if let Some(part) = e.part {
            if !parts.insert((e.title.as_str(), part)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicatePart,
                    format!("Duplicate part {} of '{}'", part, e.title),
                ));
            }
        }
    }

    for e in entities {
        if let Some(room) = e.room {
            if room >= resources.nrooms() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!("Entity {} requests unknown room {}", e.id, room),
                ));
            }
        }

        let mut bad_slot = false;
        for &slot in e.timeslots.iter().flatten() {
            if slot >= resources.nslots() {
                bad_slot = true;
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeslotReference,
                    format!("Entity {} references unknown timeslot {}", e.id, slot),
                ));
            }
        }

        if !bad_slot && resources.nslots() > 0 && admissible_timeslots(e, resources).is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoValidTimeslot,
                format!("Entity {} ('{}') fits no timeslot", e.id, e.full_title()),
            ));
        }
    }

    if entities.len() > resources.ncells() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientCells,
            format!(
                "{} entities do not fit into {} timeslots x {} rooms",
                entities.len(),
                resources.nslots(),
                resources.nrooms()
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates the lectures of a lecture-mapping problem.
///
/// Checks:
/// 1. No duplicate lecture IDs
/// 2. The open talk-slots can hold every lecture
pub fn validate_lectures(lectures: &[Entity], open_cells: usize) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for l in lectures {
        if !ids.insert(l.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateEntity,
                format!("Duplicate lecture ID: {}", l.id),
            ));
        }
    }

    if open_cells == 0 || lectures.len() > open_cells {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientCells,
            format!(
                "{} lectures do not fit into {} open talk-slots",
                lectures.len(),
                open_cells
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resources, Timeslot};

    fn sample_resources() -> Resources {
        Resources::uniform(2, 3, 4)
    }

    fn sample_entities() -> Vec<Entity> {
        vec![
            Entity::new(10, "Solvers - Part I of II").with_participant("A"),
            Entity::new(11, "Solvers - Part II of II").with_participant("A"),
            Entity::new(12, "Meshing").with_room(1).with_timeslots(vec![0, 2]),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_entities(), &sample_resources()).is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        let entities = vec![Entity::new(1, "A"), Entity::new(1, "B")];
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateEntity));
    }

    #[test]
    fn test_duplicate_part() {
        let entities = vec![
            Entity::new(1, "A - Part I of II"),
            Entity::new(2, "A - Part I of II"),
        ];
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicatePart));
    }

    #[test]
    fn test_invalid_room() {
        let entities = vec![Entity::new(1, "A").with_room(5)];
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidRoomReference));
    }

    #[test]
    fn test_invalid_timeslot() {
        let entities = vec![Entity::new(1, "A").with_timeslots(vec![0, 9])];
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidTimeslotReference));
    }

    #[test]
    fn test_entity_too_large_for_every_slot() {
        let resources = Resources::uniform(2, 2, 0).with_timeslot(Timeslot::new("late", 3));
        let entities = vec![
            Entity::new(1, "fits late").with_size(3),
            Entity::new(2, "fits nowhere").with_size(4),
        ];
        let errors = validate_input(&entities, &resources).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NoValidTimeslot);
        assert!(errors[0].message.contains("fits nowhere"));
    }

    #[test]
    fn test_insufficient_cells() {
        let entities: Vec<Entity> = (0..7).map(|i| Entity::new(i, format!("E{i}"))).collect();
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InsufficientCells));
    }

    #[test]
    fn test_admissible_timeslots() {
        let resources = Resources::new()
            .with_timeslot(Timeslot::new("a", 3))
            .with_timeslot(Timeslot::new("b", 5))
            .with_timeslot(Timeslot::new("c", 5));
        let e = Entity::new(1, "X").with_size(4).with_timeslots(vec![0, 1]);
        assert_eq!(admissible_timeslots(&e, &resources), vec![1]);

        let free = Entity::new(2, "Y").with_size(2);
        assert_eq!(admissible_timeslots(&free, &resources), vec![0, 1, 2]);
    }

    #[test]
    fn test_multiple_errors() {
        let entities = vec![
            Entity::new(1, "A").with_room(9),
            Entity::new(1, "B").with_timeslots(vec![42]),
        ];
        let errors = validate_input(&entities, &sample_resources()).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_lectures_fit() {
        let lectures: Vec<Entity> = (0..4).map(|i| Entity::new(i, format!("L{i}"))).collect();
        assert!(validate_lectures(&lectures, 4).is_ok());

        let errors = validate_lectures(&lectures, 3).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InsufficientCells);
        assert!(validate_lectures(&[], 0).is_err());
    }

    #[test]
    fn test_duplicate_lecture() {
        let lectures = vec![Entity::new(3, "A"), Entity::new(3, "B")];
        let errors = validate_lectures(&lectures, 10).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateEntity);
    }
}
