//! Conference scheduling domain models.
//!
//! Provides the data types describing what gets scheduled (entities),
//! where and when it can go (rooms, timeslots), and a candidate answer
//! (grid). All of it is immutable during optimization except the grids.
//!
//! # Domain Mappings
//!
//! | u-confsched | Session scheduling | Lecture mapping |
//! |-------------|--------------------|-----------------|
//! | Entity | Minisymposium | Contributed lecture |
//! | Grid row | Timeslot | Host session |
//! | Grid column | Room | Talk position |

mod entity;
mod entity_set;
mod grid;
mod participant;
mod resources;
mod topic;

pub use entity::Entity;
pub use entity_set::EntitySet;
pub use grid::{Gene, Grid};
pub use participant::{is_real_participant, CitationIndex, UNKNOWN_PRESENTER};
pub use resources::{Resources, Room, Timeslot};
pub use topic::{
    topic_similarity, Similarity, TopicCatalog, TopicCode, MAX_TOPIC_SIMILARITY,
    TOPICS_PER_ENTITY,
};
