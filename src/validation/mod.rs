//! Validation of message enumerations
//!
//! Message role, mode and channel are the only validated fields of an event.
//! Invalid names are rejected before anything is written.

mod message;

pub use message::{
    validate_category, validate_channel, validate_mode, validate_role, VALID_CATEGORIES,
    VALID_CHANNELS, VALID_MODES, VALID_ROLES,
};
