//! Group and participant lifecycle rules.
//!
//! Both legacy models (two-party personal debts and multi-party expense
//! groups) are variants of one tagged entity: `GroupMode`. The balance
//! engine and split calculator are mode-agnostic; only this module
//! enforces mode-specific participant-count rules.

pub mod error;
pub mod service;
pub mod types;

pub use error::GroupError;
pub use service::{CreateMultiPartyInput, CreateOneToOneInput, GroupSeed, GroupService, NewMember};
pub use types::{
    DebtDirection, Group, GroupKind, GroupMode, Participant, ParticipantRole, PartyRef,
};
