//! Stateless group lifecycle rules.
//!
//! Validates group creation and membership changes, and builds the seed
//! rows for new groups. Persistence happens in the store; everything here
//! is pure.

use chrono::{DateTime, Utc};
use divvy_shared::types::{Currency, GroupId, ParticipantId, UserId};
use rust_decimal::Decimal;

use super::error::GroupError;
use super::types::{
    DebtDirection, Group, GroupKind, GroupMode, Participant, ParticipantRole, PartyRef,
};

/// Input for creating a one-to-one (two-party debt) group.
#[derive(Debug, Clone)]
pub struct CreateOneToOneInput {
    /// The creating user.
    pub creator: UserId,
    /// The counterpart: registered user or external contact.
    pub counterpart: PartyRef,
    /// Display name for the counterpart (resolved by the caller for
    /// registered users).
    pub counterpart_name: String,
    /// Optional counterpart e-mail for display.
    pub counterpart_email: Option<String>,
    /// The originating direction of the debt.
    pub direction: DebtDirection,
    /// Category tag.
    pub kind: GroupKind,
    /// Group currency.
    pub currency: Currency,
}

/// Input for creating a multi-party group.
#[derive(Debug, Clone)]
pub struct CreateMultiPartyInput {
    /// The creating user.
    pub creator: UserId,
    /// Display name for the group.
    pub name: String,
    /// Initial members besides the creator (at least one).
    pub members: Vec<NewMember>,
    /// Category tag.
    pub kind: GroupKind,
    /// Group currency.
    pub currency: Currency,
}

/// A member to seed into a new multi-party group.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// The registered user or external contact.
    pub party: PartyRef,
    /// Authorization role; defaults to `Member` at the call sites.
    pub role: ParticipantRole,
}

/// A new group with its seeded participants, ready for persistence.
#[derive(Debug, Clone)]
pub struct GroupSeed {
    /// The group row.
    pub group: Group,
    /// The participant rows, in insertion order (creator first).
    pub participants: Vec<Participant>,
}

/// Stateless group lifecycle service.
pub struct GroupService;

impl GroupService {
    /// Builds a one-to-one group: the creator plus exactly one counterpart,
    /// both with zero balance.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::BlankName` if the counterpart name is blank.
    pub fn create_one_to_one(
        input: CreateOneToOneInput,
        now: DateTime<Utc>,
    ) -> Result<GroupSeed, GroupError> {
        if input.counterpart_name.trim().is_empty() {
            return Err(GroupError::BlankName);
        }
        if let PartyRef::Contact { name, .. } = &input.counterpart
            && name.trim().is_empty()
        {
            return Err(GroupError::BlankName);
        }

        let group_id = GroupId::new();
        let group = Group {
            id: group_id,
            mode: GroupMode::OneToOne,
            kind: input.kind,
            name: None,
            other_party_name: Some(input.counterpart_name),
            other_party_email: input.counterpart_email,
            debt_direction: Some(input.direction),
            currency: input.currency,
            is_active: true,
            created_by: input.creator,
            created_at: now,
        };

        let participants = vec![
            zero_participant(
                group_id,
                PartyRef::User {
                    user_id: input.creator,
                },
                ParticipantRole::Owner,
                now,
            ),
            zero_participant(group_id, input.counterpart, ParticipantRole::Member, now),
        ];

        Ok(GroupSeed {
            group,
            participants,
        })
    }

    /// Builds a multi-party group: the creator plus the supplied members,
    /// all with zero balance.
    ///
    /// # Errors
    ///
    /// Returns `GroupError` if the name is blank, the member list is empty,
    /// a contact has a blank name, or a registered user appears twice.
    pub fn create_multi_party(
        input: CreateMultiPartyInput,
        now: DateTime<Utc>,
    ) -> Result<GroupSeed, GroupError> {
        if input.name.trim().is_empty() {
            return Err(GroupError::BlankName);
        }
        if input.members.is_empty() {
            return Err(GroupError::NoMembers);
        }

        let mut seen_users = vec![input.creator];
        for member in &input.members {
            match &member.party {
                PartyRef::User { user_id } => {
                    if seen_users.contains(user_id) {
                        return Err(GroupError::DuplicateMember);
                    }
                    seen_users.push(*user_id);
                }
                PartyRef::Contact { name, .. } => {
                    if name.trim().is_empty() {
                        return Err(GroupError::BlankName);
                    }
                }
            }
        }

        let group_id = GroupId::new();
        let group = Group {
            id: group_id,
            mode: GroupMode::MultiParty,
            kind: input.kind,
            name: Some(input.name),
            other_party_name: None,
            other_party_email: None,
            debt_direction: None,
            currency: input.currency,
            is_active: true,
            created_by: input.creator,
            created_at: now,
        };

        let mut participants = vec![zero_participant(
            group_id,
            PartyRef::User {
                user_id: input.creator,
            },
            ParticipantRole::Owner,
            now,
        )];
        participants.extend(
            input
                .members
                .into_iter()
                .map(|m| zero_participant(group_id, m.party, m.role, now)),
        );

        Ok(GroupSeed {
            group,
            participants,
        })
    }

    /// Checks that a participant may be added to the group.
    ///
    /// # Errors
    ///
    /// Returns `OneToOneParticipantsImmutable` for one-to-one groups and
    /// `GroupInactive` for archived groups.
    pub fn validate_add_participant(group: &Group) -> Result<(), GroupError> {
        if !group.is_active {
            return Err(GroupError::GroupInactive);
        }
        if group.mode == GroupMode::OneToOne {
            return Err(GroupError::OneToOneParticipantsImmutable);
        }
        Ok(())
    }

    /// Checks that a participant may be removed from the group.
    ///
    /// Removal deactivates the participant; their historical entries stay
    /// in the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `OneToOneParticipantsImmutable` for one-to-one groups,
    /// `ParticipantInactive` if already removed, and `OutstandingBalance`
    /// while the participant's balance is non-zero.
    pub fn validate_remove_participant(
        group: &Group,
        participant: &Participant,
    ) -> Result<(), GroupError> {
        if !group.is_active {
            return Err(GroupError::GroupInactive);
        }
        if group.mode == GroupMode::OneToOne {
            return Err(GroupError::OneToOneParticipantsImmutable);
        }
        if !participant.is_active {
            return Err(GroupError::ParticipantInactive(participant.id));
        }
        if !participant.balance.is_zero() {
            return Err(GroupError::OutstandingBalance {
                participant: participant.id,
                balance: participant.balance,
            });
        }
        Ok(())
    }

    /// Checks that a group may be archived.
    ///
    /// # Errors
    ///
    /// Returns `OutstandingGroupBalance` if any participant balance is
    /// non-zero and `force` is false.
    pub fn validate_deactivate(balances: &[Decimal], force: bool) -> Result<(), GroupError> {
        if force {
            return Ok(());
        }
        if balances.iter().any(|b| !b.is_zero()) {
            return Err(GroupError::OutstandingGroupBalance);
        }
        Ok(())
    }
}

fn zero_participant(
    group_id: GroupId,
    party: PartyRef,
    role: ParticipantRole,
    now: DateTime<Utc>,
) -> Participant {
    Participant {
        id: ParticipantId::new(),
        group_id,
        party,
        role,
        balance: Decimal::ZERO,
        is_active: true,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn one_to_one_input() -> CreateOneToOneInput {
        CreateOneToOneInput {
            creator: UserId::new(),
            counterpart: PartyRef::Contact {
                name: "Sam".to_string(),
                email: None,
            },
            counterpart_name: "Sam".to_string(),
            counterpart_email: None,
            direction: DebtDirection::Lend,
            kind: GroupKind::PersonalDebt,
            currency: Currency::Usd,
        }
    }

    fn multi_party_input(members: Vec<NewMember>) -> CreateMultiPartyInput {
        CreateMultiPartyInput {
            creator: UserId::new(),
            name: "Ski trip".to_string(),
            members,
            kind: GroupKind::Trip,
            currency: Currency::Eur,
        }
    }

    fn contact(name: &str) -> NewMember {
        NewMember {
            party: PartyRef::Contact {
                name: name.to_string(),
                email: None,
            },
            role: ParticipantRole::Member,
        }
    }

    #[test]
    fn test_one_to_one_seeds_two_zero_participants() {
        let seed = GroupService::create_one_to_one(one_to_one_input(), Utc::now()).unwrap();

        assert_eq!(seed.group.mode, GroupMode::OneToOne);
        assert_eq!(seed.group.debt_direction, Some(DebtDirection::Lend));
        assert_eq!(seed.group.other_party_name.as_deref(), Some("Sam"));
        assert_eq!(seed.participants.len(), 2);
        assert!(seed.participants.iter().all(|p| p.balance.is_zero()));
        assert_eq!(seed.participants[0].role, ParticipantRole::Owner);
    }

    #[test]
    fn test_one_to_one_rejects_blank_counterpart() {
        let mut input = one_to_one_input();
        input.counterpart_name = "  ".to_string();
        let result = GroupService::create_one_to_one(input, Utc::now());
        assert!(matches!(result, Err(GroupError::BlankName)));
    }

    #[test]
    fn test_multi_party_seeds_creator_first() {
        let input = multi_party_input(vec![contact("Ana"), contact("Ben")]);
        let creator = input.creator;
        let seed = GroupService::create_multi_party(input, Utc::now()).unwrap();

        assert_eq!(seed.group.mode, GroupMode::MultiParty);
        assert_eq!(seed.participants.len(), 3);
        assert_eq!(
            seed.participants[0].party,
            PartyRef::User { user_id: creator }
        );
        assert!(seed.participants.iter().all(|p| p.balance.is_zero()));
    }

    #[test]
    fn test_multi_party_requires_members() {
        let result = GroupService::create_multi_party(multi_party_input(vec![]), Utc::now());
        assert!(matches!(result, Err(GroupError::NoMembers)));
    }

    #[test]
    fn test_multi_party_rejects_duplicate_user() {
        let user = UserId::new();
        let member = NewMember {
            party: PartyRef::User { user_id: user },
            role: ParticipantRole::Member,
        };
        let input = multi_party_input(vec![member.clone(), member]);
        let result = GroupService::create_multi_party(input, Utc::now());
        assert!(matches!(result, Err(GroupError::DuplicateMember)));
    }

    #[test]
    fn test_multi_party_rejects_creator_as_member() {
        let mut input = multi_party_input(vec![]);
        input.members = vec![NewMember {
            party: PartyRef::User {
                user_id: input.creator,
            },
            role: ParticipantRole::Member,
        }];
        let result = GroupService::create_multi_party(input, Utc::now());
        assert!(matches!(result, Err(GroupError::DuplicateMember)));
    }

    #[test]
    fn test_one_to_one_membership_is_immutable() {
        let seed = GroupService::create_one_to_one(one_to_one_input(), Utc::now()).unwrap();

        assert!(matches!(
            GroupService::validate_add_participant(&seed.group),
            Err(GroupError::OneToOneParticipantsImmutable)
        ));
        assert!(matches!(
            GroupService::validate_remove_participant(&seed.group, &seed.participants[1]),
            Err(GroupError::OneToOneParticipantsImmutable)
        ));
    }

    #[test]
    fn test_remove_requires_zero_balance() {
        let input = multi_party_input(vec![contact("Ana")]);
        let seed = GroupService::create_multi_party(input, Utc::now()).unwrap();
        let mut participant = seed.participants[1].clone();
        participant.balance = dec!(-12.50);

        let result = GroupService::validate_remove_participant(&seed.group, &participant);
        assert!(matches!(
            result,
            Err(GroupError::OutstandingBalance { balance, .. }) if balance == dec!(-12.50)
        ));

        participant.balance = Decimal::ZERO;
        assert!(GroupService::validate_remove_participant(&seed.group, &participant).is_ok());
    }

    #[test]
    fn test_deactivate_requires_zero_balances_unless_forced() {
        let balances = vec![dec!(10), dec!(-10)];
        assert!(matches!(
            GroupService::validate_deactivate(&balances, false),
            Err(GroupError::OutstandingGroupBalance)
        ));
        assert!(GroupService::validate_deactivate(&balances, true).is_ok());
        assert!(GroupService::validate_deactivate(&[Decimal::ZERO, Decimal::ZERO], false).is_ok());
    }

    #[test]
    fn test_add_participant_allowed_for_multi_party() {
        let input = multi_party_input(vec![contact("Ana")]);
        let seed = GroupService::create_multi_party(input, Utc::now()).unwrap();
        assert!(GroupService::validate_add_participant(&seed.group).is_ok());
    }
}
