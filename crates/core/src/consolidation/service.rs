//! Pure mapping from legacy records to unified groups.
//!
//! Each legacy record maps to one unified group with participants and
//! replayable entries. Balances are produced by replaying the mapped
//! entries through the balance engine, so the stored cache and the entry
//! log agree from the first moment of the group's existence.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use divvy_shared::types::{Currency, GroupId, ParticipantId};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ConsolidationError;
use super::types::{
    LegacyDebtRecord, LegacyGroupRecord, LegacyRecord, LegacySplitType, LegacyTransaction,
};
use crate::group::{
    CreateOneToOneInput, DebtDirection, Group, GroupKind, GroupMode, GroupService, Participant,
    ParticipantRole, PartyRef,
};
use crate::ledger::balance::BalanceEngine;
use crate::ledger::entry::LedgerEntry;
use crate::ledger::validation::validate_entry;
use crate::split::{Split, SplitType};

/// A legacy record materialized into the unified schema.
#[derive(Debug, Clone)]
pub struct MigratedGroup {
    /// The legacy record id, for the idempotency ledger.
    pub legacy_id: String,
    /// The unified group row.
    pub group: Group,
    /// Participants with replayed balances.
    pub participants: Vec<Participant>,
    /// Replayable unified entries (including soft-deleted history).
    pub entries: Vec<LedgerEntry>,
}

/// Result of mapping one legacy record.
#[derive(Debug, Clone)]
pub enum MigrationOutcome {
    /// The record maps to a live unified group.
    Migrated(Box<MigratedGroup>),
    /// A fully-settled debt; intentionally not recreated.
    SkippedSettled {
        /// The legacy record id, for the idempotency ledger.
        legacy_id: String,
    },
}

/// Stateless consolidation mapping service.
pub struct ConsolidationService;

impl ConsolidationService {
    /// Maps one legacy record into the unified schema.
    ///
    /// # Errors
    ///
    /// Returns a `ConsolidationError` describing why the record cannot be
    /// mapped; the caller logs and skips it.
    pub fn map_record(
        record: &LegacyRecord,
        now: DateTime<Utc>,
    ) -> Result<MigrationOutcome, ConsolidationError> {
        match record {
            LegacyRecord::Debt(debt) => Self::map_debt(debt, now),
            LegacyRecord::Group(group) => Self::map_group(group, now),
        }
    }

    /// Maps a two-party debt record.
    ///
    /// Open records become a one-to-one group seeded through an opening
    /// entry for the outstanding amount, so the balances are reproducible
    /// by replay. Fully-settled records are skipped.
    fn map_debt(
        record: &LegacyDebtRecord,
        now: DateTime<Utc>,
    ) -> Result<MigrationOutcome, ConsolidationError> {
        let currency = parse_currency(&record.id, &record.currency)?;

        if record.amount <= Decimal::ZERO {
            return Err(ConsolidationError::InvalidAmount {
                legacy_id: record.id.clone(),
                amount: record.amount,
            });
        }
        if record.amount_paid.is_sign_negative() {
            return Err(ConsolidationError::InvalidAmount {
                legacy_id: record.id.clone(),
                amount: record.amount_paid,
            });
        }

        // The legacy tracker computed with floating point; round its dust
        // away at the boundary before comparing.
        let amount = currency.round(record.amount);
        let paid = currency.round(record.amount_paid);
        let outstanding = amount - paid;
        if outstanding <= Decimal::ZERO {
            return Ok(MigrationOutcome::SkippedSettled {
                legacy_id: record.id.clone(),
            });
        }

        let counterpart_name = record
            .counterpart_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ConsolidationError::MissingCounterpart {
                legacy_id: record.id.clone(),
            })?;
        let counterpart = match record.counterpart_user {
            Some(user_id) => PartyRef::User { user_id },
            None => PartyRef::Contact {
                name: counterpart_name.clone(),
                email: record.counterpart_email.clone(),
            },
        };

        let seed = GroupService::create_one_to_one(
            CreateOneToOneInput {
                creator: record.creator,
                counterpart,
                counterpart_name,
                counterpart_email: record.counterpart_email.clone(),
                direction: record.direction,
                kind: GroupKind::PersonalDebt,
                currency,
            },
            now,
        )
        .map_err(|_| ConsolidationError::MissingCounterpart {
            legacy_id: record.id.clone(),
        })?;

        let mut group = seed.group;
        group.created_at = record.created_at;
        let mut participants = seed.participants;

        // Seeded order is creator first, counterpart second.
        let (creditor, debtor) = match record.direction {
            DebtDirection::Lend => (participants[0].id, participants[1].id),
            DebtDirection::Borrow => (participants[1].id, participants[0].id),
        };

        let entry = LedgerEntry {
            id: divvy_shared::types::EntryId::new(),
            group_id: group.id,
            description: "Opening balance".to_string(),
            amount: outstanding,
            currency,
            entry_date: record.created_at.date_naive(),
            paid_by: creditor,
            split_type: SplitType::Full,
            splits: vec![Split {
                participant_id: debtor,
                amount: outstanding,
            }],
            category_id: None,
            notes: None,
            is_settlement: false,
            deleted_at: None,
            created_by: record.creator,
            created_at: record.created_at,
        };

        let member_ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
        validate_entry(&entry, currency, |id| member_ids.contains(&id))?;

        let entries = vec![entry];
        let balances = BalanceEngine::recompute(&member_ids, &entries)?;
        for participant in &mut participants {
            participant.balance = balances[&participant.id];
        }

        Ok(MigrationOutcome::Migrated(Box::new(MigratedGroup {
            legacy_id: record.id.clone(),
            group,
            participants,
            entries,
        })))
    }

    /// Maps a multi-party group record: members 1:1 into participants,
    /// transactions replayed as unified entries, and the replayed balances
    /// reconciled against the legacy stored figures.
    fn map_group(
        record: &LegacyGroupRecord,
        now: DateTime<Utc>,
    ) -> Result<MigrationOutcome, ConsolidationError> {
        let currency = parse_currency(&record.id, &record.currency)?;

        if record.members.is_empty() {
            return Err(ConsolidationError::NoMembers {
                legacy_id: record.id.clone(),
            });
        }

        let group = Group {
            id: GroupId::new(),
            mode: GroupMode::MultiParty,
            kind: GroupKind::GroupExpense,
            name: Some(record.name.clone()),
            other_party_name: None,
            other_party_email: None,
            debt_direction: None,
            currency,
            is_active: true,
            created_by: record.creator,
            created_at: record.created_at,
        };

        let mut id_map: BTreeMap<Uuid, ParticipantId> = BTreeMap::new();
        let mut participants = Vec::with_capacity(record.members.len());
        for member in &record.members {
            let party = match (member.user_id, &member.name) {
                (Some(user_id), _) => PartyRef::User { user_id },
                (None, Some(name)) if !name.trim().is_empty() => PartyRef::Contact {
                    name: name.clone(),
                    email: member.email.clone(),
                },
                _ => {
                    return Err(ConsolidationError::MissingMemberIdentity {
                        legacy_id: record.id.clone(),
                        member_id: member.id,
                    });
                }
            };

            let participant = Participant {
                id: ParticipantId::new(),
                group_id: group.id,
                party,
                role: map_role(member.role.as_deref()),
                balance: Decimal::ZERO,
                is_active: member.is_active,
                created_at: record.created_at,
            };
            id_map.insert(member.id, participant.id);
            participants.push(participant);
        }

        let member_ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
        let mut entries = Vec::with_capacity(record.transactions.len());
        for transaction in &record.transactions {
            let entry = map_transaction(record, transaction, &group, &id_map, currency, now)?;
            // Replayed history may reference members who later left the
            // group, so membership here means "exists", not "is active".
            validate_entry(&entry, currency, |id| member_ids.contains(&id))?;
            entries.push(entry);
        }

        let balances = BalanceEngine::recompute(&member_ids, &entries)?;

        // The legacy tracker computed balances ad hoc with floating point;
        // accept up to one minor unit of dust, reject anything larger.
        for member in &record.members {
            let participant_id = id_map[&member.id];
            let stored = currency.round(member.balance);
            let replayed = balances[&participant_id];
            if (stored - replayed).abs() > currency.unit() {
                return Err(ConsolidationError::BalanceMismatch {
                    legacy_id: record.id.clone(),
                    member_id: member.id,
                    stored,
                    replayed,
                });
            }
        }
        for participant in &mut participants {
            participant.balance = balances[&participant.id];
        }

        Ok(MigrationOutcome::Migrated(Box::new(MigratedGroup {
            legacy_id: record.id.clone(),
            group,
            participants,
            entries,
        })))
    }
}

fn parse_currency(legacy_id: &str, code: &str) -> Result<Currency, ConsolidationError> {
    Currency::from_str(code).map_err(|_| ConsolidationError::UnknownCurrency {
        legacy_id: legacy_id.to_string(),
        currency: code.to_string(),
    })
}

fn map_role(role: Option<&str>) -> ParticipantRole {
    match role.map(str::to_lowercase).as_deref() {
        Some("owner") => ParticipantRole::Owner,
        Some("admin") => ParticipantRole::Admin,
        _ => ParticipantRole::Member,
    }
}

fn map_split_type(legacy: LegacySplitType) -> SplitType {
    match legacy {
        LegacySplitType::Equal => SplitType::Equal,
        LegacySplitType::Exact => SplitType::Custom,
        LegacySplitType::Percentage => SplitType::Percentage,
    }
}

fn map_transaction(
    record: &LegacyGroupRecord,
    transaction: &LegacyTransaction,
    group: &Group,
    id_map: &BTreeMap<Uuid, ParticipantId>,
    currency: Currency,
    now: DateTime<Utc>,
) -> Result<LedgerEntry, ConsolidationError> {
    if transaction.amount <= Decimal::ZERO {
        return Err(ConsolidationError::InvalidAmount {
            legacy_id: record.id.clone(),
            amount: transaction.amount,
        });
    }

    let paid_by = *id_map
        .get(&transaction.paid_by)
        .ok_or_else(|| ConsolidationError::UnknownMember {
            legacy_id: record.id.clone(),
            member_id: transaction.paid_by,
        })?;

    let mut splits = Vec::with_capacity(transaction.shares.len());
    for share in &transaction.shares {
        let participant_id =
            *id_map
                .get(&share.member_id)
                .ok_or_else(|| ConsolidationError::UnknownMember {
                    legacy_id: record.id.clone(),
                    member_id: share.member_id,
                })?;
        splits.push(Split {
            participant_id,
            amount: currency.round(share.amount),
        });
    }

    let split_type = if transaction.is_settlement {
        SplitType::Full
    } else {
        map_split_type(transaction.split_type)
    };

    Ok(LedgerEntry {
        id: divvy_shared::types::EntryId::new(),
        group_id: group.id,
        description: transaction.description.clone(),
        amount: currency.round(transaction.amount),
        currency,
        entry_date: transaction.date,
        paid_by,
        split_type,
        splits,
        category_id: None,
        notes: None,
        is_settlement: transaction.is_settlement,
        deleted_at: transaction.deleted.then_some(now),
        created_by: transaction.created_by.unwrap_or(record.creator),
        created_at: transaction.created_at,
    })
}
