//! Conversions between entity models and core domain types.

use std::str::FromStr;

use chrono::Utc;
use sea_orm::Set;
use uuid::Uuid;

use divvy_core::group::{Group, Participant, PartyRef};
use divvy_core::ledger::LedgerEntry;
use divvy_core::split::Split;
use divvy_shared::types::{
    CategoryId, Currency, EntryId, GroupId, ParticipantId, UserId,
};

use super::StoreError;
use crate::entities::{entry_splits, ledger_entries, ledger_groups, participants};

pub(crate) fn currency_from_str(code: &str) -> Result<Currency, StoreError> {
    Currency::from_str(code)
        .map_err(|_| StoreError::Internal(format!("Stored currency is not supported: {code}")))
}

pub(crate) fn group_from_model(model: &ledger_groups::Model) -> Result<Group, StoreError> {
    Ok(Group {
        id: GroupId::from_uuid(model.id),
        mode: model.mode.clone().into(),
        kind: model.kind.clone().into(),
        name: model.name.clone(),
        other_party_name: model.other_party_name.clone(),
        other_party_email: model.other_party_email.clone(),
        debt_direction: model.debt_direction.clone().map(Into::into),
        currency: currency_from_str(model.currency.trim())?,
        is_active: model.is_active,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn participant_from_model(
    model: &participants::Model,
) -> Result<Participant, StoreError> {
    let party = match (model.user_id, &model.contact_name) {
        (Some(user_id), _) => PartyRef::User {
            user_id: UserId::from_uuid(user_id),
        },
        (None, Some(name)) => PartyRef::Contact {
            name: name.clone(),
            email: model.contact_email.clone(),
        },
        (None, None) => {
            return Err(StoreError::Internal(format!(
                "Participant {} has neither user nor contact identity",
                model.id
            )));
        }
    };

    Ok(Participant {
        id: ParticipantId::from_uuid(model.id),
        group_id: GroupId::from_uuid(model.group_id),
        party,
        role: model.role.clone().into(),
        balance: model.balance,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn entry_from_models(
    model: &ledger_entries::Model,
    splits: &[entry_splits::Model],
) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        id: EntryId::from_uuid(model.id),
        group_id: GroupId::from_uuid(model.group_id),
        description: model.description.clone(),
        amount: model.amount,
        currency: currency_from_str(model.currency.trim())?,
        entry_date: model.entry_date,
        paid_by: ParticipantId::from_uuid(model.paid_by),
        split_type: model.split_type.clone().into(),
        splits: splits
            .iter()
            .map(|split| Split {
                participant_id: ParticipantId::from_uuid(split.participant_id),
                amount: split.amount,
            })
            .collect(),
        category_id: model.category_id.map(CategoryId::from_uuid),
        notes: model.notes.clone(),
        is_settlement: model.is_settlement,
        deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn group_active(group: &Group) -> ledger_groups::ActiveModel {
    let now = Utc::now();
    ledger_groups::ActiveModel {
        id: Set(group.id.into_inner()),
        mode: Set(group.mode.into()),
        kind: Set(group.kind.into()),
        name: Set(group.name.clone()),
        other_party_name: Set(group.other_party_name.clone()),
        other_party_email: Set(group.other_party_email.clone()),
        debt_direction: Set(group.debt_direction.map(Into::into)),
        currency: Set(group.currency.to_string()),
        is_active: Set(group.is_active),
        created_by: Set(group.created_by.into_inner()),
        created_at: Set(group.created_at.into()),
        updated_at: Set(now.into()),
    }
}

pub(crate) fn participant_active(participant: &Participant) -> participants::ActiveModel {
    let (user_id, contact_name, contact_email) = match &participant.party {
        PartyRef::User { user_id } => (Some(user_id.into_inner()), None, None),
        PartyRef::Contact { name, email } => (None, Some(name.clone()), email.clone()),
    };

    participants::ActiveModel {
        id: Set(participant.id.into_inner()),
        group_id: Set(participant.group_id.into_inner()),
        user_id: Set(user_id),
        contact_name: Set(contact_name),
        contact_email: Set(contact_email),
        role: Set(participant.role.into()),
        balance: Set(participant.balance),
        is_active: Set(participant.is_active),
        created_at: Set(participant.created_at.into()),
        updated_at: Set(Utc::now().into()),
    }
}

pub(crate) fn entry_active(entry: &LedgerEntry) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        group_id: Set(entry.group_id.into_inner()),
        description: Set(entry.description.clone()),
        amount: Set(entry.amount),
        currency: Set(entry.currency.to_string()),
        entry_date: Set(entry.entry_date),
        paid_by: Set(entry.paid_by.into_inner()),
        split_type: Set(entry.split_type.into()),
        category_id: Set(entry.category_id.map(CategoryId::into_inner)),
        notes: Set(entry.notes.clone()),
        is_settlement: Set(entry.is_settlement),
        deleted_at: Set(entry.deleted_at.map(Into::into)),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(entry.created_at.into()),
        updated_at: Set(Utc::now().into()),
    }
}

pub(crate) fn split_active(entry_id: EntryId, split: &Split) -> entry_splits::ActiveModel {
    entry_splits::ActiveModel {
        id: Set(Uuid::now_v7()),
        entry_id: Set(entry_id.into_inner()),
        participant_id: Set(split.participant_id.into_inner()),
        amount: Set(split.amount),
        created_at: Set(Utc::now().into()),
    }
}
