//! Group repository: group and participant lifecycle persistence.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use divvy_core::group::{
    CreateMultiPartyInput, CreateOneToOneInput, Group, GroupSeed, GroupService, NewMember,
    Participant, PartyRef,
};
use divvy_shared::types::{GroupId, ParticipantId};

use super::{StoreError, convert};
use crate::entities::{ledger_groups, participants};

/// A group together with its participants, in insertion order.
#[derive(Debug, Clone)]
pub struct GroupWithParticipants {
    /// The group.
    pub group: Group,
    /// Its participants (active and removed), ordered by insertion.
    pub participants: Vec<Participant>,
}

/// One participant's balance in a balance summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantBalance {
    /// The participant.
    pub participant_id: ParticipantId,
    /// Their signed balance.
    pub balance: Decimal,
    /// Whether they are still in the group.
    pub is_active: bool,
}

/// Group repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a one-to-one group: the creator plus exactly one
    /// counterpart, both seeded with zero balance.
    ///
    /// # Errors
    ///
    /// Returns validation errors from the lifecycle rules or database
    /// errors.
    pub async fn create_one_to_one(
        &self,
        input: CreateOneToOneInput,
    ) -> Result<GroupWithParticipants, StoreError> {
        let seed = GroupService::create_one_to_one(input, Utc::now())?;
        self.persist_seed(seed).await
    }

    /// Creates a multi-party group with its initial member set.
    ///
    /// # Errors
    ///
    /// Returns validation errors from the lifecycle rules or database
    /// errors.
    pub async fn create_multi_party(
        &self,
        input: CreateMultiPartyInput,
    ) -> Result<GroupWithParticipants, StoreError> {
        let seed = GroupService::create_multi_party(input, Utc::now())?;
        self.persist_seed(seed).await
    }

    async fn persist_seed(&self, seed: GroupSeed) -> Result<GroupWithParticipants, StoreError> {
        let txn = self.db.begin().await?;

        convert::group_active(&seed.group).insert(&txn).await?;
        for participant in &seed.participants {
            convert::participant_active(participant).insert(&txn).await?;
        }

        txn.commit().await?;

        info!(group_id = %seed.group.id, mode = ?seed.group.mode, "Created ledger group");
        Ok(GroupWithParticipants {
            group: seed.group,
            participants: seed.participants,
        })
    }

    /// Fetches a group with all of its participants.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn get_group(&self, group_id: GroupId) -> Result<GroupWithParticipants, StoreError> {
        let group_model = ledger_groups::Entity::find_by_id(group_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(StoreError::GroupNotFound(group_id.into_inner()))?;

        let participant_models = participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id.into_inner()))
            .order_by_asc(participants::Column::Id)
            .all(&self.db)
            .await?;

        let group = convert::group_from_model(&group_model)?;
        let participants = participant_models
            .iter()
            .map(convert::participant_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GroupWithParticipants {
            group,
            participants,
        })
    }

    /// Adds a participant to a multi-party group with zero balance.
    ///
    /// # Errors
    ///
    /// Returns `OneToOneParticipantsImmutable` for one-to-one groups.
    pub async fn add_participant(
        &self,
        group_id: GroupId,
        member: NewMember,
    ) -> Result<Participant, StoreError> {
        let txn = self.db.begin().await?;

        let group_model = find_group_locked(&txn, group_id).await?;
        let group = convert::group_from_model(&group_model)?;
        GroupService::validate_add_participant(&group)?;

        if let PartyRef::Contact { name, .. } = &member.party
            && name.trim().is_empty()
        {
            return Err(StoreError::Group(
                divvy_core::group::GroupError::BlankName,
            ));
        }

        let participant = Participant {
            id: ParticipantId::new(),
            group_id,
            party: member.party,
            role: member.role,
            balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        };
        convert::participant_active(&participant).insert(&txn).await?;

        txn.commit().await?;
        Ok(participant)
    }

    /// Removes (deactivates) a participant from a multi-party group.
    ///
    /// Rejected while the participant has a non-zero balance; a settlement
    /// bringing it to zero must be recorded first. The row is kept so the
    /// audit trail stays intact.
    ///
    /// # Errors
    ///
    /// Returns lifecycle rule violations or `ParticipantNotFound`.
    pub async fn remove_participant(
        &self,
        group_id: GroupId,
        participant_id: ParticipantId,
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        let group_model = find_group_locked(&txn, group_id).await?;
        let group = convert::group_from_model(&group_model)?;

        let participant_model = participants::Entity::find_by_id(participant_id.into_inner())
            .filter(participants::Column::GroupId.eq(group_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(StoreError::ParticipantNotFound(
                participant_id.into_inner(),
            ))?;
        let participant = convert::participant_from_model(&participant_model)?;

        GroupService::validate_remove_participant(&group, &participant)?;

        let mut active: participants::ActiveModel = participant_model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        info!(%group_id, %participant_id, "Removed participant");
        Ok(())
    }

    /// Archives a group. Requires all balances to be zero unless `force`
    /// is set. Groups are never hard-deleted.
    ///
    /// # Errors
    ///
    /// Returns `OutstandingGroupBalance` when balances are non-zero and
    /// `force` is false.
    pub async fn deactivate_group(&self, group_id: GroupId, force: bool) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        let group_model = find_group_locked(&txn, group_id).await?;

        let participant_models = lock_participants(&txn, group_id).await?;
        let balances: Vec<Decimal> = participant_models.iter().map(|p| p.balance).collect();
        GroupService::validate_deactivate(&balances, force)?;

        let mut active: ledger_groups::ActiveModel = group_model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        info!(%group_id, force, "Deactivated group");
        Ok(())
    }

    /// Returns the balance summary of a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn get_group_balances(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<ParticipantBalance>, StoreError> {
        let exists = ledger_groups::Entity::find_by_id(group_id.into_inner())
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(StoreError::GroupNotFound(group_id.into_inner()));
        }

        let participant_models = participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id.into_inner()))
            .order_by_asc(participants::Column::Id)
            .all(&self.db)
            .await?;

        Ok(participant_models
            .iter()
            .map(|model| ParticipantBalance {
                participant_id: ParticipantId::from_uuid(model.id),
                balance: model.balance,
                is_active: model.is_active,
            })
            .collect())
    }

    /// Returns one participant's balance.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantNotFound` if the participant is not in the
    /// group.
    pub async fn get_participant_balance(
        &self,
        group_id: GroupId,
        participant_id: ParticipantId,
    ) -> Result<Decimal, StoreError> {
        let model = participants::Entity::find_by_id(participant_id.into_inner())
            .filter(participants::Column::GroupId.eq(group_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(StoreError::ParticipantNotFound(
                participant_id.into_inner(),
            ))?;

        Ok(model.balance)
    }
}

/// Loads a group row under an exclusive lock.
pub(crate) async fn find_group_locked(
    txn: &DatabaseTransaction,
    group_id: GroupId,
) -> Result<ledger_groups::Model, StoreError> {
    ledger_groups::Entity::find_by_id(group_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(StoreError::GroupNotFound(group_id.into_inner()))
}

/// Locks every participant row of a group in id order.
///
/// Id order keeps the lock acquisition order deterministic across
/// concurrent writers, which prevents lock-order deadlocks between them.
pub(crate) async fn lock_participants(
    txn: &DatabaseTransaction,
    group_id: GroupId,
) -> Result<Vec<participants::Model>, StoreError> {
    Ok(participants::Entity::find()
        .filter(participants::Column::GroupId.eq(group_id.into_inner()))
        .order_by_asc(participants::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await?)
}
