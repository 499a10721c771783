//! # Transactions
//!
//! The public call surface as data. The host hands the registry one
//! [`Transaction`] at a time; [`Registry::apply`] dispatches it to the
//! matching method, updates counters, and logs the outcome.
//!
//! ```json
//! {"caller": "…", "height": 120, "call": {"op": "grant_access", "record_id": 1, "user": "…"}}
//! ```

use serde::{Deserialize, Serialize};

use super::errors::RegistryResult;
use super::service::Registry;
use super::types::{CallContext, Principal, RecordFields, RecordId, RecordMetadata};
use crate::observability::Event;

/// One entry point invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    Upload {
        title: String,
        size: u64,
        summary: String,
        categories: Vec<String>,
    },
    Update {
        record_id: RecordId,
        title: String,
        size: u64,
        summary: String,
        categories: Vec<String>,
    },
    TransferOwnership { record_id: RecordId, new_owner: Principal },
    Delete { record_id: RecordId },
    ReadEbook { record_id: RecordId },
    ResetReadCount { record_id: RecordId },
    GrantAccess { record_id: RecordId, user: Principal },
    DonateAccess { record_id: RecordId, recipient: Principal },
    RevokeAccess { record_id: RecordId, user: Principal },
    HasAccess { record_id: RecordId, user: Principal },
    CheckAccess { record_id: RecordId },
    GetAccessRights { record_id: RecordId, user: Principal },
    SetUploadTime { record_id: RecordId, height: u64 },
    SetSummary { record_id: RecordId, summary: String },
    SetFileSize { record_id: RecordId, size: u64 },
    SetCategories { record_id: RecordId, categories: Vec<String> },
    GetMetadata { record_id: RecordId },
    GetOwner { record_id: RecordId },
    GetAuthor { record_id: RecordId },
    GetUploadTime { record_id: RecordId },
    IsOwner { record_id: RecordId },
    CheckAdminAccess,
    GetReadCount { record_id: RecordId },
    GetTotalRecords,
}

impl Call {
    /// Operation name as it appears in the `op` tag
    pub fn name(&self) -> &'static str {
        match self {
            Call::Upload { .. } => "upload",
            Call::Update { .. } => "update",
            Call::TransferOwnership { .. } => "transfer_ownership",
            Call::Delete { .. } => "delete",
            Call::ReadEbook { .. } => "read_ebook",
            Call::ResetReadCount { .. } => "reset_read_count",
            Call::GrantAccess { .. } => "grant_access",
            Call::DonateAccess { .. } => "donate_access",
            Call::RevokeAccess { .. } => "revoke_access",
            Call::HasAccess { .. } => "has_access",
            Call::CheckAccess { .. } => "check_access",
            Call::GetAccessRights { .. } => "get_access_rights",
            Call::SetUploadTime { .. } => "set_upload_time",
            Call::SetSummary { .. } => "set_summary",
            Call::SetFileSize { .. } => "set_file_size",
            Call::SetCategories { .. } => "set_categories",
            Call::GetMetadata { .. } => "get_metadata",
            Call::GetOwner { .. } => "get_owner",
            Call::GetAuthor { .. } => "get_author",
            Call::GetUploadTime { .. } => "get_upload_time",
            Call::IsOwner { .. } => "is_owner",
            Call::CheckAdminAccess => "check_admin_access",
            Call::GetReadCount { .. } => "get_read_count",
            Call::GetTotalRecords => "get_total_records",
        }
    }

    /// True for calls that never touch the tables
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Call::HasAccess { .. }
                | Call::CheckAccess { .. }
                | Call::GetAccessRights { .. }
                | Call::GetMetadata { .. }
                | Call::GetOwner { .. }
                | Call::GetAuthor { .. }
                | Call::GetUploadTime { .. }
                | Call::IsOwner { .. }
                | Call::CheckAdminAccess
                | Call::GetReadCount { .. }
                | Call::GetTotalRecords
        )
    }

    /// Target record, if the call names one
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Call::Upload { .. } | Call::CheckAdminAccess | Call::GetTotalRecords => None,
            Call::Update { record_id, .. }
            | Call::TransferOwnership { record_id, .. }
            | Call::Delete { record_id }
            | Call::ReadEbook { record_id }
            | Call::ResetReadCount { record_id }
            | Call::GrantAccess { record_id, .. }
            | Call::DonateAccess { record_id, .. }
            | Call::RevokeAccess { record_id, .. }
            | Call::HasAccess { record_id, .. }
            | Call::CheckAccess { record_id }
            | Call::GetAccessRights { record_id, .. }
            | Call::SetUploadTime { record_id, .. }
            | Call::SetSummary { record_id, .. }
            | Call::SetFileSize { record_id, .. }
            | Call::SetCategories { record_id, .. }
            | Call::GetMetadata { record_id }
            | Call::GetOwner { record_id }
            | Call::GetAuthor { record_id }
            | Call::GetUploadTime { record_id }
            | Call::IsOwner { record_id }
            | Call::GetReadCount { record_id } => Some(*record_id),
        }
    }
}

/// A call together with the context the host executes it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub caller: Principal,
    pub height: u64,
    pub call: Call,
}

impl Transaction {
    pub fn new(caller: Principal, height: u64, call: Call) -> Self {
        Self { caller, height, call }
    }

    pub fn context(&self) -> CallContext {
        CallContext::new(self.caller, self.height)
    }
}

/// Successful result of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallOutput {
    Unit,
    RecordId(RecordId),
    Flag(bool),
    Principal(Principal),
    Height(u64),
    Count(u64),
    Metadata(RecordMetadata),
}

impl Registry {
    /// Execute one transaction
    pub fn apply(&self, tx: &Transaction) -> RegistryResult<CallOutput> {
        let ctx = tx.context();
        let result = self.dispatch(&ctx, &tx.call);

        let caller = ctx.caller.to_string();
        let height = ctx.height.to_string();
        let record_id = tx.call.record_id().map(|id| id.to_string());
        let mut fields = vec![
            ("op", tx.call.name()),
            ("caller", caller.as_str()),
            ("height", height.as_str()),
        ];
        if let Some(id) = &record_id {
            fields.push(("record_id", id.as_str()));
        }

        match &result {
            Ok(_) => {
                self.metrics.record_applied();
                if tx.call.is_query() {
                    self.logger.trace(Event::CallApplied, &fields);
                } else {
                    self.logger.info(Event::CallApplied, &fields);
                }
            }
            Err(err) => {
                self.metrics.record_rejected();
                fields.push(("code", err.code()));
                self.logger.warn(Event::CallRejected, &fields);
            }
        }

        result
    }

    fn dispatch(&self, ctx: &CallContext, call: &Call) -> RegistryResult<CallOutput> {
        match call {
            Call::Upload { title, size, summary, categories } => {
                let fields = RecordFields::new(title.clone(), *size, summary.clone(), categories.clone());
                self.upload(ctx, fields).map(CallOutput::RecordId)
            }
            Call::Update { record_id, title, size, summary, categories } => {
                let fields = RecordFields::new(title.clone(), *size, summary.clone(), categories.clone());
                self.update(ctx, *record_id, fields).map(|_| CallOutput::Unit)
            }
            Call::TransferOwnership { record_id, new_owner } => self
                .transfer_ownership(ctx, *record_id, *new_owner)
                .map(|_| CallOutput::Unit),
            Call::Delete { record_id } => self.delete(ctx, *record_id).map(|_| CallOutput::Unit),
            Call::ReadEbook { record_id } => self.read_ebook(ctx, *record_id).map(|_| CallOutput::Unit),
            Call::ResetReadCount { record_id } => {
                self.reset_read_count(ctx, *record_id).map(|_| CallOutput::Unit)
            }
            Call::GrantAccess { record_id, user } => {
                self.grant_access(ctx, *record_id, *user).map(|_| CallOutput::Unit)
            }
            Call::DonateAccess { record_id, recipient } => {
                self.donate_access(ctx, *record_id, *recipient).map(|_| CallOutput::Unit)
            }
            Call::RevokeAccess { record_id, user } => {
                self.revoke_access(ctx, *record_id, *user).map(|_| CallOutput::Unit)
            }
            Call::HasAccess { record_id, user } => Ok(CallOutput::Flag(self.has_access(*record_id, user))),
            Call::CheckAccess { record_id } => Ok(CallOutput::Flag(self.check_access(ctx, *record_id))),
            Call::GetAccessRights { record_id, user } => {
                self.get_access_rights(*record_id, user).map(CallOutput::Flag)
            }
            Call::SetUploadTime { record_id, height } => {
                self.set_upload_time(ctx, *record_id, *height).map(|_| CallOutput::Unit)
            }
            Call::SetSummary { record_id, summary } => {
                self.set_summary(ctx, *record_id, summary).map(|_| CallOutput::Unit)
            }
            Call::SetFileSize { record_id, size } => {
                self.set_file_size(ctx, *record_id, *size).map(|_| CallOutput::Unit)
            }
            Call::SetCategories { record_id, categories } => self
                .set_categories(ctx, *record_id, categories.clone())
                .map(|_| CallOutput::Unit),
            Call::GetMetadata { record_id } => self.get_metadata(*record_id).map(CallOutput::Metadata),
            Call::GetOwner { record_id } => self.get_owner(*record_id).map(CallOutput::Principal),
            Call::GetAuthor { record_id } => self.get_author(*record_id).map(CallOutput::Principal),
            Call::GetUploadTime { record_id } => self.get_upload_time(*record_id).map(CallOutput::Height),
            Call::IsOwner { record_id } => self.is_owner(ctx, *record_id).map(CallOutput::Flag),
            Call::CheckAdminAccess => Ok(CallOutput::Flag(self.check_admin_access(ctx))),
            Call::GetReadCount { record_id } => self.get_read_count(*record_id).map(CallOutput::Count),
            Call::GetTotalRecords => Ok(CallOutput::Count(self.get_total_records())),
        }
    }
}
