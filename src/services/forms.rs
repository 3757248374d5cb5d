//! Public form intake and the staff approval workflow

use crate::{
    error::{AppError, AppResult},
    models::{
        form_request::{FormDetails, FormQuery, FormReceipt, FormRequest, SubmitFormRequest},
        user::{Role, UserClaims},
    },
    repository::Repository,
    rules::{approval::next_status, AccessScope, FormAction, FormType},
};

#[derive(Clone)]
pub struct FormsService {
    repository: Repository,
}

impl FormsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Accept a request from the public forms; `expected` is the form the
    /// endpoint serves and must match the submitted details
    pub async fn submit(&self, expected: FormType, data: &SubmitFormRequest) -> AppResult<FormReceipt> {
        if data.details.form_type() != expected {
            return Err(AppError::Validation(format!(
                "Details describe a {} but this form accepts {}",
                data.details.form_type(),
                expected
            )));
        }
        if !self.repository.laboratories.exists(data.lab_id).await? {
            return Err(AppError::Validation(format!("Unknown laboratory {}", data.lab_id)));
        }
        match &data.details {
            FormDetails::EquipmentBorrow { asset_ids, .. } => {
                let missing = self.repository.assets.missing_in_lab(data.lab_id, asset_ids).await?;
                reject_missing("asset", data.lab_id, &missing)?;
            }
            FormDetails::SoftwareInstallation { workstation_ids, .. } => {
                let missing = self
                    .repository
                    .workstations
                    .missing_in_lab(data.lab_id, workstation_ids)
                    .await?;
                reject_missing("workstation", data.lab_id, &missing)?;
            }
            FormDetails::LabRequest { .. } => {}
        }

        let form = self.repository.forms.insert(data).await?;
        tracing::info!(
            form_id = form.form_id,
            form_type = %form.form_type,
            lab_id = form.lab_id,
            "Form request submitted"
        );
        Ok(FormReceipt {
            form_id: form.form_id,
            reference: form.reference,
            status: form.status,
        })
    }

    pub async fn list(&self, scope: AccessScope, query: &FormQuery) -> AppResult<Vec<FormRequest>> {
        let lab_id = scope.narrow(query.lab_id)?;
        self.repository.forms.list(query, lab_id).await
    }

    pub async fn get(&self, scope: AccessScope, id: i32) -> AppResult<FormRequest> {
        let form = self.repository.forms.get_by_id(id).await?;
        scope.ensure_lab(form.lab_id)?;
        Ok(form)
    }

    /// Apply an approval or rejection by the caller
    pub async fn decide(
        &self,
        caller: &UserClaims,
        id: i32,
        action: FormAction,
        reason: Option<&str>,
    ) -> AppResult<FormRequest> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if action == FormAction::Reject && reason.is_none() {
            return Err(AppError::Validation("A reason is required to reject a form".to_string()));
        }

        let form = self.get(caller.scope()?, id).await?;
        let next = next_status(form.form_type, form.status, caller.role, action)?;

        let updated = match caller.role {
            Role::Custodian => {
                self.repository
                    .forms
                    .record_custodian_decision(id, form.status, next, caller.user_id, reason)
                    .await?
            }
            Role::Admin => {
                self.repository
                    .forms
                    .record_admin_decision(id, form.status, next, caller.user_id, reason)
                    .await?
            }
        };

        tracing::info!(
            form_id = id,
            from = %form.status,
            to = %updated.status,
            actor = caller.user_id,
            "Form request decided"
        );
        Ok(updated)
    }
}

/// Fails when a request names records outside its laboratory
fn reject_missing(kind: &str, lab_id: i32, missing: &[i32]) -> AppResult<()> {
    if missing.is_empty() {
        return Ok(());
    }
    let ids = missing.iter().map(i32::to_string).collect::<Vec<_>>().join(", ");
    Err(AppError::Validation(format!(
        "Unknown {} ids for laboratory {}: {}",
        kind, lab_id, ids
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_missing_lists_ids() {
        assert!(reject_missing("asset", 1, &[]).is_ok());
        match reject_missing("asset", 1, &[12, 99999999]) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Unknown asset ids for laboratory 1: 12, 99999999")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
