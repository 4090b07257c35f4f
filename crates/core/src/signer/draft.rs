use serde::{Deserialize, Serialize};

use super::{SignatureKind, Signer, SignerForm, SignerOrderError, SignerOrderValidator, SignerRole};
use crate::auth::AgentIdentity;
use crate::form::ValidationErrors;

/// One drafted signer, addressed by a table-local id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRow {
    pub id: u32,
    #[serde(flatten)]
    pub signer: Signer,
}

/// Signers chosen for a document that has not been submitted yet.
///
/// The table lives with the UI between requests, so it round-trips through
/// JSON as a plain array of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerDraftTable {
    rows: Vec<DraftRow>,
}

impl SignerDraftTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the acting agent as first approver, when their email is known.
    pub fn for_agent(agent: &AgentIdentity) -> Self {
        let mut table = Self::new();
        if let Some(email) = agent.email.as_deref().filter(|e| !e.is_empty()) {
            table.push(Signer {
                email: email.to_string(),
                name: agent.name.clone().unwrap_or_default(),
                cpf: String::new(),
                role: SignerRole::Approve,
                signature_kind: SignatureKind::Plain,
                certificate: None,
                order: 1,
                remote_key: None,
            });
        }
        table
    }

    /// Build a table from submitted forms. Errors are keyed `signers[i].field`.
    pub fn from_forms(forms: Vec<SignerForm>) -> Result<Self, ValidationErrors> {
        let mut table = Self::new();
        let mut errors = ValidationErrors::new();

        for (index, form) in forms.into_iter().enumerate() {
            match form.into_signer() {
                Ok(signer) => {
                    table.push(signer);
                }
                Err(field_errors) => {
                    for (field, message) in field_errors.iter() {
                        errors.add(format!("signers[{}].{}", index, field), message);
                    }
                }
            }
        }

        errors.into_result().map(|()| table)
    }

    /// Validate a form and append the resulting row.
    pub fn add(&mut self, form: SignerForm) -> Result<&DraftRow, ValidationErrors> {
        let signer = form.into_signer()?;
        Ok(self.push(signer))
    }

    /// Remove the row with `id`. Returns whether it existed.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn validate(&self) -> Result<(), SignerOrderError> {
        let signers: Vec<Signer> = self.rows.iter().map(|row| row.signer.clone()).collect();
        SignerOrderValidator::validate(&signers)
    }

    pub fn into_signers(self) -> Vec<Signer> {
        self.rows.into_iter().map(|row| row.signer).collect()
    }

    fn push(&mut self, signer: Signer) -> &DraftRow {
        let id = self.rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        self.rows.push(DraftRow { id, signer });
        &self.rows[self.rows.len() - 1]
    }
}
