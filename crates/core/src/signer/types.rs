use serde::{Deserialize, Serialize};

use crate::signing::{RemoteSigner, SignerPayload};

/// What a signatory does on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Approve,
    Witness,
    Represent,
    Receive,
    Sign,
}

impl SignerRole {
    pub const ALL: [SignerRole; 5] = [
        SignerRole::Approve,
        SignerRole::Witness,
        SignerRole::Represent,
        SignerRole::Receive,
        SignerRole::Sign,
    ];

    /// Numeric `act` code understood by the signing service.
    pub fn action_code(&self) -> u8 {
        match self {
            SignerRole::Sign => 1,
            SignerRole::Approve => 2,
            SignerRole::Represent => 4,
            SignerRole::Witness => 5,
            SignerRole::Receive => 7,
        }
    }

    pub fn from_action_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.action_code().to_string() == code.trim())
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignerRole::Approve => "Approve",
            SignerRole::Witness => "Witness",
            SignerRole::Represent => "Represent",
            SignerRole::Receive => "Acknowledge receipt",
            SignerRole::Sign => "Sign",
        }
    }
}

/// How the signatory signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Plain,
    Certificate,
    NotApplicable,
}

impl SignatureKind {
    pub const ALL: [SignatureKind; 3] = [
        SignatureKind::Plain,
        SignatureKind::Certificate,
        SignatureKind::NotApplicable,
    ];

    /// Form choice id.
    pub fn id(&self) -> &'static str {
        match self {
            SignatureKind::Plain => "normal",
            SignatureKind::Certificate => "certificate",
            SignatureKind::NotApplicable => "not_applicable",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id.trim())
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignatureKind::Plain => "Normal",
            SignatureKind::Certificate => "Certificate",
            SignatureKind::NotApplicable => "Not applicable",
        }
    }
}

/// A signatory of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub email: String,
    pub name: String,
    pub cpf: String,
    pub role: SignerRole,
    pub signature_kind: SignatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    pub order: u32,
    /// Assigned by the signing service once the signer is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
}

impl Signer {
    /// Registration payload for the signing service.
    pub fn payload(&self) -> SignerPayload {
        SignerPayload::new(
            self.email.clone(),
            self.role.action_code(),
            self.signature_kind == SignatureKind::Certificate,
        )
    }
}

/// Display row for a remote signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerRow {
    pub key: String,
    pub signatory_name: String,
    pub signatory_email: String,
    pub cpf: String,
    pub action_label: String,
    pub signature_label: String,
    /// 1-based position in the current list, not the signer's declared order.
    pub order_index: usize,
}

impl SignerRow {
    pub fn project(index: usize, signer: &RemoteSigner) -> Self {
        let key = signer
            .key_signer
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| Some(signer.email.clone()).filter(|e| !e.is_empty()))
            .unwrap_or_else(|| format!("row-{}", index));

        let action_label = match signer.type_code.as_deref() {
            Some("1") => "Sign".to_string(),
            Some("2") => "Approve".to_string(),
            _ => signer
                .nomenclature
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Sign".to_string()),
        };

        let signature_label = if signer.certificate_flag.as_deref() == Some("1") {
            "ICP-Brasil"
        } else {
            "Normal"
        };

        Self {
            key,
            signatory_name: signer.name.clone().unwrap_or_default(),
            signatory_email: signer.email.clone(),
            cpf: signer.document.clone().unwrap_or_default(),
            action_label,
            signature_label: signature_label.to_string(),
            order_index: index + 1,
        }
    }

    pub fn project_all(signers: &[RemoteSigner]) -> Vec<Self> {
        signers
            .iter()
            .enumerate()
            .map(|(index, signer)| Self::project(index, signer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(key: Option<&str>, email: &str, type_code: Option<&str>) -> RemoteSigner {
        RemoteSigner {
            key_signer: key.map(str::to_string),
            email: email.to_string(),
            type_code: type_code.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(SignerRole::Approve.action_code(), 2);
        assert_eq!(SignerRole::Witness.action_code(), 5);
        assert_eq!(SignerRole::Represent.action_code(), 4);
        assert_eq!(SignerRole::Receive.action_code(), 7);
        assert_eq!(SignerRole::Sign.action_code(), 1);
        assert_eq!(SignerRole::from_action_code(" 7"), Some(SignerRole::Receive));
        assert_eq!(SignerRole::from_action_code("3"), None);
    }

    #[test]
    fn test_row_key_fallbacks() {
        assert_eq!(SignerRow::project(0, &remote(Some("k1"), "a@b.com", None)).key, "k1");
        assert_eq!(SignerRow::project(0, &remote(None, "a@b.com", None)).key, "a@b.com");
        assert_eq!(SignerRow::project(3, &remote(Some(""), "", None)).key, "row-3");
    }

    #[test]
    fn test_row_action_labels() {
        assert_eq!(
            SignerRow::project(0, &remote(None, "a@b.com", Some("1"))).action_label,
            "Sign"
        );
        assert_eq!(
            SignerRow::project(0, &remote(None, "a@b.com", Some("2"))).action_label,
            "Approve"
        );

        let mut witness = remote(None, "a@b.com", Some("5"));
        witness.nomenclature = Some("Testemunha".to_string());
        assert_eq!(SignerRow::project(0, &witness).action_label, "Testemunha");

        assert_eq!(
            SignerRow::project(0, &remote(None, "a@b.com", Some("9"))).action_label,
            "Sign"
        );
    }

    #[test]
    fn test_row_signature_label_and_position() {
        let mut signer = remote(Some("k"), "a@b.com", Some("1"));
        signer.certificate_flag = Some("1".to_string());

        let rows = SignerRow::project_all(&[remote(Some("j"), "c@d.com", None), signer]);
        assert_eq!(rows[0].signature_label, "Normal");
        assert_eq!(rows[1].signature_label, "ICP-Brasil");
        assert_eq!(rows[1].order_index, 2);
    }

    #[test]
    fn test_payload_from_signer() {
        let signer = Signer {
            email: "ana@acme.com".to_string(),
            name: "Ana".to_string(),
            cpf: "12345678909".to_string(),
            role: SignerRole::Witness,
            signature_kind: SignatureKind::Certificate,
            certificate: Some("A1".to_string()),
            order: 2,
            remote_key: None,
        };
        let payload = signer.payload();
        assert_eq!(payload.act, "5");
        assert_eq!(payload.certificate, "1");
    }
}
