use serde::{Deserialize, Serialize};

use super::{SignatureKind, Signer, SignerRole};
use crate::form::{
    Choice, FieldDescriptor, FieldKind, FieldValue, FormSchema, FormValues, Rule,
    ValidationErrors,
};

/// Signer form values as submitted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignerForm {
    #[serde(default)]
    pub signatory_name: String,
    #[serde(default)]
    pub signatory_cpf: String,
    #[serde(default)]
    pub signatory_email: String,
    /// Action code of the selected role ("2" = approve, ...).
    #[serde(default)]
    pub signatory_type: String,
    /// Id of the selected [`SignatureKind`].
    #[serde(default)]
    pub signature_type: String,
    #[serde(default)]
    pub signature_certificate: Option<String>,
    #[serde(default)]
    pub signatory_order: Option<FieldValue>,
}

impl SignerForm {
    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new()
            .text("signatory_name", &self.signatory_name)
            .text("signatory_cpf", &self.signatory_cpf)
            .text("signatory_email", &self.signatory_email)
            .text("signatory_type", &self.signatory_type)
            .text("signature_type", &self.signature_type);
        if let Some(certificate) = &self.signature_certificate {
            values = values.text("signature_certificate", certificate);
        }
        if let Some(order) = &self.signatory_order {
            values = values.value("signatory_order", order.clone());
        }
        values
    }

    /// Validate against [`signer_form_schema`] and build the signer.
    pub fn into_signer(self) -> Result<Signer, ValidationErrors> {
        signer_form_schema().validate(&self.values())?;

        let role = SignerRole::from_action_code(&self.signatory_type).ok_or_else(|| {
            ValidationErrors::single("signatory_type", "Unknown signatory type")
        })?;
        let signature_kind = SignatureKind::from_id(&self.signature_type).ok_or_else(|| {
            ValidationErrors::single("signature_type", "Unknown signature type")
        })?;
        let order = match &self.signatory_order {
            Some(FieldValue::Number(n)) => u32::try_from(*n).ok(),
            Some(FieldValue::Text(s)) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            ValidationErrors::single("signatory_order", "Signature position is out of range")
        })?;

        let certificate = match signature_kind {
            SignatureKind::Certificate => self
                .signature_certificate
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            _ => None,
        };

        Ok(Signer {
            email: self.signatory_email.trim().to_string(),
            name: self.signatory_name.trim().to_string(),
            cpf: self.signatory_cpf.trim().to_string(),
            role,
            signature_kind,
            certificate,
            order,
            remote_key: None,
        })
    }
}

/// Form used to add a signatory.
pub fn signer_form_schema() -> FormSchema {
    let roles = SignerRole::ALL
        .iter()
        .map(|role| Choice::new(role.action_code().to_string(), role.label()))
        .collect();
    let kinds = SignatureKind::ALL
        .iter()
        .map(|kind| Choice::new(kind.id(), kind.label()))
        .collect();

    FormSchema::new(
        "signer",
        vec![
            FieldDescriptor::new("signatory_name", "Signatory name", FieldKind::Text)
                .required()
                .with_placeholder("Enter the signatory's name"),
            FieldDescriptor::new("signatory_cpf", "Signatory CPF", FieldKind::Text)
                .required()
                .with_placeholder("Enter the signatory's CPF")
                .with_rule(Rule::DigitCount { digits: 11 }),
            FieldDescriptor::new("signatory_email", "Signatory e-mail", FieldKind::Email)
                .required()
                .with_placeholder("Enter the signatory's e-mail"),
            FieldDescriptor::new(
                "signatory_type",
                "Signatory type",
                FieldKind::SingleChoice(roles),
            )
            .required(),
            FieldDescriptor::new(
                "signature_type",
                "Signature type",
                FieldKind::SingleChoice(kinds),
            )
            .required(),
            FieldDescriptor::new("signature_certificate", "Certificate", FieldKind::Text)
                .hidden()
                .with_rule(Rule::RequiredWhen {
                    field: "signature_type".to_string(),
                    equals: SignatureKind::Certificate.id().to_string(),
                }),
            FieldDescriptor::new("signatory_order", "Signature position", FieldKind::Number)
                .required()
                .with_placeholder("Position of this signatory")
                .with_rule(Rule::Positive),
        ],
    )
}
