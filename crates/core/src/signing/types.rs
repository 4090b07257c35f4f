use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SigningWorkflow;

/// Result of a primary upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub uuid: String,
}

/// Lifecycle of a remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    ReadyToSign,
    Signing,
    Done,
    Canceled,
}

impl DocumentStatus {
    /// Map the service's numeric `statusId`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" | "7" => Some(DocumentStatus::Draft),
            "2" => Some(DocumentStatus::ReadyToSign),
            "3" => Some(DocumentStatus::Signing),
            "4" | "5" => Some(DocumentStatus::Done),
            "6" => Some(DocumentStatus::Canceled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::ReadyToSign => "ready_to_sign",
            DocumentStatus::Signing => "signing",
            DocumentStatus::Done => "done",
            DocumentStatus::Canceled => "canceled",
        }
    }
}

/// A document as tracked by the signing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct RemoteDocument {
    pub uuid: String,
    pub name: String,
    pub status: DocumentStatus,
    /// Raw `statusId` as returned by the service.
    pub status_code: String,
    /// Human-readable status from the service.
    pub status_label: String,
}

impl RemoteDocument {
    /// Signers can still be added or removed.
    pub fn accepts_signer_changes(&self) -> bool {
        self.status == DocumentStatus::ReadyToSign
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "uuidDoc")]
    uuid_doc: String,
    #[serde(rename = "nameDoc", default)]
    name_doc: String,
    #[serde(rename = "statusId", deserialize_with = "string_or_number")]
    status_id: String,
    #[serde(rename = "statusName", default)]
    status_name: String,
}

impl TryFrom<RawDocument> for RemoteDocument {
    type Error = String;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let status = DocumentStatus::from_code(&raw.status_id)
            .ok_or_else(|| format!("unknown document status id: {}", raw.status_id))?;
        Ok(Self {
            uuid: raw.uuid_doc,
            name: raw.name_doc,
            status,
            status_code: raw.status_id,
            status_label: raw.status_name,
        })
    }
}

/// A signer record as returned by the signing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSigner {
    #[serde(default)]
    pub key_signer: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "user_name", default)]
    pub name: Option<String>,
    #[serde(rename = "user_document", default)]
    pub document: Option<String>,
    /// Numeric action code ("1" = sign, "2" = approve, ...).
    #[serde(rename = "type", default, deserialize_with = "opt_string_or_number")]
    pub type_code: Option<String>,
    /// Free-text action name, used when the code is not a known one.
    #[serde(rename = "nomenclatura", default)]
    pub nomenclature: Option<String>,
    #[serde(
        rename = "certificadoicpbr",
        default,
        deserialize_with = "opt_string_or_number"
    )]
    pub certificate_flag: Option<String>,
}

/// Payload registering one signer on a document.
///
/// Identity checks the service offers (selfie, PIX, SMS, ...) are always off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerPayload {
    pub email: String,
    pub act: String,
    pub foreign: String,
    #[serde(rename = "certificadoicpbr")]
    pub certificate: String,
    #[serde(rename = "assinatura_presencial")]
    pub in_person: String,
    pub docauth: String,
    pub docauthandselfie: String,
    pub embed_methodauth: String,
    pub embed_smsnumber: String,
    pub upload_allow: String,
    pub upload_obs: String,
    pub password_code: String,
    pub auth_pix: String,
    pub videoselfie: String,
    pub d4sign_score: String,
}

impl SignerPayload {
    pub fn new(email: impl Into<String>, action_code: u8, certificate: bool) -> Self {
        let off = || "0".to_string();
        Self {
            email: email.into(),
            act: action_code.to_string(),
            foreign: off(),
            certificate: if certificate { "1" } else { "0" }.to_string(),
            in_person: off(),
            docauth: off(),
            docauthandselfie: off(),
            embed_methodauth: "email".to_string(),
            embed_smsnumber: String::new(),
            upload_allow: off(),
            upload_obs: String::new(),
            password_code: String::new(),
            auth_pix: off(),
            videoselfie: off(),
            d4sign_score: off(),
        }
    }
}

/// Outcome of a signer add/remove call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerMutation {
    pub status: u16,
    /// Created signer, present on successful additions.
    pub signer: Option<RemoteSigner>,
}

/// Options for releasing a document to its signers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_email: bool,
    pub workflow: SigningWorkflow,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
