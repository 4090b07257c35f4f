use serde::{Deserialize, Serialize};

use crate::attachment::{Attachment, AttachmentId};
use crate::form::{Choice, FieldDescriptor, FieldKind, FormSchema, FormValues, ValidationErrors};

/// Document form values as submitted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentForm {
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub primary_attachment: Option<AttachmentId>,
    /// Uploaded in this order.
    #[serde(default)]
    pub secondary_attachments: Vec<AttachmentId>,
}

impl DocumentForm {
    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new()
            .text("document_name", &self.document_name)
            .choices(
                "secondary_attachments",
                self.secondary_attachments
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
            );
        if let Some(primary) = self.primary_attachment {
            values = values.text("primary_attachment", primary.to_string());
        }
        values
    }

    /// Validate against the ticket's attachments and pick the selected files.
    ///
    /// Returns the primary attachment and the secondaries in selection order.
    pub fn resolve<'a>(
        &self,
        attachments: &'a [Attachment],
    ) -> Result<(&'a Attachment, Vec<&'a Attachment>), ValidationErrors> {
        document_form_schema(attachments).validate(&self.values())?;

        let find = |id: AttachmentId| attachments.iter().find(|a| a.id == id);

        let primary = self
            .primary_attachment
            .and_then(find)
            .ok_or_else(|| {
                ValidationErrors::single("primary_attachment", "Primary attachment is required")
            })?;

        if self.secondary_attachments.contains(&primary.id) {
            return Err(ValidationErrors::single(
                "secondary_attachments",
                "The primary attachment cannot also be a secondary attachment",
            ));
        }

        let secondaries = self
            .secondary_attachments
            .iter()
            .filter_map(|id| find(*id))
            .collect();

        Ok((primary, secondaries))
    }
}

/// Form used to create a document from a ticket's attachments.
pub fn document_form_schema(attachments: &[Attachment]) -> FormSchema {
    let choices: Vec<Choice> = attachments
        .iter()
        .map(|a| Choice::new(a.id.to_string(), a.name.clone()))
        .collect();

    FormSchema::new(
        "document",
        vec![
            FieldDescriptor::new("document_name", "Contract name", FieldKind::Text)
                .required()
                .with_placeholder("Enter the contract name"),
            FieldDescriptor::new(
                "primary_attachment",
                "Primary attachment",
                FieldKind::SingleChoice(choices.clone()),
            )
            .required()
            .with_placeholder("File that becomes the signable document"),
            FieldDescriptor::new(
                "secondary_attachments",
                "Secondary attachments",
                FieldKind::MultiChoice(choices),
            )
            .with_placeholder("Attachments are added in the order they are selected"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn attachments() -> Vec<Attachment> {
        vec![
            fixtures::attachment(1, "contract.pdf"),
            fixtures::attachment(2, "annex-a.pdf"),
            fixtures::attachment(3, "annex-b.pdf"),
        ]
    }

    #[test]
    fn test_resolve_keeps_selection_order() {
        let attachments = attachments();
        let form = DocumentForm {
            document_name: "Contract".to_string(),
            primary_attachment: Some(1),
            secondary_attachments: vec![3, 2],
        };

        let (primary, secondaries) = form.resolve(&attachments).unwrap();
        assert_eq!(primary.id, 1);
        assert_eq!(
            secondaries.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![3, 2]
        );
    }

    #[test]
    fn test_name_and_primary_required() {
        let errors = DocumentForm::default().resolve(&attachments()).unwrap_err();
        assert!(errors.get("document_name").is_some());
        assert!(errors.get("primary_attachment").is_some());
    }

    #[test]
    fn test_unknown_attachment_rejected() {
        let form = DocumentForm {
            document_name: "Contract".to_string(),
            primary_attachment: Some(99),
            secondary_attachments: vec![],
        };
        let errors = form.resolve(&attachments()).unwrap_err();
        assert!(errors
            .get("primary_attachment")
            .unwrap()
            .contains("unknown option"));
    }

    #[test]
    fn test_primary_cannot_be_secondary() {
        let form = DocumentForm {
            document_name: "Contract".to_string(),
            primary_attachment: Some(1),
            secondary_attachments: vec![1],
        };
        let errors = form.resolve(&attachments()).unwrap_err();
        assert!(errors.get("secondary_attachments").is_some());
    }
}
