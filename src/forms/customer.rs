use crate::api::Part;
use crate::forms::ValidationErrors;
use crate::model::{CustomerField, DocumentKind};
use crate::{utils, Result};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

pub(crate) const CUSTOMER_CREATED: &str = "Customer created successfully";
pub(crate) const CUSTOMER_CREATE_FAILED: &str = "Failed to create customer";

/// A document read from disk, to be uploaded with a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: DocumentKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub async fn read(kind: DocumentKind, path: &Path) -> Result<Self> {
        let bytes = utils::read_bytes(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("{} does not name a file", path.display()))?;
        Ok(Self {
            kind,
            file_name,
            bytes,
        })
    }
}

/// The customer registration form. Text fields are sent only when they are not blank; documents
/// are sent as file parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub is_borrower: bool,
    pub is_lender: bool,
    pub company_id: String,
    fields: BTreeMap<CustomerField, String>,
    attachments: BTreeMap<DocumentKind, Attachment>,
}

impl CustomerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: CustomerField, value: impl Into<String>) -> &mut Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: CustomerField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Replaces any earlier document of the same kind.
    pub fn attach(&mut self, attachment: Attachment) -> &mut Self {
        self.attachments.insert(attachment.kind, attachment);
        self
    }

    pub fn detach(&mut self, kind: DocumentKind) -> Option<Attachment> {
        self.attachments.remove(&kind)
    }

    /// Builds the multipart body.
    pub fn validate(&self) -> std::result::Result<Vec<Part>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !self.is_borrower && !self.is_lender {
            errors.add(
                ValidationErrors::FORM,
                "Select at least one: Borrower or Lender",
            );
            return Err(errors);
        }

        let missing: Vec<CustomerField> = CustomerField::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.get(*f).trim().is_empty())
            .collect();
        let company_missing = self.company_id.trim().is_empty();
        if !missing.is_empty() || company_missing {
            errors.add(ValidationErrors::FORM, "Please fill all required fields (*)");
            for field in missing {
                errors.add(field.to_string(), "Required");
            }
            if company_missing {
                errors.add("companyId", "Required");
            }
            return Err(errors);
        }
        if self.company_id.trim().parse::<u64>().is_err() {
            errors.add("companyId", "Must be a company id");
        }

        errors.into_result(|| {
            let mut parts = vec![
                Part::Text {
                    name: "isBorrower".to_string(),
                    value: self.is_borrower.to_string(),
                },
                Part::Text {
                    name: "isLender".to_string(),
                    value: self.is_lender.to_string(),
                },
                Part::Text {
                    name: "companyId".to_string(),
                    value: self.company_id.trim().to_string(),
                },
            ];
            parts.extend(CustomerField::ALL.into_iter().filter_map(|field| {
                super::non_blank(self.get(field)).map(|value| Part::Text {
                    name: field.to_string(),
                    value,
                })
            }));
            parts.extend(self.attachments.values().map(|a| Part::File {
                name: a.kind.part_name().to_string(),
                file_name: a.file_name.clone(),
                bytes: a.bytes.clone(),
            }));
            parts
        })
    }
}
