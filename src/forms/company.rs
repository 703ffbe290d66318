use crate::forms::ValidationErrors;
use crate::model::CreateCompanyPayload;

pub const COMPANY_NAME_MAX: usize = 150;
pub const COMPANY_DESC_MAX: usize = 500;

pub(crate) const COMPANY_CREATED: &str = "Company created sucessfully";
pub(crate) const COMPANY_CREATE_FAILED: &str = "Failed to create company";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub company_name: String,
    pub company_desc: String,
}

impl CompanyForm {
    pub fn new(company_name: impl Into<String>, company_desc: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            company_desc: company_desc.into(),
        }
    }

    /// The name is trimmed before it is sent; an empty description is sent as `null`.
    pub fn validate(&self) -> Result<CreateCompanyPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.company_name.trim().is_empty() {
            errors.add("companyName", "Company name is required");
        } else if self.company_name.chars().count() > COMPANY_NAME_MAX {
            errors.add(
                "companyName",
                "Company name must be less than 150 characters",
            );
        }
        if self.company_desc.chars().count() > COMPANY_DESC_MAX {
            errors.add("companyDesc", "Description must be less than 500 characters");
        }
        errors.into_result(|| CreateCompanyPayload {
            company_name: self.company_name.trim().to_string(),
            company_desc: if self.company_desc.is_empty() {
                None
            } else {
                Some(self.company_desc.clone())
            },
        })
    }
}
