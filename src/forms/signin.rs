use crate::api::auth::LoginRequest;
use crate::forms::ValidationErrors;

/// Shown when a sign-in fails and the server did not say why.
pub const SIGN_IN_FAILED: &str = "Invalid email or password";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are required. The values are sent as typed.
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "Please enter email");
        }
        if self.password.is_empty() {
            errors.add("password", "Please enter password");
        }
        errors.into_result(|| LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}
