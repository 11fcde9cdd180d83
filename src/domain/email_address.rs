use validator::validate_email;

/// A recipient or sender address accepted by `validator`'s e-mail check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(email: String) -> Result<EmailAddress, String> {
        let is_valid_email = validate_email(&email);

        if !is_valid_email {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
