use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;
// The name becomes `<name>.crt` inside the certificate directory.
const FORBIDDEN_CHARS: [char; 3] = ['/', '\\', '\0'];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClientName(String);

impl ClientName {
    pub fn parse(name: String) -> Result<ClientName, String> {
        let is_empty_or_whitespace = name.trim().is_empty();
        let is_too_long = name.graphemes(true).count() > MAX_CHAR_LENGHT;
        let contains_forbidden_chars = name.chars().any(|char| FORBIDDEN_CHARS.contains(&char));
        let is_relative_path = name == "." || name == "..";

        if is_empty_or_whitespace || is_too_long || contains_forbidden_chars || is_relative_path {
            return Err(format!("{} is not a valid client name", name));
        }

        Ok(Self(name))
    }

    /// File name of the certificate issued to this client.
    pub fn certificate_file_name(&self) -> String {
        format!("{}.crt", self.0)
    }
}

impl TryFrom<String> for ClientName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClientName::parse(value)
    }
}

impl AsRef<str> for ClientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
