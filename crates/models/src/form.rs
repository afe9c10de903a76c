use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidateUrl, ValidationError};

/// Uploaded logo file as received from a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub data: Vec<u8>,
}

impl LogoUpload {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Browsers submit an empty part when no file was picked
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Submitted fields for client registration (POST /app)
///
/// Only recognised field names are carried; anything else in the request is
/// dropped before it gets here.
#[derive(Debug, Clone, Default)]
pub struct NewClientForm {
    pub client_name: Option<String>,
    pub client_uri: Option<String>,
    pub redirect_uris: Vec<String>,
    pub logo: Option<LogoUpload>,
}

/// Submitted fields for a full client update (PUT /app/:client_id)
#[derive(Debug, Clone, Default)]
pub struct UpdateClientForm {
    pub client_name: Option<String>,
    pub client_uri: Option<String>,
    pub logo_update_option: Option<String>,
    pub redirect_uris: Vec<String>,
    pub logo: Option<LogoUpload>,
}

/// Name of a required form field that was absent or blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Display and redirect fields shared by create and update, after presence checks
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ClientDetails {
    #[validate(length(min = 1, max = 255))]
    pub client_name: String,

    #[validate(length(max = 2048), custom(function = "validate_web_url"))]
    pub client_uri: String,

    #[validate(custom(function = "validate_redirect_uris"))]
    pub redirect_uris: Vec<String>,
}

impl NewClientForm {
    pub fn details(&self) -> Result<ClientDetails, MissingField> {
        Ok(ClientDetails {
            client_name: required(&self.client_name, "client_name")?,
            client_uri: required(&self.client_uri, "client_uri")?,
            redirect_uris: self.redirect_uris.clone(),
        })
    }

    /// The attached logo, ignoring empty file parts
    pub fn logo(&self) -> Option<&LogoUpload> {
        self.logo.as_ref().filter(|logo| !logo.is_empty())
    }
}

impl UpdateClientForm {
    pub fn details(&self) -> Result<ClientDetails, MissingField> {
        Ok(ClientDetails {
            client_name: required(&self.client_name, "client_name")?,
            client_uri: required(&self.client_uri, "client_uri")?,
            redirect_uris: self.redirect_uris.clone(),
        })
    }

    pub fn logo(&self) -> Option<&LogoUpload> {
        self.logo.as_ref().filter(|logo| !logo.is_empty())
    }

    /// Parsed `logo_update_option`; absent means no change
    pub fn logo_option(&self) -> Result<LogoUpdateOption, String> {
        match self.logo_update_option.as_deref().map(str::trim) {
            None | Some("") => Ok(LogoUpdateOption::NoChange),
            Some(value) => value.parse(),
        }
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, MissingField> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(MissingField(field))
}

/// What to do with the stored logo on update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoUpdateOption {
    /// Replace the logo with the attached file
    Update,

    /// Drop the stored logo and fall back to the default
    Delete,

    /// Keep the current logo, even if a file is attached
    NoChange,
}

impl fmt::Display for LogoUpdateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoUpdateOption::Update => write!(f, "update"),
            LogoUpdateOption::Delete => write!(f, "delete"),
            LogoUpdateOption::NoChange => write!(f, "no-change"),
        }
    }
}

impl FromStr for LogoUpdateOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(LogoUpdateOption::Update),
            "delete" => Ok(LogoUpdateOption::Delete),
            "no-change" => Ok(LogoUpdateOption::NoChange),
            _ => Err(format!("Invalid logo update option: {}", s)),
        }
    }
}

/// Index `N` of a `redirect_uriN` form field
pub fn redirect_uri_index(field_name: &str) -> Option<u32> {
    REDIRECT_URI_FIELD
        .captures(field_name)
        .and_then(|caps| caps[1].parse().ok())
        .filter(|index| *index > 0)
}

fn validate_web_url(value: &str) -> Result<(), ValidationError> {
    if value.validate_url() && WEB_URL_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

fn validate_redirect_uris(uris: &[String]) -> Result<(), ValidationError> {
    for uri in uris {
        validate_web_url(uri)?;
    }
    Ok(())
}

lazy_static::lazy_static! {
    static ref REDIRECT_URI_FIELD: regex::Regex = regex::Regex::new(r"^redirect_uri(\d+)$").unwrap();
    static ref WEB_URL_REGEX: regex::Regex = regex::Regex::new(r"^https?://[^\s/?#]+").unwrap();
}
