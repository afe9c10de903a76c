pub mod client;
pub mod form;

pub use client::{ClientSummary, OAuthClient};
pub use form::{
    redirect_uri_index, ClientDetails, LogoUpdateOption, LogoUpload, MissingField, NewClientForm,
    UpdateClientForm,
};
