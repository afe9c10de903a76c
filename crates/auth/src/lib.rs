pub mod error;
pub mod guard;
pub mod logo;
pub mod secrets;
pub mod service;

pub use error::{ClientError, Result};
pub use guard::authorize;
pub use logo::{LogoChange, LogoSaga};
pub use service::ClientService;
