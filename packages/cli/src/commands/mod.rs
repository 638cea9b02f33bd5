pub mod apply;
pub mod init;
pub mod inspect;
pub mod prefs;
pub mod resolve;
pub mod validate;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use prefs::{prefs, PrefsArgs};
pub use resolve::{resolve, ResolveArgs};
pub use validate::{validate, ValidateArgs};
