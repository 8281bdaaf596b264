//! Login: normalización de módulos e inferencia de rol

pub mod login;
pub mod modules;

pub use login::{interpret_login, LoginOutcome};
pub use modules::{extract_modules, infer_admin, AdminDecision, AdminRule};
