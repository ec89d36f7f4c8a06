//! IAM policy primitives.
//!
//! Canonical JSON shapes:
//! - Document: `{"Version": "2012-10-17", "Statement": [...], "Id"?: "..."}`
//! - Statement: `{"Sid"?, "Principal"?, "NotPrincipal"?, "Effect", "Action",
//!   "NotAction"?, "Resource"?, "NotResource"?, "Condition"?}`
//!
//! `Action`, `Resource` and principal id lists accept a bare string on input
//! and are always written as arrays.

mod condition;
mod policy_document;
mod principal;
mod statement;
mod string_list;
mod tag;

pub use condition::{ConditionOperator, Conditions};
pub use policy_document::{CURRENT_VERSION, PolicyDocument};
pub use principal::{PrincipalType, Principals};
pub use statement::{Effect, StatementEntry};
pub use string_list::{ANY, Actions, PrincipalIds, Resources};
pub use tag::{Tag, Tags, tag_list};
