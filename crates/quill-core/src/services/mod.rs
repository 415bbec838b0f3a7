//! Content service - CRUD plus ownership rules for posts, comments and users.
//!
//! Every operation is a short sequence of store calls. Checks that precede a
//! write (ownership, username availability) are not atomic with that write; a
//! concurrent request can slip in between.

mod comments;
mod posts;
mod users;

pub use comments::{CommentService, NewComment};
pub use posts::{NewPost, PostChanges, PostService};
pub use users::{ProfileInput, UserService};

use crate::error::DomainError;

/// Ownership is the only authorization rule: the acting principal must equal the owner.
fn ensure_owner(
    entity_type: &'static str,
    id: impl ToString,
    owner: &str,
    actor: Option<&str>,
) -> Result<(), DomainError> {
    if actor == Some(owner) {
        return Ok(());
    }
    let id = id.to_string();
    tracing::warn!(
        entity = entity_type,
        id = %id,
        actor = actor.unwrap_or("<none>"),
        "Rejected modification by non-owner"
    );
    Err(DomainError::forbidden(entity_type, id))
}
