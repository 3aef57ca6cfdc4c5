//! Who may do what with a note.
use crate::{Identity, Note};

/// Access rules for notes. Every rule is a pure function of the identity and
/// the note; anonymous identities are refused everything.
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn can_list(identity: &Identity) -> bool {
        identity.is_authenticated()
    }

    pub fn can_create(identity: &Identity) -> bool {
        identity.is_authenticated()
    }

    pub fn can_view(identity: &Identity, note: &Note) -> bool {
        Self::is_author(identity, note)
    }

    pub fn can_modify(identity: &Identity, note: &Note) -> bool {
        Self::is_author(identity, note)
    }

    fn is_author(identity: &Identity, note: &Note) -> bool {
        identity
            .user_id()
            .is_some_and(|user| note.is_authored_by(user))
    }
}
