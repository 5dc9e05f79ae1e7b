//! Results of ownership-checked mutations.
//!
//! A refused mutation is not an error: the actor is sent to a safe view and
//! the record stays untouched.

use std::fmt;

/// Where a request ends up after a mutation or a refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Index,
    AllGroups,
    Profile { username: String },
    Post { username: String, post_id: i64 },
    /// Arbitrary path, e.g. the page a like was toggled from.
    Path(String),
}

impl Redirect {
    pub fn profile(username: impl Into<String>) -> Self {
        Self::Profile {
            username: username.into(),
        }
    }

    pub fn post(username: impl Into<String>, post_id: i64) -> Self {
        Self::Post {
            username: username.into(),
            post_id,
        }
    }

    /// Location header value.
    pub fn location(&self) -> String {
        match self {
            Redirect::Index => "/".to_string(),
            Redirect::AllGroups => "/allgroups/".to_string(),
            Redirect::Profile { username } => format!("/{username}/"),
            Redirect::Post { username, post_id } => format!("/{username}/{post_id}/"),
            Redirect::Path(path) => path.clone(),
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Mutation result: performed, or refused with a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Redirect(Redirect),
}
