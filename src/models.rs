use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Subject stored for contact messages sent without one.
pub const NO_SUBJECT: &str = "No subject";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The site owner. There is at most one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub location: String,
    pub skills: Vec<String>,
    pub socials: Socials,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub bio: String,
    pub location: String,
    pub skills: Vec<String>,
    pub socials: Socials,
}

impl ProfileDraft {
    pub fn into_profile(self, id: Uuid) -> Profile {
        let ProfileDraft { name, bio, location, skills, socials } = self;
        Profile { id, name, bio, location, skills, socials }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub stack: Vec<String>,
    pub github: Option<String>,
    pub live: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub stack: Vec<String>,
    pub github: Option<String>,
    pub live: Option<String>,
    pub image: Option<String>,
}

impl ProjectDraft {
    pub fn into_project(self, id: Uuid) -> Project {
        let ProjectDraft { title, description, stack, github, live, image } = self;
        Project { id, title, description, stack, github, live, image }
    }
}

/// A message left through the public contact form.
///
/// `replied` implies `read`. The only way to change either flag is through
/// [`Contact::apply`] (or the store's `update_contact`), and neither
/// transition can clear a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: OffsetDateTime,
    pub read: bool,
    pub replied: bool,
}

/// A validated contact form submission, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    New,
    Read,
    Replied,
}

impl ContactState {
    pub fn label(&self) -> &'static str {
        use ContactState::*;
        match self {
            New => "New",
            Read => "Read",
            Replied => "Replied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPatch {
    MarkRead,
    /// Replying implies having read.
    MarkReplied,
}

impl Contact {
    pub fn state(&self) -> ContactState {
        if self.replied {
            ContactState::Replied
        } else if self.read {
            ContactState::Read
        } else {
            ContactState::New
        }
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }

    pub fn mark_replied(&mut self) {
        self.read = true;
        self.replied = true;
    }

    pub fn apply(&mut self, patch: ContactPatch) {
        match patch {
            ContactPatch::MarkRead => self.mark_read(),
            ContactPatch::MarkReplied => self.mark_replied(),
        }
    }
}
