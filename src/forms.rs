//! Form bodies and the checks made on them before anything is stored.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{ContactDraft, ProfileDraft, ProjectDraft, Socials, NO_SUBJECT};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please select an image file")]
    NotAnImage,
}

/// Splits `"React, Go,  Rust"` into trimmed, non-empty entries.
pub fn split_tags(input: &str) -> Vec<String> {
    input.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Blank means absent.
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<ContactDraft, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !EMAIL.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        let subject = match self.subject.trim() {
            "" => NO_SUBJECT,
            subject => subject,
        };

        Ok(ContactDraft {
            name: name.to_owned(),
            email: email.to_owned(),
            subject: subject.to_owned(),
            message: message.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub bio: String,
    pub location: String,
    /// Comma separated.
    pub skills: String,
    pub github: String,
    pub twitter: String,
    pub email: String,
}

impl ProfileForm {
    pub fn into_draft(self) -> Result<ProfileDraft, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(ProfileDraft {
            name: self.name.trim().to_owned(),
            bio: self.bio.trim().to_owned(),
            location: self.location.trim().to_owned(),
            skills: split_tags(&self.skills),
            socials: Socials {
                github: optional(&self.github),
                twitter: optional(&self.twitter),
                email: optional(&self.email),
            },
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    /// Comma separated.
    pub stack: String,
    pub github: String,
    pub live: String,
    pub image: String,
}

impl ProjectForm {
    pub fn into_draft(self) -> Result<ProjectDraft, ValidationError> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(ProjectDraft {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            stack: split_tags(&self.stack),
            github: optional(&self.github),
            live: optional(&self.live),
            image: optional(&self.image),
        })
    }
}

/// Raster formats accepted for upload. Anything else could be served back as
/// active content from the site's own origin.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

fn allowed_image(ext: &str) -> Option<String> {
    let ext = ext.trim().to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Extension for a stored upload, from the client's file name or failing that
/// the image subtype. Both have to name an allowed raster format.
pub fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> Result<String, ValidationError> {
    let subtype = content_type
        .and_then(|ct| ct.strip_prefix("image/"))
        .and_then(|s| s.split(';').next())
        .and_then(allowed_image)
        .ok_or(ValidationError::NotAnImage)?;

    match file_name.and_then(|name| name.rsplit_once('.')) {
        Some((_, ext)) => allowed_image(ext).ok_or(ValidationError::NotAnImage),
        None => Ok(subtype),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str, subject: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            email: email.to_owned(),
            subject: subject.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn blank_subject_gets_placeholder() {
        let draft = contact("Ana", "ana@x.com", "", "Hi").validate().unwrap();
        assert_eq!(draft.subject, "No subject");
        assert_eq!(draft.name, "Ana");

        let draft = contact("Ana", "ana@x.com", "   ", "Hi").validate().unwrap();
        assert_eq!(draft.subject, NO_SUBJECT);
    }

    #[test]
    fn fields_are_trimmed() {
        let draft = contact("  Ana ", " ana@x.com ", " Hello ", " Hi\n").validate().unwrap();
        assert_eq!(draft, ContactDraft {
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            subject: "Hello".to_owned(),
            message: "Hi".to_owned(),
        });
    }

    #[test]
    fn required_fields() {
        assert_eq!(contact("", "ana@x.com", "", "Hi").validate(), Err(ValidationError::MissingFields));
        assert_eq!(contact("Ana", " ", "", "Hi").validate(), Err(ValidationError::MissingFields));
        assert_eq!(contact("Ana", "ana@x.com", "Subject", "  ").validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn email_shape() {
        for bad in ["ana", "ana@x", "@.", "ana at x.com"] {
            assert_eq!(contact("Ana", bad, "", "Hi").validate(), Err(ValidationError::InvalidEmail), "{bad}");
        }
        assert!(contact("Ana", "a@b.c", "", "Hi").validate().is_ok());
    }

    #[test]
    fn tags_split_on_commas() {
        assert_eq!(split_tags("React, Go,  Rust"), ["React", "Go", "Rust"]);
        assert_eq!(split_tags("React,,Go, "), ["React", "Go"]);
        assert!(split_tags("").is_empty());
        assert_eq!(join_tags(&split_tags("a,b")), "a, b");
    }

    #[test]
    fn project_form_blanks_become_none() {
        let draft = ProjectForm {
            title: "Shop".to_owned(),
            description: "A store".to_owned(),
            stack: "React, Node.js".to_owned(),
            github: " ".to_owned(),
            live: "https://shop.example".to_owned(),
            image: String::new(),
        }.into_draft().unwrap();

        assert_eq!(draft.github, None);
        assert_eq!(draft.live.as_deref(), Some("https://shop.example"));
        assert_eq!(draft.image, None);
        assert_eq!(draft.stack, ["React", "Node.js"]);
    }

    #[test]
    fn project_needs_title_and_description() {
        let form = ProjectForm { title: "Shop".to_owned(), ..Default::default() };
        assert_eq!(form.into_draft(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn profile_form_keeps_duplicate_skills() {
        let draft = ProfileForm {
            name: "Ana".to_owned(),
            skills: "Rust, Go, Rust".to_owned(),
            twitter: "https://twitter.com/ana".to_owned(),
            ..Default::default()
        }.into_draft().unwrap();
        assert_eq!(draft.skills, ["Rust", "Go", "Rust"]);
        assert_eq!(draft.socials.github, None);
        assert!(draft.socials.twitter.is_some());
    }

    #[test]
    fn image_extensions() {
        assert_eq!(image_extension(Some("shot.PNG"), Some("image/png")).unwrap(), "png");
        assert_eq!(image_extension(Some("shot"), Some("image/jpeg")).unwrap(), "jpeg");
        assert_eq!(image_extension(Some("shot.webp"), Some("image/webp; q=1")).unwrap(), "webp");
        assert_eq!(image_extension(Some("evil.html"), Some("image/png")), Err(ValidationError::NotAnImage));
        assert_eq!(image_extension(Some("logo.svg"), Some("image/svg+xml")), Err(ValidationError::NotAnImage));
        assert_eq!(image_extension(None, Some("image/svg+xml")), Err(ValidationError::NotAnImage));
        assert_eq!(image_extension(Some("shot.png"), Some("image/x-icon")), Err(ValidationError::NotAnImage));
        assert_eq!(image_extension(Some("doc.pdf"), Some("application/pdf")), Err(ValidationError::NotAnImage));
        assert_eq!(image_extension(Some("x.png"), None), Err(ValidationError::NotAnImage));
    }
}
