//! Client-side narrowing of whole collections.
//!
//! Every page fetches its collection in full and filters it in memory. The
//! text search and the category/status filter must both pass for a record to
//! be kept.

use std::collections::BTreeSet;

use crate::models::{Contact, Project};

pub trait Searchable {
    /// Free-text fields matched by the search box.
    fn search_fields(&self) -> Vec<&str>;

    /// Tags, matched by both the search box and the category filter.
    fn tags(&self) -> &[String];
}

impl Searchable for Project {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.stack
    }
}

impl Searchable for Contact {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.subject.as_str(), self.message.as_str()]
    }

    fn tags(&self) -> &[String] {
        &[]
    }
}

pub fn matches_search<R: Searchable>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();

    record.search_fields()
        .into_iter()
        .chain(record.tags().iter().map(String::as_str))
        .any(|field| field.to_lowercase().contains(&term))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TechFilter {
    #[default]
    All,
    Tech(String),
}

impl TechFilter {
    /// `"all"` in any case, or nothing at all, disables the filter.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => TechFilter::All,
            Some(v) if v.eq_ignore_ascii_case("all") => TechFilter::All,
            Some(v) => TechFilter::Tech(v.to_owned()),
        }
    }

    pub fn as_query(&self) -> &str {
        match self {
            TechFilter::All => "all",
            TechFilter::Tech(tech) => tech,
        }
    }

    pub fn matches<R: Searchable>(&self, record: &R) -> bool {
        let TechFilter::Tech(tech) = self else {
            return true;
        };
        let tech = tech.to_lowercase();
        record.tags().iter().any(|tag| tag.to_lowercase() == tech)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl StatusFilter {
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("unread") => StatusFilter::Unread,
            Some("read") => StatusFilter::Read,
            _ => StatusFilter::All,
        }
    }

    pub fn as_query(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Unread => "unread",
            StatusFilter::Read => "read",
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Unread => !contact.read,
            StatusFilter::Read => contact.read,
        }
    }
}

pub fn filter_projects(projects: &[Project], term: &str, tech: &TechFilter) -> Vec<Project> {
    projects.iter()
        .filter(|p| matches_search(*p, term) && tech.matches(*p))
        .cloned()
        .collect()
}

pub fn filter_contacts(contacts: &[Contact], term: &str, status: StatusFilter) -> Vec<Contact> {
    contacts.iter()
        .filter(|c| matches_search(*c, term) && status.matches(c))
        .cloned()
        .collect()
}

/// Sorted, de-duplicated union of every tag across `records`, as stored.
/// Blank tags are skipped.
pub fn tag_universe<'a, R, I>(records: I) -> Vec<String>
where
    R: Searchable + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records.into_iter()
        .flat_map(|r| r.tags().iter())
        .filter(|tag| !tag.trim().is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    Frontend,
    Backend,
    Database,
    Tools,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Frontend,
        SkillCategory::Backend,
        SkillCategory::Database,
        SkillCategory::Tools,
    ];

    pub fn label(&self) -> &'static str {
        use SkillCategory::*;
        match self {
            Frontend => "Frontend",
            Backend => "Backend",
            Database => "Database",
            Tools => "Tools",
        }
    }

    fn members(&self) -> &'static [&'static str] {
        use SkillCategory::*;
        match self {
            Frontend => &["React", "Next.js", "TypeScript", "JavaScript", "HTML", "CSS", "Tailwind", "Vue", "Angular", "Svelte"],
            Backend => &["Node.js", "Python", "Java", "PHP", "Express", "Django", "Spring", "Laravel", "FastAPI", "Go"],
            Database => &["PostgreSQL", "MySQL", "MongoDB", "Redis", "Supabase", "Firebase", "SQLite"],
            Tools => &["Git", "Docker", "AWS", "Linux", "Figma", "VS Code", "Vercel", "Netlify"],
        }
    }
}

/// Buckets skills by exact name. Empty buckets are dropped, so an empty result
/// means none of the skills are known and the caller should list them flat.
pub fn categorize_skills(skills: &[String]) -> Vec<(SkillCategory, Vec<String>)> {
    SkillCategory::ALL.into_iter()
        .map(|category| {
            let members = category.members();
            let found = skills.iter()
                .filter(|s| members.contains(&s.as_str()))
                .cloned()
                .collect::<Vec<_>>();
            (category, found)
        })
        .filter(|(_, found)| !found.is_empty())
        .collect()
}
