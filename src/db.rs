use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    include_res,
    models::{Contact, ContactDraft, ContactPatch, Profile, ProfileDraft, Project, ProjectDraft, Socials},
    store::{RecordStore, StoreError, StoreResult, CONTACTS, PROFILE, PROJECTS},
};

// unique: id
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    bio: String,
    location: String,
    skills: String,
    socials: String,
}

// unique: id; listed by rowid
#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    title: String,
    description: String,
    stack: String,
    github: Option<String>,
    live: Option<String>,
    image: Option<String>,
}

// unique: id; created_at is unix millis
#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    name: String,
    email: String,
    subject: String,
    message: String,
    created_at: i64,
    read: bool,
    replied: bool,
}

fn malformed(collection: &'static str, reason: impl ToString) -> StoreError {
    StoreError::Malformed { collection, reason: reason.to_string() }
}

fn parse_id(collection: &'static str, id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| malformed(collection, format!("id {id:?}: {e}")))
}

fn from_json<T: DeserializeOwned>(collection: &'static str, column: &str, json: &str) -> StoreResult<T> {
    serde_json::from_str(json).map_err(|e| malformed(collection, format!("{column}: {e}")))
}

/// A JSON array of strings. `null` is read as no tags.
fn tags(collection: &'static str, column: &str, json: &str) -> StoreResult<Vec<String>> {
    let tags: Option<Vec<String>> = from_json(collection, column, json)?;
    Ok(tags.unwrap_or_default())
}

/// Converts listed rows, leaving out any that don't hold a valid record so one
/// bad row can't take the whole listing down.
fn valid_records<R, T>(collection: &'static str, rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping {collection} row: {e}");
                None
            }
        })
        .collect()
}

fn to_json<T: Serialize>(collection: &'static str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| malformed(collection, e))
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> StoreResult<Self> {
        Ok(Profile {
            id: parse_id(PROFILE, &row.id)?,
            name: row.name,
            bio: row.bio,
            location: row.location,
            skills: tags(PROFILE, "skills", &row.skills)?,
            socials: from_json::<Socials>(PROFILE, "socials", &row.socials)?,
        })
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> StoreResult<Self> {
        Ok(Project {
            id: parse_id(PROJECTS, &row.id)?,
            title: row.title,
            description: row.description,
            stack: tags(PROJECTS, "stack", &row.stack)?,
            github: row.github,
            live: row.live,
            image: row.image,
        })
    }
}

impl TryFrom<ContactRow> for Contact {
    type Error = StoreError;

    fn try_from(row: ContactRow) -> StoreResult<Self> {
        if row.replied && !row.read {
            return Err(malformed(CONTACTS, format!("{} replied but unread", row.id)));
        }
        let created_at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(row.created_at) * 1_000_000)
            .map_err(|e| malformed(CONTACTS, format!("created_at: {e}")))?;

        Ok(Contact {
            id: parse_id(CONTACTS, &row.id)?,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            created_at,
            read: row.read,
            replied: row.replied,
        })
    }
}

fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Millisecond precision, matching what the contacts table keeps.
fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}

fn expect_row(
    result: sqlx::sqlite::SqliteQueryResult,
    collection: &'static str,
    id: Uuid,
) -> StoreResult<()> {
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound { collection, id });
    }
    Ok(())
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await?;
        Self::with_pool(pool).await
    }

    /// A private database living as long as the store. Only one connection is
    /// ever opened, since every new `:memory:` connection is a fresh database.
    pub async fn memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::raw_sql(include_res!(str, "/schema.sql"))
            .execute(&pool)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn profile(&self) -> StoreResult<Option<Profile>> {
        sqlx::query_as::<_, ProfileRow>("SELECT id,name,bio,location,skills,socials FROM profile LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    async fn insert_profile(&self, draft: ProfileDraft) -> StoreResult<Profile> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO profile (id,name,bio,location,skills,socials) VALUES (?,?,?,?,?,?)")
            .bind(id.to_string())
            .bind(&draft.name)
            .bind(&draft.bio)
            .bind(&draft.location)
            .bind(to_json(PROFILE, &draft.skills)?)
            .bind(to_json(PROFILE, &draft.socials)?)
            .execute(&self.pool)
            .await?;

        info!("created profile {id}");
        Ok(draft.into_profile(id))
    }

    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<()> {
        let result = sqlx::query("UPDATE profile SET name=?,bio=?,location=?,skills=?,socials=? WHERE id=?")
            .bind(&draft.name)
            .bind(&draft.bio)
            .bind(&draft.location)
            .bind(to_json(PROFILE, &draft.skills)?)
            .bind(to_json(PROFILE, &draft.socials)?)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        expect_row(result, PROFILE, id)
    }

    async fn projects(&self, limit: Option<u32>) -> StoreResult<Vec<Project>> {
        // LIMIT -1 is unbounded in sqlite
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query_as::<_, ProjectRow>("SELECT id,title,description,stack,github,live,image FROM projects ORDER BY rowid LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(valid_records(PROJECTS, rows))
    }

    async fn project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        sqlx::query_as::<_, ProjectRow>("SELECT id,title,description,stack,github,live,image FROM projects WHERE id=?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn insert_project(&self, draft: ProjectDraft) -> StoreResult<Project> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO projects (id,title,description,stack,github,live,image) VALUES (?,?,?,?,?,?,?)")
            .bind(id.to_string())
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(to_json(PROJECTS, &draft.stack)?)
            .bind(&draft.github)
            .bind(&draft.live)
            .bind(&draft.image)
            .execute(&self.pool)
            .await?;

        info!("created project {id} {:?}", draft.title);
        Ok(draft.into_project(id))
    }

    async fn update_project(&self, id: Uuid, draft: ProjectDraft) -> StoreResult<()> {
        let result = sqlx::query("UPDATE projects SET title=?,description=?,stack=?,github=?,live=?,image=? WHERE id=?")
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(to_json(PROJECTS, &draft.stack)?)
            .bind(&draft.github)
            .bind(&draft.live)
            .bind(&draft.image)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        expect_row(result, PROJECTS, id)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id=?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        expect_row(result, PROJECTS, id)
    }

    async fn contacts(&self) -> StoreResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>("SELECT id,name,email,subject,message,created_at,read,replied FROM contacts ORDER BY created_at DESC, rowid DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(valid_records(CONTACTS, rows))
    }

    async fn contact(&self, id: Uuid) -> StoreResult<Option<Contact>> {
        sqlx::query_as::<_, ContactRow>("SELECT id,name,email,subject,message,created_at,read,replied FROM contacts WHERE id=?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Contact::try_from)
            .transpose()
    }

    async fn insert_contact(&self, draft: ContactDraft) -> StoreResult<Contact> {
        let id = Uuid::now_v7();
        let created_at = now();
        sqlx::query("INSERT INTO contacts (id,name,email,subject,message,created_at,read,replied) VALUES (?,?,?,?,?,?,0,0)")
            .bind(id.to_string())
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(&draft.subject)
            .bind(&draft.message)
            .bind(unix_millis(created_at))
            .execute(&self.pool)
            .await?;

        info!("new contact {id} from {}", draft.email);
        let ContactDraft { name, email, subject, message } = draft;
        Ok(Contact { id, name, email, subject, message, created_at, read: false, replied: false })
    }

    async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> StoreResult<()> {
        let sql = match patch {
            ContactPatch::MarkRead => "UPDATE contacts SET read=1 WHERE id=?",
            ContactPatch::MarkReplied => "UPDATE contacts SET read=1, replied=1 WHERE id=?",
        };
        let result = sqlx::query(sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        expect_row(result, CONTACTS, id)
    }

    async fn delete_contact(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id=?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        expect_row(result, CONTACTS, id)
    }
}

#[cfg(test)]
mod tests {
    use crate::{models::NO_SUBJECT, store::save_profile};

    use super::*;

    fn contact_draft(name: &str) -> ContactDraft {
        ContactDraft {
            name: name.to_owned(),
            email: format!("{}@x.com", name.to_lowercase()),
            subject: NO_SUBJECT.to_owned(),
            message: "Hi".to_owned(),
        }
    }

    #[tokio::test]
    async fn profile_is_created_then_updated() {
        let store = SqliteStore::memory().await.unwrap();
        assert!(store.profile().await.unwrap().is_none());

        let mut draft = ProfileDraft {
            name: "Ana".to_owned(),
            skills: vec!["Rust".to_owned(), "Rust".to_owned(), "Go".to_owned()],
            socials: Socials { github: Some("https://github.com/ana".to_owned()), ..Default::default() },
            ..Default::default()
        };
        let created = save_profile(&store, draft.clone()).await.unwrap();

        draft.location = "Lisbon".to_owned();
        let updated = save_profile(&store, draft).await.unwrap();
        assert_eq!(updated.id, created.id);

        let stored = store.profile().await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.skills, ["Rust", "Rust", "Go"]);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn projects_keep_insertion_order() {
        let store = SqliteStore::memory().await.unwrap();
        for title in ["one", "two", "three"] {
            store.insert_project(ProjectDraft { title: title.to_owned(), ..Default::default() }).await.unwrap();
        }
        let titles: Vec<_> = store.projects(None).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
        assert_eq!(store.projects(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = SqliteStore::memory().await.unwrap();
        let id = Uuid::now_v7();
        assert!(matches!(store.delete_project(id).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.update_contact(id, ContactPatch::MarkRead).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.update_project(id, ProjectDraft::default()).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn new_contacts_are_unread_and_newest_first() {
        let store = SqliteStore::memory().await.unwrap();
        let first = store.insert_contact(contact_draft("Ana")).await.unwrap();
        let second = store.insert_contact(contact_draft("Ben")).await.unwrap();
        assert!(!first.read && !first.replied);

        let listed = store.contacts().await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn replying_marks_read() {
        let store = SqliteStore::memory().await.unwrap();
        let contact = store.insert_contact(contact_draft("Ana")).await.unwrap();

        store.update_contact(contact.id, ContactPatch::MarkReplied).await.unwrap();
        let replied = store.contact(contact.id).await.unwrap().unwrap();
        assert!(replied.read && replied.replied);

        store.update_contact(contact.id, ContactPatch::MarkRead).await.unwrap();
        assert_eq!(store.contact(contact.id).await.unwrap().unwrap(), replied);

        store.delete_contact(contact.id).await.unwrap();
        assert!(store.contact(contact.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_rows_are_left_out_of_listings() {
        let store = SqliteStore::memory().await.unwrap();
        let good = store.insert_project(ProjectDraft { title: "Good".to_owned(), ..Default::default() }).await.unwrap();
        let broken = Uuid::now_v7();
        sqlx::query("INSERT INTO projects (id,title,stack) VALUES (?,?,?)")
            .bind(broken.to_string())
            .bind("Broken")
            .bind("not json")
            .execute(store.pool())
            .await
            .unwrap();

        assert_eq!(store.projects(None).await.unwrap(), vec![good]);
        let err = store.project(broken).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { collection: PROJECTS, .. }), "{err}");
    }

    #[tokio::test]
    async fn null_tag_list_reads_as_empty() {
        let store = SqliteStore::memory().await.unwrap();
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO projects (id,title,stack) VALUES (?,?,'null')")
            .bind(id.to_string())
            .bind("Untagged")
            .execute(store.pool())
            .await
            .unwrap();

        let project = store.project(id).await.unwrap().unwrap();
        assert!(project.stack.is_empty());
        assert_eq!(store.projects(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn contact_with_bad_id_is_left_out() {
        let store = SqliteStore::memory().await.unwrap();
        let ana = store.insert_contact(contact_draft("Ana")).await.unwrap();
        sqlx::query("INSERT INTO contacts (id,name,email,subject,message,created_at) VALUES ('not-a-uuid','b','c','d','e',0)")
            .execute(store.pool())
            .await
            .unwrap();

        assert_eq!(store.contacts().await.unwrap(), vec![ana]);
    }

    #[tokio::test]
    async fn table_forbids_replied_without_read() {
        let store = SqliteStore::memory().await.unwrap();
        let result = sqlx::query("INSERT INTO contacts (id,name,email,subject,message,created_at,read,replied) VALUES (?,'a','b','c','d',0,0,1)")
            .bind(Uuid::now_v7().to_string())
            .execute(store.pool())
            .await;
        assert!(result.is_err());
    }
}
