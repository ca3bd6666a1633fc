//! Team roster persisted as a JSON document.

use crate::identity::{
    adapters::{name_taken, sort_by_name},
    domain::{MemberId, TeamMember},
    ports::{TeamDirectory, TeamDirectoryError, TeamDirectoryResult},
};
use crate::storage::{JsonFile, JsonFileError};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Document file holding the roster.
const ROSTER_FILE: &str = "team_members.json";

/// [`TeamDirectory`] stored in `team_members.json` inside a data directory.
#[derive(Debug)]
pub struct FileTeamDirectory {
    file: JsonFile<Vec<TeamMember>>,
    write_lock: Mutex<()>,
}

impl FileTeamDirectory {
    /// Opens the roster inside `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the directory cannot be opened.
    pub fn open(data_dir: &str) -> Result<Self, JsonFileError> {
        Ok(Self {
            file: JsonFile::open(data_dir, ROSTER_FILE)?,
            write_lock: Mutex::new(()),
        })
    }

    fn load(&self) -> TeamDirectoryResult<Vec<TeamMember>> {
        self.file.load().map_err(TeamDirectoryError::persistence)
    }

    fn save(&self, members: &Vec<TeamMember>) -> TeamDirectoryResult<()> {
        self.file.save(members).map_err(TeamDirectoryError::persistence)
    }
}

#[async_trait]
impl TeamDirectory for FileTeamDirectory {
    async fn add(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load()?;
        if name_taken(&members, member.name().as_str(), None) {
            return Err(TeamDirectoryError::DuplicateName(
                member.name().as_str().to_owned(),
            ));
        }
        members.push(member.clone());
        self.save(&members)
    }

    async fn update(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load()?;
        if name_taken(&members, member.name().as_str(), Some(member.id())) {
            return Err(TeamDirectoryError::DuplicateName(
                member.name().as_str().to_owned(),
            ));
        }
        let slot = members
            .iter_mut()
            .find(|existing| existing.id() == member.id())
            .ok_or(TeamDirectoryError::NotFound(member.id()))?;
        *slot = member.clone();
        self.save(&members)
    }

    async fn remove(&self, id: MemberId) -> TeamDirectoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load()?;
        let before = members.len();
        members.retain(|member| member.id() != id);
        if members.len() == before {
            return Err(TeamDirectoryError::NotFound(id));
        }
        self.save(&members)
    }

    async fn find_by_id(&self, id: MemberId) -> TeamDirectoryResult<Option<TeamMember>> {
        Ok(self.load()?.into_iter().find(|member| member.id() == id))
    }

    async fn find_by_name(&self, name: &str) -> TeamDirectoryResult<Option<TeamMember>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|member| member.name().matches(name)))
    }

    async fn list(&self) -> TeamDirectoryResult<Vec<TeamMember>> {
        let mut members = self.load()?;
        sort_by_name(&mut members);
        Ok(members)
    }
}
