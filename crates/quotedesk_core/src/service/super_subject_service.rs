//! Super-subject use-case service.

use crate::model::super_subject::{default_super_subjects, SuperSubject, SuperSubjectId};
use crate::repo::super_subject_repo::SuperSubjectRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

pub struct SuperSubjectService<R: SuperSubjectRepository> {
    repo: R,
}

impl<R: SuperSubjectRepository> SuperSubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a grouping from raw subject and author lists.
    pub fn create_super_subject(
        &mut self,
        name: &str,
        subjects: &[String],
        authors: &[String],
    ) -> RepoResult<SuperSubject> {
        let group = SuperSubject::new(name, subjects, authors);
        self.save(group)
    }

    /// Replaces name, members and image of an existing or new grouping.
    pub fn save_super_subject(&mut self, group: SuperSubject) -> RepoResult<SuperSubject> {
        let group = SuperSubject {
            id: group.id,
            image: group.image,
            ..SuperSubject::new(group.name, &group.subjects, &group.authors)
        };
        self.save(group)
    }

    pub fn get_super_subject(&self, id: SuperSubjectId) -> RepoResult<Option<SuperSubject>> {
        self.repo.get_super_subject(id)
    }

    pub fn list_super_subjects(&self) -> RepoResult<Vec<SuperSubject>> {
        self.repo.list_super_subjects()
    }

    pub fn delete_super_subject(&self, id: SuperSubjectId) -> RepoResult<()> {
        self.repo.delete_super_subject(id)
    }

    /// Inserts the default groupings when none exist yet.
    ///
    /// # Contract
    /// - Returns the number of groupings inserted (0 when any already exist).
    pub fn seed_defaults(&mut self) -> RepoResult<u32> {
        if !self.repo.list_super_subjects()?.is_empty() {
            return Ok(0);
        }
        let mut inserted = 0u32;
        for group in default_super_subjects() {
            self.repo.upsert_super_subject(&group)?;
            inserted += 1;
        }
        info!("event=super_subject_seed module=service status=ok inserted={inserted}");
        Ok(inserted)
    }

    fn save(&mut self, group: SuperSubject) -> RepoResult<SuperSubject> {
        let id = self.repo.upsert_super_subject(&group)?;
        self.repo
            .get_super_subject(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("super subject {id} missing after save")))
    }
}
