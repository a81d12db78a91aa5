use std::sync::Arc;

use crate::credential::errors::CredentialError;
use crate::subject::models::RotationTag;
use crate::subject::models::SubjectId;
use crate::subject::ports::SubjectRepository;

/// Revokes all of a subject's tokens by replacing its rotation tag.
pub struct CredentialRotationPolicy<SR>
where
    SR: SubjectRepository,
{
    subjects: Arc<SR>,
}

impl<SR> CredentialRotationPolicy<SR>
where
    SR: SubjectRepository,
{
    pub fn new(subjects: Arc<SR>) -> Self {
        Self { subjects }
    }

    /// Draw a tag without persisting it, for callers that store it inside
    /// their own atomic update.
    pub fn next_tag(&self) -> RotationTag {
        RotationTag::generate()
    }

    /// Generate, persist and return a new rotation tag.
    ///
    /// # Errors
    /// * `SubjectNotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn rotate(&self, id: SubjectId) -> Result<RotationTag, CredentialError> {
        let tag = self.next_tag();
        self.subjects.update_rotation_tag(id, &tag).await?;

        tracing::info!(subject_id = %id, "Rotation tag replaced, outstanding tokens revoked");
        Ok(tag)
    }

    /// Store a new password hash together with a fresh rotation tag.
    ///
    /// Either both are written or neither is.
    ///
    /// # Errors
    /// * `SubjectNotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn rotate_with_password(
        &self,
        id: SubjectId,
        password_hash: &str,
    ) -> Result<RotationTag, CredentialError> {
        let tag = self.next_tag();
        self.subjects.update_credentials(id, password_hash, &tag).await?;

        tracing::info!(subject_id = %id, "Password replaced, outstanding tokens revoked");
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mocks::MockSubjects;

    #[tokio::test]
    async fn test_rotate_persists_returned_tag() {
        let mut subjects = MockSubjects::new();
        let stored = Arc::new(std::sync::Mutex::new(None::<String>));
        let sink = Arc::clone(&stored);

        subjects
            .expect_update_rotation_tag()
            .withf(|id, _| *id == SubjectId(42))
            .times(1)
            .returning(move |_, tag| {
                *sink.lock().unwrap() = Some(tag.as_str().to_string());
                Ok(())
            });

        let policy = CredentialRotationPolicy::new(Arc::new(subjects));
        let tag = policy.rotate(SubjectId(42)).await.expect("rotation failed");

        assert_eq!(stored.lock().unwrap().as_deref(), Some(tag.as_str()));
    }

    #[tokio::test]
    async fn test_rotate_unknown_subject() {
        let mut subjects = MockSubjects::new();
        subjects
            .expect_update_rotation_tag()
            .times(1)
            .returning(|id, _| Err(CredentialError::SubjectNotFound(id.to_string())));

        let policy = CredentialRotationPolicy::new(Arc::new(subjects));

        assert!(matches!(
            policy.rotate(SubjectId(7)).await,
            Err(CredentialError::SubjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rotate_with_password_writes_hash_and_tag_together() {
        let mut subjects = MockSubjects::new();
        let stored = Arc::new(std::sync::Mutex::new(None::<String>));
        let sink = Arc::clone(&stored);

        subjects.expect_update_rotation_tag().times(0);
        subjects
            .expect_update_credentials()
            .withf(|id, hash, _| *id == SubjectId(42) && hash == "$argon2id$new")
            .times(1)
            .returning(move |_, _, tag| {
                *sink.lock().unwrap() = Some(tag.as_str().to_string());
                Ok(())
            });

        let policy = CredentialRotationPolicy::new(Arc::new(subjects));
        let tag = policy
            .rotate_with_password(SubjectId(42), "$argon2id$new")
            .await
            .expect("rotation failed");

        assert_eq!(stored.lock().unwrap().as_deref(), Some(tag.as_str()));
    }

    #[test]
    fn test_next_tag_is_fresh() {
        let policy = CredentialRotationPolicy::new(Arc::new(MockSubjects::new()));
        assert_ne!(policy.next_tag(), policy.next_tag());
    }
}
