//! mockall doubles of the domain ports, shared by the unit tests.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use mockall::mock;

use crate::credential::errors::CredentialError;
use crate::credential::errors::MailerError;
use crate::credential::models::MailMessage;
use crate::credential::models::ResetRecord;
use crate::credential::ports::Mailer;
use crate::credential::ports::ResetRecordRepository;
use crate::subject::models::EmailAddress;
use crate::subject::models::NewSubject;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;
use crate::subject::ports::SubjectRepository;

mock! {
    pub Subjects {}

    #[async_trait]
    impl SubjectRepository for Subjects {
        async fn create(&self, subject: NewSubject) -> Result<Subject, CredentialError>;
        async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, CredentialError>;
        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<Subject>, CredentialError>;
        async fn update_credentials(
            &self,
            id: SubjectId,
            password_hash: &str,
            rotation_tag: &RotationTag,
        ) -> Result<(), CredentialError>;
        async fn update_rotation_tag(
            &self,
            id: SubjectId,
            rotation_tag: &RotationTag,
        ) -> Result<(), CredentialError>;
        async fn update_last_login(
            &self,
            id: SubjectId,
            at: DateTime<Utc>,
        ) -> Result<(), CredentialError>;
    }
}

mock! {
    pub ResetRecords {}

    #[async_trait]
    impl ResetRecordRepository for ResetRecords {
        async fn insert(&self, record: &ResetRecord) -> Result<(), CredentialError>;
        async fn find_by_token(&self, token: &str) -> Result<Option<ResetRecord>, CredentialError>;
        async fn consume(
            &self,
            token: &str,
            now: DateTime<Utc>,
            password_hash: String,
            rotation_tag: Option<RotationTag>,
        ) -> Result<Option<SubjectId>, CredentialError>;
    }
}

mock! {
    pub Mail {}

    #[async_trait]
    impl Mailer for Mail {
        async fn send(&self, message: &MailMessage) -> Result<(), MailerError>;
    }
}

/// Active, non-privileged subject with a fixed rotation tag.
pub fn subject(id: i64, tag: &str) -> Subject {
    Subject {
        id: SubjectId(id),
        email: EmailAddress::new(format!("subject{}@example.com", id)).unwrap(),
        password_hash: "$argon2id$placeholder".to_string(),
        is_active: true,
        is_superuser: false,
        rotation_tag: RotationTag::new(tag),
        last_login: None,
        created_at: Utc::now(),
    }
}

/// Cheap Argon2 parameters and a fixed secret.
pub fn authenticator() -> auth::Authenticator {
    let hasher = auth::PasswordHasher::with_params(8 * 1024, 1, 1).unwrap();
    let codec = auth::TokenCodec::new(
        b"unit-test-secret-key-at-least-32-bytes",
        auth::TokenLifetimes::default(),
    )
    .unwrap();
    auth::Authenticator::new(hasher, codec)
}
