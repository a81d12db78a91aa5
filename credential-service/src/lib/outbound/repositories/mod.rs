pub mod reset_record;
pub mod subject;

pub use reset_record::PostgresResetRecordRepository;
pub use subject::PostgresSubjectRepository;
