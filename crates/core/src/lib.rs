pub mod analysis;
pub mod auth;
pub mod config;
pub mod poller;
pub mod record;
pub mod submission;
pub mod testing;
pub mod transfer;

pub use analysis::{
    render_report, AnalysisResult, HttpResultFetcher, ResultError, ResultFetcher,
};
pub use auth::{create_credential_provider, AuthError, CredentialProvider};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, AuthMethod, Config,
    ConfigError, SanitizedConfig,
};
pub use poller::{PollError, PollerState, StatusPoller, Subscription, WatchSnapshot};
pub use record::{
    HttpRecordClient, Record, RecordApi, RecordError, RecordId, RecordStatus, RecordSummary,
    Subject,
};
pub use submission::{
    PendingSubmission, ResumePayload, SubmissionError, SubmissionOrchestrator, SubmissionRequest,
    ValidationError,
};
pub use transfer::{HttpTransferClient, PresignedTransfer, TransferError};
