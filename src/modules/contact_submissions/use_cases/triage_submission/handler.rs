use crate::modules::contact_submissions::core::submission::{ContactSubmission, SubmissionStatus};
use crate::modules::sync::core::mutation::{MutationOutcome, MutationRequest};
use crate::modules::sync::use_cases::mutate_entity::handler::{
    MutationCoordinator, MutationError,
};

pub async fn set_status(
    coordinator: &MutationCoordinator<ContactSubmission>,
    submission: &ContactSubmission,
    next: SubmissionStatus,
) -> Result<MutationOutcome<ContactSubmission>, MutationError> {
    coordinator
        .submit(MutationRequest::transition(
            submission.id.clone(),
            "status",
            submission.status.as_str(),
            next.as_str(),
        ))
        .await
}

/// Opening an unread submission marks it read; anything else is left alone.
pub async fn mark_read_on_open(
    coordinator: &MutationCoordinator<ContactSubmission>,
    submission: &ContactSubmission,
) -> Result<Option<MutationOutcome<ContactSubmission>>, MutationError> {
    if submission.status != SubmissionStatus::New {
        return Ok(None);
    }
    set_status(coordinator, submission, SubmissionStatus::Read)
        .await
        .map(Some)
}
