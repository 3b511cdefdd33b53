use crate::modules::orders::core::order::{Order, OrderStatus};
use crate::modules::sync::core::mutation::{MutationOutcome, MutationRequest};
use crate::modules::sync::use_cases::mutate_entity::handler::{
    MutationCoordinator, MutationError,
};
use crate::shared::core::row::RecordId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("order {0} is not in this view")]
    UnknownOrder(RecordId),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Changes one order's status, starting from the status the view currently shows.
pub async fn transition_order_status(
    coordinator: &MutationCoordinator<Order>,
    id: &RecordId,
    next: OrderStatus,
) -> Result<Order, TransitionError> {
    let current = coordinator
        .loader()
        .get(id)
        .await
        .ok_or_else(|| TransitionError::UnknownOrder(id.clone()))?;
    let request =
        MutationRequest::transition(id.clone(), "status", current.status.as_str(), next.as_str());
    match coordinator.submit(request).await? {
        MutationOutcome::Created(order) | MutationOutcome::Updated(order) => Ok(order),
        MutationOutcome::Deleted(_) => Err(TransitionError::UnknownOrder(id.clone())),
    }
}
