// Dialog/Form Controller.
//
// Purpose
// - Hold one draft while a create or edit dialog is open and hand it to the coordinator.
//
// Responsibilities
// - Invalid drafts never leave the controller.
// - An edit only sends the fields the operator changed; no change closes the dialog.
// - A failed submit keeps the draft, and a retried create keeps its client id.

use crate::modules::sync::core::draft::{DraftForm, ValidationErrors};
use crate::modules::sync::core::mutation::{MutationOutcome, MutationRequest};
use crate::modules::sync::use_cases::mutate_entity::handler::{MutationCoordinator, MutationError};
use crate::shared::core::entity::Entity;
use crate::shared::core::row::{RecordId, Row, values_equal};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormError {
    #[error("no dialog is open")]
    Closed,

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Closed,
    Creating { client_id: RecordId },
    Editing { id: RecordId, original: Row },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    Saved(MutationOutcome<E>),
    Unchanged,
}

pub struct FormController<F: DraftForm> {
    mode: FormMode,
    draft: Option<F>,
    errors: Option<ValidationErrors>,
}

impl<F: DraftForm> Default for FormController<F> {
    fn default() -> Self {
        Self {
            mode: FormMode::Closed,
            draft: None,
            errors: None,
        }
    }
}

/// Fields of `current` that differ from `original`.
pub fn changed_fields(original: &Row, current: &Row) -> Row {
    current
        .iter()
        .filter(|(field, value)| {
            original
                .get(field.as_str())
                .is_none_or(|before| !values_equal(before, value))
        })
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

impl<F: DraftForm> FormController<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self) {
        self.open_create_with(RecordId::generate());
    }

    /// Opens a create form under a caller-chosen id, so a caller resubmitting the same
    /// request after a lost response lands on the same record.
    pub fn open_create_with(&mut self, client_id: RecordId) {
        self.mode = FormMode::Creating { client_id };
        self.draft = Some(F::empty());
        self.errors = None;
    }

    pub fn open_edit(&mut self, entity: &F::Entity) {
        let draft = F::from_entity(entity);
        // A record that fails today's validation compares against nothing, so every field is sent.
        let original = draft.to_fields().unwrap_or_default();
        self.mode = FormMode::Editing {
            id: entity.id().clone(),
            original,
        };
        self.draft = Some(draft);
        self.errors = None;
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        match &self.mode {
            FormMode::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&F> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut F> {
        self.draft.as_mut()
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// Discards the draft unconditionally.
    pub fn cancel(&mut self) {
        self.mode = FormMode::Closed;
        self.draft = None;
        self.errors = None;
    }

    pub async fn submit(
        &mut self,
        coordinator: &MutationCoordinator<F::Entity>,
    ) -> Result<SubmitOutcome<F::Entity>, FormError> {
        let draft = self.draft.as_ref().ok_or(FormError::Closed)?;
        let fields = match draft.to_fields() {
            Ok(fields) => fields,
            Err(errors) => {
                self.errors = Some(errors.clone());
                return Err(FormError::Invalid(errors));
            }
        };
        self.errors = None;

        let request = match &self.mode {
            FormMode::Closed => return Err(FormError::Closed),
            FormMode::Creating { client_id } => Some(MutationRequest::Create {
                fields,
                client_id: client_id.clone(),
            }),
            FormMode::Editing { id, original } => {
                let patch = changed_fields(original, &fields);
                (!patch.is_empty()).then(|| MutationRequest::Update {
                    id: id.clone(),
                    patch,
                })
            }
        };
        let Some(request) = request else {
            self.cancel();
            return Ok(SubmitOutcome::Unchanged);
        };

        let outcome = coordinator.submit(request).await?;
        self.cancel();
        Ok(SubmitOutcome::Saved(outcome))
    }
}

#[cfg(test)]
mod form_controller_tests {
    use super::*;
    use crate::modules::sync::core::mutation::ReconcileStrategy;
    use crate::modules::sync::use_cases::load_collection::handler::EntityListLoader;
    use crate::modules::training_data::core::draft::TrainingDataDraft;
    use crate::modules::training_data::core::training_data::TrainingData;
    use crate::shared::core::predicate::QuerySpec;
    use crate::shared::core::table::Table;
    use crate::shared::infrastructure::gateway::RemoteError;
    use crate::shared::infrastructure::gateway::in_memory::{GatewayCall, InMemoryGateway};
    use crate::tests::fixtures::context::make_context;
    use crate::tests::fixtures::training_data::TrainingDataBuilder;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::Arc;

    type BeforeEachReturn = (
        Arc<InMemoryGateway>,
        Arc<EntityListLoader<TrainingData>>,
        MutationCoordinator<TrainingData>,
    );

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let (gateway, _, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<TrainingData>::new(&ctx, QuerySpec::new()));
        let coordinator = MutationCoordinator::new(&ctx, loader.clone(), ReconcileStrategy::InPlace);
        (gateway, loader, coordinator)
    }

    async fn seed_one(gateway: &InMemoryGateway, loader: &EntityListLoader<TrainingData>) {
        gateway
            .seed(
                Table::TrainingData,
                vec![TrainingDataBuilder::new().id("t-1").question("How do I add a contact?").build_row()],
            )
            .await;
        loader.load().await.unwrap();
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_block_an_invalid_draft_without_a_round_trip(before_each: BeforeEachReturn) {
        let (gateway, _, coordinator) = before_each;
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_create();

        let result = form.submit(&coordinator).await;

        assert!(matches!(result, Err(FormError::Invalid(_))));
        assert!(form.is_open());
        assert_eq!(form.errors().and_then(|errors| errors.message_for("question")), Some("is required"));
        assert!(gateway.calls().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_and_close(before_each: BeforeEachReturn) {
        let (gateway, loader, coordinator) = before_each;
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.question = "What does SOS do?".into();
        draft.answer = "It alerts your contacts.".into();
        draft.tags = "sos, alerts".into();

        let outcome = form.submit(&coordinator).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Saved(MutationOutcome::Created(_))));
        assert!(!form.is_open());
        assert_eq!(loader.len().await, 1);
        let rows = gateway.rows(Table::TrainingData).await;
        assert_eq!(rows[0].get("tags"), Some(&json!(["sos", "alerts"])));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_draft_and_client_id_when_submit_fails(
        before_each: BeforeEachReturn,
    ) {
        let (gateway, loader, coordinator) = before_each;
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.question = "Q".into();
        draft.answer = "A".into();
        let mode_before = form.mode().clone();
        gateway.fail_next(Table::TrainingData, RemoteError::Network("reset".into()));

        let result = form.submit(&coordinator).await;

        assert!(matches!(result, Err(FormError::Mutation(_))));
        assert_eq!(form.draft().map(|draft| draft.question.as_str()), Some("Q"));
        assert_eq!(form.mode(), &mode_before);
        assert_eq!(loader.len().await, 0);
        assert!(form.submit(&coordinator).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_once_when_two_forms_share_a_client_id(
        before_each: BeforeEachReturn,
    ) {
        let (gateway, loader, coordinator) = before_each;
        let client_id = RecordId::from("t-retry");
        for _ in 0..2 {
            let mut form = FormController::<TrainingDataDraft>::new();
            form.open_create_with(client_id.clone());
            let draft = form.draft_mut().unwrap();
            draft.question = "Q".into();
            draft.answer = "A".into();

            let outcome = form.submit(&coordinator).await.unwrap();

            assert!(matches!(outcome, SubmitOutcome::Saved(MutationOutcome::Created(ref entry)) if entry.id == client_id));
        }

        assert_eq!(gateway.rows(Table::TrainingData).await.len(), 1);
        assert_eq!(loader.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_send_only_changed_fields(before_each: BeforeEachReturn) {
        let (gateway, loader, coordinator) = before_each;
        seed_one(&gateway, &loader).await;
        let entity = loader.snapshot().await.remove(0);
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_edit(&entity);
        form.draft_mut().unwrap().category = "contacts".into();

        form.submit(&coordinator).await.unwrap();

        let row = gateway.rows(Table::TrainingData).await.remove(0);
        assert_eq!(row.get("category"), Some(&json!("contacts")));
        assert!(gateway.calls().contains(&GatewayCall::Update(Table::TrainingData, "t-1".into())));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_close_an_unchanged_edit_without_a_round_trip(before_each: BeforeEachReturn) {
        let (gateway, loader, coordinator) = before_each;
        seed_one(&gateway, &loader).await;
        let entity = loader.snapshot().await.remove(0);
        let calls_before = gateway.calls().len();
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_edit(&entity);
        assert_eq!(form.editing_id(), Some(&RecordId::from("t-1")));

        let outcome = form.submit(&coordinator).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Unchanged);
        assert!(!form.is_open());
        assert_eq!(gateway.calls().len(), calls_before);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_touch_the_collection_while_editing(before_each: BeforeEachReturn) {
        let (gateway, loader, _) = before_each;
        seed_one(&gateway, &loader).await;
        let before = loader.snapshot().await;
        let mut form = FormController::<TrainingDataDraft>::new();
        form.open_edit(&before[0]);
        form.draft_mut().unwrap().answer = "changed locally".into();

        assert_eq!(loader.snapshot().await, before);
        form.cancel();
        assert!(form.draft().is_none());
        assert_eq!(loader.snapshot().await, before);
    }
}
