use crate::modules::sync::core::mutation::MutationRequest;
use crate::modules::sync::use_cases::edit_draft::handler::{FormController, SubmitOutcome};
use crate::modules::training_data::core::draft::TrainingDataDraft;
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::in_memory::GatewayCall;
use crate::shell::state::AppState;
use crate::tests::fixtures::context::make_context;
use crate::tests::fixtures::training_data::TrainingDataBuilder;

#[tokio::test]
async fn edits_stay_in_the_draft_until_saved() {
    let (gateway, _, ctx) = make_context();
    gateway
        .seed(
            Table::TrainingData,
            vec![
                TrainingDataBuilder::new()
                    .id("t-1")
                    .question("How do I add a contact?")
                    .build_row(),
            ],
        )
        .await;
    let state = AppState::mount(ctx).await;
    let loader = state.training_data.loader();
    let original = loader.get(&"t-1".into()).await.unwrap();

    let mut form = FormController::<TrainingDataDraft>::new();
    form.open_edit(&original);
    form.draft_mut().unwrap().question = "How do I add an emergency contact?".into();

    assert_eq!(loader.get(&"t-1".into()).await.unwrap(), original);

    let outcome = form.submit(state.training_data.coordinator()).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert!(!form.is_open());
    let saved = loader.get(&"t-1".into()).await.unwrap();
    assert_eq!(saved.question, "How do I add an emergency contact?");
    assert_eq!(saved.answer, original.answer);
}

#[tokio::test]
async fn cancelling_an_edit_sends_nothing() {
    let (gateway, _, ctx) = make_context();
    gateway
        .seed(Table::TrainingData, vec![TrainingDataBuilder::new().id("t-1").build_row()])
        .await;
    let state = AppState::mount(ctx).await;
    let original = state.training_data.loader().get(&"t-1".into()).await.unwrap();

    let mut form = FormController::<TrainingDataDraft>::new();
    form.open_edit(&original);
    form.draft_mut().unwrap().answer = "changed".into();
    form.cancel();

    assert!(
        !gateway
            .calls()
            .iter()
            .any(|call| matches!(call, GatewayCall::Update(..)))
    );
    assert_eq!(state.training_data.loader().get(&"t-1".into()).await.unwrap(), original);
}

#[tokio::test]
async fn creates_then_deletes_an_entry() {
    let (gateway, _, ctx) = make_context();
    let state = AppState::mount(ctx).await;

    let mut form = FormController::<TrainingDataDraft>::new();
    form.open_create();
    {
        let draft = form.draft_mut().unwrap();
        draft.question = "Does the SOS button work offline?".into();
        draft.answer = "It falls back to SMS.".into();
        draft.tags = "sos, offline".into();
    }
    let SubmitOutcome::Saved(outcome) =
        form.submit(state.training_data.coordinator()).await.unwrap()
    else {
        panic!("expected the entry to be saved");
    };
    let id = outcome.id().clone();

    assert_eq!(state.training_data.loader().len().await, 1);
    assert_eq!(gateway.rows(Table::TrainingData).await.len(), 1);

    state
        .training_data
        .coordinator()
        .submit(MutationRequest::Delete { id })
        .await
        .unwrap();

    assert_eq!(state.training_data.loader().len().await, 0);
    assert!(gateway.rows(Table::TrainingData).await.is_empty());
}
