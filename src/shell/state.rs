use crate::modules::ai_settings::core::setting::AiSetting;
use crate::modules::contact_submissions::core::submission::ContactSubmission;
use crate::modules::family::core::invite::FamilyInvite;
use crate::modules::location_pings::core::ping::LocationPing;
use crate::modules::marketing_content::core::content::MarketingContent;
use crate::modules::orders::core::order::Order;
use crate::modules::procedures::use_cases::invoke_procedure::handler::ProcedureRunner;
use crate::modules::products::core::product::Product;
use crate::modules::sync::view::EntityView;
use crate::modules::training_data::core::training_data::TrainingData;
use crate::shared::context::AppContext;
use crate::shared::core::entity::Entity;
use crate::shared::core::predicate::{OrderBy, QuerySpec};
use std::sync::Arc;

/// One mounted view per admin page.
#[derive(Clone)]
pub struct AppState {
    pub ctx: AppContext,
    pub orders: Arc<EntityView<Order>>,
    pub products: Arc<EntityView<Product>>,
    pub training_data: Arc<EntityView<TrainingData>>,
    pub marketing_content: Arc<EntityView<MarketingContent>>,
    pub contact_submissions: Arc<EntityView<ContactSubmission>>,
    pub family_invites: Arc<EntityView<FamilyInvite>>,
    pub location_pings: Arc<EntityView<LocationPing>>,
    pub ai_settings: Arc<EntityView<AiSetting>>,
    pub procedures: Arc<ProcedureRunner>,
}

/// Live on the view's own table, newest first unless told otherwise.
async fn mount_view<E: Entity>(ctx: &AppContext) -> Arc<EntityView<E>> {
    mount_ordered(ctx, OrderBy::desc("created_at")).await
}

async fn mount_ordered<E: Entity>(ctx: &AppContext, order_by: OrderBy) -> Arc<EntityView<E>> {
    let query = QuerySpec::new().order_by(order_by);
    Arc::new(EntityView::mount(ctx, query, &[E::TABLE]).await)
}

impl AppState {
    pub async fn mount(ctx: AppContext) -> Self {
        let (
            orders,
            products,
            training_data,
            marketing_content,
            contact_submissions,
            family_invites,
            location_pings,
            ai_settings,
        ) = tokio::join!(
            mount_view::<Order>(&ctx),
            mount_view::<Product>(&ctx),
            mount_view::<TrainingData>(&ctx),
            mount_view::<MarketingContent>(&ctx),
            mount_view::<ContactSubmission>(&ctx),
            mount_view::<FamilyInvite>(&ctx),
            mount_view::<LocationPing>(&ctx),
            mount_ordered::<AiSetting>(&ctx, OrderBy::asc("setting_key")),
        );
        Self {
            procedures: Arc::new(ProcedureRunner::new(&ctx)),
            ctx,
            orders,
            products,
            training_data,
            marketing_content,
            contact_submissions,
            family_invites,
            location_pings,
            ai_settings,
        }
    }

    pub async fn unmount(&self) {
        tokio::join!(
            self.orders.unmount(),
            self.products.unmount(),
            self.training_data.unmount(),
            self.marketing_content.unmount(),
            self.contact_submissions.unmount(),
            self.family_invites.unmount(),
            self.location_pings.unmount(),
            self.ai_settings.unmount(),
        );
    }
}
