use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend tables mirrored by the admin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Orders,
    Products,
    TrainingData,
    MarketingContent,
    ContactSubmissions,
    FamilyInvites,
    FamilyGroups,
    FamilyMemberships,
    Subscribers,
    SubscriptionPlans,
    WhatsappAccounts,
    WhatsappConversations,
    WhatsappMessages,
    LocationPings,
    AiModelSettings,
    EmergencyTestResults,
}

impl Table {
    pub const ALL: [Table; 17] = [
        Table::Profiles,
        Table::Orders,
        Table::Products,
        Table::TrainingData,
        Table::MarketingContent,
        Table::ContactSubmissions,
        Table::FamilyInvites,
        Table::FamilyGroups,
        Table::FamilyMemberships,
        Table::Subscribers,
        Table::SubscriptionPlans,
        Table::WhatsappAccounts,
        Table::WhatsappConversations,
        Table::WhatsappMessages,
        Table::LocationPings,
        Table::AiModelSettings,
        Table::EmergencyTestResults,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Orders => "orders",
            Table::Products => "products",
            Table::TrainingData => "training_data",
            Table::MarketingContent => "marketing_content",
            Table::ContactSubmissions => "contact_submissions",
            Table::FamilyInvites => "family_invites",
            Table::FamilyGroups => "family_groups",
            Table::FamilyMemberships => "family_memberships",
            Table::Subscribers => "subscribers",
            Table::SubscriptionPlans => "subscription_plans",
            Table::WhatsappAccounts => "whatsapp_accounts",
            Table::WhatsappConversations => "whatsapp_conversations",
            Table::WhatsappMessages => "whatsapp_messages",
            Table::LocationPings => "location_pings",
            Table::AiModelSettings => "ai_model_settings",
            Table::EmergencyTestResults => "emergency_test_results",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
