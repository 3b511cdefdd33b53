pub mod shared {
    pub mod core {
        pub mod entity;
        pub mod predicate;
        pub mod row;
        pub mod table;
    }
    pub mod infrastructure {
        pub mod gateway;
        pub mod notifier;
    }
    pub mod config;
    pub mod context;
}

pub mod modules {
    pub mod sync {
        pub mod core {
            pub mod collection;
            pub mod draft;
            pub mod filter;
            pub mod mutation;
            pub mod stats;
        }
        pub mod use_cases {
            pub mod load_collection {
                pub mod handler;
            }
            pub mod mutate_entity {
                pub mod decide;
                pub mod handler;
            }
            pub mod realtime_reload {
                pub mod handler;
            }
            pub mod edit_draft {
                pub mod handler;
            }
        }
        pub mod view;
    }
    pub mod orders {
        pub mod core {
            pub mod order;
            pub mod policy;
        }
        pub mod use_cases {
            pub mod list_orders {
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod transition_order_status {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod reconcile_payments {
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod products {
        pub mod core {
            pub mod draft;
            pub mod product;
        }
        pub mod use_cases {
            pub mod manage_products {
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod training_data {
        pub mod core {
            pub mod draft;
            pub mod training_data;
        }
        pub mod use_cases {
            pub mod manage_training_data {
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod marketing_content {
        pub mod core {
            pub mod content;
            pub mod draft;
            pub mod policy;
        }
        pub mod use_cases {
            pub mod review_content {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod contact_submissions {
        pub mod core {
            pub mod submission;
        }
        pub mod use_cases {
            pub mod triage_submission {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod family {
        pub mod core {
            pub mod draft;
            pub mod invite;
        }
        pub mod use_cases {
            pub mod send_invite {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod location_pings {
        pub mod core {
            pub mod ping;
        }
        pub mod use_cases {
            pub mod export_locations {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod ai_settings {
        pub mod core {
            pub mod setting;
        }
        pub mod use_cases {
            pub mod update_setting {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod procedures {
        pub mod core {
            pub mod reports;
        }
        pub mod use_cases {
            pub mod invoke_procedure {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;
