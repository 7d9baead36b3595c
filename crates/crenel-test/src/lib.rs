//! Crenel availability server - integration test support.
//!
//! This crate re-exports the workspace crates to support integration tests
//! that use `crenel::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use crenel_core::*;
    pub use crenel_service::*;

    // Re-export db crate with all its public modules
    pub mod db {
        pub use crenel_db::db::*;

        // Additional db handlers from app
        pub mod connection {
            pub use crenel_app::db_handler::DbProviderHandler;
            pub use crenel_db::db::connection::*;
        }
    }

    // Re-export models
    pub mod model {
        pub use crenel_db::model::*;
    }

    // Re-export app middleware and handlers
    pub mod middleware {
        pub use crenel_app::middleware::*;
    }

    // Re-export config from both core and app
    pub mod config {
        pub use crenel_app::config::ConfigHandler;
        pub use crenel_core::config::*;
    }
}

// Re-export top-level modules for convenience
pub mod app {
    pub use crenel_app::*;

    pub mod api {
        pub use crenel_app::app::api::*;
    }
}

pub use crenel_schedule as schedule;
