// Composition root for the admin console.
//
// Responsibilities
// - Read config from environment.
// - Choose the gateway: hosted backend when configured, in-memory otherwise.
// - Mount one view per admin page and expose them over HTTP.

pub mod http;
pub mod state;
