// handlers/mod.rs - two security tiers
//
// Public (no auth): health check, service banner, unknown-route fallback
// Protected (bearer JWT): every /api/* resource, scoped to the caller
pub mod protected;
pub mod public;
