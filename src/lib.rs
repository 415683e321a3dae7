// Library root
// -----------
// This crate exposes the pieces behind the two binaries: the interactive
// identity-registry client (`main.rs`) and the face-auth socket client
// (`bin/face_client.rs`).
//
// Module responsibilities:
// - `session`: in-memory auth state for one run.
// - `http` / `api`: request building, transport and outcome classification.
// - `extract`: best-effort dotted-path reads from JSON bodies.
// - `ops`: one handler per menu operation, returning printable reports.
// - `ui`: the dialoguer-driven menu.
// - `face`: the socket client for the face-auth server.
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod face;
pub mod http;
pub mod ops;
pub mod session;
pub mod ui;
