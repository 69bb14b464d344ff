// ============================================================================
// RPC Module - signed invocations accepted by the node
// ============================================================================
//
// Components:
//   - signed_invocation: Ed25519 signed contract call envelope
//
// ============================================================================

pub mod signed_invocation;

pub use signed_invocation::*;
