//! Shared types for the quote sync service and its RPC clients.

use serde::{Deserialize, Serialize};

/// Version tag written into the persisted store document.
pub const STORE_VERSION: u32 = 1;

// =====================================================
// Domain Types
// =====================================================

/// A quote: a text/category pair. Identity is derived from the two
/// fields, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

/// Persisted envelope for the quote collection.
///
/// Older documents were written as a bare array; readers must accept
/// both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub v: u32,
    pub quotes: Vec<Quote>,
}

// =====================================================
// RPC Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AddQuoteRequest {
    pub text: String,
    pub category: String,
}

/// Category filter for a random pick. Absent or `"all"` means any
/// category.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RandomQuoteRequest {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetFilterRequest {
    pub category: String,
}

// =====================================================
// RPC Payload Types
// =====================================================

/// An exported quote document plus its suggested filename.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportPayload {
    pub filename: String,
    pub content: String,
}

/// Result of a manual sync: quotes merged in from the server, and
/// whether the follow-up push succeeded.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub added: usize,
    pub pushed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub quote_count: usize,
    pub category_count: usize,
    /// Bumped on every store mutation; poll this to detect changes.
    pub revision: u64,
    pub last_sync_at: Option<String>,
    pub sync_interval_secs: u64,
}

// =====================================================
// RPC Response Envelope
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
