//! Lead table controller
//!
//! In-memory CRUD over an ordered sequence of lead records. No persistence;
//! the table is seeded from a static reference list and lives for the
//! session. One operation on a row - the call trigger - feeds the console
//! manager, which is why the coercion into a backend request lives here.
//!
//! Field values are free-form text (in-place edit may write anything) and
//! are coerced to numbers only when a backend request is built; non-numeric
//! input silently becomes 0. Known weak validation point, not hardened.

use serde::{Deserialize, Serialize};

use crate::adapter::ReadyCallCheck;
use crate::error::{ConsoleError, ConsoleResult};
use leadcall_backend_api::CreateCallRequest;

/// A prospective-customer record
///
/// Identity (`key`) is opaque, unique within the table, and stable across
/// edits; a copy regenerates it with a timestamp suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Opaque row identity
    pub key: String,
    /// Lead record id
    pub leads_id: String,
    /// Advertiser account id
    pub account_id: String,
    /// Agent user id attached to the lead
    pub user_id: String,
    /// Callee phone number
    pub callee_number: String,
    /// Callee display name
    pub callee_name: String,
}

impl Lead {
    /// Parameters for the SDK readiness predicate for this lead
    pub fn ready_check(&self) -> ReadyCallCheck {
        ReadyCallCheck {
            callee_name: self.callee_name.clone(),
            callee_phone_num: self.callee_number.clone(),
        }
    }

    /// Build the backend call-creation request for this lead.
    ///
    /// `user_id` comes from the session credentials, not from the row.
    /// Numeric fields are coerced parse-or-0; the callee number travels as
    /// a string.
    pub fn call_params(&self, user_id: u64) -> CreateCallRequest {
        CreateCallRequest {
            account_id: coerce_u64(&self.account_id),
            leads_id: coerce_u64(&self.leads_id),
            user_id,
            callee_number: self.callee_number.clone(),
        }
    }
}

/// Coerce free-form text to a number, non-numeric input becoming 0
pub fn coerce_u64(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

/// The reference seed list the table starts from
pub fn seed_leads() -> Vec<Lead> {
    let rows = [
        ("0", "218001014", "20458", "321", "13810433402", "colin"),
        ("1", "217998358", "20458", "123456", "13811892894", "lucia"),
        ("2", "217818272", "20458", "20458", "13193334813", "haiqing"),
        ("3", "217997425", "20458", "20458", "13161354813", "haiqing2"),
        ("4", "11751470", "20458", "123", "13693002106", "guiyang"),
        ("5", "217822085", "20458", "54321", "15923371929", "arc"),
    ];
    rows.iter()
        .map(|(key, leads_id, account_id, user_id, callee_number, callee_name)| Lead {
            key: key.to_string(),
            leads_id: leads_id.to_string(),
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            callee_number: callee_number.to_string(),
            callee_name: callee_name.to_string(),
        })
        .collect()
}

/// Ordered, in-memory lead table
///
/// # Examples
///
/// ```rust
/// use leadcall_console_core::LeadTable;
///
/// let mut table = LeadTable::new();
/// let copy = table.copy("0").unwrap();
/// assert_ne!(copy.key, "0");
/// assert_eq!(table.rows()[1].key, copy.key);
///
/// // The first row is protected from deletion.
/// assert!(table.delete("0").is_err());
/// assert!(table.delete(&copy.key).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct LeadTable {
    rows: Vec<Lead>,
}

impl Default for LeadTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadTable {
    /// Create a table seeded with the reference list
    pub fn new() -> Self {
        Self { rows: seed_leads() }
    }

    /// Create a table from explicit rows
    pub fn from_rows(rows: Vec<Lead>) -> Self {
        Self { rows }
    }

    /// All rows, in table order
    pub fn rows(&self) -> &[Lead] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Look a row up by identity
    pub fn get(&self, key: &str) -> Option<&Lead> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// In-place field replacement by identity lookup.
    ///
    /// The row's `key` selects the record; every other field of `row`
    /// overwrites the stored values. Identity is stable across edits.
    pub fn save(&mut self, row: Lead) -> ConsoleResult<()> {
        let index = self
            .rows
            .iter()
            .position(|existing| existing.key == row.key)
            .ok_or_else(|| ConsoleError::LeadNotFound { key: row.key.clone() })?;
        self.rows[index] = row;
        Ok(())
    }

    /// Duplicate a record, inserted immediately after the source row.
    ///
    /// The copy gets a fresh identity: the source key's base (the portion
    /// before the first `-`) plus a millisecond timestamp, bumped until
    /// unique within the table.
    pub fn copy(&mut self, key: &str) -> ConsoleResult<Lead> {
        let index = self
            .rows
            .iter()
            .position(|row| row.key == key)
            .ok_or_else(|| ConsoleError::LeadNotFound { key: key.to_string() })?;

        let base = key.split('-').next().unwrap_or(key).to_string();
        let mut millis = chrono::Utc::now().timestamp_millis();
        let mut candidate = format!("{}-{}", base, millis);
        while self.rows.iter().any(|row| row.key == candidate) {
            millis += 1;
            candidate = format!("{}-{}", base, millis);
        }

        let mut copy = self.rows[index].clone();
        copy.key = candidate;
        self.rows.insert(index + 1, copy.clone());
        tracing::debug!(source = key, key = %copy.key, "lead copied");
        Ok(copy)
    }

    /// Remove a record by identity.
    ///
    /// The first row is protected from deletion (policy, not technical
    /// necessity).
    pub fn delete(&mut self, key: &str) -> ConsoleResult<Lead> {
        let index = self
            .rows
            .iter()
            .position(|row| row.key == key)
            .ok_or_else(|| ConsoleError::LeadNotFound { key: key.to_string() })?;
        if index == 0 {
            return Err(ConsoleError::ProtectedLead { key: key.to_string() });
        }
        Ok(self.rows.remove(index))
    }
}
