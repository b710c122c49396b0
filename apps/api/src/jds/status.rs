use serde::Serialize;

const ARCHIVING_STATUSES: &[&str] = &[
    "Won",
    "Lost",
    "Never Worked",
    "Won and Replaced",
    "Pending invoice/ contract",
    "Partial Payment",
    "Offered",
];

const OPEN_STATUSES: &[&str] = &[
    "Pre-alignment",
    "Sourcing",
    "Endorsed",
    "Sourcing +1",
    "Client int.",
    "Stalled",
];

/// Pipeline status → archived flag. `None` for statuses we do not track.
pub fn archived_for_status(status: &str) -> Option<bool> {
    if ARCHIVING_STATUSES.contains(&status) {
        Some(true)
    } else if OPEN_STATUSES.contains(&status) {
        Some(false)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub code: String,
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_before: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_after: Option<bool>,
}

impl StatusResult {
    fn skipped(code: &str, reason: &'static str) -> Self {
        Self {
            code: code.to_string(),
            updated: false,
            reason: Some(reason),
            archived: None,
            archived_before: None,
            archived_after: None,
        }
    }

    pub fn not_mapped(code: &str) -> Self {
        Self::skipped(code, "Status not mapped")
    }

    pub fn not_found(code: &str) -> Self {
        Self::skipped(code, "Not found")
    }

    /// Compares the stored flag with the target one. `updated` means a write is needed.
    pub fn compare(code: &str, current: bool, target: bool) -> Self {
        if current == target {
            Self {
                archived: Some(target),
                ..Self::skipped(code, "No change")
            }
        } else {
            Self {
                code: code.to_string(),
                updated: true,
                reason: None,
                archived: None,
                archived_before: Some(current),
                archived_after: Some(target),
            }
        }
    }
}
