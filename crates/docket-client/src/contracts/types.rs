use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DataRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataRangeHint {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicView {
    pub name: String,
    pub columns: Vec<ViewColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewColumn {
    pub name: String,
    pub column_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
    pub expected: Option<String>,
    pub received: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
    pub deduped: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummaryData {
    pub patterns_detected: i64,
    pub missing_detected: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadImportData {
    pub dry_run: bool,
    pub import_id: Option<String>,
    pub message: String,
    pub summary: ImportSummary,
    pub source_used: Option<String>,
    pub refreshed: Option<RefreshSummaryData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunRow {
    pub import_id: String,
    pub status: String,
    pub created_at: String,
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
    pub deduped: i64,
    pub source_kind: Option<String>,
    pub source_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportListData {
    pub rows: Vec<ImportRunRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternChangeRow {
    pub changed_at: String,
    pub field: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternRow {
    pub pattern_id: String,
    pub document_type: String,
    pub source: String,
    pub frequency: String,
    pub stability: String,
    pub confidence: String,
    pub average_interval_days: Option<f64>,
    pub stddev_interval_days: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    pub uploads_analyzed: i64,
    pub last_upload_date: Option<String>,
    pub next_expected_date: Option<String>,
    pub pattern_changes: Vec<PatternChangeRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternsData {
    pub policy_version: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub rows: Vec<PatternRow>,
    pub data_range_hint: DataRangeHint,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingRow {
    pub missing_id: String,
    pub pattern_id: String,
    pub document_type: String,
    pub source: String,
    pub expected_date: String,
    pub grace_period_end: String,
    pub days_overdue: i64,
    pub is_missing: bool,
    pub confidence: String,
    pub historical_uploads: i64,
    pub last_upload_date: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingData {
    pub policy_version: String,
    pub as_of: String,
    pub rows: Vec<MissingRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingActionData {
    pub missing_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderRow {
    pub id: String,
    pub missing_id: String,
    pub document_type: String,
    pub source: String,
    pub reminder_type: String,
    pub urgency: String,
    pub title: String,
    pub body: String,
    pub details: Option<String>,
    pub actions: Vec<String>,
    pub scheduled_for: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemindersByType {
    pub upcoming: i64,
    pub overdue: i64,
    pub follow_up: i64,
    pub final_notice: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemindersByUrgency {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemindersData {
    pub policy_version: String,
    pub as_of: String,
    pub total_pending: i64,
    pub total_reminders: i64,
    pub by_type: RemindersByType,
    pub by_urgency: RemindersByUrgency,
    pub rows: Vec<ReminderRow>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessData {
    pub as_of: String,
    pub processed: i64,
    pub sent: i64,
    pub failed: i64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsRow {
    pub document_type: String,
    pub enabled: bool,
    pub reminder_days_before: i64,
    pub reminder_days_after: i64,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub max_reminders: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsData {
    pub rows: Vec<SettingsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsUpdateData {
    pub row: SettingsRow,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeData {
    pub run_id: String,
    pub policy_version: String,
    pub as_of: String,
    pub total_sources: i64,
    pub patterns_detected: i64,
    pub missing_detected: i64,
    pub deadlines_created: i64,
    pub duration_ms: i64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadlineRow {
    pub deadline_id: String,
    pub missing_id: String,
    pub pattern_id: String,
    pub deadline_type: String,
    pub title: String,
    pub due_date: String,
    pub document_type: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadlinesData {
    pub rows: Vec<DeadlineRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummaryData {
    pub db_path: String,
    pub schema_version: String,
    pub public_views: Vec<PublicView>,
    pub data_range: DataRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaViewData {
    pub view: PublicView,
}
