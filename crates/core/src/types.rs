/// Users, profiles, and videos are keyed by UUID. A profile id is the user id.
pub type EntityId = uuid::Uuid;

/// Database-assigned positive integer identifying a user to the external
/// watermark service.
pub type NumericUserId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
