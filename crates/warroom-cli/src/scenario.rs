//! Canned incident scenarios for the demo runner.

use serde_json::{json, Value};

/// Latency spike on the user API: a config deploy shrank the database
/// connection pool right before p99 went from 200ms to 3000ms.
pub fn latency_spike() -> Value {
    json!({
        "id": "INC-2024-1029-001",
        "symptom": "API latency spike - p99 latency increased from 200ms to 3000ms",
        "severity": "high",
        "service": "user-api",
        "started_at": "2024-10-29T14:30:00Z",
        "affected_endpoints": [
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v1/users/search"
        ],
        "impact": "50% of user requests experiencing slow response times"
    })
}
