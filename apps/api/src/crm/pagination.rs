//! Activity Fetcher — walks a lead's activity collection page by page.
//!
//! The collection only supports `date_created__gt` / `date_created__lt` filters
//! plus a row `_skip`, and many activities can share one exact timestamp. The
//! traversal therefore carries an explicit cursor:
//!
//! 1. The first page asks for activity *after* `now - LOOKBACK_DAYS`.
//! 2. Every later page asks for activity *before* the last timestamp seen.
//! 3. When a page ends on the tie-reference timestamp, the bound stays put and
//!    `_skip` grows by the page length so the next request walks further into
//!    the tied group. Any other ending timestamp resets `_skip` to 0 and becomes
//!    the new tie-reference.
//!
//! Traversal stops on an empty page or `has_more == false`. The result is the
//! first `MAX_ACTIVITIES` records in fetch order. A failed page aborts the whole
//! call and nothing accumulated so far is returned.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::crm::{ActivityQuery, CrmBackend, CrmError, TimeBound};
use crate::models::activity::ActivityRecord;

/// Lookback horizon for the first page.
pub const LOOKBACK_DAYS: i64 = 180;

/// Hard cap on the records returned to the caller.
pub const MAX_ACTIVITIES: usize = 10;

/// Which side of `reference_timestamp` the next page is filtered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// First page only.
    After,
    /// Every page after the first. Terminal.
    Before,
}

/// Per-invocation traversal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalCursor {
    pub reference_timestamp: DateTime<Utc>,
    pub skip_offset: usize,
    pub direction: Direction,
    tie_reference: Option<DateTime<Utc>>,
}

impl TraversalCursor {
    /// Cursor positioned at the lookback horizon relative to `now`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            reference_timestamp: now - Duration::days(LOOKBACK_DAYS),
            skip_offset: 0,
            direction: Direction::After,
            tie_reference: None,
        }
    }

    pub fn query(&self, lead_id: &str) -> ActivityQuery {
        let bound = match self.direction {
            Direction::After => TimeBound::After(self.reference_timestamp),
            Direction::Before => TimeBound::Before(self.reference_timestamp),
        };
        ActivityQuery {
            lead_id: lead_id.to_string(),
            bound,
            skip: self.skip_offset,
        }
    }

    /// Moves the cursor past a fetched page. Empty pages leave it untouched.
    pub fn advance(&mut self, page: &[ActivityRecord]) {
        let (Some(first), Some(last)) = (page.first(), page.last()) else {
            return;
        };

        if self.direction == Direction::After {
            self.tie_reference = Some(first.activity_at);
        }

        if self.tie_reference == Some(last.activity_at) {
            self.skip_offset += page.len();
        } else {
            self.skip_offset = 0;
            self.tie_reference = Some(last.activity_at);
        }

        self.reference_timestamp = last.activity_at;
        self.direction = Direction::Before;
    }

    pub fn tie_reference(&self) -> Option<DateTime<Utc>> {
        self.tie_reference
    }
}

/// Returns up to `MAX_ACTIVITIES` recent activity records for `lead_id`.
pub async fn fetch_recent_activities(
    crm: &dyn CrmBackend,
    lead_id: &str,
) -> Result<Vec<ActivityRecord>, CrmError> {
    fetch_recent_activities_at(crm, lead_id, Utc::now()).await
}

/// Same as `fetch_recent_activities` with an explicit clock.
pub async fn fetch_recent_activities_at(
    crm: &dyn CrmBackend,
    lead_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ActivityRecord>, CrmError> {
    let lead_id = lead_id.trim();
    if lead_id.is_empty() {
        return Err(CrmError::InvalidLeadId("lead_id cannot be empty".to_string()));
    }

    let mut cursor = TraversalCursor::starting_at(now);
    let mut buffer: Vec<ActivityRecord> = Vec::new();
    let mut pages = 0usize;

    loop {
        let query = cursor.query(lead_id);
        debug!(
            "Fetching activity page {} for lead {}: bound={:?} skip={} tie_reference={:?}",
            pages + 1,
            lead_id,
            query.bound,
            query.skip,
            cursor.tie_reference()
        );

        let page = crm.fetch_activity_page(&query).await?;
        pages += 1;

        if page.records.is_empty() {
            break;
        }

        cursor.advance(&page.records);
        buffer.extend(page.records);

        if !page.has_more {
            break;
        }
    }

    info!(
        "Fetched {} activities for lead {} across {} pages",
        buffer.len(),
        lead_id,
        pages
    );

    buffer.truncate(MAX_ACTIVITIES);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::testing::{at, record, ScriptedCrm, SimulatedCrm};
    use crate::models::activity::ActivityPage;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn horizon() -> DateTime<Utc> {
        now() - Duration::days(LOOKBACK_DAYS)
    }

    fn page(records: Vec<ActivityRecord>, has_more: bool) -> ActivityPage {
        ActivityPage { records, has_more }
    }

    fn after(ts: DateTime<Utc>, skip: usize) -> ActivityQuery {
        ActivityQuery {
            lead_id: "L1".to_string(),
            bound: TimeBound::After(ts),
            skip,
        }
    }

    fn before(ts: DateTime<Utc>, skip: usize) -> ActivityQuery {
        ActivityQuery {
            lead_id: "L1".to_string(),
            bound: TimeBound::Before(ts),
            skip,
        }
    }

    // ── Cursor ──────────────────────────────────────────────────────────────

    #[test]
    fn test_cursor_starts_at_horizon_seeking_forward() {
        let cursor = TraversalCursor::starting_at(now());
        assert_eq!(cursor.reference_timestamp, horizon());
        assert_eq!(cursor.skip_offset, 0);
        assert_eq!(cursor.direction, Direction::After);
        assert_eq!(cursor.query("L1"), after(horizon(), 0));
    }

    #[test]
    fn test_cursor_flips_to_before_after_first_page() {
        let mut cursor = TraversalCursor::starting_at(now());
        cursor.advance(&[record("a", at(30)), record("b", at(20))]);
        assert_eq!(cursor.direction, Direction::Before);
        assert_eq!(cursor.reference_timestamp, at(20));
        assert_eq!(cursor.skip_offset, 0);
        assert_eq!(cursor.tie_reference(), Some(at(20)));
    }

    #[test]
    fn test_cursor_ignores_empty_page() {
        let mut cursor = TraversalCursor::starting_at(now());
        let before_advance = cursor.clone();
        cursor.advance(&[]);
        assert_eq!(cursor, before_advance);
    }

    #[test]
    fn test_cursor_skip_accumulates_while_ties_continue() {
        let mut cursor = TraversalCursor::starting_at(now());
        cursor.advance(&[record("a", at(50)), record("b", at(50))]);
        assert_eq!(cursor.skip_offset, 2);
        cursor.advance(&[record("c", at(50)), record("d", at(50)), record("e", at(50))]);
        assert_eq!(cursor.skip_offset, 5);
        assert_eq!(cursor.reference_timestamp, at(50));
        cursor.advance(&[record("f", at(50)), record("g", at(40))]);
        assert_eq!(cursor.skip_offset, 0);
        assert_eq!(cursor.reference_timestamp, at(40));
    }

    // ── Traversal ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_three_records_then_empty_page_takes_two_requests() {
        let records = vec![record("r1", at(30)), record("r2", at(20)), record("r3", at(10))];
        let crm = ScriptedCrm::new(vec![
            Ok(page(records.clone(), true)),
            Ok(page(vec![], false)),
        ]);

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(result, records);
        assert_eq!(crm.queries(), vec![after(horizon(), 0), before(at(10), 0)]);
    }

    #[tokio::test]
    async fn test_less_than_a_page_issues_one_request() {
        let records = vec![record("r1", at(9)), record("r2", at(8))];
        let crm = ScriptedCrm::new(vec![Ok(page(records.clone(), false))]);

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(result, records);
        assert_eq!(crm.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_activity_older_than_horizon_yields_empty_result() {
        let old = horizon() - Duration::days(3);
        let crm = SimulatedCrm::new(
            3,
            vec![record("old1", old), record("old2", old - Duration::days(1))],
        );

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(crm.queries(), vec![after(horizon(), 0)]);
    }

    #[tokio::test]
    async fn test_tie_burst_walks_by_skip_with_unchanged_bound() {
        let tied = at(50);
        let crm = ScriptedCrm::new(vec![
            Ok(page(vec![record("t1", tied), record("t2", tied), record("t3", tied)], true)),
            Ok(page(vec![record("t4", tied), record("t5", tied), record("t6", tied)], true)),
            Ok(page(vec![record("t7", tied), record("n1", at(40))], true)),
            Ok(page(vec![], false)),
        ]);

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(
            crm.queries(),
            vec![
                after(horizon(), 0),
                before(tied, 3),
                before(tied, 6),
                before(at(40), 0),
            ]
        );
        let ids: Vec<_> = result.iter().map(|r| r.payload["id"].clone()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5", "t6", "t7", "n1"]);
    }

    #[tokio::test]
    async fn test_tie_burst_stops_when_has_more_is_false() {
        let tied = at(50);
        let crm = ScriptedCrm::new(vec![
            Ok(page(vec![record("t1", tied), record("t2", tied)], true)),
            Ok(page(vec![record("t3", tied), record("t4", tied)], false)),
        ]);

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(crm.queries(), vec![after(horizon(), 0), before(tied, 2)]);
    }

    #[tokio::test]
    async fn test_tied_first_page_skips_past_older_records_under_strict_bound() {
        // The strict `<` bound already excludes the tied timestamp, so the
        // accumulated skip is applied to older records and drops them.
        let tied = at(50);
        let crm = SimulatedCrm::new(
            3,
            vec![
                record("t1", tied),
                record("t2", tied),
                record("t3", tied),
                record("t4", tied),
                record("n1", at(40)),
                record("n2", at(30)),
            ],
        );

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(crm.queries(), vec![after(horizon(), 0), before(tied, 3)]);
        let ids: Vec<_> = result.iter().map(|r| r.payload["id"].clone()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn test_tie_reference_rebases_to_latest_boundary() {
        // Page 1 ends on t=40, which becomes the tie reference instead of the
        // page's first timestamp. Page 2 ending on 40 again is then walked by skip,
        // and page 3 ending on 20 re-bases once more.
        let crm = ScriptedCrm::new(vec![
            Ok(page(vec![record("a", at(60)), record("b", at(40))], true)),
            Ok(page(vec![record("c", at(40)), record("d", at(40))], true)),
            Ok(page(vec![record("e", at(30)), record("f", at(20))], true)),
            Ok(page(vec![record("g", at(60)), record("h", at(20))], true)),
            Ok(page(vec![], false)),
        ]);

        fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(
            crm.queries(),
            vec![
                after(horizon(), 0),
                before(at(40), 0),
                before(at(40), 2),
                before(at(20), 0),
                before(at(20), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_result_is_capped_at_ten_records() {
        let records: Vec<_> = (0..25)
            .map(|i| record(&format!("r{i}"), at(100 - i)))
            .collect();
        let crm = SimulatedCrm::new(10, records.clone());

        let result = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(result.len(), MAX_ACTIVITIES);
        assert_eq!(result, records[..MAX_ACTIVITIES].to_vec());
        assert_eq!(crm.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_after_two_pages_returns_no_partial_result() {
        let crm = ScriptedCrm::new(vec![
            Ok(page(vec![record("a", at(30)), record("b", at(25))], true)),
            Ok(page(vec![record("c", at(20)), record("d", at(15))], true)),
            Err(CrmError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        ]);

        let result = fetch_recent_activities_at(&crm, "L1", now()).await;

        assert!(matches!(result, Err(CrmError::Api { status: 502, .. })));
        assert_eq!(crm.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_invocations_are_identical() {
        let records: Vec<_> = (0..14)
            .map(|i| record(&format!("r{i}"), at(80 - i)))
            .collect();
        let crm = SimulatedCrm::new(4, records);

        let first = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();
        let second = fetch_recent_activities_at(&crm, "L1", now()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), MAX_ACTIVITIES);
    }

    #[tokio::test]
    async fn test_empty_lead_id_is_rejected_without_requests() {
        let crm = ScriptedCrm::new(vec![]);

        let result = fetch_recent_activities_at(&crm, "   ", now()).await;

        assert!(matches!(result, Err(CrmError::InvalidLeadId(_))));
        assert!(crm.queries().is_empty());
    }
}
