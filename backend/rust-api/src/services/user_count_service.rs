use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    models::user_count::{CountResult, DurationUnit},
    services::user_store::UserStore,
    utils::time::trailing_window,
};

const UNIT_EXPECTATION: &str = "the server was expecting one of: day, week, month, year";
const DURATION_EXPECTATION: &str = "the server was expecting a positive time period";

#[derive(Debug, Error)]
pub enum UserCountError {
    #[error("{field} => Invalid parameter value detected: Invalid external api parameter: {expected}")]
    InvalidArgument {
        field: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl UserCountError {
    fn invalid_unit() -> Self {
        UserCountError::InvalidArgument {
            field: "duration_unit",
            expected: UNIT_EXPECTATION,
        }
    }

    fn invalid_duration() -> Self {
        UserCountError::InvalidArgument {
            field: "duration",
            expected: DURATION_EXPECTATION,
        }
    }

    /// Name of the offending parameter for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            UserCountError::InvalidArgument { field, .. } => Some(*field),
            UserCountError::Store(_) => None,
        }
    }
}

/// Counts accounts that logged in during a trailing calendar window.
pub struct ActiveUserCounter {
    store: Arc<dyn UserStore>,
}

impl ActiveUserCounter {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn count(
        &self,
        duration: i64,
        duration_unit: &str,
    ) -> Result<CountResult, UserCountError> {
        self.count_at(Utc::now(), duration, duration_unit).await
    }

    /// Same as [`count`](Self::count) with the window anchored at `now`.
    pub async fn count_at(
        &self,
        now: DateTime<Utc>,
        duration: i64,
        duration_unit: &str,
    ) -> Result<CountResult, UserCountError> {
        let unit = DurationUnit::parse(duration_unit).ok_or_else(UserCountError::invalid_unit)?;
        if duration <= 0 {
            return Err(UserCountError::invalid_duration());
        }
        let amount = u32::try_from(duration).map_err(|_| UserCountError::invalid_duration())?;
        let window =
            trailing_window(now, amount, unit).ok_or_else(UserCountError::invalid_duration)?;

        let count = self.store.count_active_users(&window).await?;

        tracing::debug!(
            duration,
            unit = %unit,
            from = %window.start,
            to = %window.end,
            count,
            "Counted active users"
        );

        Ok(CountResult::new(count, &window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{user::UserAccount, user_count::TimeWindow},
        services::user_store::InMemoryUserStore,
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps the in-memory store and records how many queries reached it.
    struct RecordingStore {
        inner: InMemoryUserStore,
        queries: AtomicUsize,
    }

    impl RecordingStore {
        fn new(accounts: Vec<UserAccount>) -> Arc<Self> {
            Arc::new(Self {
                inner: InMemoryUserStore::with_accounts(accounts),
                queries: AtomicUsize::new(0),
            })
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserStore for RecordingStore {
        async fn count_active_users(&self, window: &TimeWindow) -> anyhow::Result<u64> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.inner.count_active_users(window).await
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn scenario_accounts() -> Vec<UserAccount> {
        vec![
            UserAccount::new(Some(now())),
            UserAccount::new(Some(now() - Duration::days(2))),
            UserAccount::new(Some(now() - Duration::days(400))),
        ]
    }

    #[tokio::test]
    async fn test_rejects_unknown_unit_without_querying() {
        let store = RecordingStore::new(scenario_accounts());
        let counter = ActiveUserCounter::new(store.clone());

        for unit in ["hour", "YEAR", "years", "", "fortnight"] {
            let err = counter.count_at(now(), 1, unit).await.unwrap_err();
            assert_eq!(err.field(), Some("duration_unit"), "unit {unit:?}");
        }
        assert_eq!(store.queries(), 0);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_duration_without_querying() {
        let store = RecordingStore::new(scenario_accounts());
        let counter = ActiveUserCounter::new(store.clone());

        for duration in [0, -1, i64::MIN] {
            let err = counter.count_at(now(), duration, "day").await.unwrap_err();
            assert_eq!(err.field(), Some("duration"));
        }
        assert_eq!(store.queries(), 0);
    }

    #[tokio::test]
    async fn test_unit_is_checked_before_duration() {
        let counter = ActiveUserCounter::new(RecordingStore::new(vec![]));
        let err = counter.count_at(now(), 0, "hour").await.unwrap_err();
        assert_eq!(err.field(), Some("duration_unit"));
    }

    #[tokio::test]
    async fn test_unrepresentable_duration_is_invalid() {
        let store = RecordingStore::new(vec![]);
        let counter = ActiveUserCounter::new(store.clone());
        let err = counter.count_at(now(), i64::MAX, "year").await.unwrap_err();
        assert_eq!(err.field(), Some("duration"));
        assert_eq!(store.queries(), 0);
    }

    #[tokio::test]
    async fn test_error_message_names_parameter() {
        let counter = ActiveUserCounter::new(RecordingStore::new(vec![]));
        let err = counter.count_at(now(), 1, "hour").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "duration_unit => Invalid parameter value detected: Invalid external api parameter: \
             the server was expecting one of: day, week, month, year"
        );
    }

    #[tokio::test]
    async fn test_one_year_and_one_day_scenario() {
        let store = RecordingStore::new(scenario_accounts());
        let counter = ActiveUserCounter::new(store.clone());

        let year = counter.count_at(now(), 1, "year").await.unwrap();
        assert_eq!(year.count, 2);
        assert_eq!(year.from, "2023-06-15T12:00:00+00:00");
        assert_eq!(year.to, "2024-06-15T12:00:00+00:00");

        let day = counter.count_at(now(), 1, "day").await.unwrap();
        assert_eq!(day.count, 1);
        assert_eq!(day.from, "2024-06-14T12:00:00+00:00");

        assert_eq!(store.queries(), 2);
    }

    #[tokio::test]
    async fn test_window_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let store = RecordingStore::new(vec![
            UserAccount::new(Some(start)),
            UserAccount::new(Some(now())),
            UserAccount::new(Some(start - Duration::seconds(1))),
        ]);
        let counter = ActiveUserCounter::new(store);

        let result = counter.count_at(now(), 1, "month").await.unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.from, "2024-05-15T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_weeks_span_seven_days_each() {
        let store = RecordingStore::new(vec![
            UserAccount::new(Some(now() - Duration::days(13))),
            UserAccount::new(Some(now() - Duration::days(15))),
        ]);
        let counter = ActiveUserCounter::new(store);

        let result = counter.count_at(now(), 2, "week").await.unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.from, "2024-06-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let counter = ActiveUserCounter::new(RecordingStore::new(scenario_accounts()));
        let first = counter.count_at(now(), 1, "year").await.unwrap();
        let second = counter.count_at(now(), 1, "year").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_login_earlier_in_current_second_is_counted() {
        let now = now() + Duration::milliseconds(301);
        let counter = ActiveUserCounter::new(RecordingStore::new(vec![UserAccount::new(Some(
            now - Duration::milliseconds(1),
        ))]));

        let result = counter.count_at(now, 1, "year").await.unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.to, "2024-06-15T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_count_uses_wall_clock() {
        let counter = ActiveUserCounter::new(Arc::new(InMemoryUserStore::with_accounts(vec![
            UserAccount::new(Some(Utc::now())),
        ])));
        let before = Utc::now() - Duration::seconds(1);
        let result = counter.count(1, "year").await.unwrap();
        let to = DateTime::parse_from_rfc3339(&result.to)
            .unwrap()
            .with_timezone(&Utc);
        assert!(to >= before);
        assert_eq!(result.count, 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let counter = ActiveUserCounter::new(Arc::new(InMemoryUserStore::unavailable()));
        let err = counter.count_at(now(), 1, "year").await.unwrap_err();
        assert!(matches!(err, UserCountError::Store(_)));
        assert_eq!(err.field(), None);
    }
}
