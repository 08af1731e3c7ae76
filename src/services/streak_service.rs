use chrono::{Days, NaiveDate};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{error::Result, models::StreakSnapshot};

/// Length of the contiguous run of active days ending at the newest date.
///
/// `dates` must be distinct calendar days sorted newest first. The run only
/// counts when its newest day is today or yesterday; an older latest day
/// means the streak is broken and the current run is zero.
pub fn current_run(dates: &[NaiveDate], today: NaiveDate) -> i32 {
    let Some(&latest) = dates.first() else {
        return 0;
    };

    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    for (offset, &date) in dates.iter().enumerate().skip(1) {
        let expected = latest - Days::new(offset as u64);
        if date == expected {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Recomputes the caller's streak state from their full set of workout days
/// and writes it back onto the user row. Runs inside the caller's
/// transaction; the user row is locked first so concurrent saves serialize.
///
/// `longest_streak` only ever ratchets upward, so deleting old sessions can
/// lower the current run without erasing a past best.
pub async fn record_qualifying_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<StreakSnapshot> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    let dates: Vec<NaiveDate> = sqlx::query_scalar(
        "SELECT DISTINCT (start_time AT TIME ZONE 'UTC')::date AS day
         FROM workout_sessions
         WHERE user_id = $1
         ORDER BY day DESC",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let current = current_run(&dates, today);
    let total = dates.len() as i32;

    let snapshot = sqlx::query_as::<_, StreakSnapshot>(
        "UPDATE users
         SET current_streak = $2,
             longest_streak = GREATEST(longest_streak, $2),
             total_active_days = $3
         WHERE id = $1
         RETURNING current_streak, longest_streak, total_active_days",
    )
    .bind(user_id)
    .bind(current)
    .bind(total)
    .fetch_one(&mut *conn)
    .await?;

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
    }

    #[test]
    fn no_activity_means_no_run() {
        assert_eq!(current_run(&[], day(10)), 0);
    }

    #[test]
    fn run_counts_back_from_today() {
        let dates = [day(10), day(9), day(8)];
        assert_eq!(current_run(&dates, day(10)), 3);
    }

    #[test]
    fn run_survives_when_latest_was_yesterday() {
        let dates = [day(9), day(8)];
        assert_eq!(current_run(&dates, day(10)), 2);
    }

    #[test]
    fn gap_before_today_resets_the_run() {
        let dates = [day(7), day(6), day(5)];
        assert_eq!(current_run(&dates, day(10)), 0);
    }

    #[test]
    fn run_stops_at_the_first_missing_day() {
        // Active on the 1st, 2nd, 3rd and 5th: the run ending on the 5th is
        // just that one day, even though four days are active in total.
        let dates = [day(5), day(3), day(2), day(1)];
        assert_eq!(current_run(&dates, day(5)), 1);
    }

    #[test]
    fn consecutive_weekdays_accumulate() {
        let monday = day(3);
        let tuesday = day(4);
        let wednesday = day(5);

        assert_eq!(current_run(&[monday], monday), 1);
        assert_eq!(current_run(&[tuesday, monday], tuesday), 2);
        assert_eq!(current_run(&[wednesday, tuesday, monday], wednesday), 3);
    }

    #[test]
    fn single_old_day_is_zero_not_one() {
        assert_eq!(current_run(&[day(1)], day(10)), 0);
    }
}
