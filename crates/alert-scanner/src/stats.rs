//! Derived alert metrics.

use chrono::{DateTime, Duration, Utc};
use scholar_core::Alert;

/// Point-in-time rollup over the alert list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertStats {
    pub unread_count: usize,
    /// Alerts created on the current Utc calendar day.
    pub today_alerts: usize,
    /// Alerts created within the last seven days.
    pub week_alerts: usize,
    /// Rounded mean match percentage, 0 when there are no alerts.
    pub match_rate: u8,
}

impl AlertStats {
    pub fn compute(alerts: &[Alert], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let week_ago = now - Duration::days(7);

        let unread_count = alerts.iter().filter(|a| !a.is_read).count();
        let today_alerts = alerts
            .iter()
            .filter(|a| a.created_at.date_naive() == today)
            .count();
        let week_alerts = alerts.iter().filter(|a| a.created_at > week_ago).count();
        let match_rate = if alerts.is_empty() {
            0
        } else {
            let sum: u32 = alerts.iter().map(|a| u32::from(a.match_percentage)).sum();
            (sum as f64 / alerts.len() as f64).round() as u8
        };

        Self {
            unread_count,
            today_alerts,
            week_alerts,
            match_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::AlertUrgency;

    fn alert(id: u64, match_percentage: u8, created_at: DateTime<Utc>, is_read: bool) -> Alert {
        Alert {
            id,
            opportunity_id: format!("opp-{id}"),
            title: format!("Alert {id}"),
            match_percentage,
            urgency: AlertUrgency::Low,
            created_at,
            is_read,
        }
    }

    #[test]
    fn empty_list_is_all_zeros() {
        let stats = AlertStats::compute(&[], Utc::now());
        assert_eq!(stats, AlertStats::default());
    }

    #[test]
    fn match_rate_is_rounded_mean() {
        let now = Utc::now();
        let alerts = vec![alert(1, 90, now, false), alert(2, 80, now, false)];
        assert_eq!(AlertStats::compute(&alerts, now).match_rate, 85);
    }

    #[test]
    fn day_and_week_windows() {
        let now = Utc::now();
        let alerts = vec![
            alert(1, 50, now, false),
            alert(2, 50, now - Duration::days(2), true),
            alert(3, 50, now - Duration::days(8), false),
        ];

        let stats = AlertStats::compute(&alerts, now);
        assert_eq!(stats.today_alerts, 1);
        assert_eq!(stats.week_alerts, 2);
        assert_eq!(stats.unread_count, 2);
        assert_eq!(stats.match_rate, 50);
    }
}
