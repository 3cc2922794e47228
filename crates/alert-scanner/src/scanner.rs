//! The scanning state machine and alert list.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use match_engine::match_percentage;
use scholar_core::{
    Alert, AlertSettings, AlertUrgency, Opportunity, SettingsStorage, UserProfile,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::stats::AlertStats;

/// Scans the catalog on a schedule and maintains the alert list.
///
/// The scanner starts stopped. `start` spawns the periodic schedule and
/// `stop` cancels it; both are safe to call from any state, any number of
/// times. Alerts accumulate newest-first and stay until deleted.
pub struct AlertScanner {
    inner: Arc<Inner>,
}

struct Inner {
    catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>,
    profile_rx: watch::Receiver<Option<UserProfile>>,
    state: Mutex<ScannerState>,
    task: Mutex<Option<JoinHandle<()>>>,
    storage: Mutex<Option<Arc<dyn SettingsStorage>>>,
    alerts_tx: watch::Sender<Arc<Vec<Alert>>>,
    scanning_tx: watch::Sender<bool>,
    last_scan_tx: watch::Sender<Option<DateTime<Utc>>>,
}

struct ScannerState {
    alerts: Vec<Alert>,
    settings: AlertSettings,
    next_alert_id: u64,
}

impl AlertScanner {
    pub fn new(
        catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>,
        profile_rx: watch::Receiver<Option<UserProfile>>,
    ) -> Self {
        let (alerts_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (scanning_tx, _) = watch::channel(false);
        let (last_scan_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                catalog_rx,
                profile_rx,
                state: Mutex::new(ScannerState {
                    alerts: Vec::new(),
                    settings: AlertSettings::default(),
                    next_alert_id: 1,
                }),
                task: Mutex::new(None),
                storage: Mutex::new(None),
                alerts_tx,
                scanning_tx,
                last_scan_tx,
            }),
        }
    }

    /// Start from non-default settings, typically the saved ones.
    pub fn with_settings(self, settings: AlertSettings) -> Self {
        self.inner.state.lock().unwrap().settings = settings;
        self
    }

    /// Attach a settings store; `update_settings` persists through it.
    pub fn with_storage(self, storage: Arc<dyn SettingsStorage>) -> Self {
        *self.inner.storage.lock().unwrap() = Some(storage);
        self
    }

    /// Begin periodic scanning. Calling while already running is a no-op;
    /// the first tick fires one full interval after this call.
    pub fn start(&self) {
        let mut task = self.inner.task.lock().unwrap();
        if task.is_some() {
            tracing::debug!("scanner already running");
            return;
        }

        self.inner.last_scan_tx.send_replace(Some(Utc::now()));
        self.inner.scanning_tx.send_replace(true);

        let inner = self.inner.clone();
        *task = Some(tokio::spawn(async move {
            loop {
                // Re-read the frequency before every wait so a settings
                // update takes effect without a restart.
                let interval = {
                    let state = inner.state.lock().unwrap();
                    state.settings.scan_frequency.interval()
                };
                tokio::time::sleep(interval).await;
                inner.tick(Utc::now());
            }
        }));
        tracing::info!("alert scanner started");
    }

    /// Cancel the periodic schedule. Safe from any state; once this returns
    /// no further ticks fire until the next `start`.
    pub fn stop(&self) {
        let handle = self.inner.task.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.abort();
            self.inner.scanning_tx.send_replace(false);
            tracing::info!("alert scanner stopped");
        }
    }

    /// Run one scan immediately, regardless of schedule state.
    pub fn scan_now(&self) {
        self.inner.tick(Utc::now());
    }

    pub fn mark_as_read(&self, id: u64) {
        let snapshot = {
            let mut state = self.inner.state.lock().unwrap();
            match state.alerts.iter_mut().find(|a| a.id == id) {
                Some(alert) if !alert.is_read => {
                    alert.is_read = true;
                    Some(Arc::new(state.alerts.clone()))
                }
                _ => None,
            }
        };
        if let Some(snapshot) = snapshot {
            self.inner.alerts_tx.send_replace(snapshot);
        }
    }

    /// Idempotent: a second call changes nothing and publishes nothing.
    pub fn mark_all_as_read(&self) {
        let snapshot = {
            let mut state = self.inner.state.lock().unwrap();
            let mut changed = false;
            for alert in state.alerts.iter_mut() {
                if !alert.is_read {
                    alert.is_read = true;
                    changed = true;
                }
            }
            changed.then(|| Arc::new(state.alerts.clone()))
        };
        if let Some(snapshot) = snapshot {
            self.inner.alerts_tx.send_replace(snapshot);
        }
    }

    /// Remove an alert by id; unknown ids are ignored.
    pub fn delete_alert(&self, id: u64) {
        let snapshot = {
            let mut state = self.inner.state.lock().unwrap();
            let before = state.alerts.len();
            state.alerts.retain(|a| a.id != id);
            (state.alerts.len() != before).then(|| Arc::new(state.alerts.clone()))
        };
        if let Some(snapshot) = snapshot {
            self.inner.alerts_tx.send_replace(snapshot);
        }
    }

    /// Replace the settings atomically; the next tick uses them. Existing
    /// alerts are not re-filtered. Persists through the attached storage
    /// when one is present, best-effort.
    pub async fn update_settings(&self, settings: AlertSettings) {
        self.inner.state.lock().unwrap().settings = settings.clone();
        tracing::debug!("alert settings updated");

        let storage = self.inner.storage.lock().unwrap().clone();
        if let Some(storage) = storage {
            if let Err(e) = storage.save(&settings).await {
                tracing::warn!(error = %e, "failed to save alert settings");
            }
        }
    }

    pub fn settings(&self) -> AlertSettings {
        self.inner.state.lock().unwrap().settings.clone()
    }

    /// Metrics rollup over the current alert list.
    pub fn stats(&self) -> AlertStats {
        let state = self.inner.state.lock().unwrap();
        AlertStats::compute(&state.alerts, Utc::now())
    }

    /// Receiver for the newest-first alert list.
    pub fn alerts(&self) -> watch::Receiver<Arc<Vec<Alert>>> {
        self.inner.alerts_tx.subscribe()
    }

    pub fn is_scanning(&self) -> watch::Receiver<bool> {
        self.inner.scanning_tx.subscribe()
    }

    pub fn last_scan_time(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_scan_tx.subscribe()
    }
}

impl Inner {
    /// One scan pass: filter the live catalog through the settings, turn
    /// survivors into alerts, and prepend the batch in catalog order.
    fn tick(&self, now: DateTime<Utc>) {
        let catalog = self.catalog_rx.borrow().clone();
        let profile = self.profile_rx.borrow().clone();

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let mut batch = Vec::new();
            for opportunity in catalog.iter() {
                let Some(urgency) = candidate_urgency(opportunity, &state.settings, now)
                else {
                    continue;
                };
                let id = state.next_alert_id;
                state.next_alert_id += 1;
                batch.push(Alert {
                    id,
                    opportunity_id: opportunity.id.clone(),
                    title: opportunity.title.clone(),
                    match_percentage: match_percentage(profile.as_ref(), opportunity),
                    urgency,
                    created_at: now,
                    is_read: false,
                });
            }
            if batch.is_empty() {
                None
            } else {
                tracing::info!(count = batch.len(), "scan produced new alerts");
                batch.append(&mut std::mem::take(&mut state.alerts));
                state.alerts = batch;
                Some(Arc::new(state.alerts.clone()))
            }
        };

        if let Some(snapshot) = snapshot {
            self.alerts_tx.send_replace(snapshot);
        }
        self.last_scan_tx.send_replace(Some(now));
    }
}

/// Settings gate for one opportunity, returning its urgency when it should
/// become an alert. The amount gate only applies when an amount is listed;
/// an empty category set means every category; the urgency set always
/// applies, so an empty one yields no alerts.
fn candidate_urgency(
    opportunity: &Opportunity,
    settings: &AlertSettings,
    now: DateTime<Utc>,
) -> Option<AlertUrgency> {
    if opportunity.is_expired(now) {
        return None;
    }
    if let Some(amount) = opportunity.amount {
        if amount < settings.min_amount || amount > settings.max_amount {
            return None;
        }
    }
    if !settings.categories.is_empty() && !settings.categories.contains(&opportunity.category) {
        return None;
    }
    let urgency = AlertUrgency::for_deadline(opportunity.deadline, now);
    settings.urgency_levels.contains(&urgency).then_some(urgency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scholar_core::{OpportunityCategory, ScanFrequency, StorageError};
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::task::yield_now;
    use tokio::time::advance;

    fn opportunity(
        id: &str,
        category: OpportunityCategory,
        amount: Option<f64>,
        deadline_days: Option<i64>,
    ) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            title: format!("Opportunity {id}"),
            category,
            deadline: deadline_days.map(|d| Utc::now() + chrono::Duration::days(d)),
            amount,
            requirements: vec![],
            tags: vec![],
            description: String::new(),
        }
    }

    fn scanner_with(catalog: Vec<Opportunity>) -> AlertScanner {
        let (_catalog_tx, catalog_rx) = watch::channel(Arc::new(catalog));
        let (_profile_tx, profile_rx) = watch::channel(None);
        AlertScanner::new(catalog_rx, profile_rx)
    }

    fn frequent() -> AlertSettings {
        AlertSettings {
            scan_frequency: ScanFrequency::Frequent,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scan_now_alerts_on_live_entries_only() {
        let scanner = scanner_with(vec![
            opportunity("urgent", OpportunityCategory::Stem, Some(5_000.0), Some(3)),
            opportunity("expired", OpportunityCategory::Stem, Some(5_000.0), Some(-1)),
            opportunity("open", OpportunityCategory::General, None, None),
        ]);

        scanner.scan_now();

        let alerts = scanner.alerts().borrow().clone();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].opportunity_id, "urgent");
        assert_eq!(alerts[0].urgency, AlertUrgency::High);
        assert!(alerts[0].is_urgent());
        assert_eq!(alerts[1].opportunity_id, "open");
        assert_eq!(alerts[1].urgency, AlertUrgency::Low);
        assert!(alerts.iter().all(|a| !a.is_read));
        assert!(scanner.last_scan_time().borrow().is_some());

        let stats = scanner.stats();
        assert_eq!(stats.unread_count, 2);
        assert_eq!(stats.today_alerts, 2);
        assert_eq!(stats.week_alerts, 2);
        assert_eq!(stats.match_rate, 40, "no profile scores the base only");
    }

    #[tokio::test]
    async fn amount_gate_skips_only_priced_outliers() {
        let scanner = scanner_with(vec![
            opportunity("low", OpportunityCategory::General, Some(500.0), None),
            opportunity("high", OpportunityCategory::General, Some(10_000.0), None),
            opportunity("unpriced", OpportunityCategory::General, None, None),
            opportunity("fits", OpportunityCategory::General, Some(3_000.0), None),
        ]);
        scanner
            .update_settings(AlertSettings {
                min_amount: 1_000.0,
                max_amount: 5_000.0,
                ..Default::default()
            })
            .await;

        scanner.scan_now();

        let alerts = scanner.alerts().borrow().clone();
        let ids: Vec<_> = alerts.iter().map(|a| a.opportunity_id.as_str()).collect();
        assert_eq!(ids, vec!["unpriced", "fits"]);
    }

    #[tokio::test]
    async fn category_filter_applies_when_set_is_non_empty() {
        let scanner = scanner_with(vec![
            opportunity("stem", OpportunityCategory::Stem, Some(2_000.0), None),
            opportunity("arts", OpportunityCategory::Arts, Some(2_000.0), None),
        ]);
        scanner
            .update_settings(AlertSettings {
                categories: HashSet::from([OpportunityCategory::Stem]),
                ..Default::default()
            })
            .await;

        scanner.scan_now();
        let first: Vec<_> = scanner
            .alerts()
            .borrow()
            .iter()
            .map(|a| a.opportunity_id.clone())
            .collect();
        assert_eq!(first, vec!["stem"]);

        // Back to the wildcard empty set; earlier alerts are kept as-is.
        scanner.update_settings(AlertSettings::default()).await;
        scanner.scan_now();

        let alerts = scanner.alerts().borrow().clone();
        let ids: Vec<_> = alerts.iter().map(|a| a.opportunity_id.as_str()).collect();
        assert_eq!(ids, vec!["stem", "arts", "stem"]);
    }

    #[tokio::test]
    async fn empty_urgency_set_produces_no_alerts() {
        let scanner = scanner_with(vec![opportunity(
            "any",
            OpportunityCategory::General,
            Some(2_000.0),
            Some(3),
        )]);
        scanner
            .update_settings(AlertSettings {
                urgency_levels: HashSet::new(),
                ..Default::default()
            })
            .await;

        scanner.scan_now();

        assert!(scanner.alerts().borrow().is_empty());
        assert!(scanner.last_scan_time().borrow().is_some());
    }

    #[tokio::test]
    async fn batches_accumulate_newest_first() {
        let scanner = scanner_with(vec![
            opportunity("a", OpportunityCategory::General, None, None),
            opportunity("b", OpportunityCategory::General, None, None),
        ]);

        scanner.scan_now();
        scanner.scan_now();

        let alerts = scanner.alerts().borrow().clone();
        let ids: Vec<_> = alerts.iter().map(|a| a.id).collect();
        // Second batch in front, catalog order preserved inside each batch.
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }

    #[tokio::test]
    async fn read_state_is_idempotent() {
        let scanner = scanner_with(vec![
            opportunity("a", OpportunityCategory::General, None, None),
            opportunity("b", OpportunityCategory::General, None, None),
        ]);
        scanner.scan_now();
        let mut rx = scanner.alerts();
        rx.borrow_and_update();

        scanner.mark_as_read(1);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert_eq!(scanner.stats().unread_count, 1);

        // Already read: no state change, no publish.
        scanner.mark_as_read(1);
        assert!(!rx.has_changed().unwrap());

        scanner.mark_all_as_read();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert_eq!(scanner.stats().unread_count, 0);

        scanner.mark_all_as_read();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(scanner.stats().unread_count, 0);
    }

    #[tokio::test]
    async fn delete_removes_by_id_and_ignores_unknown() {
        let scanner = scanner_with(vec![
            opportunity("a", OpportunityCategory::General, None, None),
            opportunity("b", OpportunityCategory::General, None, None),
        ]);
        scanner.scan_now();
        let mut rx = scanner.alerts();
        rx.borrow_and_update();

        scanner.delete_alert(1);
        assert!(rx.has_changed().unwrap());
        let ids: Vec<_> = rx.borrow_and_update().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2]);

        scanner.delete_alert(99);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_a_single_schedule() {
        let scanner = scanner_with(vec![
            opportunity("a", OpportunityCategory::General, None, None),
            opportunity("b", OpportunityCategory::General, None, None),
        ])
        .with_settings(frequent());
        let mut rx = scanner.alerts();

        scanner.start();
        scanner.start();
        assert!(*scanner.is_scanning().borrow());

        // Nothing fires before one full interval has elapsed.
        advance(Duration::from_secs(450)).await;
        assert!(!rx.has_changed().unwrap());

        advance(Duration::from_secs(450)).await;
        rx.changed().await.unwrap();
        yield_now().await;
        yield_now().await;
        assert_eq!(rx.borrow_and_update().len(), 2, "one batch per interval");

        rx.changed().await.unwrap();
        yield_now().await;
        assert_eq!(rx.borrow_and_update().len(), 4);

        scanner.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks_and_restart_resumes() {
        let scanner = scanner_with(vec![opportunity(
            "a",
            OpportunityCategory::General,
            None,
            None,
        )])
        .with_settings(frequent());
        let mut rx = scanner.alerts();

        scanner.start();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        scanner.stop();
        assert!(!*scanner.is_scanning().borrow());

        advance(Duration::from_secs(3_600)).await;
        yield_now().await;
        assert!(!rx.has_changed().unwrap(), "no ticks after stop");

        // Stop while stopped is a no-op.
        scanner.stop();

        scanner.start();
        assert!(*scanner.is_scanning().borrow());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);

        scanner.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn scan_frequency_change_governs_the_next_wait() {
        let scanner = scanner_with(vec![opportunity(
            "a",
            OpportunityCategory::General,
            None,
            None,
        )])
        .with_settings(frequent());
        let mut rx = scanner.alerts();

        scanner.start();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        scanner
            .update_settings(AlertSettings {
                scan_frequency: ScanFrequency::Daily,
                ..Default::default()
            })
            .await;

        // The wait already in progress keeps its 15-minute deadline.
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);

        // From here the daily period governs: the old cadence is silent.
        advance(Duration::from_secs(4 * 900)).await;
        yield_now().await;
        assert!(!rx.has_changed().unwrap());

        advance(Duration::from_secs(86_400)).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 3);

        scanner.stop();
    }

    #[derive(Default)]
    struct MemorySettings {
        saved: Mutex<Option<AlertSettings>>,
    }

    #[async_trait]
    impl SettingsStorage for MemorySettings {
        async fn load(&self) -> Option<AlertSettings> {
            self.saved.lock().unwrap().clone()
        }

        async fn save(&self, settings: &AlertSettings) -> Result<(), StorageError> {
            *self.saved.lock().unwrap() = Some(settings.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn update_settings_persists_through_storage() {
        let storage = Arc::new(MemorySettings::default());
        let scanner = scanner_with(vec![]).with_storage(storage.clone());

        let custom = AlertSettings {
            min_amount: 2_500.0,
            scan_frequency: ScanFrequency::Daily,
            ..Default::default()
        };
        scanner.update_settings(custom.clone()).await;

        assert_eq!(scanner.settings(), custom);
        assert_eq!(*storage.saved.lock().unwrap(), Some(custom));
    }
}
