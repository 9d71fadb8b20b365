//! Repository Implementation

use crate::models::{
    AlertRecord, Contact, DashboardStats, Hive, HiveStatus, HiveUpdate, NewHive, ReadingRecord,
    Requester, Tip, TrainingApplication, TrainingResource, User,
};
use crate::StorageError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Retention limits for the append-only logs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Max reading records kept across all hives
    pub max_readings: usize,
    /// Max alert log entries
    pub max_alerts: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_readings: 100_000,
            max_alerts: 10_000,
        }
    }
}

/// Rows plus the next id to hand out
pub(crate) struct Table<T> {
    pub(crate) rows: VecDeque<T>,
    next_id: i64,
}

impl<T> Table<T> {
    pub(crate) fn new() -> Self {
        Self {
            rows: VecDeque::new(),
            next_id: 1,
        }
    }

    pub(crate) fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Repository for data access (in-memory)
pub struct Repository {
    hives: Mutex<Table<Hive>>,
    readings: Mutex<Table<ReadingRecord>>,
    alerts: Mutex<Table<AlertRecord>>,
    contacts: Mutex<HashMap<i64, Contact>>,
    pub(crate) users: Mutex<Table<User>>,
    pub(crate) tips: Mutex<Table<Tip>>,
    pub(crate) training: Mutex<Table<TrainingResource>>,
    pub(crate) applications: Mutex<Vec<TrainingApplication>>,
    retention: RetentionConfig,
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::with_retention(RetentionConfig::default())
    }

    /// Create a repository with explicit retention limits
    pub fn with_retention(retention: RetentionConfig) -> Self {
        info!("Creating in-memory repository with retention {:?}", retention);
        Self {
            hives: Mutex::new(Table::new()),
            readings: Mutex::new(Table::new()),
            alerts: Mutex::new(Table::new()),
            contacts: Mutex::new(HashMap::new()),
            users: Mutex::new(Table::new()),
            tips: Mutex::new(Table::new()),
            training: Mutex::new(Table::new()),
            applications: Mutex::new(Vec::new()),
            retention,
        }
    }

    // ---- Hives ----

    /// Register a hive. Name and device id are required; device ids are unique.
    pub fn register_hive(&self, new: NewHive) -> Result<Hive, StorageError> {
        let name = new.name.trim();
        let device_id = new.device_id.trim();
        if name.is_empty() || device_id.is_empty() {
            return Err(StorageError::InvalidState(
                "Name and device_id are required".to_string(),
            ));
        }

        let mut hives = lock(&self.hives)?;
        if hives.rows.iter().any(|h| h.device_id == device_id) {
            return Err(StorageError::Conflict(format!(
                "Device ID already registered: {}",
                device_id
            )));
        }

        let now = Utc::now();
        let hive = Hive {
            id: hives.allocate_id(),
            name: name.to_string(),
            device_id: device_id.to_string(),
            location: new.location.trim().to_string(),
            description: new.description.trim().to_string(),
            owner_id: new.owner_id,
            owner_name: new.owner_name,
            status: HiveStatus::Pending,
            created_at: now,
            updated_at: now,
            approved_at: None,
            approved_by: None,
        };
        hives.rows.push_back(hive.clone());

        info!("Registered hive {} ({}) for owner {}", hive.id, hive.device_id, hive.owner_id);
        Ok(hive)
    }

    /// Activate a pending hive. Admin only.
    pub fn approve_hive(&self, id: i64, requester: &Requester) -> Result<Hive, StorageError> {
        if !requester.is_admin() {
            return Err(StorageError::Forbidden);
        }

        let mut hives = lock(&self.hives)?;
        let hive = hives
            .rows
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(StorageError::NotFound)?;

        let now = Utc::now();
        hive.status = HiveStatus::Active;
        hive.approved_at = Some(now);
        hive.approved_by = Some(requester.user_id);
        hive.updated_at = now;

        info!("Hive {} approved by {}", id, requester.user_id);
        Ok(hive.clone())
    }

    /// Fetch a hive the requester owns (or any hive, for admins)
    pub fn get_hive(&self, id: i64, requester: &Requester) -> Result<Hive, StorageError> {
        let hives = lock(&self.hives)?;
        let hive = hives
            .rows
            .iter()
            .find(|h| h.id == id)
            .ok_or(StorageError::NotFound)?;

        if !requester.can_access(hive) {
            return Err(StorageError::Forbidden);
        }
        Ok(hive.clone())
    }

    /// Look a hive up by its sensor device id
    pub fn find_by_device(&self, device_id: &str) -> Result<Option<Hive>, StorageError> {
        let hives = lock(&self.hives)?;
        Ok(hives.rows.iter().find(|h| h.device_id == device_id).cloned())
    }

    /// Hives visible to the requester
    pub fn list_hives(&self, requester: &Requester) -> Result<Vec<Hive>, StorageError> {
        let hives = lock(&self.hives)?;
        Ok(hives
            .rows
            .iter()
            .filter(|h| requester.can_access(h))
            .cloned()
            .collect())
    }

    /// Apply a partial update
    pub fn update_hive(
        &self,
        id: i64,
        update: HiveUpdate,
        requester: &Requester,
    ) -> Result<Hive, StorageError> {
        let mut hives = lock(&self.hives)?;
        let hive = hives
            .rows
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(StorageError::NotFound)?;

        if !requester.can_access(hive) {
            return Err(StorageError::Forbidden);
        }

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(StorageError::InvalidState("Name cannot be empty".to_string()));
            }
            hive.name = name.to_string();
        }
        if let Some(location) = update.location {
            hive.location = location.trim().to_string();
        }
        if let Some(description) = update.description {
            hive.description = description.trim().to_string();
        }
        match update.status {
            Some(status) if requester.is_admin() => hive.status = status,
            Some(_) => debug!("Ignoring status change on hive {} from non-admin", id),
            None => {}
        }
        hive.updated_at = Utc::now();

        Ok(hive.clone())
    }

    /// Delete a hive and its readings, leaving a note in the alert log
    pub fn remove_hive(&self, id: i64, requester: &Requester) -> Result<Hive, StorageError> {
        let removed = {
            let mut hives = lock(&self.hives)?;
            let pos = hives
                .rows
                .iter()
                .position(|h| h.id == id)
                .ok_or(StorageError::NotFound)?;

            if !requester.can_access(&hives.rows[pos]) {
                return Err(StorageError::Forbidden);
            }
            hives.rows.remove(pos).ok_or(StorageError::NotFound)?
        };

        lock(&self.readings)?.rows.retain(|r| r.hive_id != id);
        self.insert_alert(AlertRecord::hive_deleted(&removed, requester.user_id, Utc::now()))?;

        warn!("Hive {} ({}) deleted by {}", removed.id, removed.name, requester.user_id);
        Ok(removed)
    }

    pub fn hive_count(&self) -> Result<usize, StorageError> {
        Ok(lock(&self.hives)?.rows.len())
    }

    // ---- Readings ----

    /// Insert a reading record, assigning its id
    pub fn insert_reading(&self, mut record: ReadingRecord) -> Result<i64, StorageError> {
        let mut readings = lock(&self.readings)?;
        record.id = readings.allocate_id();

        // Enforce retention
        while readings.rows.len() >= self.retention.max_readings.max(1) {
            readings.rows.pop_front();
        }

        let id = record.id;
        readings.rows.push_back(record);
        debug!("Inserted reading with ID {}", id);
        Ok(id)
    }

    /// Most recent reading for a hive
    pub fn latest_reading(&self, hive_id: i64) -> Result<Option<ReadingRecord>, StorageError> {
        Ok(self.recent_readings(hive_id, 1)?.into_iter().next())
    }

    /// Most recent readings for a hive, newest first
    pub fn recent_readings(
        &self,
        hive_id: i64,
        limit: usize,
    ) -> Result<Vec<ReadingRecord>, StorageError> {
        let readings = lock(&self.readings)?;
        let mut matching: Vec<_> = readings
            .rows
            .iter()
            .filter(|r| r.hive_id == hive_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit);
        Ok(matching)
    }

    pub fn reading_count(&self) -> Result<usize, StorageError> {
        Ok(lock(&self.readings)?.rows.len())
    }

    // ---- Alert log ----

    /// Insert an alert log entry, assigning its id
    pub fn insert_alert(&self, mut record: AlertRecord) -> Result<i64, StorageError> {
        let mut alerts = lock(&self.alerts)?;
        record.id = alerts.allocate_id();

        while alerts.rows.len() >= self.retention.max_alerts.max(1) {
            alerts.rows.pop_front();
        }

        let id = record.id;
        alerts.rows.push_back(record);
        debug!("Inserted alert with ID {}", id);
        Ok(id)
    }

    /// Alert log entries, newest first
    pub fn list_alerts(
        &self,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let alerts = lock(&self.alerts)?;
        Ok(alerts
            .rows
            .iter()
            .rev()
            .filter(|a| !unread_only || !a.is_read)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Mark an alert as read
    pub fn mark_read(&self, id: i64) -> Result<(), StorageError> {
        let mut alerts = lock(&self.alerts)?;
        let alert = alerts
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StorageError::NotFound)?;
        alert.is_read = true;
        Ok(())
    }

    /// Drop every alert log entry
    pub fn clear_alerts(&self) -> Result<(), StorageError> {
        lock(&self.alerts)?.rows.clear();
        info!("Alert log cleared");
        Ok(())
    }

    pub fn unread_count(&self) -> Result<usize, StorageError> {
        Ok(lock(&self.alerts)?.rows.iter().filter(|r| !r.is_read).count())
    }

    // ---- Contacts ----

    /// Store notification contact details for a user
    pub fn set_contact(&self, user_id: i64, contact: Contact) -> Result<(), StorageError> {
        lock(&self.contacts)?.insert(user_id, contact);
        Ok(())
    }

    /// Notification contact details for a user
    pub fn contact(&self, user_id: i64) -> Result<Option<Contact>, StorageError> {
        Ok(lock(&self.contacts)?.get(&user_id).cloned())
    }

    // ---- Dashboard ----

    /// Averages over the latest reading of each visible hive.
    ///
    /// Missing fields count as zero. Averages are rounded to one decimal
    /// and are all zero when no visible hive has a reading.
    pub fn dashboard_stats(&self, requester: &Requester) -> Result<DashboardStats, StorageError> {
        let hives = self.list_hives(requester)?;
        let hive_ids: HashSet<i64> = hives.iter().map(|h| h.id).collect();

        let mut totals = [0.0f64; 4];
        let mut with_data = 0usize;
        for hive in &hives {
            if let Some(latest) = self.latest_reading(hive.id)? {
                let r = latest.reading;
                totals[0] += r.temperature.unwrap_or(0.0);
                totals[1] += r.humidity.unwrap_or(0.0);
                totals[2] += r.hive_weight.unwrap_or(0.0);
                totals[3] += r.gas_level.unwrap_or(0.0);
                with_data += 1;
            }
        }

        let avg = |total: f64| {
            if with_data == 0 {
                0.0
            } else {
                round1(total / with_data as f64)
            }
        };

        let active_alerts = lock(&self.alerts)?
            .rows
            .iter()
            .filter(|a| !a.is_read && (requester.is_admin() || hive_ids.contains(&a.hive_id)))
            .count();

        Ok(DashboardStats {
            total_hives: hives.len(),
            active_alerts,
            temperature_avg: avg(totals[0]),
            humidity_avg: avg(totals[1]),
            weight_avg: avg(totals[2]),
            gas_level_avg: avg(totals[3]),
        })
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
