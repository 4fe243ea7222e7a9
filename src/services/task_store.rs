use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use rusqlite::{params, params_from_iter, Connection};

use crate::database;
use crate::error::{AssistantError, Result};
use crate::models::{
    CategoryStat, Event, ProductivityStats, Reminder, Task, TaskSortKey, TaskStatus,
};

/// How often the monitor thread polls for due reminders.
const POLL_PERIOD: Duration = Duration::from_secs(60);
/// Upper bound on waiting for the monitor thread at shutdown.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);
/// Daily event count above which the schedule counts as busy.
const BUSY_DAY_EVENTS: usize = 5;

pub type ReminderCallback = Box<dyn Fn(&Reminder) + Send>;

struct MonitorHandle {
    stop_tx: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

/// Tasks, calendar events and reminders over one SQLite file, plus the
/// background reminder monitor. Storage uses a connection per call.
pub struct TaskStore {
    db_path: PathBuf,
    monitor: Option<MonitorHandle>,
}

impl TaskStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        database::init_task_db(&db_path)?;
        Ok(Self {
            db_path,
            monitor: None,
        })
    }

    fn connect(&self) -> Result<Connection> {
        database::open(&self.db_path)
    }

    // ─── Tasks ───

    pub fn add_task(&self, task: &Task) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tasks
                (title, description, status, priority, due_date, created_at,
                 category, tags, estimated_duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.title,
                task.description,
                task.status.as_str(),
                task.priority,
                task.due_date.map(database::to_stored),
                database::now_stored(),
                task.category,
                serde_json::to_string(&task.tags)?,
                task.estimated_duration,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Filtered task query, ascending by the allow-listed sort column.
    pub fn get_tasks(
        &self,
        status: Option<TaskStatus>,
        category: Option<&str>,
        limit: usize,
        sort: TaskSortKey,
    ) -> Result<Vec<Task>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(status) = status {
            values.push(status.as_str().to_string());
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(category) = category {
            values.push(category.to_string());
            clauses.push(format!("category = ?{}", values.len()));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT id, title, description, status, priority, due_date, category,
                    tags, estimated_duration, actual_duration, created_at, completed_at
             FROM tasks {} ORDER BY {} ASC LIMIT {}",
            where_clause,
            sort.column(),
            limit
        );

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), row_to_task)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Rewrite the stored row for `task.id` with the given task.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let id = task
            .id
            .ok_or_else(|| AssistantError::not_found("Task", "<unsaved>"))?;
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, status = ?3, priority = ?4,
                 due_date = ?5, category = ?6, tags = ?7,
                 estimated_duration = ?8, actual_duration = ?9, completed_at = ?10
             WHERE id = ?11",
            params![
                task.title,
                task.description,
                task.status.as_str(),
                task.priority,
                task.due_date.map(database::to_stored),
                task.category,
                serde_json::to_string(&task.tags)?,
                task.estimated_duration,
                task.actual_duration,
                task.completed_at.map(database::to_stored),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(AssistantError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    pub fn complete_task(&self, id: i64) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE tasks SET status = 'completed', completed_at = ?1 WHERE id = ?2",
            params![database::now_stored(), id],
        )?;
        if changed == 0 {
            return Err(AssistantError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(AssistantError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    // ─── Events ───

    pub fn add_event(&self, event: &Event) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO events
                (title, description, start_time, end_time, location, attendees,
                 reminder_minutes, category, recurring, recurrence_pattern)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                event.title,
                event.description,
                database::to_stored(event.start_time),
                database::to_stored(event.end_time),
                event.location,
                serde_json::to_string(&event.attendees)?,
                event.reminder_minutes,
                event.category,
                event.recurring as i64,
                event.recurrence_pattern,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Events whose start time falls inside the given window, ordered
    /// by start time.
    pub fn get_events(
        &self,
        from: Option<chrono::DateTime<Utc>>,
        to: Option<chrono::DateTime<Utc>>,
        category: Option<&str>,
    ) -> Result<Vec<Event>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(from) = from {
            values.push(database::to_stored(from));
            clauses.push(format!("start_time >= ?{}", values.len()));
        }
        if let Some(to) = to {
            values.push(database::to_stored(to));
            clauses.push(format!("start_time < ?{}", values.len()));
        }
        if let Some(category) = category {
            values.push(category.to_string());
            clauses.push(format!("category = ?{}", values.len()));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT id, title, description, start_time, end_time, location, attendees,
                    reminder_minutes, category, recurring, recurrence_pattern
             FROM events {} ORDER BY start_time ASC",
            where_clause
        );

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), row_to_event)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_today_events(&self) -> Result<Vec<Event>> {
        let start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        self.get_events(Some(start), Some(start + ChronoDuration::days(1)), None)
    }

    pub fn get_upcoming_events(&self, days: i64) -> Result<Vec<Event>> {
        let now = Utc::now();
        self.get_events(Some(now), Some(now + ChronoDuration::days(days)), None)
    }

    // ─── Reminders ───

    pub fn add_reminder(&self, reminder: &Reminder) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO reminders
                (title, message, reminder_time, repeat_interval, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reminder.title,
                reminder.message,
                database::to_stored(reminder.reminder_time),
                reminder.repeat_interval,
                reminder.is_active as i64,
                database::now_stored(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_due_reminders(&self) -> Result<Vec<Reminder>> {
        let conn = self.connect()?;
        due_reminders(&conn)
    }

    pub fn update_reminder(&self, reminder: &Reminder) -> Result<()> {
        let id = reminder
            .id
            .ok_or_else(|| AssistantError::not_found("Reminder", "<unsaved>"))?;
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE reminders
             SET title = ?1, message = ?2, reminder_time = ?3,
                 repeat_interval = ?4, is_active = ?5
             WHERE id = ?6",
            params![
                reminder.title,
                reminder.message,
                database::to_stored(reminder.reminder_time),
                reminder.repeat_interval,
                reminder.is_active as i64,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(AssistantError::not_found("Reminder", id.to_string()));
        }
        Ok(())
    }

    /// Fire every due reminder through the callbacks and apply the
    /// repeat policy. Exposed so the monitor loop and tests share one
    /// code path.
    pub fn process_due_reminders(&self, callbacks: &[ReminderCallback]) -> Result<usize> {
        let conn = self.connect()?;
        poll_once(&conn, callbacks)
    }

    /// Start the 60-second reminder poll loop. Returns false when a
    /// monitor is already running.
    pub fn start_reminder_monitoring(&mut self, callbacks: Vec<ReminderCallback>) -> bool {
        if let Some(monitor) = &self.monitor {
            if !monitor.thread.is_finished() {
                return false;
            }
            self.monitor = None;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let db_path = self.db_path.clone();
        let thread = std::thread::spawn(move || loop {
            match database::open(&db_path).and_then(|conn| poll_once(&conn, &callbacks)) {
                Ok(fired) if fired > 0 => log::info!("fired {} reminder(s)", fired),
                Ok(_) => {}
                Err(e) => log::error!("reminder poll failed: {}", e),
            }
            // The channel doubles as an interruptible sleep.
            match stop_rx.recv_timeout(POLL_PERIOD) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        });

        self.monitor = Some(MonitorHandle { stop_tx, thread });
        true
    }

    /// Signal the monitor to exit and wait up to two seconds for it.
    /// A thread stuck past the deadline is abandoned with a warning.
    pub fn stop_reminder_monitoring(&mut self) {
        let Some(monitor) = self.monitor.take() else {
            return;
        };
        let _ = monitor.stop_tx.send(());

        let deadline = Instant::now() + STOP_TIMEOUT;
        while !monitor.thread.is_finished() {
            if Instant::now() >= deadline {
                log::warn!("reminder monitor did not stop within 2s; abandoning thread");
                return;
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        if monitor.thread.join().is_err() {
            log::error!("reminder monitor thread panicked");
        }
    }

    // ─── Analytics ───

    /// Completion aggregates for the trailing window. All ratios are
    /// zero-safe on an empty store.
    pub fn get_productivity_stats(&self, days: i64) -> Result<ProductivityStats> {
        let now = Utc::now();
        let cutoff = database::to_stored(now - ChronoDuration::days(days));
        let now_stored = database::to_stored(now);
        let conn = self.connect()?;

        let total_tasks_created: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE created_at >= ?1",
            params![cutoff],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*), AVG(actual_duration)
             FROM tasks
             WHERE status = 'completed' AND completed_at >= ?1
             GROUP BY category
             ORDER BY category",
        )?;
        let completed_by_category = stmt
            .query_map(params![cutoff], |row| {
                Ok(CategoryStat {
                    category: row.get(0)?,
                    completed: row.get(1)?,
                    avg_duration_minutes: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let overdue_tasks: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE status = 'pending' AND due_date IS NOT NULL AND due_date < ?1",
            params![now_stored],
            |row| row.get(0),
        )?;

        let completed_total: i64 = completed_by_category.iter().map(|c| c.completed).sum();
        let completion_rate = if total_tasks_created > 0 {
            completed_total as f64 / total_tasks_created as f64
        } else {
            0.0
        };

        Ok(ProductivityStats {
            period_days: days,
            total_tasks_created,
            completed_by_category,
            overdue_tasks,
            completion_rate,
        })
    }

    /// Advisory strings derived from fixed heuristics; deterministic
    /// for a given store state.
    pub fn suggest_schedule_optimization(&self) -> Result<Vec<String>> {
        let now = Utc::now();
        let pending = self.get_tasks(Some(TaskStatus::Pending), None, 20, TaskSortKey::DueDate)?;
        let mut suggestions = Vec::new();

        let overdue = pending
            .iter()
            .filter(|t| t.due_date.map(|due| due < now).unwrap_or(false))
            .count();
        if overdue > 0 {
            suggestions.push(format!(
                "You have {} overdue tasks. Consider rescheduling or completing them.",
                overdue
            ));
        }

        if self.get_today_events()?.len() > BUSY_DAY_EVENTS {
            suggestions.push(
                "Your schedule is quite busy today. Consider rescheduling non-critical meetings."
                    .to_string(),
            );
        }

        let undated = pending.iter().filter(|t| t.due_date.is_none()).count();
        if undated > 0 {
            suggestions.push(format!(
                "{} tasks don't have due dates. Consider setting deadlines to improve prioritization.",
                undated
            ));
        }

        Ok(suggestions)
    }
}

impl Drop for TaskStore {
    fn drop(&mut self) {
        self.stop_reminder_monitoring();
    }
}

fn due_reminders(conn: &Connection) -> Result<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, message, reminder_time, repeat_interval, is_active, created_at
         FROM reminders
         WHERE is_active = 1 AND reminder_time <= ?1
         ORDER BY reminder_time ASC",
    )?;
    let rows = stmt.query_map(params![database::now_stored()], row_to_reminder)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// One monitor cycle: fetch due reminders, run every callback per
/// reminder with panic isolation, then advance or deactivate.
fn poll_once(conn: &Connection, callbacks: &[ReminderCallback]) -> Result<usize> {
    let due = due_reminders(conn)?;
    for reminder in &due {
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(reminder))).is_err() {
                log::error!("reminder callback panicked for '{}'", reminder.title);
            }
        }
        apply_repeat_policy(conn, reminder)?;
    }
    Ok(due.len())
}

fn apply_repeat_policy(conn: &Connection, reminder: &Reminder) -> Result<()> {
    match reminder.repeat_interval {
        Some(minutes) => {
            let next = reminder.reminder_time + ChronoDuration::minutes(minutes);
            conn.execute(
                "UPDATE reminders SET reminder_time = ?1 WHERE id = ?2",
                params![database::to_stored(next), reminder.id],
            )?;
        }
        None => {
            conn.execute(
                "UPDATE reminders SET is_active = 0 WHERE id = ?1",
                params![reminder.id],
            )?;
        }
    }
    Ok(())
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let tags_json: Option<String> = row.get(7)?;
    Ok(Task {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        status: TaskStatus::parse(&status).unwrap_or(TaskStatus::Pending),
        priority: row.get(4)?,
        due_date: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| database::from_stored(&s)),
        category: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        tags: tags_json
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default(),
        estimated_duration: row.get(8)?,
        actual_duration: row.get(9)?,
        created_at: row
            .get::<_, Option<String>>(10)?
            .and_then(|s| database::from_stored(&s)),
        completed_at: row
            .get::<_, Option<String>>(11)?
            .and_then(|s| database::from_stored(&s)),
    })
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let attendees_json: Option<String> = row.get(6)?;
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    Ok(Event {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        start_time: database::from_stored(&start).unwrap_or_else(Utc::now),
        end_time: database::from_stored(&end).unwrap_or_else(Utc::now),
        location: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        attendees: attendees_json
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default(),
        reminder_minutes: row.get(7)?,
        category: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        recurring: row.get::<_, i64>(9)? != 0,
        recurrence_pattern: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
    })
}

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let when: String = row.get(3)?;
    Ok(Reminder {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        message: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        reminder_time: database::from_stored(&when).unwrap_or_else(Utc::now),
        repeat_interval: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        created_at: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| database::from_stored(&s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn temp_store(tag: &str) -> (TaskStore, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "artifix-tasks-{}-{}.db",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        (TaskStore::new(&path).unwrap(), path)
    }

    #[test]
    fn added_task_is_listed_as_pending() {
        let (store, path) = temp_store("pending");
        store.add_task(&Task::new("Buy milk")).unwrap();

        let tasks = store
            .get_tasks(Some(TaskStatus::Pending), None, 50, TaskSortKey::DueDate)
            .unwrap();
        assert!(tasks
            .iter()
            .any(|t| t.title == "Buy milk" && t.status == TaskStatus::Pending));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn complete_task_sets_completed_at() {
        let (store, path) = temp_store("complete");
        let id = store.add_task(&Task::new("File taxes")).unwrap();
        store.complete_task(id).unwrap();

        let tasks = store
            .get_tasks(Some(TaskStatus::Completed), None, 50, TaskSortKey::CreatedAt)
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed_at.is_some());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_ids_surface_as_not_found() {
        let (store, path) = temp_store("notfound");
        assert!(matches!(
            store.complete_task(999).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        assert!(matches!(
            store.delete_task(999).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn tasks_sort_by_requested_key() {
        let (store, path) = temp_store("sort");
        let mut low = Task::new("low priority");
        low.priority = 1;
        let mut high = Task::new("high priority");
        high.priority = 5;
        store.add_task(&high).unwrap();
        store.add_task(&low).unwrap();

        let by_priority = store
            .get_tasks(None, None, 50, TaskSortKey::Priority)
            .unwrap();
        assert_eq!(by_priority[0].title, "low priority");

        let by_title = store.get_tasks(None, None, 50, TaskSortKey::Title).unwrap();
        assert_eq!(by_title[0].title, "high priority");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn update_task_rewrites_the_stored_row() {
        let (store, path) = temp_store("update");
        let id = store.add_task(&Task::new("draft notes")).unwrap();

        let mut task = store
            .get_tasks(None, None, 50, TaskSortKey::CreatedAt)
            .unwrap()
            .remove(0);
        assert_eq!(task.id, Some(id));
        task.title = "draft meeting notes".to_string();
        task.priority = 5;
        task.status = TaskStatus::InProgress;
        task.tags = vec!["writing".to_string()];
        store.update_task(&task).unwrap();

        let stored = store
            .get_tasks(Some(TaskStatus::InProgress), None, 50, TaskSortKey::CreatedAt)
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "draft meeting notes");
        assert_eq!(stored[0].priority, 5);
        assert_eq!(stored[0].tags, vec!["writing".to_string()]);

        task.id = Some(999);
        assert!(matches!(
            store.update_task(&task).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        task.id = None;
        assert!(matches!(
            store.update_task(&task).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn update_reminder_rewrites_time_and_message() {
        let (store, path) = temp_store("update-reminder");
        let past = Utc::now() - ChronoDuration::minutes(5);
        let mut reminder = Reminder::new("Standup", "Join the call", past);
        let id = store.add_reminder(&reminder).unwrap();

        reminder.id = Some(id);
        reminder.message = "Join the video call".to_string();
        reminder.reminder_time = Utc::now() + ChronoDuration::hours(1);
        store.update_reminder(&reminder).unwrap();
        assert!(store.get_due_reminders().unwrap().is_empty());

        reminder.reminder_time = past;
        store.update_reminder(&reminder).unwrap();
        let due = store.get_due_reminders().unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message, "Join the video call");

        reminder.id = Some(999);
        assert!(matches!(
            store.update_reminder(&reminder).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        reminder.id = None;
        assert!(matches!(
            store.update_reminder(&reminder).unwrap_err(),
            AssistantError::NotFound { .. }
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn repeating_reminder_advances_and_stays_active() {
        let (store, path) = temp_store("repeat");
        let fired_at = Utc::now() - ChronoDuration::minutes(1);
        let mut reminder = Reminder::new("Stretch", "Stand up", fired_at);
        reminder.repeat_interval = Some(30);
        let id = store.add_reminder(&reminder).unwrap();

        let fired = store.process_due_reminders(&[]).unwrap();
        assert_eq!(fired, 1);

        let conn = store.connect().unwrap();
        let (when, active): (String, i64) = conn
            .query_row(
                "SELECT reminder_time, is_active FROM reminders WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        // Stored timestamps carry second precision.
        let next = database::from_stored(&when).unwrap();
        assert_eq!(
            next.timestamp(),
            (fired_at + ChronoDuration::minutes(30)).timestamp()
        );
        assert_eq!(active, 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn one_shot_reminder_deactivates_after_firing() {
        let (store, path) = temp_store("oneshot");
        let reminder = Reminder::new(
            "Dentist",
            "Appointment now",
            Utc::now() - ChronoDuration::minutes(5),
        );
        store.add_reminder(&reminder).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callbacks: Vec<ReminderCallback> =
            vec![Box::new(move |r| sink.lock().unwrap().push(r.title.clone()))];

        assert_eq!(store.process_due_reminders(&callbacks).unwrap(), 1);
        assert_eq!(seen.lock().unwrap().as_slice(), ["Dentist"]);

        // A second cycle must not fire it again.
        assert_eq!(store.process_due_reminders(&callbacks).unwrap(), 0);
        assert!(store.get_due_reminders().unwrap().is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn panicking_callback_does_not_stop_the_others() {
        let (store, path) = temp_store("panic");
        store
            .add_reminder(&Reminder::new(
                "Water plants",
                "",
                Utc::now() - ChronoDuration::minutes(1),
            ))
            .unwrap();

        let reached = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&reached);
        let callbacks: Vec<ReminderCallback> = vec![
            Box::new(|_| panic!("callback failure")),
            Box::new(move |_| *counter.lock().unwrap() += 1),
        ];

        assert_eq!(store.process_due_reminders(&callbacks).unwrap(), 1);
        assert_eq!(*reached.lock().unwrap(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn monitor_start_is_idempotent_and_stop_is_bounded() {
        let (mut store, path) = temp_store("monitor");
        assert!(store.start_reminder_monitoring(Vec::new()));
        assert!(!store.start_reminder_monitoring(Vec::new()));

        let started = Instant::now();
        store.stop_reminder_monitoring();
        assert!(started.elapsed() < STOP_TIMEOUT + Duration::from_millis(500));
        assert!(store.monitor.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn productivity_stats_are_zero_safe_on_empty_store() {
        let (store, path) = temp_store("stats-empty");
        let stats = store.get_productivity_stats(7).unwrap();
        assert_eq!(stats.total_tasks_created, 0);
        assert_eq!(stats.overdue_tasks, 0);
        assert_eq!(stats.completion_rate, 0.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn stats_count_completions_and_overdue() {
        let (store, path) = temp_store("stats");
        let mut overdue = Task::new("late report");
        overdue.due_date = Some(Utc::now() - ChronoDuration::days(2));
        store.add_task(&overdue).unwrap();

        let done_id = store.add_task(&Task::new("ship release")).unwrap();
        store.complete_task(done_id).unwrap();

        let stats = store.get_productivity_stats(7).unwrap();
        assert_eq!(stats.total_tasks_created, 2);
        assert_eq!(stats.overdue_tasks, 1);
        assert!((stats.completion_rate - 0.5).abs() < f64::EPSILON);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn schedule_suggestions_flag_overdue_and_undated_tasks() {
        let (store, path) = temp_store("suggest");
        let mut overdue = Task::new("expired");
        overdue.due_date = Some(Utc::now() - ChronoDuration::days(1));
        store.add_task(&overdue).unwrap();
        store.add_task(&Task::new("someday")).unwrap();

        let suggestions = store.suggest_schedule_optimization().unwrap();
        assert!(suggestions.iter().any(|s| s.contains("overdue")));
        assert!(suggestions.iter().any(|s| s.contains("due dates")));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn events_today_and_upcoming_windows() {
        let (store, path) = temp_store("events");
        let soon = Event {
            id: None,
            title: "Standup".to_string(),
            description: String::new(),
            start_time: Utc::now() + ChronoDuration::minutes(10),
            end_time: Utc::now() + ChronoDuration::minutes(25),
            location: String::new(),
            attendees: vec!["dana".to_string()],
            reminder_minutes: 15,
            category: "meeting".to_string(),
            recurring: false,
            recurrence_pattern: String::new(),
        };
        let far = Event {
            title: "Offsite".to_string(),
            start_time: Utc::now() + ChronoDuration::days(30),
            end_time: Utc::now() + ChronoDuration::days(30) + ChronoDuration::hours(8),
            ..soon.clone()
        };
        store.add_event(&soon).unwrap();
        store.add_event(&far).unwrap();

        let upcoming = store.get_upcoming_events(7).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Standup");
        assert_eq!(upcoming[0].attendees, vec!["dana".to_string()]);
        let _ = std::fs::remove_file(path);
    }
}
