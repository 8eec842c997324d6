use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use log::{debug, info, warn};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::ids::{IdGenerator, TimeRandomIds};
use crate::persistence::{
    Collection, DEFAULT_KEY_PREFIX, KeyValueStore, PersistenceError, PersistenceResult,
    PlannerSnapshot, validate_snapshot,
};
use crate::rules::{self, ScheduleRuleError};
use crate::schedule::{ClassType, NewSchedule, Schedule, SchedulePatch};
use crate::settings::{Settings, SettingsPatch};
use crate::subject::{NewSubject, Priority, Subject, SubjectPatch};
use crate::task::{NewTask, Task, TaskPatch, TaskType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Rule(#[from] ScheduleRuleError),
    #[error("subject {0} does not exist")]
    UnknownSubject(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Records kept in an id-keyed collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;
    fn id(&self) -> &str;
}

impl Record for Subject {
    const COLLECTION: Collection = Collection::Subjects;
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Schedule {
    const COLLECTION: Collection = Collection::Schedules;
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;
    fn id(&self) -> &str {
        &self.id
    }
}

/// What a subject delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub subject_removed: bool,
    pub schedules_removed: usize,
    pub tasks_removed: usize,
}

/// CRUD over the subjects, schedules, tasks and settings blobs of a
/// [`KeyValueStore`].
///
/// Nothing is cached: every read decodes the stored blob and every mutation
/// re-encodes and writes the whole collection before returning. When a write
/// fails the error is returned and the stored data is whatever the medium
/// kept, which for a single `set` is the previous value.
pub struct PlannerStore<S, G = TimeRandomIds> {
    medium: S,
    ids: G,
    prefix: String,
}

impl<S: KeyValueStore> PlannerStore<S> {
    pub fn new(medium: S) -> Self {
        Self::with_id_generator(medium, TimeRandomIds)
    }
}

impl<S: KeyValueStore, G: IdGenerator> PlannerStore<S, G> {
    pub fn with_id_generator(medium: S, ids: G) -> Self {
        Self {
            medium,
            ids,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn medium(&self) -> &S {
        &self.medium
    }

    pub fn into_medium(self) -> S {
        self.medium
    }

    fn key(&self, collection: Collection) -> String {
        collection.key(&self.prefix)
    }

    fn load<T: Record>(&self) -> PersistenceResult<Vec<T>> {
        let key = self.key(T::COLLECTION);
        match self.medium.get(&key)? {
            Some(raw) => {
                let records: Vec<T> = serde_json::from_str(&raw)?;
                debug!("loaded {} records from {key}", records.len());
                Ok(records)
            }
            None => Ok(Vec::new()),
        }
    }

    fn encode<T: Record>(&self, records: &[T]) -> PersistenceResult<(String, String)> {
        Ok((self.key(T::COLLECTION), serde_json::to_string(records)?))
    }

    fn save<T: Record>(&mut self, records: &[T]) -> PersistenceResult<()> {
        let (key, value) = self.encode(records)?;
        if let Err(err) = self.medium.set(&key, &value) {
            warn!("write to {key} failed: {err}");
            return Err(err);
        }
        debug!("saved {} records to {key}", records.len());
        Ok(())
    }

    fn fresh_id<T: Record>(&mut self, existing: &[T]) -> String {
        loop {
            let id = self.ids.next_id();
            if !existing.iter().any(|r| r.id() == id) {
                return id;
            }
            debug!("regenerating colliding id {id}");
        }
    }

    fn find<T: Record>(&self, id: &str) -> PersistenceResult<Option<T>> {
        Ok(self.load::<T>()?.into_iter().find(|r| r.id() == id))
    }

    /// Returns whether a record was removed. Absent ids write nothing.
    fn remove<T: Record>(&mut self, id: &str) -> PersistenceResult<bool> {
        let mut records = self.load::<T>()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }

    fn ensure_subject(&self, subject_id: &str) -> StoreResult<()> {
        if self.find::<Subject>(subject_id)?.is_none() {
            return Err(StoreError::UnknownSubject(subject_id.to_string()));
        }
        Ok(())
    }

    // Subjects

    pub fn subjects(&self) -> PersistenceResult<Vec<Subject>> {
        self.load()
    }

    pub fn subject_by_id(&self, id: &str) -> PersistenceResult<Option<Subject>> {
        self.find(id)
    }

    pub fn add_subject(&mut self, fields: NewSubject) -> PersistenceResult<Subject> {
        let mut subjects = self.load::<Subject>()?;
        let id = self.fresh_id(&subjects);
        let subject = fields.into_subject(id, Utc::now());
        subjects.push(subject.clone());
        self.save(&subjects)?;
        Ok(subject)
    }

    pub fn update_subject(
        &mut self,
        id: &str,
        patch: SubjectPatch,
    ) -> PersistenceResult<Option<Subject>> {
        let mut subjects = self.load::<Subject>()?;
        let Some(subject) = subjects.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        patch.apply(subject);
        let updated = subject.clone();
        self.save(&subjects)?;
        Ok(Some(updated))
    }

    /// Removes the subject and every schedule and task that references it.
    ///
    /// All three blobs are encoded before anything is written, then written as
    /// one batch with the subject last. A medium without transactions can
    /// therefore only be interrupted into orphaned children, never into a
    /// subject whose children are gone.
    pub fn delete_subject(&mut self, id: &str) -> PersistenceResult<CascadeSummary> {
        let mut subjects = self.load::<Subject>()?;
        let mut schedules = self.load::<Schedule>()?;
        let mut tasks = self.load::<Task>()?;

        let (subjects_before, schedules_before, tasks_before) =
            (subjects.len(), schedules.len(), tasks.len());
        subjects.retain(|s| s.id != id);
        schedules.retain(|s| s.subject_id != id);
        tasks.retain(|t| t.subject_id != id);

        let summary = CascadeSummary {
            subject_removed: subjects.len() != subjects_before,
            schedules_removed: schedules_before - schedules.len(),
            tasks_removed: tasks_before - tasks.len(),
        };
        if summary == CascadeSummary::default() {
            return Ok(summary);
        }

        let batch = vec![
            self.encode(&schedules)?,
            self.encode(&tasks)?,
            self.encode(&subjects)?,
        ];
        if let Err(err) = self.medium.set_many(&batch) {
            warn!("cascade delete of subject {id} failed: {err}");
            return Err(err);
        }
        info!(
            "deleted subject {id} with {} schedules and {} tasks",
            summary.schedules_removed, summary.tasks_removed
        );
        Ok(summary)
    }

    // Schedules

    pub fn schedules(&self) -> PersistenceResult<Vec<Schedule>> {
        self.load()
    }

    pub fn schedule_by_id(&self, id: &str) -> PersistenceResult<Option<Schedule>> {
        self.find(id)
    }

    pub fn schedules_by_day(&self, day: Weekday) -> PersistenceResult<Vec<Schedule>> {
        Ok(rules::by_day(&self.load::<Schedule>()?, day))
    }

    /// Rejects unknown subjects, inverted ranges and same-day overlaps before
    /// anything is written.
    pub fn add_schedule(&mut self, fields: NewSchedule) -> StoreResult<Schedule> {
        self.ensure_subject(&fields.subject_id)?;
        let mut schedules = self.load::<Schedule>()?;
        if let Err(err) = rules::validate_slot(&schedules, &fields, None) {
            warn!("rejected new class slot: {err}");
            return Err(err.into());
        }
        let id = self.fresh_id(&schedules);
        let schedule = fields.into_schedule(id, Utc::now());
        schedules.push(schedule.clone());
        self.save(&schedules)?;
        Ok(schedule)
    }

    /// The merged record is validated against every other slot, so an edit
    /// never conflicts with its own previous version.
    pub fn update_schedule(
        &mut self,
        id: &str,
        patch: SchedulePatch,
    ) -> StoreResult<Option<Schedule>> {
        let mut schedules = self.load::<Schedule>()?;
        let Some(idx) = schedules.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        let mut updated = schedules[idx].clone();
        patch.apply(&mut updated);
        if updated.subject_id != schedules[idx].subject_id {
            self.ensure_subject(&updated.subject_id)?;
        }
        if let Err(err) = rules::validate_slot(&schedules, &updated, Some(id)) {
            warn!("rejected edit of class slot {id}: {err}");
            return Err(err.into());
        }
        schedules[idx] = updated.clone();
        self.save(&schedules)?;
        Ok(Some(updated))
    }

    pub fn delete_schedule(&mut self, id: &str) -> PersistenceResult<bool> {
        self.remove::<Schedule>(id)
    }

    // Tasks

    pub fn tasks(&self) -> PersistenceResult<Vec<Task>> {
        self.load()
    }

    pub fn task_by_id(&self, id: &str) -> PersistenceResult<Option<Task>> {
        self.find(id)
    }

    pub fn add_task(&mut self, fields: NewTask) -> StoreResult<Task> {
        self.ensure_subject(&fields.subject_id)?;
        let mut tasks = self.load::<Task>()?;
        let id = self.fresh_id(&tasks);
        let task = fields.into_task(id, Utc::now());
        tasks.push(task.clone());
        self.save(&tasks)?;
        Ok(task)
    }

    /// Unknown ids are not-found before the subject reference is checked.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut tasks = self.load::<Task>()?;
        let Some(idx) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let current = tasks[idx].subject_id.as_str();
        if let Some(subject_id) = patch.subject_id.as_deref().filter(|s| *s != current) {
            self.ensure_subject(subject_id)?;
        }
        patch.apply(&mut tasks[idx]);
        let updated = tasks[idx].clone();
        self.save(&tasks)?;
        Ok(Some(updated))
    }

    pub fn toggle_task_complete(&mut self, id: &str) -> PersistenceResult<Option<Task>> {
        let mut tasks = self.load::<Task>()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let updated = task.clone();
        self.save(&tasks)?;
        Ok(Some(updated))
    }

    pub fn delete_task(&mut self, id: &str) -> PersistenceResult<bool> {
        self.remove::<Task>(id)
    }

    // Settings

    pub fn settings(&self) -> PersistenceResult<Settings> {
        let key = self.key(Collection::Settings);
        match self.medium.get(&key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Settings::default()),
        }
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> PersistenceResult<Settings> {
        let mut settings = self.settings()?;
        patch.apply(&mut settings);
        let key = self.key(Collection::Settings);
        self.medium.set(&key, &serde_json::to_string(&settings)?)?;
        Ok(settings)
    }

    // Whole store

    /// Clears subjects, schedules and tasks. Settings are kept.
    pub fn reset_all(&mut self) -> PersistenceResult<()> {
        for collection in [Collection::Schedules, Collection::Tasks, Collection::Subjects] {
            let key = self.key(collection);
            self.medium.remove(&key)?;
        }
        info!("planner data reset");
        Ok(())
    }

    pub fn snapshot(&self) -> PersistenceResult<PlannerSnapshot> {
        Ok(PlannerSnapshot {
            subjects: self.load()?,
            schedules: self.load()?,
            tasks: self.load()?,
            settings: self.settings()?,
        })
    }

    /// Replaces every collection, settings included, with a validated snapshot.
    pub fn restore(&mut self, snapshot: &PlannerSnapshot) -> PersistenceResult<()> {
        validate_snapshot(snapshot)?;
        let batch = vec![
            self.encode(&snapshot.subjects)?,
            self.encode(&snapshot.schedules)?,
            self.encode(&snapshot.tasks)?,
            (
                self.key(Collection::Settings),
                serde_json::to_string(&snapshot.settings)?,
            ),
        ];
        self.medium.set_many(&batch)?;
        info!(
            "restored {} subjects, {} schedules, {} tasks",
            snapshot.subjects.len(),
            snapshot.schedules.len(),
            snapshot.tasks.len()
        );
        Ok(())
    }

    /// Populates an empty planner with three subjects and their classes and
    /// tasks. Returns `false` without writing if any subject already exists.
    pub fn seed_sample_data(&mut self, now: DateTime<Utc>) -> StoreResult<bool> {
        if !self.subjects()?.is_empty() {
            return Ok(false);
        }

        let math = self.add_subject(
            NewSubject::new("Mathematics")
                .with_priority(Priority::High)
                .with_color("#8b5cf6")
                .with_credits(4)
                .with_professor("Dr. Smith")
                .with_description("Advanced Calculus and Linear Algebra"),
        )?;
        let physics = self.add_subject(
            NewSubject::new("Physics")
                .with_priority(Priority::High)
                .with_color("#3b82f6")
                .with_credits(4)
                .with_professor("Dr. Johnson")
                .with_description("Quantum Mechanics and Thermodynamics"),
        )?;
        let cs = self.add_subject(
            NewSubject::new("Computer Science")
                .with_priority(Priority::Medium)
                .with_color("#10b981")
                .with_credits(3)
                .with_professor("Prof. Williams")
                .with_description("Data Structures and Algorithms"),
        )?;

        let slots = [
            (&math.id, Weekday::Mon, (9, 0), (10, 30), "Room 101", ClassType::Lecture),
            (&physics.id, Weekday::Mon, (11, 0), (12, 30), "Lab 2", ClassType::Lab),
            (&cs.id, Weekday::Tue, (14, 0), (15, 30), "Room 205", ClassType::Lecture),
        ];
        for (subject_id, day, (sh, sm), (eh, em), location, class_type) in slots {
            let (Some(start), Some(end)) = (
                NaiveTime::from_hms_opt(sh, sm, 0),
                NaiveTime::from_hms_opt(eh, em, 0),
            ) else {
                continue;
            };
            self.add_schedule(
                NewSchedule::new(subject_id.as_str(), day, start, end)
                    .with_location(location)
                    .with_class_type(class_type),
            )?;
        }

        let tomorrow = now + Duration::days(1);
        let next_week = now + Duration::days(7);
        self.add_task(
            NewTask::new(&math.id, "Calculus Problem Set 5", TaskType::Assignment, tomorrow)
                .with_priority(Priority::High)
                .with_description("Complete problems 1-20 from Chapter 5"),
        )?;
        self.add_task(
            NewTask::new(&physics.id, "Midterm Exam", TaskType::Exam, next_week)
                .with_priority(Priority::High)
                .with_description("Chapters 1-5, bring calculator"),
        )?;
        self.add_task(
            NewTask::new(&cs.id, "Binary Tree Implementation", TaskType::Assignment, next_week)
                .with_priority(Priority::Medium)
                .with_description("Implement BST with insert, delete, and search operations"),
        )?;

        info!("seeded sample planner data");
        Ok(true)
    }
}
