//! Note routing tests with mock collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notebook_core::{InterpreterResult, JobStatus, NoteId, NoteSnapshot, ParagraphId};
use notebook_interpreter::{
    Interpreter, InterpreterContext, InterpreterLoader, InterpreterSetting, UserCredentials,
    UsernamePassword,
};
use notebook_note::{
    InMemoryCredentials, Note, NoteConfig, NoteError, NoteServices, SearchIndex,
    TracingListenerFactory,
};
use notebook_scheduler::{FifoScheduler, Job, Scheduler, SchedulerError};
use notebook_storage::{JsonNotebookRepo, NoteInfo, NotebookRepo};

// === Mocks ===

#[derive(Default)]
struct RecordingScheduler {
    jobs: Mutex<Vec<Arc<dyn Job>>>,
}

impl RecordingScheduler {
    fn submitted(&self) -> Vec<Arc<dyn Job>> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn name(&self) -> &str {
        "recording"
    }

    fn submit(&self, job: Arc<dyn Job>) -> notebook_scheduler::Result<()> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }

    fn queued(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

struct MockInterpreter {
    name: String,
    scheduler: Option<Arc<dyn Scheduler>>,
    calls: Mutex<Vec<(String, Option<String>, UserCredentials)>>,
}

impl MockInterpreter {
    fn new(name: &str, scheduler: Option<Arc<dyn Scheduler>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            scheduler,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Option<String>, UserCredentials)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Interpreter for MockInterpreter {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheduler(&self) -> Option<Arc<dyn Scheduler>> {
        self.scheduler.clone()
    }

    async fn interpret(&self, script: &str, context: &InterpreterContext) -> InterpreterResult {
        self.calls.lock().unwrap().push((
            script.to_string(),
            context.target.clone(),
            context.credentials.clone(),
        ));
        if script.contains("fail") {
            InterpreterResult::error(format!("{} failed", self.name))
        } else {
            InterpreterResult::success(format!("{}: {}", self.name, script))
        }
    }
}

#[derive(Default)]
struct MockLoader {
    bound: HashMap<String, Arc<dyn Interpreter>>,
    default: Option<InterpreterSetting>,
    lookups: Mutex<Vec<String>>,
}

impl MockLoader {
    fn bind(mut self, name: &str, interpreter: Arc<dyn Interpreter>) -> Self {
        self.bound.insert(name.to_string(), interpreter);
        self
    }

    fn with_default(mut self, group: &str) -> Self {
        self.default = Some(InterpreterSetting::new(group));
        self
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl InterpreterLoader for MockLoader {
    fn get(&self, name: &str) -> Option<Arc<dyn Interpreter>> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.bound.get(name).cloned()
    }

    fn default_setting(&self) -> Option<InterpreterSetting> {
        self.default.clone()
    }
}

#[derive(Default)]
struct MemoryRepo {
    notes: Mutex<HashMap<NoteId, NoteSnapshot>>,
}

#[async_trait]
impl NotebookRepo for MemoryRepo {
    async fn save(&self, note: &NoteSnapshot) -> notebook_storage::Result<()> {
        self.notes.lock().unwrap().insert(note.id.clone(), note.clone());
        Ok(())
    }

    async fn get(&self, id: &NoteId) -> notebook_storage::Result<Option<NoteSnapshot>> {
        Ok(self.notes.lock().unwrap().get(id).cloned())
    }

    async fn list(&self) -> notebook_storage::Result<Vec<NoteInfo>> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .values()
            .map(|n| NoteInfo {
                id: n.id.clone(),
                name: n.name.clone(),
            })
            .collect())
    }

    async fn remove(&self, id: &NoteId) -> notebook_storage::Result<()> {
        self.notes.lock().unwrap().remove(id);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingIndex {
    updated: Mutex<Vec<NoteId>>,
    deleted: Mutex<Vec<ParagraphId>>,
}

impl SearchIndex for RecordingIndex {
    fn update_note(&self, note: &NoteSnapshot) {
        self.updated.lock().unwrap().push(note.id.clone());
    }

    fn delete_paragraph(&self, _note_id: &NoteId, paragraph_id: &ParagraphId) {
        self.deleted.lock().unwrap().push(paragraph_id.clone());
    }
}

struct Fixture {
    loader: Arc<MockLoader>,
    index: Arc<RecordingIndex>,
    repo: Arc<dyn NotebookRepo>,
    credentials: Arc<InMemoryCredentials>,
}

impl Fixture {
    fn new(loader: MockLoader) -> Self {
        Self {
            loader: Arc::new(loader),
            index: Arc::new(RecordingIndex::default()),
            repo: Arc::new(MemoryRepo::default()),
            credentials: Arc::new(InMemoryCredentials::new()),
        }
    }

    fn services(&self) -> NoteServices {
        NoteServices {
            repo: self.repo.clone(),
            loader: self.loader.clone(),
            listeners: Arc::new(TracingListenerFactory),
            index: self.index.clone(),
            credentials: self.credentials.clone(),
        }
    }

    fn note(&self) -> Note {
        Note::new(self.services())
    }
}

fn add_with_text(note: &mut Note, text: &str) -> ParagraphId {
    let p = note.add_paragraph();
    p.set_text(text);
    p.id().clone()
}

// === Routing ===

#[test]
fn run_normal_test() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let text = "%spark sc.version";
    let mut note = fixture.note();
    let id = add_with_text(&mut note, text);
    note.run(&id).unwrap();

    let submitted = scheduler.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].name(), id.as_str());
    assert_eq!(fixture.loader.lookups(), vec!["spark"]);

    let p = note.paragraph(&id).unwrap();
    assert_eq!(p.text(), text);
    assert_eq!(p.effective_text(), text);
    assert_eq!(p.status(), JobStatus::Pending);
    assert_eq!(note.last_repl_name(), "spark");
}

#[tokio::test]
async fn run_jdbc_test() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let jdbc = MockInterpreter::new("jdbc", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("jdbc", jdbc.clone()));

    let text = "%mysql show databases";
    let mut note = fixture.note();
    let id = add_with_text(&mut note, text);
    note.run(&id).unwrap();

    let submitted = scheduler.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(fixture.loader.lookups(), vec!["mysql", "jdbc"]);

    let p = note.paragraph(&id).unwrap();
    assert_eq!(p.effective_text(), "%jdbc(mysql) show databases");
    assert_eq!(p.text(), text);
    assert_eq!(note.last_repl_name(), "mysql");

    submitted[0].run().await;
    let calls = jdbc.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "show databases");
    assert_eq!(calls[0].1.as_deref(), Some("mysql"));
    assert_eq!(p.status(), JobStatus::Finished);
    assert_eq!(p.result().unwrap().message, "jdbc: show databases");
}

#[test]
fn run_unknown_paragraph_fails_without_submitting() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let mut note = fixture.note();
    add_with_text(&mut note, "%spark 1");

    let err = note.run(&ParagraphId::from("missing")).unwrap_err();
    assert!(matches!(err, NoteError::ParagraphNotFound(id) if id.as_str() == "missing"));
    assert!(scheduler.submitted().is_empty());
    assert!(fixture.loader.lookups().is_empty());
}

#[test]
fn run_without_interpreter_marks_paragraph_failed() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let mut note = fixture.note();
    let ok = add_with_text(&mut note, "%spark 1");
    note.run(&ok).unwrap();
    assert_eq!(note.last_repl_name(), "spark");

    let id = add_with_text(&mut note, "%mysql show databases");
    let err = note.run(&id).unwrap_err();

    assert!(matches!(&err, NoteError::InterpreterNotFound(name) if name == "mysql"));
    assert_eq!(err.to_string(), "Interpreter mysql not found");
    assert_eq!(scheduler.submitted().len(), 1);
    assert_eq!(note.last_repl_name(), "spark");

    let p = note.paragraph(&id).unwrap();
    assert_eq!(p.status(), JobStatus::Error);
    assert_eq!(p.result().unwrap().message, "Interpreter mysql not found");
    assert_eq!(p.effective_text(), "%mysql show databases");
}

#[test]
fn run_without_directive_or_default_fails() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    let id = add_with_text(&mut note, "sc.version");

    let err = note.run(&id).unwrap_err();
    assert!(matches!(err, NoteError::InterpreterNotFound(name) if name == "default"));
    assert_eq!(note.last_repl_name(), "");
}

#[test]
fn run_without_directive_uses_default_interpreter() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark).with_default("spark"));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "sc.version");
    note.run(&id).unwrap();

    assert_eq!(scheduler.submitted().len(), 1);
    assert_eq!(note.paragraph(&id).unwrap().effective_text(), "sc.version");
    assert_eq!(note.last_repl_name(), "spark");
}

#[test]
fn run_without_scheduler_fails() {
    let orphan = MockInterpreter::new("spark", None);
    let fixture = Fixture::new(MockLoader::default().bind("spark", orphan));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%spark 1");
    let err = note.run(&id).unwrap_err();

    assert!(matches!(err, NoteError::SchedulerUnavailable(name) if name == "spark"));
    assert_eq!(note.paragraph(&id).unwrap().status(), JobStatus::Error);
    assert_eq!(note.last_repl_name(), "");
}

#[tokio::test]
async fn run_on_closed_scheduler_fails() {
    let scheduler = FifoScheduler::start("spark");
    scheduler.shutdown().await;
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%spark 1");
    let err = note.run(&id).unwrap_err();

    assert!(matches!(err, NoteError::Scheduler(SchedulerError::Closed(_))));
    assert_eq!(note.paragraph(&id).unwrap().status(), JobStatus::Error);
    assert_eq!(note.last_repl_name(), "");
}

#[test]
fn disabled_fallback_does_not_multiplex() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let jdbc = MockInterpreter::new("jdbc", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("jdbc", jdbc));

    let mut note = fixture.note().with_config(NoteConfig {
        multiplex_fallback: None,
    });
    let id = add_with_text(&mut note, "%mysql show databases");

    assert!(matches!(note.run(&id), Err(NoteError::InterpreterNotFound(_))));
    assert_eq!(fixture.loader.lookups(), vec!["mysql"]);
    assert!(scheduler.submitted().is_empty());
}

#[test]
fn editing_after_multiplexed_run_resets_effective_text() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let jdbc = MockInterpreter::new("jdbc", Some(scheduler.clone()));
    let fixture = Fixture::new(
        MockLoader::default()
            .bind("spark", spark)
            .bind("jdbc", jdbc),
    );

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%mysql select 1");
    note.run(&id).unwrap();
    assert_eq!(note.paragraph(&id).unwrap().effective_text(), "%jdbc(mysql) select 1");

    note.paragraph_mut(&id).unwrap().set_text("%spark 1 + 1");
    assert_eq!(note.paragraph(&id).unwrap().effective_text(), "%spark 1 + 1");

    note.run(&id).unwrap();
    assert_eq!(note.paragraph(&id).unwrap().effective_text(), "%spark 1 + 1");
    assert_eq!(note.last_repl_name(), "spark");
    assert_eq!(scheduler.submitted().len(), 2);
}

#[test]
fn failed_rerun_drops_previous_rewrite() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let jdbc = MockInterpreter::new("jdbc", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("jdbc", jdbc));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%mysql show databases");
    note.run(&id).unwrap();
    assert_eq!(note.paragraph(&id).unwrap().effective_text(), "%jdbc(mysql) show databases");

    let mut note = note.with_config(NoteConfig {
        multiplex_fallback: None,
    });
    assert!(matches!(note.run(&id), Err(NoteError::InterpreterNotFound(_))));

    let p = note.paragraph(&id).unwrap();
    assert_eq!(p.effective_text(), "%mysql show databases");
    assert_eq!(p.status(), JobStatus::Error);
    assert_eq!(scheduler.submitted().len(), 1);
}

#[tokio::test]
async fn earlier_run_does_not_overwrite_later_one() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%spark old");
    note.run(&id).unwrap();
    note.paragraph_mut(&id).unwrap().set_text("%spark new");
    let latest = note.run(&id).unwrap();

    let jobs = scheduler.submitted();
    assert_eq!(jobs.len(), 2);
    jobs[0].run().await;

    let p = note.paragraph(&id).unwrap();
    let state = p.job_handle().snapshot();
    assert_eq!(state.status, JobStatus::Pending);
    assert_eq!(state.job_id.as_ref(), Some(&latest));
    assert!(state.result.is_none());
    assert!(!note.is_terminated());

    jobs[1].run().await;
    assert_eq!(p.status(), JobStatus::Finished);
    assert_eq!(p.result().unwrap().message, "spark: new");
    assert!(note.is_terminated());
}

#[tokio::test]
async fn run_passes_user_credentials() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let jdbc = MockInterpreter::new("jdbc", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("jdbc", jdbc.clone()));

    let mut creds = UserCredentials::new();
    creds.put(
        "mysql",
        UsernamePassword {
            username: "alice".to_string(),
            password: "pw".to_string(),
        },
    );
    fixture.credentials.put("alice", creds);

    let mut note = fixture.note();
    let id = {
        let p = note.add_paragraph();
        p.set_text("%jdbc(mysql) select 1");
        p.set_user(Some("alice".to_string()));
        p.id().clone()
    };
    note.run(&id).unwrap();
    scheduler.submitted()[0].run().await;

    let calls = jdbc.calls();
    assert_eq!(calls[0].1.as_deref(), Some("mysql"));
    assert_eq!(calls[0].2.get("mysql").unwrap().username, "alice");
    assert_eq!(note.last_repl_name(), "jdbc(mysql)");
}

// === Last used interpreter ===

#[test]
fn put_default_repl_name_if_interpreter_setting_absent() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    note.put_default_repl_name();

    assert_eq!(note.last_repl_name(), "");
    assert_eq!(note.last_interpreter_name(), "");
}

#[test]
fn put_default_repl_name_if_interpreter_setting_present() {
    let fixture = Fixture::new(MockLoader::default().with_default("spark"));
    let mut note = fixture.note();
    note.put_default_repl_name();

    assert_eq!(note.last_repl_name(), "spark");
    assert_eq!(note.last_interpreter_name(), "%spark");
}

#[test]
fn add_paragraph_with_last_repl_name() {
    let fixture = Fixture::new(MockLoader::default().with_default("spark"));
    let mut note = fixture.note();
    note.put_default_repl_name();

    let p = note.add_paragraph();
    assert_eq!(p.text(), "%spark ");
    assert_eq!(p.required_repl_name(), "spark");
}

#[test]
fn insert_paragraph_with_last_repl_name() {
    let fixture = Fixture::new(MockLoader::default().with_default("spark"));
    let mut note = fixture.note();
    note.put_default_repl_name();

    let end = note.paragraphs().len();
    let p = note.insert_paragraph(end);
    assert_eq!(p.text(), "%spark ");
}

#[test]
fn add_paragraph_without_last_repl_name_is_empty() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    assert_eq!(note.add_paragraph().text(), "");
}

#[test]
fn insert_paragraph_clamps_position() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    let first = add_with_text(&mut note, "a");
    let front = note.insert_paragraph(0).id().clone();
    let back = note.insert_paragraph(42).id().clone();

    let order: Vec<_> = note.paragraphs().iter().map(|p| p.id().clone()).collect();
    assert_eq!(order, vec![front, first, back]);
}

#[test]
fn set_last_repl_name() {
    let fixture = Fixture::new(MockLoader::default().with_default("md"));
    let mut note = fixture.note();
    note.put_default_repl_name();
    let id = add_with_text(&mut note, "%spark sc.version");

    note.set_last_repl_name(&id).unwrap();
    assert_eq!(note.last_repl_name(), "spark");

    assert!(matches!(
        note.set_last_repl_name(&ParagraphId::from("HelloWorld")),
        Err(NoteError::ParagraphNotFound(_))
    ));
    assert_eq!(note.last_repl_name(), "spark");
}

#[test]
fn adding_and_removing_paragraphs_keeps_last_repl_name() {
    let fixture = Fixture::new(MockLoader::default().with_default("spark"));
    let mut note = fixture.note();
    note.put_default_repl_name();

    let id = note.add_paragraph().id().clone();
    note.remove_paragraph(&id).unwrap();
    assert_eq!(note.last_repl_name(), "spark");
}

// === Paragraph management ===

#[test]
fn remove_paragraph_notifies_index() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    let a = add_with_text(&mut note, "a");
    let b = add_with_text(&mut note, "b");

    let removed = note.remove_paragraph(&a).unwrap();
    assert_eq!(removed.text(), "a");
    assert_eq!(note.len(), 1);
    assert_eq!(note.last_paragraph().unwrap().id(), &b);
    assert_eq!(*fixture.index.deleted.lock().unwrap(), vec![a.clone()]);

    assert!(note.remove_paragraph(&a).is_none());
    assert_eq!(fixture.index.deleted.lock().unwrap().len(), 1);
}

#[test]
fn move_paragraph() {
    let fixture = Fixture::new(MockLoader::default());
    let mut note = fixture.note();
    let a = add_with_text(&mut note, "a");
    let b = add_with_text(&mut note, "b");
    let c = add_with_text(&mut note, "c");

    note.move_paragraph(&a, 2).unwrap();
    let order: Vec<_> = note.paragraphs().iter().map(|p| p.text().to_string()).collect();
    assert_eq!(order, vec!["b", "c", "a"]);

    assert!(matches!(
        note.move_paragraph(&b, 3),
        Err(NoteError::IndexOutOfBounds { index: 3, len: 3 })
    ));
    assert!(matches!(
        note.move_paragraph(&ParagraphId::from("nope"), 0),
        Err(NoteError::ParagraphNotFound(_))
    ));
    assert_eq!(note.paragraphs()[1].id(), &c);
}

#[tokio::test]
async fn clear_paragraph_output() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let sh = MockInterpreter::new("sh", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("sh", sh));

    let mut note = fixture.note();
    let id = add_with_text(&mut note, "%sh ls");
    note.run(&id).unwrap();
    scheduler.submitted()[0].run().await;
    assert!(note.paragraph(&id).unwrap().result().is_some());

    let p = note.clear_paragraph_output(&id).unwrap();
    assert!(p.result().is_none());
    assert_eq!(p.status(), JobStatus::Ready);
}

// === End to end ===

#[tokio::test]
async fn run_all_on_fifo_scheduler() {
    let scheduler = FifoScheduler::start("spark");
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark.clone()));

    let mut note = fixture.note();
    add_with_text(&mut note, "%spark one");
    add_with_text(&mut note, "%spark two");
    add_with_text(&mut note, "%spark fail three");

    let jobs = note.run_all().unwrap();
    assert_eq!(jobs.len(), 3);

    scheduler.shutdown().await;
    assert!(note.is_terminated());

    let scripts: Vec<_> = spark.calls().into_iter().map(|c| c.0).collect();
    assert_eq!(scripts, vec!["one", "two", "fail three"]);

    let statuses: Vec<_> = note.paragraphs().iter().map(|p| p.status()).collect();
    assert_eq!(statuses, vec![JobStatus::Finished, JobStatus::Finished, JobStatus::Error]);
}

#[test]
fn run_all_stops_at_first_failure() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let fixture = Fixture::new(MockLoader::default().bind("spark", spark));

    let mut note = fixture.note();
    add_with_text(&mut note, "%spark one");
    add_with_text(&mut note, "%unknown two");
    let third = add_with_text(&mut note, "%spark three");

    assert!(matches!(note.run_all(), Err(NoteError::InterpreterNotFound(_))));
    assert_eq!(scheduler.submitted().len(), 1);
    assert_eq!(note.paragraph(&third).unwrap().status(), JobStatus::Ready);
}

#[tokio::test]
async fn persist_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let repo: Arc<dyn NotebookRepo> = Arc::new(JsonNotebookRepo::new(dir.path()).await.unwrap());

    let scheduler = Arc::new(RecordingScheduler::default());
    let spark = MockInterpreter::new("spark", Some(scheduler.clone()));
    let mut fixture = Fixture::new(MockLoader::default().bind("spark", spark));
    fixture.repo = repo.clone();

    let mut note = fixture.note().with_name("Quickstart");
    let id = add_with_text(&mut note, "%spark sc.version");
    note.run(&id).unwrap();
    note.persist().await.unwrap();
    assert_eq!(*fixture.index.updated.lock().unwrap(), vec![note.id().clone()]);

    let snapshot = repo.get(note.id()).await.unwrap().unwrap();
    let reloaded = Note::from_snapshot(snapshot, fixture.services());

    assert_eq!(reloaded.id(), note.id());
    assert_eq!(reloaded.name(), "Quickstart");
    assert_eq!(reloaded.last_repl_name(), "spark");
    let p = reloaded.paragraph(&id).unwrap();
    assert_eq!(p.text(), "%spark sc.version");
    assert_eq!(p.required_repl_name(), "spark");
    // Still pending when saved; nothing can complete it after a reload.
    assert_eq!(p.status(), JobStatus::Abort);
}
