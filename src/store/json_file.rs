//! Directory-backed document store.
//!
//! Layout:
//! ```text
//! data_dir/
//! ├── question_bank.json
//! ├── answered_events.json
//! └── quiz_history.json
//! ```
//! Each file holds one JSON array. A mutation is applied to a copy of the
//! collections, written to `<file>.tmp`, renamed over the original, and only
//! then committed in memory, so a failed write leaves both views unchanged.
//!
//! Mutations run on their own task and hold the lock until the commit. A
//! caller dropped mid-write (a cancelled sibling in `try_join_all`, a
//! timeout) does not cancel the write, so the file never runs ahead of
//! memory and the next write cannot undo it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::{Collections, HistoryRecorder, QuestionRepository};
use crate::error::StoreError;
use crate::model::{
    AnsweredQuestionEvent, EntryId, NewQuestionEntry, QuestionBankEntry, QuizHistoryRecord, Topic, UserId,
};

const BANK_FILE: &str = "question_bank.json";
const ANSWERED_FILE: &str = "answered_events.json";
const HISTORY_FILE: &str = "quiz_history.json";

#[derive(Debug, Clone, Copy)]
enum Collection {
    Bank,
    Answered,
    History,
}

impl Collection {
    fn file_name(self) -> &'static str {
        match self {
            Self::Bank => BANK_FILE,
            Self::Answered => ANSWERED_FILE,
            Self::History => HISTORY_FILE,
        }
    }

    /// Pretty JSON of this collection and its item count.
    fn encode(self, collections: &Collections) -> Result<(Vec<u8>, usize), serde_json::Error> {
        Ok(match self {
            Self::Bank => (serde_json::to_vec_pretty(&collections.bank)?, collections.bank.len()),
            Self::Answered => (serde_json::to_vec_pretty(&collections.answered)?, collections.answered.len()),
            Self::History => (serde_json::to_vec_pretty(&collections.history)?, collections.history.len()),
        })
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    base_dir: PathBuf,
    collections: Arc<Mutex<Collections>>,
}

impl JsonFileStore {
    /// Open (or create) a store rooted at `base_dir`.
    #[instrument(target = "kidsquiz::store", skip_all, fields(dir = %base_dir.as_ref().display()))]
    pub async fn open(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;

        let collections = Collections {
            bank: load(&base_dir.join(BANK_FILE)).await?,
            answered: load(&base_dir.join(ANSWERED_FILE)).await?,
            history: load(&base_dir.join(HISTORY_FILE)).await?,
        };
        info!(
            bank = collections.bank.len(),
            answered = collections.answered.len(),
            history = collections.history.len(),
            "Opened JSON file store"
        );

        Ok(Self { base_dir, collections: Arc::new(Mutex::new(collections)) })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub async fn snapshot(&self) -> Collections {
        self.collections.lock().await.clone()
    }

    /// Apply `change` to a copy, persist `which` if it reports a change, then
    /// commit. Returns whatever `change` produced.
    async fn mutate<R, F>(&self, which: Collection, change: F) -> Result<R, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Collections) -> Result<(R, bool), StoreError> + Send + 'static,
    {
        let collections = Arc::clone(&self.collections);
        let path = self.base_dir.join(which.file_name());

        tokio::spawn(async move {
            let mut guard = collections.lock_owned().await;
            let mut next = guard.clone();
            let (output, changed) = change(&mut next)?;
            if changed {
                let (json, items) = which.encode(&next)?;
                write_atomic(&path, &json).await?;
                debug!(target: "kidsquiz::store", path = %path.display(), items, "Wrote collection");
                *guard = next;
            }
            Ok::<R, StoreError>(output)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store write task failed: {e}")))?
    }
}

async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_atomic(path: &Path, json: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(json).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl QuestionRepository for JsonFileStore {
    async fn query_unused(
        &self,
        topic: &Topic,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuestionBankEntry>, StoreError> {
        Ok(self.collections.lock().await.unused(topic, user, limit))
    }

    async fn mark_used(&self, id: &EntryId, user: &UserId) -> Result<(), StoreError> {
        let (id, user) = (id.clone(), user.clone());
        self.mutate(Collection::Bank, move |next| Ok(((), next.mark_used(&id, &user)?))).await
    }

    async fn insert_question(&self, entry: NewQuestionEntry) -> Result<EntryId, StoreError> {
        self.mutate(Collection::Bank, move |next| Ok((next.insert(entry), true))).await
    }
}

#[async_trait]
impl HistoryRecorder for JsonFileStore {
    async fn append_answered_event(&self, event: &AnsweredQuestionEvent) -> Result<(), StoreError> {
        let event = event.clone();
        self.mutate(Collection::Answered, move |next| {
            next.answered.push(event);
            Ok(((), true))
        })
        .await
    }

    async fn query_answered_events(
        &self,
        user: &UserId,
        subject: &str,
        grade: &str,
    ) -> Result<Vec<AnsweredQuestionEvent>, StoreError> {
        Ok(self.collections.lock().await.answered_by(user, subject, grade))
    }

    async fn insert_history_record(&self, record: &QuizHistoryRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.mutate(Collection::History, move |next| {
            next.history.push(record);
            Ok(((), true))
        })
        .await
    }

    async fn query_history(&self, user: &UserId) -> Result<Vec<QuizHistoryRecord>, StoreError> {
        Ok(self.collections.lock().await.history_of(user))
    }
}
