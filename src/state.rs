use std::collections::HashMap;
use std::path::Path;

use rusty_eda::{Bucket, Dispatch, RequestedType, Session};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A one-line message under the menu bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded session (None until user loads a file).
    pub session: Option<Session>,

    /// Column picked in the "change data type" form.
    pub coerce_column: Option<String>,

    /// Type picked in the "change data type" form.
    pub coerce_type: RequestedType,

    /// Which bucket the visualization panel works on.
    pub bucket: Bucket,

    /// Selected columns per bucket, in the order they were ticked.
    pub selections: HashMap<Bucket, Vec<String>>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: None,
            coerce_column: None,
            coerce_type: RequestedType::Float,
            bucket: Bucket::Numerical,
            selections: HashMap::new(),
            status: None,
        }
    }
}

impl AppState {
    /// Load a file and replace the current session on success.
    pub fn open(&mut self, path: &Path) {
        match Session::open(path) {
            Ok(session) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    session.dataset().len(),
                    session.dataset().column_names()
                );
                self.set_session(session);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    /// Ingest a newly loaded session and reset the forms.
    pub fn set_session(&mut self, session: Session) {
        self.coerce_column = session.dataset().column_names().first().cloned();
        self.selections.clear();
        self.status = Some(Status::Info(format!(
            "Loaded {} ({} rows x {} columns)",
            session.source(),
            session.dataset().len(),
            session.dataset().width()
        )));
        self.session = Some(session);
    }

    /// Run the "change data type" form.
    pub fn apply_coercion(&mut self) {
        let (Some(session), Some(column)) = (self.session.as_mut(), self.coerce_column.clone())
        else {
            return;
        };
        match session.coerce(&column, self.coerce_type) {
            Ok(done) => {
                self.status = Some(Status::Info(format!(
                    "'{}' is now {} (was {})",
                    done.column, done.to, done.from
                )));
                self.prune_selections();
            }
            Err(e) => {
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    /// Drop selected columns that left their bucket after a coercion.
    fn prune_selections(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let classification = session.classify();
        for bucket in Bucket::ALL {
            if let Some(selected) = self.selections.get_mut(&bucket) {
                selected.retain(|c| classification.contains(bucket, c));
            }
        }
    }

    pub fn selected(&self, bucket: Bucket) -> &[String] {
        self.selections
            .get(&bucket)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Tick or untick a column in a bucket's selection.
    pub fn toggle_column(&mut self, bucket: Bucket, column: &str) {
        let selected = self.selections.entry(bucket).or_default();
        if let Some(pos) = selected.iter().position(|c| c == column) {
            selected.remove(pos);
        } else {
            selected.push(column.to_string());
        }
    }

    /// Select every member of a bucket.
    pub fn select_all(&mut self, bucket: Bucket) {
        if let Some(session) = &self.session {
            let members = session.classify().members(bucket).to_vec();
            self.selections.insert(bucket, members);
        }
    }

    /// Deselect all columns of a bucket.
    pub fn select_none(&mut self, bucket: Bucket) {
        self.selections.insert(bucket, Vec::new());
    }

    /// Dispatch the current bucket and selection against the live dataset.
    pub fn visualization(&self) -> Option<rusty_eda::Result<Dispatch>> {
        let session = self.session.as_ref()?;
        Some(session.visualize(self.bucket, self.selected(self.bucket)))
    }
}
