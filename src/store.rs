//! The persisted question bank: a JSON array of records keyed by question id.
//!
//! The store is an explicit handle with a deliberately narrow lifecycle:
//! open for a merge, read-modify-write, done. It is never held open across
//! the pipeline's text-processing stages. Writes replace the whole file
//! atomically (temp file + rename in the same directory), which is the
//! single-writer serialisation the read-modify-write cycle needs —
//! concurrent upserts from separate processes must still be serialised
//! externally.
//!
//! Read tolerance mirrors the error policy: an absent file is an empty
//! bank; a corrupt file is an empty bank with a warning (it will be
//! overwritten by the next successful write); an individual unparsable
//! element is skipped with a warning. Only real I/O failures are fatal.

use crate::error::Pdf2BankError;
use crate::question::{BankRecord, Question};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Handle to a persisted question bank file.
#[derive(Debug, Clone)]
pub struct BankStore {
    path: PathBuf,
}

impl BankStore {
    /// Point at a bank file. The file need not exist yet; the parent
    /// directory is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        BankStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records currently in the bank.
    ///
    /// Absent file ⇒ empty. Corrupt JSON ⇒ empty with a warning. Elements
    /// that are valid JSON but not valid records are skipped with a
    /// warning (and dropped on the next write).
    pub fn records(&self) -> Result<Vec<BankRecord>, Pdf2BankError> {
        let raw = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Pdf2BankError::StoreReadFailed {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_slice(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    "Question bank {} is corrupted ({}); treating as empty",
                    self.path.display(),
                    e
                );
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<BankRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping malformed record in {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(records)
    }

    /// Merge the given questions into the bank, keyed by id.
    ///
    /// Existing records keep their position; a question whose id is already
    /// present overwrites that record in place; new ids are appended in
    /// input order. Records for other exams or other numbers are never
    /// touched. Duplicate ids within one batch keep the last occurrence,
    /// with a warning. Returns the number of records in the bank after the
    /// merge.
    pub fn upsert(&self, questions: &[Question]) -> Result<usize, Pdf2BankError> {
        let mut records = self.records()?;
        let mut index_by_id: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        let mut seen_in_batch: HashSet<String> = HashSet::new();
        for question in questions {
            let id = question.id();
            if !seen_in_batch.insert(id.clone()) {
                warn!("Duplicate question id {} in this batch; keeping the last", id);
            }
            let record = BankRecord::from(question);
            match index_by_id.get(&id) {
                Some(&i) => {
                    debug!("Overwriting existing record {}", id);
                    records[i] = record;
                }
                None => {
                    index_by_id.insert(id, records.len());
                    records.push(record);
                }
            }
        }

        self.write_records(&records)?;
        info!(
            "Question bank {} now holds {} records ({} merged)",
            self.path.display(),
            records.len(),
            questions.len()
        );
        Ok(records.len())
    }

    /// Atomic whole-file replace: serialise to a temp file in the bank's
    /// directory, then rename over the target.
    fn write_records(&self, records: &[BankRecord]) -> Result<(), Pdf2BankError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| Pdf2BankError::StoreWriteFailed {
            path: self.path.clone(),
            source: e,
        })?;

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| Pdf2BankError::Internal(format!("bank serialisation: {}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
            Pdf2BankError::StoreWriteFailed {
                path: self.path.clone(),
                source: e,
            }
        })?;
        tmp.write_all(&json)
            .map_err(|e| Pdf2BankError::StoreWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;
        tmp.persist(&self.path)
            .map_err(|e| Pdf2BankError::StoreWriteFailed {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamCode;

    fn question(code: &str, number: u32, stem: &str) -> Question {
        let mut q = Question::raw(number, ExamCode::new(code), vec![0], String::new());
        q.stem = stem.to_string();
        q
    }

    fn store_in(dir: &tempfile::TempDir) -> BankStore {
        BankStore::open(dir.path().join("QuestionBank.json"))
    }

    #[test]
    fn absent_file_is_an_empty_bank() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_empty_bank() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{not json!").unwrap();
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn upsert_overwrites_by_id_and_keeps_unrelated_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .upsert(&[question("X", 1, "old"), question("Y", 2, "keep")])
            .unwrap();
        store.upsert(&[question("X", 1, "new")]).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "X_F1_Q001");
        assert_eq!(records[0].stem, "new");
        assert_eq!(records[1].id, "Y_F1_Q002");
        assert_eq!(records[1].stem, "keep");
    }

    #[test]
    fn repeated_upsert_of_same_batch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let batch = [question("ENEM23_F2", 1, "a"), question("ENEM23_F2", 2, "b")];

        store.upsert(&batch).unwrap();
        let once = store.records().unwrap();
        store.upsert(&batch).unwrap();
        let twice = store.records().unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn new_ids_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .upsert(&[
                question("Z", 3, "c"),
                question("Z", 1, "a"),
                question("Z", 2, "b"),
            ])
            .unwrap();
        let ids: Vec<String> = store.records().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["Z_F1_Q003", "Z_F1_Q001", "Z_F1_Q002"]);
    }

    #[test]
    fn duplicate_ids_in_batch_keep_the_last() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .upsert(&[question("X", 1, "first"), question("X", 1, "second")])
            .unwrap();
        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stem, "second");
    }

    #[test]
    fn malformed_elements_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"[{"id": "X_Q001", "matéria": "Inglês", "tema": "Inglês",
                 "texto": "", "enunciado": "kept", "alternativas": [],
                 "imagens": [], "correta": null},
                {"unexpected": true}]"#,
        )
        .unwrap();
        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stem, "kept");
    }

    #[test]
    fn written_file_is_a_json_array_with_portuguese_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.upsert(&[question("ENEM23_F2", 1, "stem")]).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["matéria"], "Inglês");
        assert_eq!(value[0]["enunciado"], "stem");
        assert!(value[0]["correta"].is_null());
    }
}
