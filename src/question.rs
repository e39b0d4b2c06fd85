//! The central `Question` record and its persisted projection.
//!
//! A `Question` is born raw (number, provenance pages, the untouched text
//! slice) from the segmenter and then threaded through the pipeline stages,
//! each of which is a pure `Question -> Question` transformation filling or
//! appending to its own fields. Nothing mutates a question after it has been
//! handed to the bank store.

use crate::exam::ExamCode;
use serde::{Deserialize, Serialize};

/// Subject/topic default stamped on every record at this stage — the
/// pipeline targets the English-language section; classification beyond
/// that is downstream work.
pub const DEFAULT_SUBJECT: &str = "Inglês";

/// One reconstructed exam question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Number captured from the in-document marker. Unique within one exam
    /// at best — never across exams.
    pub number: u32,
    /// The source exam this question belongs to.
    pub exam_code: ExamCode,
    /// Zero-based indices of the pages this question's text overlaps,
    /// in page order.
    pub pages: Vec<usize>,
    /// The unprocessed slice of the document stream between this question's
    /// marker and the next. Kept as provenance; later stages only read it
    /// (de-duplication checks, language-section filter).
    pub raw_text: String,
    /// Optional reading passage preceding the prompt.
    pub passage: String,
    /// The question prompt itself.
    pub stem: String,
    /// Lettered alternatives, `"A) …"` through `"E) …"`, in document order.
    pub alternatives: Vec<String>,
    /// Image-root-relative paths of figures attached to this question.
    pub images: Vec<String>,
}

impl Question {
    /// Construct the raw record as emitted by the segmenter; derived fields
    /// start empty and are filled by later stages.
    pub fn raw(number: u32, exam_code: ExamCode, pages: Vec<usize>, raw_text: String) -> Self {
        Question {
            number,
            exam_code,
            pages,
            raw_text,
            passage: String::new(),
            stem: String::new(),
            alternatives: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Stable identifier and sole merge key in the bank:
    /// `<EXAM_CODE>_Q<zero-padded number>`.
    pub fn id(&self) -> String {
        format!("{}_Q{:03}", self.exam_code, self.number)
    }
}

/// Serialized projection of a [`Question`] as stored in the bank file.
///
/// Field names follow the bank's established Portuguese schema; `correct` is
/// a placeholder reserved for downstream annotation and is always `null`
/// when written by this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub id: String,
    #[serde(rename = "matéria")]
    pub subject: String,
    #[serde(rename = "tema")]
    pub topic: String,
    #[serde(rename = "texto")]
    pub passage: String,
    #[serde(rename = "enunciado")]
    pub stem: String,
    #[serde(rename = "alternativas")]
    pub alternatives: Vec<String>,
    #[serde(rename = "imagens")]
    pub images: Vec<String>,
    #[serde(rename = "correta")]
    pub correct: Option<String>,
}

impl From<&Question> for BankRecord {
    fn from(q: &Question) -> Self {
        BankRecord {
            id: q.id(),
            subject: DEFAULT_SUBJECT.to_string(),
            topic: DEFAULT_SUBJECT.to_string(),
            passage: q.passage.clone(),
            stem: q.stem.clone(),
            alternatives: q.alternatives.clone(),
            images: q.images.clone(),
            correct: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::raw(7, ExamCode::new("ENEM23_F2"), vec![2, 3], "body".into())
    }

    #[test]
    fn id_is_zero_padded() {
        assert_eq!(sample().id(), "ENEM23_F2_Q007");
        let q = Question::raw(120, ExamCode::new("ENEM23_F2"), vec![], String::new());
        assert_eq!(q.id(), "ENEM23_F2_Q120");
    }

    #[test]
    fn record_projection_keys() {
        let mut q = sample();
        q.stem = "What?".into();
        q.alternatives = vec!["A) yes".into(), "B) no".into()];
        let record = BankRecord::from(&q);
        let json = serde_json::to_value(&record).unwrap();
        // The persisted schema is fixed — renames must survive round-trips.
        assert_eq!(json["id"], "ENEM23_F2_Q007");
        assert_eq!(json["matéria"], DEFAULT_SUBJECT);
        assert_eq!(json["tema"], DEFAULT_SUBJECT);
        assert_eq!(json["enunciado"], "What?");
        assert_eq!(json["alternativas"][1], "B) no");
        assert!(json["correta"].is_null());
    }

    #[test]
    fn record_round_trip() {
        let record = BankRecord::from(&sample());
        let json = serde_json::to_string(&record).unwrap();
        let back: BankRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
