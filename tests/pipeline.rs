//! Integration tests for the text-processing pipeline and the bank store.
//!
//! These stages are pure functions over strings, so the tests run against
//! synthetic page text — no PDF, no pdfium, no OCR binary. The one stateful
//! component exercised here is `BankStore`, which gets a tempdir.

use pdf2bank::pipeline::{merge, pages::PageMap, parse, segment};
use pdf2bank::{BankRecord, BankStore, ExamCode, Question};
use std::collections::HashMap;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn exam() -> ExamCode {
    ExamCode::new("ENEM23_F2")
}

/// Run the full text pipeline over synthetic pages: build the page map,
/// segment, parse, merge recognized text, filter language sections.
fn run_pipeline(
    page_texts: Vec<&str>,
    recognized: HashMap<usize, String>,
) -> (Vec<Question>, usize) {
    let (full_text, page_map) =
        PageMap::from_page_texts(page_texts.into_iter().map(str::to_string));
    let questions = segment::segment_questions(&full_text, &page_map, &exam());
    let questions: Vec<Question> = questions
        .into_iter()
        .map(parse::parse_content)
        .map(|q| merge::merge_recognized(q, &recognized))
        .collect();
    merge::filter_language_sections(questions)
}

// ── Full-pipeline behaviour ──────────────────────────────────────────────────

#[test]
fn two_page_exam_reconstructs_both_questions() {
    let page1 = "12\n\
                 ENEM 2023\n\
                 QUESTÃO 1\n\
                 Read the cartoon below.\n\
                 \n\
                 What does the speaker imply?\n\
                 A) That time is short.\n\
                 B) That time is long.\n\
                 C) That nothing matters.\n\
                 D) That everything matters.\n\
                 E) That the question is moot.";
    let page2 = "QUESTÃO 2\n\
                 Choose the correct option.\n\
                 A) First.\n\
                 B) Second.\n\
                 C) Third.\n\
                 D) Fourth.\n\
                 E) Fifth.";

    let (questions, excluded) = run_pipeline(vec![page1, page2], HashMap::new());

    assert_eq!(excluded, 0);
    assert_eq!(questions.len(), 2);

    let q1 = &questions[0];
    assert_eq!(q1.number, 1);
    assert_eq!(q1.id(), "ENEM23_F2_Q001");
    assert_eq!(q1.pages, vec![0]);
    assert_eq!(q1.passage, "Read the cartoon below.");
    assert_eq!(q1.stem, "What does the speaker imply?");
    assert_eq!(q1.alternatives.len(), 5);
    assert_eq!(q1.alternatives[0], "A) That time is short.");
    assert_eq!(q1.alternatives[4], "E) That the question is moot.");

    let q2 = &questions[1];
    assert_eq!(q2.number, 2);
    assert_eq!(q2.pages, vec![1]);
    // Single paragraph before the alternatives: stem only, no passage.
    assert_eq!(q2.passage, "");
    assert_eq!(q2.stem, "Choose the correct option.");
    assert_eq!(q2.alternatives.len(), 5);
}

#[test]
fn question_spanning_a_page_break_records_both_pages() {
    let page1 = "QUESTÃO 3\nA passage that starts on this page\n";
    let page2 = "and continues on the next one.\n\nWhat now?\nA) This.\nB) That.";

    let (questions, _) = run_pipeline(vec![page1, page2], HashMap::new());

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].pages, vec![0, 1]);
    assert!(questions[0].stem.contains("What now?"));
}

#[test]
fn recognized_text_lands_in_the_passage_without_corrupting_structure() {
    let page = "QUESTÃO 1\n\
                Intro paragraph.\n\
                \n\
                Pick one.\n\
                A) Yes.\n\
                B) No.";
    let mut recognized = HashMap::new();
    recognized.insert(0, "Caption printed inside the cartoon image".to_string());

    let (questions, _) = run_pipeline(vec![page], recognized);

    let q = &questions[0];
    // Structure comes from the native text layer only; OCR text appends.
    assert_eq!(q.stem, "Pick one.");
    assert_eq!(q.alternatives, vec!["A) Yes.", "B) No."]);
    assert!(q.passage.starts_with("Intro paragraph."));
    assert!(q.passage.ends_with("Caption printed inside the cartoon image"));
}

#[test]
fn recognized_text_already_in_the_layer_is_not_appended() {
    let page = "QUESTÃO 1\nShared sentence here.\n\nStem.\nA) One.\nB) Two.";
    let mut recognized = HashMap::new();
    recognized.insert(0, "Shared sentence here.".to_string());

    let (questions, _) = run_pipeline(vec![page], recognized);
    assert_eq!(questions[0].passage, "Shared sentence here.");
}

#[test]
fn spanish_section_questions_after_five_are_dropped() {
    let mut pages = Vec::new();
    let mut bodies = Vec::new();
    for n in 1..=6 {
        let section = if n == 6 {
            "Questões de 06 a 10 (opção espanhol)\n"
        } else {
            ""
        };
        bodies.push(format!("QUESTÃO {n}\n{section}Stem {n}.\nA) a.\nB) b."));
    }
    let joined = bodies.join("\n");
    pages.push(joined.as_str());

    let (questions, excluded) = run_pipeline(pages, HashMap::new());

    assert_eq!(excluded, 1);
    assert_eq!(questions.len(), 5);
    assert!(questions.iter().all(|q| q.number <= 5));
}

#[test]
fn spanish_marker_in_an_early_question_is_kept() {
    // The threshold protects the shared 1–5 block even when the word shows up.
    let page = "QUESTÃO 2\nA text mentioning espanhol as a subject.\n\nStem.\nA) a.\nB) b.";
    let (questions, excluded) = run_pipeline(vec![page], HashMap::new());
    assert_eq!(excluded, 0);
    assert_eq!(questions.len(), 1);
}

#[test]
fn no_markers_yields_empty_output_not_an_error() {
    let (questions, excluded) = run_pipeline(vec!["Just a cover page.\n"], HashMap::new());
    assert!(questions.is_empty());
    assert_eq!(excluded, 0);
}

#[test]
fn page_number_and_header_artifacts_never_reach_the_records() {
    let page = "37\n\
                ENEM 2023 — segundo dia\n\
                QUESTÃO 4\n\
                Stem with content.\n\
                A) a.\n\
                B) b.";
    let (questions, _) = run_pipeline(vec![page], HashMap::new());
    let q = &questions[0];
    assert!(!q.stem.contains("ENEM 2023"));
    assert!(!q.stem.starts_with("37"));
}

// ── Store integration ────────────────────────────────────────────────────────

#[test]
fn extracted_questions_round_trip_through_the_bank() {
    let page = "QUESTÃO 1\nPassage.\n\nStem one.\nA) a.\nB) b.\nQUESTÃO 2\nStem two.\nA) a.\nB) b.";
    let (questions, _) = run_pipeline(vec![page], HashMap::new());
    assert_eq!(questions.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let store = BankStore::open(dir.path().join("data").join("QuestionBank.json"));

    let size = store.upsert(&questions).unwrap();
    assert_eq!(size, 2);

    let records = store.records().unwrap();
    let expected: Vec<BankRecord> = questions.iter().map(BankRecord::from).collect();
    assert_eq!(records, expected);
}

#[test]
fn rerunning_the_same_exam_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = BankStore::open(dir.path().join("QuestionBank.json"));

    let first = "QUESTÃO 1\nOld stem.\nA) a.\nB) b.";
    let (questions, _) = run_pipeline(vec![first], HashMap::new());
    store.upsert(&questions).unwrap();

    let second = "QUESTÃO 1\nNew stem.\nA) a.\nB) b.";
    let (questions, _) = run_pipeline(vec![second], HashMap::new());
    let size = store.upsert(&questions).unwrap();

    assert_eq!(size, 1);
    let records = store.records().unwrap();
    assert_eq!(records[0].stem, "New stem.");
}

#[test]
fn different_exams_coexist_in_one_bank() {
    let dir = tempfile::tempdir().unwrap();
    let store = BankStore::open(dir.path().join("QuestionBank.json"));

    let page = "QUESTÃO 1\nStem.\nA) a.\nB) b.";
    let (full_text, page_map) = PageMap::from_page_texts([page.to_string()]);

    for code in ["ENEM23_F2", "ENEM19_F1"] {
        let exam = ExamCode::new(code);
        let questions: Vec<Question> = segment::segment_questions(&full_text, &page_map, &exam)
            .into_iter()
            .map(parse::parse_content)
            .collect();
        store.upsert(&questions).unwrap();
    }

    let ids: Vec<String> = store.records().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["ENEM23_F2_Q001", "ENEM19_F1_Q001"]);
}
