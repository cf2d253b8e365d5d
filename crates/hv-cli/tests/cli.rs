//! End-to-end tests of the reporting and script layers over a small file.

use std::io::Write;

use tempfile::NamedTempFile;

use hv_cli::script::{ScriptOutcome, run_script, write_publication};
use hv_cli::summary::{OptionsReport, SummaryReport};
use hv_query::DatasetStore;
use hv_session::{Session, SessionConfig};

const CSV: &str = "\
Name,Age,Gender,Blood Type,Medical Condition,Date of Admission,Doctor,Hospital,Insurance Provider,Billing Amount,Room Number,Admission Type,Discharge Date,Medication,Test Results
Ann,30,Female,A+,Asthma,2023-01-01,Dr X,Mercy General,Aetna,1000,101,Urgent,2023-01-05,Aspirin,Normal
Bob,70,Male,O-,Cancer,2023-02-01,Dr Y,Mercy General,Cigna,3000,102,Elective,2023-02-03,Ibuprofen,Abnormal
Cat,50,Female,B+,Obesity,2023-03-01,Dr Z,\"Smith Ltd,\",Aetna,,103,Emergency,2023-03-11,Penicillin,Abnormal
";

fn session() -> Session {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();
    let store = DatasetStore::load(file.path()).unwrap();
    Session::new(store, SessionConfig::default()).unwrap()
}

#[test]
fn test_script_transcript() {
    let script = "\
# explore one gender
show
set gender Female
apply
show
set bogus 1
reset
quit
apply
";
    let mut session = session();
    let mut out = Vec::new();
    let outcome = run_script(&mut session, script.as_bytes(), &mut out).unwrap();

    assert_eq!(outcome, ScriptOutcome { executed: 5, failed: 1 });
    insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
    selection: All
    patients: 3
    total billing: $4.0K
    avg billing: $1.3K
    avg stay: 5.3 days
    hospitals: 2
    top hospital: Mercy General (2 patients, mostly Normal)
    applied: Female (2 rows)
    selection: Female
    patients: 2
    total billing: $1.0K
    avg billing: $500
    avg stay: 7.0 days
    hospitals: 2
    top hospital: Mercy General (1 patients, mostly Normal)
    line 6: error: unknown filter field 'bogus'
    reset: 3 rows
    ");
}

#[test]
fn test_stats_prints_cache_table() {
    let mut session = session();
    let mut out = Vec::new();
    let script = "set gender Female\napply\nreset\nstats\n";
    let outcome = run_script(&mut session, script.as_bytes(), &mut out).unwrap();
    assert_eq!(outcome, ScriptOutcome { executed: 4, failed: 0 });

    let text = String::from_utf8(out).unwrap();
    for label in ["Cache", "Hit rate", "filter", "aggregate"] {
        assert!(text.contains(label), "missing {label} in:\n{text}");
    }
    // The reset lands on the filter key of the initial unfiltered apply.
    assert_eq!(session.cache_stats().filter.hits, 1);
    assert!(text.contains("33.3%"));
}

#[test]
fn test_summary_report_json() {
    let mut session = session();
    session.set_predicate("testResult", "Abnormal").unwrap();
    let publication = session.start();

    let report = SummaryReport::new(&publication, session.test_results(), 1);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["selection"], "Abnormal");
    assert_eq!(json["scalars"]["count"], 2);
    assert_eq!(json["testResults"]["Abnormal"], 2);
    assert_eq!(json["testResults"]["Normal"], 0);
    assert_eq!(json["hospitals"].as_array().map(Vec::len), Some(1));
    assert!(json["filterKey"].as_str().unwrap().contains("\"testResult\":\"Abnormal\""));
}

#[test]
fn test_options_report_lists_sorted_values() {
    let session = session();
    let report = OptionsReport::new(session.store());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["rows"], 3);
    assert_eq!(json["admissionDateMin"], "2023-01-01");
    assert_eq!(json["admissionDateMax"], "2023-03-01");
    let hospitals = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["field"] == "hospital")
        .unwrap();
    insta::assert_json_snapshot!(&hospitals["values"], @r#"
    [
      "Mercy General",
      "Smith Ltd"
    ]
    "#);
}

#[test]
fn test_write_publication_before_any_filter() {
    let mut session = session();
    let publication = session.start();
    let mut out = Vec::new();
    write_publication(&mut out, &publication).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("selection: All\npatients: 3\n"));
}
