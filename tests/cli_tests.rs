use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

fn school_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("school"))
}

/// Run `init` in a fresh temp dir and return the config path.
fn init_config(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("school-config");
    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
    config_path
}

fn cmd_with(config_path: &Path, api_url: &str) -> Command {
    let mut cmd = school_cmd();
    cmd.args(["-C", config_path.to_str().unwrap(), "--api-url", api_url]);
    cmd
}

/// One request as the stub backend saw it.
#[derive(Debug, Clone)]
struct Captured {
    method: String,
    path: String,
    content_type: String,
    body: Vec<u8>,
}

impl Captured {
    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct Stub {
    url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Stub {
    /// The single request sent with `method` to `path`.
    fn request(&self, method: &str, path: &str) -> Captured {
        let requests = self.requests.lock().unwrap();
        let matching: Vec<&Captured> = requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .collect();
        assert_eq!(matching.len(), 1, "{method} {path} in {requests:?}");
        matching[0].clone()
    }
}

/// Tiny HTTP/1.1 backend answering canned bodies keyed by `"METHOD /path"`,
/// recording every request it receives.
fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut content_length = 0usize;
            let mut content_type = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    match name.trim().to_ascii_lowercase().as_str() {
                        "content-length" => content_length = value.trim().parse().unwrap_or(0),
                        "content-type" => content_type = value.trim().to_string(),
                        _ => {}
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);

            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or("GET").to_string();
            let path = parts.next().unwrap_or("/").to_string();
            let key = format!("{method} {path}");
            log.lock().unwrap().push(Captured {
                method,
                path,
                content_type,
                body,
            });

            let (status, payload) = routes
                .iter()
                .find(|(route, _, _)| *route == key)
                .map(|(_, s, b)| (*s, *b))
                .unwrap_or((404, r#"{"detail": "Not found."}"#));
            let reason = match status {
                200 => "OK",
                201 => "Created",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    Stub {
        url: format!("http://{addr}"),
        requests,
    }
}

const EXPENSES: &str = r#"[
    {"id": 1, "category": "RENT", "amount": "50000.00", "date": "2025-03-01", "description": "March rent"},
    {"id": 2, "category": "UTILITY_BILLS", "amount": "8000.00", "date": "3/10/2025", "description": "Electricity"},
    {"id": 3, "category": "RENT", "amount": "90.00", "date": "2025-03-15", "description": "Storage"},
    {"id": 4, "category": "RENT", "amount": "45000.00", "date": "sometime", "description": "April rent"}
]"#;

const FEES: &str = r#"[
    {"id": 31, "student_info": {"roll_no": 7, "name": "Ayesha Khan", "grade": 5},
     "month": "2025-04-01", "tuition_fee": "6500.00", "exam_fee": "500.00",
     "total_fee": "7000.00", "amount_paid": "7000.00", "paid": true},
    {"id": 32, "student_info": {"roll_no": 12, "name": "Bilal Ahmed", "grade": 3},
     "month": "2025-04-01", "tuition_fee": "6500.00", "total_fee": "6500.00", "paid": false},
    {"id": 33, "student_info": {"roll_no": 7, "name": "Ayesha Khan", "grade": 5},
     "month": "2025-03-01", "tuition_fee": "7200.00", "total_fee": "7200.00", "paid": false}
]"#;

const LEDGER: &str = r#"[
    {"id": 1, "month": "2025-02-01", "MonthlyStudentFees": "300000.00", "MonthlyTeacherPays": "35000.00",
     "MonthlyExpenses": "10000.00", "MonthlyProfit": "255000.00"},
    {"id": 2, "month": "2025-03-01", "MonthlyStudentFees": "350000.00", "MonthlyTeacherPays": "35000.00",
     "MonthlyExpenses": "10000.00", "MonthlyProfit": "305000.00"}
]"#;

#[test]
fn test_help() {
    school_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("School administration client"));
}

#[test]
fn test_version() {
    school_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("school"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("school-config");

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized school config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("challans").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_shows_api_override() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8000"));

    cmd_with(&config_path, "http://backend.test:9000/")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://backend.test:9000"));
}

#[test]
fn test_malformed_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    std::fs::write(config_path.join("config.toml"), "[api\nbase_url = ").unwrap();

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_fee_calc_is_local() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    school_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "fees",
            "calc",
            "--set",
            "tuition_fee=100.00",
            "--set",
            "exam_fee=50",
            "--set",
            "stationary_charges=",
            "--set",
            "admission_fee=25.5",
            "--set",
            "pending=10",
            "--amount-paid",
            "200.00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:       Rs. 185.50"))
        .stdout(predicate::str::contains("Balance:     Rs. 0.00"))
        .stdout(predicate::str::contains("Status:      PAID"));
}

#[test]
fn test_fee_calc_rejects_bad_assignment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "fees", "calc", "--set", "exam_fee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid assignment"));

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "fees", "calc", "--set", "bus_fee=10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown fee field"));
}

#[test]
fn test_expenses_filtered_total() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/expenses/", 200, EXPENSES)]);

    cmd_with(&config_path, &stub.url)
        .args(["expenses", "list", "--category", "rent", "--min-amount", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 2 of 4 expenses"))
        .stdout(predicate::str::contains("Total: Rs. 95,000.00"))
        .stdout(predicate::str::contains("Storage").not());
}

#[test]
fn test_expense_date_range_keeps_unreadable_dates() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/expenses/", 200, EXPENSES)]);

    cmd_with(&config_path, &stub.url)
        .args(["expenses", "list", "--from", "2025-03-05", "--to", "2025-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 3 of 4 expenses"))
        .stdout(predicate::str::contains("Kept 1 record(s) with unreadable dates"))
        .stderr(predicate::str::contains("could not parse date 'sometime'"));
}

#[test]
fn test_fees_month_summary() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/studentfees/", 200, FEES)]);

    cmd_with(&config_path, &stub.url)
        .args(["fees", "list", "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 2 of 3 fee records"))
        .stdout(predicate::str::contains("Total:   Rs. 13,500.00"))
        .stdout(predicate::str::contains("Paid:    Rs. 7,000.00"))
        .stdout(predicate::str::contains("Pending: Rs. 6,500.00"));
}

#[test]
fn test_challan_requires_selection() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/studentfees/", 200, FEES)]);

    cmd_with(&config_path, &stub.url)
        .args(["fees", "challan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No fee records selected"));
}

#[test]
fn test_challan_skips_unknown_ids() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/studentfees/", 200, FEES)]);

    cmd_with(&config_path, &stub.url)
        .args(["fees", "challan", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 0 challan(s), skipped 1 id(s) not in the list"));
}

#[test]
fn test_dashboard_uses_latest_month() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/ledger/", 200, LEDGER)]);

    cmd_with(&config_path, &stub.url)
        .args(["dashboard", "--months", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Financial Dashboard: March 2025"))
        .stdout(predicate::str::contains("87.1 (excellent)"))
        .stdout(predicate::str::contains("▲ 16.7% (good)"))
        .stdout(predicate::str::contains("Revenue/expense ratio: 7.78"));
}

#[test]
fn test_dashboard_rejects_out_of_range_months() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    school_cmd()
        .args(["-C", config_path.to_str().unwrap(), "dashboard", "--months", "13"])
        .assert()
        .failure();
}

#[test]
fn test_server_error_message_is_surfaced() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![(
        "GET /api/ledger/",
        500,
        r#"{"detail": "database unavailable"}"#,
    )]);

    cmd_with(&config_path, &stub.url)
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server error (500): database unavailable"));
}

#[test]
fn test_missing_record_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![]);

    cmd_with(&config_path, &stub.url)
        .args(["students", "show", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Student '404' not found"));
}

#[test]
fn test_network_failure_is_distinguished() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    cmd_with(&config_path, "http://127.0.0.1:9")
        .args(["students", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network error"));
}

const STUDENT: &str = r#"{"roll_no": 7, "name": "Ayesha Khan", "father_name": "Imran Khan", "grade": 5,
    "tuition_fee": "6500.00", "pending_fee": "1200.00", "enrolled": true}"#;

const FEE_31: &str = r#"{"id": 31, "student_info": {"roll_no": 7, "name": "Ayesha Khan", "grade": 5},
    "month": "2025-04-01", "tuition_fee": "6500.00", "exam_fee": "500.00",
    "total_fee": "7000.00", "amount_paid": "7000.00", "balance": "0.00", "paid": true}"#;

const CREATED_FEE: &str = r#"{"id": 40, "student_info": {"roll_no": 7, "name": "Ayesha Khan", "grade": 5},
    "month": "2025-04-01", "total_fee": "8200.00", "paid": true}"#;

#[test]
fn test_fee_add_posts_recomputed_totals() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![
        ("GET /api/students/7/", 200, STUDENT),
        ("POST /api/studentfees/", 201, CREATED_FEE),
    ]);

    cmd_with(&config_path, &stub.url)
        .args([
            "fees",
            "add",
            "--student",
            "7",
            "--set",
            "tuition_fee=6500",
            "--set",
            "exam_fee=500",
            "--amount-paid",
            "2000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created fee record #40 for Ayesha Khan"));

    let sent = stub.request("POST", "/api/studentfees/");
    assert!(sent.content_type.starts_with("application/json"));
    let body = sent.json();
    assert_eq!(body["student"], 7);
    assert_eq!(body["pending"], "1200.00");
    assert_eq!(body["total_fee"], "8200.00");
    assert_eq!(body["amount_paid"], "2000.00");
    assert_eq!(body["balance"], "6200.00");
    assert_eq!(body["paid"], true);
}

#[test]
fn test_fee_edit_puts_to_update_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![
        ("GET /api/studentfees/31/", 200, FEE_31),
        ("PUT /api/feeupdate/31/", 200, "{}"),
    ]);

    cmd_with(&config_path, &stub.url)
        .args(["fees", "edit", "31", "--set", "exam_fee=800", "--paid", "no"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated fee record #31"))
        .stdout(predicate::str::contains("Balance:     Rs. 300.00"));

    let body = stub.request("PUT", "/api/feeupdate/31/").json();
    assert_eq!(body["id"], 31);
    assert_eq!(body["student"], 7);
    assert_eq!(body["exam_fee"], "800.00");
    assert_eq!(body["total_fee"], "7300.00");
    assert_eq!(body["balance"], "300.00");
    assert_eq!(body["paid"], false);
}

/// Boundary announced in a multipart content type.
fn boundary_of(content_type: &str) -> String {
    content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap_or_else(|| panic!("not multipart: {content_type}"))
        .to_string()
}

#[test]
fn test_student_add_uploads_multipart_form() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let scan = temp_dir.path().join("admission.pdf");
    std::fs::write(&scan, b"%PDF-1.4 scanned form").unwrap();
    let stub = serve(vec![(
        "POST /api/students/",
        201,
        r#"{"roll_no": 51, "name": "Sara Ali", "grade": 4}"#,
    )]);

    cmd_with(&config_path, &stub.url)
        .args(["students", "add", "--name", "Sara Ali", "--grade", "4", "--doc"])
        .arg(&scan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added student #51 (Sara Ali)"));

    let sent = stub.request("POST", "/api/students/");
    let boundary = boundary_of(&sent.content_type);
    let body = sent.text();
    assert!(body.contains(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nSara Ali\r\n"
    )));
    assert!(body.contains("name=\"grade\"\r\n\r\n4\r\n"));
    assert!(body.contains(
        "name=\"scanned_doc\"; filename=\"admission.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4 scanned form\r\n"
    ));
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
}

#[test]
fn test_teacher_add_uploads_document() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let cv = temp_dir.path().join("cv.txt");
    std::fs::write(&cv, "Nadia, MSc").unwrap();
    let stub = serve(vec![(
        "POST /api/teacher/",
        201,
        r#"{"id": 9, "name": "Nadia", "qualification": "MSc", "pay": 45000}"#,
    )]);

    cmd_with(&config_path, &stub.url)
        .args(["teachers", "add", "--name", "Nadia", "--qualification", "MSc"])
        .args(["--pay", "45000", "--doc"])
        .arg(&cv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added teacher #9 (Nadia)"));

    let sent = stub.request("POST", "/api/teacher/");
    boundary_of(&sent.content_type);
    let body = sent.text();
    assert!(body.contains("name=\"pay\"\r\n\r\n45000\r\n"));
    assert!(body.contains(
        "name=\"teacher_doc\"; filename=\"cv.txt\"\r\nContent-Type: application/octet-stream\r\n\r\nNadia, MSc\r\n"
    ));
}

#[test]
fn test_teacher_pay_must_be_whole() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![]);

    cmd_with(&config_path, &stub.url)
        .args(["teachers", "add", "--name", "Nadia", "--pay", "45000.50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a whole amount"));
    assert!(stub.requests.lock().unwrap().is_empty());
}

#[test]
fn test_expense_edit_keeps_unset_fields() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![
        (
            "GET /api/expenses/2/",
            200,
            r#"{"id": 2, "category": "UTILITY_BILLS", "amount": "8000.00", "date": "3/10/2025", "description": "Electricity"}"#,
        ),
        (
            "PUT /api/expenses/2/",
            200,
            r#"{"id": 2, "category": "UTILITY_BILLS", "amount": "8500.00", "date": "2025-03-10", "description": "Electricity"}"#,
        ),
    ]);

    cmd_with(&config_path, &stub.url)
        .args(["expenses", "edit", "2", "--amount", "8500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated expense #2"));

    assert_eq!(
        stub.request("PUT", "/api/expenses/2/").json(),
        serde_json::json!({
            "category": "UTILITY_BILLS",
            "amount": "8500.00",
            "date": "2025-03-10",
            "description": "Electricity"
        })
    );
}

#[test]
fn test_payment_add_defaults_to_teacher_pay() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![
        ("GET /api/teacher/2/", 200, r#"{"id": 2, "name": "Usman", "pay": 35000}"#),
        (
            "POST /api/teacherpay/",
            201,
            r#"{"id": 12, "teacher": 2, "month": "2025-03-01", "pay": 35000, "paid": true}"#,
        ),
    ]);

    cmd_with(&config_path, &stub.url)
        .args(["payments", "add", "--teacher", "2", "--month", "2025-03", "--paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created payment #12 for teacher #2"));

    assert_eq!(
        stub.request("POST", "/api/teacherpay/").json(),
        serde_json::json!({"teacher": 2, "month": "2025-03-01", "pay": 35000, "paid": true})
    );
}

#[test]
fn test_payment_edit_merges_with_stored_row() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![
        (
            "GET /api/teacherpay/4/",
            200,
            r#"{"id": 4, "teacher": 2, "month": "2025-03-01", "pay": 35000, "paid": false}"#,
        ),
        (
            "PUT /api/teacherpay/4/",
            200,
            r#"{"id": 4, "teacher": 2, "month": "2025-03-01", "pay": 36000, "paid": true}"#,
        ),
    ]);

    cmd_with(&config_path, &stub.url)
        .args(["payments", "edit", "4", "--pay", "36000", "--status", "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated payment #4"));

    assert_eq!(
        stub.request("PUT", "/api/teacherpay/4/").json(),
        serde_json::json!({"teacher": 2, "month": "2025-03-01", "pay": 36000, "paid": true})
    );
}

#[test]
fn test_challan_ignores_ids_outside_the_filtered_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let stub = serve(vec![("GET /api/studentfees/", 200, FEES)]);

    // Record 33 is loaded but belongs to March.
    cmd_with(&config_path, &stub.url)
        .args(["fees", "challan", "33", "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generated 0 challan(s), skipped 1 id(s) not in the list",
        ));
}
