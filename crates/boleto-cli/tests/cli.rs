use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BOLETO: &str = "\
237-2 23793.38128 60007.827136 61790.000634 6 16060000015075
Beneficiário: Acme S.A. CNPJ: 09.516.419/0001-75
Vencimento: 21/10/2026
Valor do Documento: R$ 150,75
";

const CORRUPTED_CNPJ: &str = "\
237-2 23793.38128 60007.827136 61790.000634 6 16060000015075
Beneficiário: Acme S.A. CNPJ: 09.516.419/0001-76
Vencimento: 21/10/2026
";

/// Command with its config directory pointed at `home`, so no user config leaks in.
fn boleto(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("boleto").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    boleto(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_process_wire_approved() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "boleto.txt", BOLETO);

    boleto(dir.path())
        .args(["process", "--format", "wire", "--text-only", "--date", "2026-10-16"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status_geral\": \"APROVADO\""))
        .stdout(predicate::str::contains("\"linha_digitavel_valida\": true"))
        .stdout(predicate::str::contains("due soon (5 days)"));
}

#[test]
fn test_process_rejects_corrupted_cnpj() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "boleto.txt", CORRUPTED_CNPJ);

    boleto(dir.path())
        .args(["process", "--format", "wire", "--text-only", "--date", "2026-10-16"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("REPROVADO"))
        .stdout(predicate::str::contains("\"cnpj_verificado\": false"));
}

#[test]
fn test_process_text_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "boleto.txt", BOLETO);

    boleto(dir.path())
        .args(["process", "--format", "text", "--text-only", "--date", "2026-10-16"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: APROVADO"))
        .stdout(predicate::str::contains("R$ 150,75"))
        .stdout(predicate::str::contains("237 (Bradesco)"));
}

#[test]
fn test_process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "boleto.txt", BOLETO);
    let output = dir.path().join("report.json");

    boleto(dir.path())
        .args(["process", "--text-only", "--date", "2026-10-16", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["outcome"]["overall_status"], "APPROVED");
    assert_eq!(report["fields"]["payment_line"]["value"], "23793381286000782713661790000634616060000015075");
    assert_eq!(report["recognition"]["engine_id"], "embedded_text");
}

#[test]
fn test_process_blank_document() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "blank.txt", "   \n\n");

    boleto(dir.path())
        .args(["process", "--text-only"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read document"));
}

#[test]
fn test_process_missing_file() {
    let dir = TempDir::new().unwrap();

    boleto(dir.path())
        .args(["process", "--text-only"])
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_validate_fields_file() {
    let dir = TempDir::new().unwrap();
    let fields = serde_json::json!({
        "payment_line": { "value": "23793381286000782713661790000634616060000015075", "confidence": "high", "source": "supplied" },
        "beneficiary_name": { "value": "Acme S.A.", "confidence": "high", "source": "supplied" },
        "beneficiary_tax_id": { "value": "09516419000175", "confidence": "high", "source": "supplied" },
        "due_date": { "value": "2026-10-10", "confidence": "high", "source": "supplied" }
    });
    let input = write(&dir, "fields.json", &fields.to_string());

    boleto(dir.path())
        .args(["validate", "--wire", "--date", "2026-10-16"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("APROVADO_COM_OBS"))
        .stdout(predicate::str::contains("expired (6 days ago)"));
}

#[test]
fn test_validate_rejects_bad_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "fields.json", "{ not json");

    boleto(dir.path())
        .arg("validate")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid fields JSON"));
}

#[test]
fn test_batch_with_summary() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", BOLETO);
    write(&dir, "b.txt", CORRUPTED_CNPJ);
    write(&dir, "blank.txt", "  \n");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    boleto(dir.path())
        .args(["batch", "--text-only", "--summary", "--continue-on-error", "--date", "2026-10-16"])
        .arg("--output-dir")
        .arg(&out)
        .arg(pattern.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"));

    assert!(out.join("a.txt.json").exists());
    assert!(out.join("b.txt.json").exists());
    assert!(!out.join("blank.txt.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("file,status"));
    assert!(summary.contains(",APROVADO,"));
    assert!(summary.contains(",REPROVADO,"));
    assert!(summary.contains(",ERROR,"));
}

#[test]
fn test_batch_stops_on_error() {
    let dir = TempDir::new().unwrap();
    write(&dir, "blank.txt", "  \n");
    let pattern = dir.path().join("*.txt");

    boleto(dir.path())
        .args(["batch", "--text-only"])
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();

    boleto(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("boleto config init"));

    boleto(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join("boleto").join("config.json").exists());

    boleto(dir.path())
        .args(["config", "set", "validation.due_soon_days", "3"])
        .assert()
        .success();

    boleto(dir.path())
        .args(["config", "get", "validation.due_soon_days"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));

    boleto(dir.path())
        .args(["config", "get", "validation.nope"])
        .assert()
        .failure();
}
