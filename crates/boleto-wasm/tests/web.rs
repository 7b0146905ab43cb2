#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use boleto_wasm::{process_text, validate_cnpj, validate_payment_line, payment_line_to_barcode};

const LINE: &str = "23793.38128 60007.827136 61790.000634 6 16060000015075";

#[wasm_bindgen_test]
fn test_validate_cnpj() {
    assert!(validate_cnpj("09.516.419/0001-75"));
    assert!(!validate_cnpj("09.516.419/0001-76"));
}

#[wasm_bindgen_test]
fn test_validate_payment_line() {
    assert!(validate_payment_line(LINE, true));
    assert!(!validate_payment_line("2379338128600078271366179000063461606000001507", false));
}

#[wasm_bindgen_test]
fn test_barcode() {
    assert_eq!(
        payment_line_to_barcode(LINE).unwrap(),
        "23796160600000150753381260007827136179000063"
    );
}

#[wasm_bindgen_test]
fn test_process_text_wire() {
    let text = format!(
        "Beneficiário: Loja Exemplo Ltda\nCNPJ: 09.516.419/0001-75\nVencimento: 21/10/2026\n{}\n",
        LINE
    );
    let wire = process_text(&text, Some("2026-10-16".to_string())).unwrap();
    assert!(wire.contains("\"status_geral\":\"APROVADO\""));
    assert!(wire.contains("due soon (5 days)"));
}
