//! Common regex patterns for boleto extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Payment line as printed: 5.5 5.6 5.6 1 14
    pub static ref PAYMENT_LINE_PRINTED: Regex = Regex::new(
        r"\b(\d{5})[.\s]?(\d{5})\s+(\d{5})[.\s]?(\d{6})\s+(\d{5})[.\s]?(\d{6})\s+(\d)\s+(\d{14})\b"
    ).unwrap();

    // Digits with at most one space, dot or hyphen between them
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"\d(?:[ .\-]?\d)*"
    ).unwrap();

    // Same, also allowing '/' (CNPJ masks)
    pub static ref TAX_ID_RUN: Regex = Regex::new(
        r"\d(?:[ ./\-]?\d)*"
    ).unwrap();

    // Amounts
    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)(?:valor\s+(?:do\s+)?documento|valor\s+cobrado|valor\s+a\s+pagar|valor\s+do\s+boleto|total\s+a\s+pagar)[\s:=()\-]*(?:R\$|BRL)?\s*(\d{1,3}(?:[. ]\d{3})*,\d{2}|\d+[.,]\d{2})\b"
    ).unwrap();

    pub static ref AMOUNT_WITH_CURRENCY: Regex = Regex::new(
        r"(?:R\$|BRL|\$)[ \t]*(\d{1,3}(?:[., ]\d{3})*[.,]\d{2}|\d+[.,]\d{2})\b"
    ).unwrap();

    // Day/month/year, separators / - . with optional surrounding spaces
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})\s?[/.\-]\s?(\d{1,2})\s?[/.\-]\s?(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DUE_DATE_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:data\s+de\s+vencimento|vencimento|vencto|venc|vcto|pagamento\s+at[ée]|pagar\s+at[ée]|due\s+date)"
    ).unwrap();

    // CNPJ
    pub static ref CNPJ_LABELED: Regex = Regex::new(
        r"(?i)\b(?:CPF\s*/\s*CNPJ|CNPJ\s*/\s*CPF|CNPJ|C\.N\.P\.J\.?)(?:\s+do\s+benefici[aá]rio)?\s*(?:n[º°o.]*\s*)?[:\-]?\s*(\d{2}\.?\d{3}\.?\d{3}\s?/?\s?\d{4}\s?-?\s?\d{2})\b"
    ).unwrap();

    pub static ref CNPJ_MASKED: Regex = Regex::new(
        r"\b\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}\b"
    ).unwrap();

    pub static ref TAX_ID_LABEL: Regex = Regex::new(
        r"(?i)\b(?:CNPJ|CPF|C\.N\.P\.J)"
    ).unwrap();

    // Party labels, matched at the start of a line
    pub static ref BENEFICIARY_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:benefici[aá]rio(?:\s+final)?|cedente|favorecido)\b\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref PAYER_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:pagador|sacado)\b\s*[:\-]?\s*(.*)$"
    ).unwrap();

    // Labels further along a line, e.g. after the due date. These need a colon
    // so that "Código do Beneficiário" headers are not taken as labels.
    pub static ref BENEFICIARY_LABEL_INLINE: Regex = Regex::new(
        r"(?i)\s(?:benefici[aá]rio(?:\s+final)?|cedente|favorecido)\s*:\s*(.*)$"
    ).unwrap();

    pub static ref PAYER_LABEL_INLINE: Regex = Regex::new(
        r"(?i)\s(?:pagador|sacado)\s*:\s*(.*)$"
    ).unwrap();

    // Lines that carry another label and end a name search
    pub static ref STOP_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:ag[eê]ncia|c[oó]digo|nosso\s+n[uú]mero|vencimento|data|valor|cnpj|cpf|pagador|sacado|benefici[aá]rio|cedente|esp[eé]cie|carteira|local\s+de\s+pagamento|instru[cç][oõ]es|n[uú]mero\s+do\s+documento|endere[cç]o)\b"
    ).unwrap();

    // Bank
    pub static ref BANK_LABEL: Regex = Regex::new(
        r"(?i)\bbanco\s*(?:n[º°o.]*\s*)?[:\-]?\s*(\d{3})\b"
    ).unwrap();

    pub static ref BANK_NAME_PAIR: Regex = Regex::new(
        r"(?i)\b(\d{3})\s*-\s*[\dxX]?\s*[|\-]?\s*(?:banco|bradesco|ita[uú]|santander|caixa|sicoob|sicredi|nubank|inter|c6|safra|banrisul|brb)\b"
    ).unwrap();

    pub static ref BANK_BEFORE_LINE: Regex = Regex::new(
        r"\b(\d{3})(?:\s*-\s*[\dxX])?\s*\|?\s*$"
    ).unwrap();

    // Nosso número
    pub static ref OUR_NUMBER_LABEL: Regex = Regex::new(
        r"(?i)\bnosso\s+n(?:[uú]mero|[º°o.])[ \t]*[:\-]?[ \t]*([0-9][0-9 ./\-]{2,30}[0-9xX])?"
    ).unwrap();

    pub static ref OUR_NUMBER_VALUE: Regex = Regex::new(
        r"^\s*([0-9][0-9 ./\-]{2,30}[0-9xX])\s*$"
    ).unwrap();
}
