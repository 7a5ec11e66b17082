use zeroize::Zeroize;

use super::{expand::expand_tokens, parser::parse_script, AutotypeToken};

/// Field types of a password entry that auto-type can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Title,
    Group,
    UserName,
    Password,
    Url,
    Email,
    Notes,
    Autotype,
    TwoFactorKey,
    CreditCardNumber,
    CreditCardExpiration,
    CreditCardVerificationValue,
    CreditCardPin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    record_type: RecordType,
    data: Vec<u8>,
}

impl Record {
    pub fn new(record_type: RecordType, data: Vec<u8>) -> Self {
        Self { record_type, data }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Overwrites the stored bytes with zeros and leaves the record empty.
    pub fn clear(&mut self) {
        self.data.zeroize();
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Ordered collection of records. Auto-type only ever reads from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    records: Vec<Record>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first record of the given type, appending one if missing.
    pub fn with_text(self, record_type: RecordType, text: &str) -> Self {
        self.with_bytes(record_type, text.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, record_type: RecordType, data: Vec<u8>) -> Self {
        match self.records.iter_mut().find(|r| r.record_type == record_type) {
            Some(record) => {
                record.clear();
                record.data = data;
            }
            None => self.records.push(Record::new(record_type, data)),
        }
        self
    }

    /// Appends a record even if one of the same type exists, e.g. a second
    /// auto-type script.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, record_type: RecordType) -> Option<&Record> {
        self.records.iter().find(|r| r.record_type == record_type)
    }

    /// Text of the first record of that type, empty if absent.
    pub fn text(&self, record_type: RecordType) -> String {
        self.get(record_type).map(Record::text).unwrap_or_default()
    }

    pub fn bytes(&self, record_type: RecordType) -> &[u8] {
        self.get(record_type).map(Record::bytes).unwrap_or_default()
    }

    /// Unexpanded tokens of every auto-type script, or the default sequence
    /// when the entry has none.
    pub fn autotype_scripts(&self) -> Vec<Vec<AutotypeToken>> {
        let scripts: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.record_type == RecordType::Autotype)
            .map(|r| parse_script(&r.text()))
            .collect();
        if scripts.is_empty() {
            vec![parse_script("")]
        } else {
            scripts
        }
    }

    /// Tokens of the entry's first auto-type script with fields filled in.
    pub fn autotype_tokens(&self) -> Vec<AutotypeToken> {
        expand_tokens(&parse_script(&self.text(RecordType::Autotype)), self)
    }
}
