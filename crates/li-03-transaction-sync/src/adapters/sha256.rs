//! SHA-256 version fingerprint over the ERP-origin fields.

use crate::ports::VersionFingerprinter;
use sha2::{Digest, Sha256};
use shared_types::{Transaction, TransactionItem};

/// Field separator; cannot occur in the encoded values.
const SEP: &[u8] = &[0x1f];

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Fingerprinter;

impl Sha256Fingerprinter {
    pub fn new() -> Self {
        Self
    }
}

impl VersionFingerprinter for Sha256Fingerprinter {
    fn compute(&self, tx: &Transaction) -> String {
        let mut hasher = Sha256::new();

        for field in [
            tx.id.as_str(),
            tx.organisation_id.as_str(),
            tx.internal_number.as_str(),
            tx.transaction_type.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update(SEP);
        }
        hasher.update(tx.entry_date.to_string().as_bytes());
        hasher.update(SEP);

        // Item order coming from the ERP is not significant.
        let mut items: Vec<&TransactionItem> = tx.items.iter().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        for item in items {
            update_item(&mut hasher, item);
        }

        hex::encode(hasher.finalize())
    }
}

fn update_item(hasher: &mut Sha256, item: &TransactionItem) {
    hasher.update(item.id.as_bytes());
    hasher.update(SEP);
    for field in [
        &item.account_debit,
        &item.account_credit,
        &item.document_number,
        &item.cost_center,
    ] {
        hasher.update(field.as_deref().unwrap_or("").as_bytes());
        hasher.update(SEP);
    }
    // normalize() so that 10.0 and 10.00 hash alike
    hasher.update(item.amount_fcy.normalize().to_string().as_bytes());
    hasher.update(SEP);
    hasher.update(item.amount_lcy.normalize().to_string().as_bytes());
    hasher.update(SEP);
    hasher.update(item.currency.as_bytes());
    hasher.update(SEP);
}
