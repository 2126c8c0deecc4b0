//! Fixtures shared by unit and property tests.

use chrono::Utc;
use rust_decimal::Decimal;

use motortrack_shared::types::{CashAdvanceId, MotorcycleId};

use crate::entity::{
    CashAdvance, CashAdvanceStatus, Customer, DocumentType, LiquidationDetails, Motorcycle,
    MotorcycleStatus,
};
use crate::workflow::types::DocumentUpload;

/// A motorcycle in `status` with no documents.
pub(crate) fn motorcycle(status: MotorcycleStatus) -> Motorcycle {
    let now = Utc::now();
    let id = MotorcycleId::new();
    Motorcycle {
        id,
        make: "Honda".to_string(),
        model: "Click 125i".to_string(),
        year: 2024,
        color: "Red".to_string(),
        plate_number: None,
        engine_number: format!("ENG-{id}"),
        chassis_number: format!("CHS-{id}"),
        customer: Customer {
            name: "Ana Santos".to_string(),
            ..Customer::default()
        },
        date_sold: Some(now.date_naive()),
        status,
        documents: vec![],
        endorsement_id: None,
        liquidation: None,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

/// A pending cash advance funding `ids`.
pub(crate) fn cash_advance(amount: Decimal, ids: &[MotorcycleId]) -> CashAdvance {
    let now = Utc::now();
    CashAdvance {
        id: CashAdvanceId::new(),
        personnel: "Lito Liaison".to_string(),
        purpose: "LTO registration".to_string(),
        amount,
        date: now.date_naive(),
        status: CashAdvanceStatus::Pending,
        motorcycle_ids: ids.to_vec(),
        check_voucher_number: None,
        check_voucher_release_date: None,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        liquidated_at: None,
        created_by: "Lito Liaison".to_string(),
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

/// Submitted liquidation details.
pub(crate) fn liquidation(
    parent_ca_id: Option<CashAdvanceId>,
    allocated_advance: Decimal,
    lto_or_amount: Decimal,
    lto_process_fee: Decimal,
) -> LiquidationDetails {
    let total_liquidation = lto_or_amount + lto_process_fee;
    LiquidationDetails {
        parent_ca_id,
        allocated_advance,
        lto_or_number: "OR-0001".to_string(),
        lto_or_amount,
        lto_process_fee,
        total_liquidation,
        shortage_overage: allocated_advance - total_liquidation,
        remarks: None,
        submitted_by: "Lito Liaison".to_string(),
        submitted_at: Utc::now(),
        verified_by: None,
        verified_at: None,
        returned_reason: None,
    }
}

/// A document upload without expiry.
pub(crate) fn upload(doc_type: DocumentType) -> DocumentUpload {
    DocumentUpload {
        doc_type,
        reference: None,
        expires_at: None,
    }
}
