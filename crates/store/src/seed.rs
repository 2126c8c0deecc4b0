//! Demo data loaded at startup and by tests.
//!
//! Covers every stage of the workflow: units still at the store, an
//! endorsement batch, a pending advance, an advance under liquidation and a
//! fully liquidated advance with a unit due for insurance renewal.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use motortrack_core::entity::{
    CashAdvance, CashAdvanceStatus, Customer, Document, DocumentType, Endorsement,
    LiquidationDetails, Motorcycle, MotorcycleStatus, REGISTRATION_REQUIREMENTS,
};
use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use crate::repository::ChangeSet;

/// Builds the demo data set relative to `now`.
#[must_use]
pub fn demo(now: DateTime<Utc>) -> ChangeSet {
    let today = now.date_naive();
    let liaison = "Lito Reyes";

    let mut units = vec![
        unit(
            now,
            "Honda",
            "Click 125i",
            "Red",
            "KF12E-100231",
            "MLHJF1234N100231",
            "Maria Santos",
            MotorcycleStatus::Incomplete,
            &[],
        ),
        unit(
            now,
            "Yamaha",
            "Mio Gear",
            "Matte Blue",
            "E3X5E-204411",
            "MH3SEK110N204411",
            "Jose Dela Cruz",
            MotorcycleStatus::LackingRequirements,
            &[DocumentType::Csr, DocumentType::Coc],
        ),
        unit(
            now,
            "Suzuki",
            "Raider R150",
            "Black",
            "CGA1-318870",
            "MH8DL11A2N318870",
            "Ana Villanueva",
            MotorcycleStatus::ReadyToRegister,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Kawasaki",
            "Barako II",
            "Red",
            "BC175J-550198",
            "JKBBCJ17AN550198",
            "Ramon Garcia",
            MotorcycleStatus::EndorsedReady,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Honda",
            "Beat",
            "White",
            "JF83E-412093",
            "MLHJF8320N412093",
            "Liza Mendoza",
            MotorcycleStatus::EndorsedIncomplete,
            &[DocumentType::Csr, DocumentType::Coc, DocumentType::SalesInvoice],
        ),
        unit(
            now,
            "Yamaha",
            "NMAX 155",
            "Grey",
            "G3L9E-771204",
            "MH3SG4620N771204",
            "Paolo Reyes",
            MotorcycleStatus::Processing,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Honda",
            "ADV 160",
            "Black",
            "KF45E-610772",
            "MLHKF4510N610772",
            "Carmen Lim",
            MotorcycleStatus::ForLiquidation,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Suzuki",
            "Burgman Street",
            "Silver",
            "AG125-902331",
            "MH8DP11A9N902331",
            "Daniel Tan",
            MotorcycleStatus::ForVerification,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Yamaha",
            "Aerox 155",
            "Cyan",
            "BF6E-338102",
            "MH3SG5320N338102",
            "Grace Aquino",
            MotorcycleStatus::Completed,
            &REGISTRATION_REQUIREMENTS,
        ),
        unit(
            now,
            "Honda",
            "TMX Supremo",
            "Red",
            "JC73E-120447",
            "MLHJC7310N120447",
            "Eduardo Bautista",
            MotorcycleStatus::Registered,
            &REGISTRATION_REQUIREMENTS,
        ),
    ];

    let endorsement = Endorsement {
        id: EndorsementId::new(),
        transaction_date: today - Duration::days(21),
        liaison_name: liaison.to_string(),
        created_by: "Sarah Gomez".to_string(),
        remarks: Some("Weekly batch".to_string()),
        motorcycle_ids: units[3..].iter().map(|m| m.id).collect(),
        version: 0,
        created_at: now - Duration::days(21),
    };
    for endorsed in &mut units[3..] {
        endorsed.endorsement_id = Some(endorsement.id);
    }

    let pending = advance(
        now,
        liaison,
        Decimal::new(250_000, 2),
        &[units[5].id],
        CashAdvanceStatus::Pending,
        today - Duration::days(2),
    );

    let mut released = advance(
        now,
        liaison,
        Decimal::new(500_000, 2),
        &[units[6].id, units[7].id],
        CashAdvanceStatus::CvReleased,
        today - Duration::days(14),
    );
    released.approved_by = Some("Alma Cruz".to_string());
    released.approved_at = Some(now - Duration::days(13));
    released.check_voucher_number = Some("CV-2024-0117".to_string());
    released.check_voucher_release_date = Some(today - Duration::days(12));

    let mut closed = advance(
        now,
        liaison,
        Decimal::new(500_000, 2),
        &[units[8].id, units[9].id],
        CashAdvanceStatus::Liquidated,
        today - Duration::days(30),
    );
    closed.approved_by = Some("Alma Cruz".to_string());
    closed.approved_at = Some(now - Duration::days(29));
    closed.check_voucher_number = Some("CV-2024-0098".to_string());
    closed.check_voucher_release_date = Some(today - Duration::days(28));
    closed.liquidated_at = Some(now - Duration::days(3));

    units[7].liquidation = Some(liquidation(
        now,
        released.id,
        "OR-55812",
        Decimal::new(180_000, 2),
        Decimal::new(52_000, 2),
        None,
    ));
    units[8].liquidation = Some(liquidation(
        now,
        closed.id,
        "OR-55102",
        Decimal::new(175_000, 2),
        Decimal::new(50_000, 2),
        Some("Alma Cruz"),
    ));
    units[9].liquidation = Some(liquidation(
        now,
        closed.id,
        "OR-55103",
        Decimal::new(175_000, 2),
        Decimal::new(50_000, 2),
        Some("Alma Cruz"),
    ));

    let registered = &mut units[9];
    registered.plate_number = Some("NCR 4821".to_string());
    registered.documents.push(Document::new(
        DocumentType::OrCr,
        Some("ORCR-88213".to_string()),
        now - Duration::days(340),
        Some(now + Duration::days(25)),
    ));
    for doc in &mut registered.documents {
        if doc.doc_type == DocumentType::Insurance {
            doc.expires_at = Some(now + Duration::days(20));
        }
    }

    ChangeSet {
        motorcycles: units,
        cash_advances: vec![closed, released, pending],
        endorsements: vec![endorsement],
    }
}

#[allow(clippy::too_many_arguments)]
fn unit(
    now: DateTime<Utc>,
    make: &str,
    model: &str,
    color: &str,
    engine_number: &str,
    chassis_number: &str,
    customer: &str,
    status: MotorcycleStatus,
    documents: &[DocumentType],
) -> Motorcycle {
    let received = now - Duration::days(45);
    Motorcycle {
        id: MotorcycleId::new(),
        make: make.to_string(),
        model: model.to_string(),
        year: 2024,
        color: color.to_string(),
        plate_number: None,
        engine_number: engine_number.to_string(),
        chassis_number: chassis_number.to_string(),
        customer: Customer {
            name: customer.to_string(),
            address: Some("Quezon City".to_string()),
            contact_number: None,
        },
        date_sold: Some(received.date_naive()),
        status,
        documents: documents
            .iter()
            .map(|doc_type| {
                let expires_at =
                    (*doc_type == DocumentType::Insurance).then(|| received + Duration::days(365));
                Document::new(*doc_type, None, received, expires_at)
            })
            .collect(),
        endorsement_id: None,
        liquidation: None,
        version: 0,
        created_at: received,
        updated_at: received,
    }
}

fn advance(
    now: DateTime<Utc>,
    personnel: &str,
    amount: Decimal,
    motorcycle_ids: &[MotorcycleId],
    status: CashAdvanceStatus,
    date: NaiveDate,
) -> CashAdvance {
    CashAdvance {
        id: CashAdvanceId::new(),
        personnel: personnel.to_string(),
        purpose: "LTO registration processing".to_string(),
        amount,
        date,
        status,
        motorcycle_ids: motorcycle_ids.to_vec(),
        check_voucher_number: None,
        check_voucher_release_date: None,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        liquidated_at: None,
        created_by: personnel.to_string(),
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

fn liquidation(
    now: DateTime<Utc>,
    parent: CashAdvanceId,
    or_number: &str,
    lto_or_amount: Decimal,
    lto_process_fee: Decimal,
    verified_by: Option<&str>,
) -> LiquidationDetails {
    let allocated_advance = Decimal::new(250_000, 2);
    let total_liquidation = lto_or_amount + lto_process_fee;
    LiquidationDetails {
        parent_ca_id: Some(parent),
        allocated_advance,
        lto_or_number: or_number.to_string(),
        lto_or_amount,
        lto_process_fee,
        total_liquidation,
        shortage_overage: allocated_advance - total_liquidation,
        remarks: None,
        submitted_by: "Lito Reyes".to_string(),
        submitted_at: now - Duration::days(5),
        verified_by: verified_by.map(str::to_string),
        verified_at: verified_by.map(|_| now - Duration::days(4)),
        returned_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[test]
    fn test_demo_data_is_consistent() {
        let seed = demo(Utc::now());
        assert_eq!(seed.motorcycles.len(), 10);
        assert_eq!(seed.cash_advances.len(), 3);
        assert!(InMemoryStore::seeded(seed).is_ok());
    }
}
