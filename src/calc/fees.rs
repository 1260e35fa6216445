//! Fee totals, balances and the draft controller behind `fees add/edit/calc`.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::{Result, SchoolError};
use crate::models::{ChargeKind, FeeCharges, FeeSubmission, Student, StudentFee, StudentInfo};
use crate::money::Money;

/// Sum of all nine charge fields, rounded to cents.
pub fn total_fee(charges: &FeeCharges) -> Money {
    charges.items().map(|(_, amount)| amount).sum::<Money>().round_cents()
}

/// Outstanding amount; never negative.
pub fn balance(total: Money, amount_paid: Money) -> Money {
    (total - amount_paid).max(Money::ZERO).round_cents()
}

/// A field that can be edited on a fee draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Charge(ChargeKind),
    AmountPaid,
    Month,
    Description,
}

impl DraftField {
    fn triggers_recompute(&self) -> bool {
        matches!(self, DraftField::Charge(_) | DraftField::AmountPaid)
    }
}

impl FromStr for DraftField {
    type Err = SchoolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amount_paid" | "paid_amount" => Ok(DraftField::AmountPaid),
            "month" => Ok(DraftField::Month),
            "description" | "note" => Ok(DraftField::Description),
            _ => s.parse().map(DraftField::Charge),
        }
    }
}

/// Parse `field=value` as given to `--set`.
pub fn parse_assignment(input: &str) -> Result<(DraftField, String)> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| SchoolError::InvalidAssignment(input.to_string()))?;
    Ok((field.parse()?, value.to_string()))
}

/// Editable fee record. Derived fields are recomputed whenever a charge or the
/// paid amount changes, so they are never stale with respect to the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeDraft {
    pub id: Option<i64>,
    pub student: Option<i64>,
    pub student_info: StudentInfo,
    pub month: String,
    pub charges: FeeCharges,
    pub description: String,
    pub amount_paid: Money,
    pub total_fee: Money,
    pub balance: Money,
    pub paid: bool,
}

impl FeeDraft {
    /// Blank draft for a new record billed on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            student: None,
            student_info: StudentInfo::default(),
            month: today.format("%Y-%m-%d").to_string(),
            charges: FeeCharges::default(),
            description: String::new(),
            amount_paid: Money::ZERO,
            total_fee: Money::ZERO,
            balance: Money::ZERO,
            paid: false,
        }
    }

    /// Draft for editing a stored record. Stored totals are kept until something changes.
    pub fn from_fee(fee: &StudentFee) -> Self {
        Self {
            id: Some(fee.id),
            student: Some(fee.student_id()),
            student_info: fee.student_info.clone(),
            month: fee.month.clone(),
            charges: fee.charges.clone(),
            description: fee.description.clone().unwrap_or_default(),
            amount_paid: fee.amount_paid,
            total_fee: fee.total_fee,
            balance: fee.balance,
            paid: fee.paid,
        }
    }

    /// Bill this draft to `student`, carrying their outstanding balance forward.
    pub fn select_student(&mut self, student: &Student) {
        self.student = Some(student.roll_no);
        self.student_info = StudentInfo {
            roll_no: student.roll_no,
            name: student.name.clone(),
            grade: student.grade,
        };
        self.charges.pending = student.pending_fee;
        self.recompute();
    }

    /// Apply one edit. Returns true when derived fields were recomputed.
    pub fn set(&mut self, field: DraftField, value: &str) -> bool {
        match field {
            DraftField::Charge(kind) => self.charges.set(kind, Money::parse_or_zero(value)),
            DraftField::AmountPaid => self.amount_paid = Money::parse_or_zero(value),
            DraftField::Month => self.month = value.trim().to_string(),
            DraftField::Description => self.description = value.to_string(),
        }
        if field.triggers_recompute() {
            self.recompute();
            true
        } else {
            false
        }
    }

    /// Manual override of the paid flag; the next amount edit recomputes it.
    pub fn set_paid(&mut self, paid: bool) {
        self.paid = paid;
    }

    fn recompute(&mut self) {
        self.total_fee = total_fee(&self.charges);
        self.balance = balance(self.total_fee, self.amount_paid);
        self.paid = self.amount_paid > Money::ZERO;
    }

    /// Request body with totals recomputed from the current inputs.
    pub fn submission(&self) -> Result<FeeSubmission> {
        let student = self
            .student
            .ok_or_else(|| SchoolError::invalid("student", "", "a student is required"))?;
        let total = total_fee(&self.charges);
        Ok(FeeSubmission {
            id: self.id,
            student,
            month: self.month.clone(),
            charges: self.charges.clone(),
            description: self.description.clone(),
            total_fee: total,
            amount_paid: self.amount_paid,
            balance: balance(total, self.amount_paid),
            paid: self.paid,
        })
    }
}
