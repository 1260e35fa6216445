use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Record;
use crate::error::SchoolError;
use crate::money::Money;

/// The fixed set of line items on a monthly fee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeKind {
    Tuition,
    Exam,
    Ac,
    Stationary,
    Admission,
    Lab,
    Security,
    Misc,
    Pending,
}

impl ChargeKind {
    /// Every charge that contributes to `total_fee`, in display order.
    pub const ALL: [ChargeKind; 9] = [
        ChargeKind::Tuition,
        ChargeKind::Exam,
        ChargeKind::Ac,
        ChargeKind::Stationary,
        ChargeKind::Admission,
        ChargeKind::Lab,
        ChargeKind::Security,
        ChargeKind::Misc,
        ChargeKind::Pending,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            ChargeKind::Tuition => "tuition_fee",
            ChargeKind::Exam => "exam_fee",
            ChargeKind::Ac => "ac_charges",
            ChargeKind::Stationary => "stationary_charges",
            ChargeKind::Admission => "admission_fee",
            ChargeKind::Lab => "lab_charges",
            ChargeKind::Security => "security_fee",
            ChargeKind::Misc => "misc",
            ChargeKind::Pending => "pending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargeKind::Tuition => "Tuition Fee",
            ChargeKind::Exam => "Exam Fee",
            ChargeKind::Ac => "AC Charges",
            ChargeKind::Stationary => "Stationary Charges",
            ChargeKind::Admission => "Admission Fee",
            ChargeKind::Lab => "Lab Charges",
            ChargeKind::Security => "Security (Refundable)",
            ChargeKind::Misc => "Miscellaneous",
            ChargeKind::Pending => "Previous Dues",
        }
    }
}

impl FromStr for ChargeKind {
    type Err = SchoolError;

    /// Field names as sent to the backend, plus short forms ("exam", "ac").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let short = match key.as_str() {
            "tuition" => Some(ChargeKind::Tuition),
            "exam" => Some(ChargeKind::Exam),
            "ac" => Some(ChargeKind::Ac),
            "stationary" => Some(ChargeKind::Stationary),
            "admission" => Some(ChargeKind::Admission),
            "lab" => Some(ChargeKind::Lab),
            "security" => Some(ChargeKind::Security),
            _ => None,
        };
        short
            .or_else(|| ChargeKind::ALL.into_iter().find(|k| k.field_name() == key))
            .ok_or_else(|| SchoolError::UnknownFeeField(s.to_string()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeeCharges {
    #[serde(default)]
    pub tuition_fee: Money,
    #[serde(default)]
    pub exam_fee: Money,
    #[serde(default)]
    pub ac_charges: Money,
    #[serde(default)]
    pub stationary_charges: Money,
    #[serde(default)]
    pub admission_fee: Money,
    #[serde(default)]
    pub lab_charges: Money,
    #[serde(default)]
    pub security_fee: Money,
    #[serde(default)]
    pub misc: Money,
    #[serde(default)]
    pub pending: Money,
}

impl FeeCharges {
    pub fn get(&self, kind: ChargeKind) -> Money {
        match kind {
            ChargeKind::Tuition => self.tuition_fee,
            ChargeKind::Exam => self.exam_fee,
            ChargeKind::Ac => self.ac_charges,
            ChargeKind::Stationary => self.stationary_charges,
            ChargeKind::Admission => self.admission_fee,
            ChargeKind::Lab => self.lab_charges,
            ChargeKind::Security => self.security_fee,
            ChargeKind::Misc => self.misc,
            ChargeKind::Pending => self.pending,
        }
    }

    pub fn set(&mut self, kind: ChargeKind, value: Money) {
        let slot = match kind {
            ChargeKind::Tuition => &mut self.tuition_fee,
            ChargeKind::Exam => &mut self.exam_fee,
            ChargeKind::Ac => &mut self.ac_charges,
            ChargeKind::Stationary => &mut self.stationary_charges,
            ChargeKind::Admission => &mut self.admission_fee,
            ChargeKind::Lab => &mut self.lab_charges,
            ChargeKind::Security => &mut self.security_fee,
            ChargeKind::Misc => &mut self.misc,
            ChargeKind::Pending => &mut self.pending,
        };
        *slot = value;
    }

    /// (kind, amount) pairs in display order.
    pub fn items(&self) -> impl Iterator<Item = (ChargeKind, Money)> + '_ {
        ChargeKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// Denormalised student identity embedded in fee rows.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct StudentInfo {
    #[serde(default)]
    pub roll_no: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StudentFee {
    pub id: i64,
    /// Write-only on the backend; usually absent in list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<i64>,
    #[serde(default)]
    pub student_info: StudentInfo,
    #[serde(default)]
    pub month: String,
    #[serde(flatten)]
    pub charges: FeeCharges,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_fee: Money,
    #[serde(default)]
    pub amount_paid: Money,
    #[serde(default)]
    pub balance: Money,
    #[serde(default)]
    pub paid: bool,
}

impl StudentFee {
    /// The student's primary key, falling back to the embedded roll number.
    pub fn student_id(&self) -> i64 {
        self.student.unwrap_or(self.student_info.roll_no)
    }
}

impl Record for StudentFee {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn describe(&self) -> String {
        format!("fee #{} ({})", self.id, self.student_info.name)
    }
}

/// Body sent when creating or updating a fee record.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FeeSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student: i64,
    pub month: String,
    #[serde(flatten)]
    pub charges: FeeCharges,
    pub description: String,
    pub total_fee: Money,
    pub amount_paid: Money,
    pub balance: Money,
    pub paid: bool,
}

/// Bulk fee generation for every enrolled student.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FeeGeneration {
    pub month: NaiveDate,
    pub exam_fee: Money,
    pub ac_charges: Money,
    pub stationary_charges: Money,
    pub lab_charges: Money,
}
