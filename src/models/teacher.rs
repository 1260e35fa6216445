use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{default_true, has_file, Record};
use crate::api::Multipart;
use crate::error::{Result, SchoolError};
use crate::money::Money;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub cnic: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub pay: Money,
    #[serde(default)]
    pub joining_date: Option<String>,
    #[serde(default = "default_true")]
    pub enrolled: bool,
    #[serde(default)]
    pub teacher_doc: Option<String>,
}

impl Teacher {
    pub fn has_document(&self) -> bool {
        has_file(&self.teacher_doc)
    }
}

impl Record for Teacher {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn describe(&self) -> String {
        format!("teacher #{} ({})", self.id, self.name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct TeacherInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub cnic: Option<String>,
    pub qualification: Option<String>,
    pub pay: Option<Money>,
    pub enrolled: Option<bool>,
    pub document: Option<PathBuf>,
}

impl TeacherInput {
    pub fn to_form(&self) -> Result<Multipart> {
        let mut form = Multipart::new();
        form.text_opt("name", self.name.as_deref());
        form.text_opt("contact", self.contact.as_deref());
        form.text_opt("cnic", self.cnic.as_deref());
        form.text_opt("qualification", self.qualification.as_deref());
        form.text_opt("pay", whole_pay(self.pay)?.map(|p| p.to_string()).as_deref());
        form.text_opt("enrolled", self.enrolled.map(|e| e.to_string()).as_deref());
        if let Some(path) = &self.document {
            form.file("teacher_doc", path)?;
        }
        Ok(form)
    }
}

/// Pay is stored as a whole number by the backend; fractions are refused
/// rather than cut off.
fn whole_pay(pay: Option<Money>) -> Result<Option<i64>> {
    pay.map(|p| {
        p.whole()
            .ok_or_else(|| SchoolError::invalid("pay", &p.to_string(), "must be a whole amount"))
    })
    .transpose()
}

/// One month's salary line for one teacher.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TeacherPayment {
    pub id: i64,
    pub teacher: i64,
    pub month: String,
    #[serde(default)]
    pub pay: Money,
    #[serde(default)]
    pub paid: bool,
}

impl Record for TeacherPayment {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn describe(&self) -> String {
        format!("teacher payment #{}", self.id)
    }
}

/// Asks the backend to create a payment row for every enrolled teacher.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GenerateTeacherPay {
    pub month: NaiveDate,
}

/// Body for creating or editing one payment row.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TeacherPaymentInput {
    pub teacher: i64,
    pub month: NaiveDate,
    pub pay: i64,
    pub paid: bool,
}

impl TeacherPaymentInput {
    pub fn new(teacher: i64, month: NaiveDate, pay: Money, paid: bool) -> Result<Self> {
        Ok(Self {
            teacher,
            month,
            pay: whole_pay(Some(pay))?.unwrap_or_default(),
            paid,
        })
    }

    /// Starts from a stored row, for edits.
    pub fn from_payment(payment: &TeacherPayment) -> Result<Self> {
        let month = crate::dates::parse_record_date(&payment.month).ok_or_else(|| {
            SchoolError::invalid("month", &payment.month, "stored month is not a date")
        })?;
        Self::new(payment.teacher, month, payment.pay, payment.paid)
    }
}
